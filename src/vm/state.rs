use crate::{
    error::VmError,
    loader::{bootstrap::boot_class_path, ClassDef, ClassLoader, MethodArea},
    types::{hierarchy::ClassResolver, names, Class, ClassId, ClassSource, LoaderId},
    value::{Extra, HeapStorage, ObjectRef},
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::debug;

use super::{metrics::RuntimeMetrics, natives::NativeRegistry, Thread};

/// State shared by every thread of one virtual machine.
pub struct Runtime {
    pub area: MethodArea,
    natives: Arc<NativeRegistry>,
    pub metrics: Arc<RuntimeMetrics>,
    next_thread_id: AtomicU64,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// A runtime over the built-in boot class path and the process-wide natives.
    pub fn new() -> Self {
        Self::with_registry(NativeRegistry::global())
    }

    pub fn with_registry(natives: Arc<NativeRegistry>) -> Self {
        Self::with_boot_class_path(boot_class_path(), natives)
    }

    pub fn with_boot_class_path(defs: Vec<ClassDef>, natives: Arc<NativeRegistry>) -> Self {
        let metrics = Arc::new(RuntimeMetrics::new());
        Self {
            area: MethodArea::new(defs, metrics.clone()),
            natives,
            metrics,
            next_thread_id: AtomicU64::new(1),
        }
    }

    pub fn natives(&self) -> &NativeRegistry {
        &self.natives
    }

    pub fn attach_thread(&self) -> Thread {
        Thread {
            id: self.next_thread_id.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// A user loader delegating to the bootstrap loader.
    pub fn new_loader(&self, name: impl Into<String>, source: ClassSource) -> Arc<ClassLoader> {
        self.area.new_loader(name, source, None)
    }

    pub fn class(&self, id: ClassId) -> Arc<Class> {
        self.area.class(id)
    }

    pub fn load_class(&self, loader: LoaderId, name: &str) -> Result<ClassId, VmError> {
        self.area.load_class(loader, name)
    }

    /// Resolves a name as a user would type it: dot or slash form, an array
    /// descriptor, or a primitive keyword.
    pub fn resolve_user_name(&self, loader: LoaderId, name: &str) -> Result<ClassId, VmError> {
        if let Some(id) = self.area.primitive_class(name) {
            return Ok(id);
        }
        self.load_class(loader, &names::to_internal_name(name))
    }

    pub fn is_assignable(&self, source: ClassId, target: ClassId) -> bool {
        self.area.is_assignable(source, target)
    }

    /// `instanceof`: never true for null.
    pub fn is_instance(&self, value: &ObjectRef, class: ClassId) -> bool {
        match value.class() {
            Some(runtime_class) => self.is_assignable(runtime_class, class),
            None => false,
        }
    }

    pub fn new_string(&self, text: impl Into<String>) -> Result<ObjectRef, VmError> {
        let class = self.load_class(LoaderId::BOOTSTRAP, "java/lang/String")?;
        Ok(ObjectRef::new(class, HeapStorage::Str(text.into())))
    }

    /// A reference array of `component` elements.
    pub fn new_object_array(
        &self,
        component: ClassId,
        elements: Vec<ObjectRef>,
    ) -> Result<ObjectRef, VmError> {
        let component = self.class(component);
        let array_class = self.load_class(
            component.defining_loader(),
            &names::array_class_name(&component.name),
        )?;
        Ok(ObjectRef::new(array_class, HeapStorage::Vec(elements)))
    }

    /// The `java/lang/Class` instance of `id`. Always the same object.
    pub fn class_object(&self, id: ClassId) -> Result<ObjectRef, VmError> {
        let class = self.class(id);
        if let Some(mirror) = class.mirror.get() {
            return Ok(mirror.clone());
        }
        let mirror_class = self.load_class(LoaderId::BOOTSTRAP, "java/lang/Class")?;
        let mirror = class.mirror.get_or_init(|| {
            self.metrics.record_mirror_created();
            debug!(class = %class.name, "created class mirror");
            ObjectRef::new(
                mirror_class,
                HeapStorage::Obj {
                    extra: Some(Extra::Class(id)),
                },
            )
        });
        Ok(mirror.clone())
    }

    /// The `java/lang/ClassLoader` handle of `loader`, with the handle's class
    /// resolved through that loader. Always the same object.
    pub fn loader_object(&self, loader: LoaderId) -> Result<ObjectRef, VmError> {
        let l = self.area.loader(loader);
        if let Some(handle) = l.mirror.get() {
            return Ok(handle.clone());
        }
        let handle_class = self.load_class(loader, "java/lang/ClassLoader")?;
        let handle = l.mirror.get_or_init(|| {
            self.metrics.record_loader_handle_created();
            debug!(loader = %l.name, "created class loader handle");
            ObjectRef::new(
                handle_class,
                HeapStorage::Obj {
                    extra: Some(Extra::Loader(loader)),
                },
            )
        });
        Ok(handle.clone())
    }

    /// The `sun/reflect/ConstantPool` peer of `id`. Its fields are never
    /// populated.
    pub fn constant_pool_object(&self, id: ClassId) -> Result<ObjectRef, VmError> {
        let class = self.class(id);
        if let Some(peer) = class.constant_pool.get() {
            return Ok(peer.clone());
        }
        let peer_class = self.load_class(LoaderId::BOOTSTRAP, "sun/reflect/ConstantPool")?;
        let peer = class.constant_pool.get_or_init(|| {
            self.metrics.record_constant_pool_peer_created();
            debug!(class = %class.name, "created constant pool peer");
            ObjectRef::new(
                peer_class,
                HeapStorage::Obj {
                    extra: Some(Extra::ConstantPool(id)),
                },
            )
        });
        Ok(peer.clone())
    }
}
