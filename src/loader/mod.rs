//! Class loading: the loaders, the arenas of descriptors they own, and the
//! linking of class definitions into descriptors.
//!
//! Loaders delegate parent-first. Array classes are created on demand in the
//! defining loader of their element type, and the nine primitive classes live
//! in the bootstrap loader.
use crate::{
    error::VmError,
    types::{
        hierarchy::{ClassHierarchy, ClassResolver},
        names, AccessFlags, Class, ClassId, ClassKind, ClassSource, EnclosingMethod, LoaderId,
    },
    value::ObjectRef,
    vm::{
        metrics::RuntimeMetrics,
        statics::{ClassInitState, StaticInitializer},
    },
};
use dashmap::DashMap;
use parking_lot::{ReentrantMutex, RwLock};
use std::{
    cell::RefCell,
    collections::HashSet,
    fmt::{Debug, Formatter},
    sync::{Arc, OnceLock},
};
use tracing::trace;

pub mod bootstrap;

/// A class definition as the class-file parser hands it to a loader.
#[derive(Clone)]
pub struct ClassDef {
    pub name: String,
    pub access_flags: AccessFlags,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub enclosing_method: Option<EnclosingMethod>,
    pub static_initializer: Option<StaticInitializer>,
}

impl Debug for ClassDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("access_flags", &self.access_flags)
            .field("super_name", &self.super_name)
            .field("interfaces", &self.interfaces)
            .field("enclosing_method", &self.enclosing_method)
            .field("static_initializer", &self.static_initializer.is_some())
            .finish()
    }
}

impl ClassDef {
    /// A public class extending `java/lang/Object`.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access_flags: AccessFlags::PUBLIC | AccessFlags::SUPER,
            super_name: Some("java/lang/Object".to_string()),
            interfaces: vec![],
            enclosing_method: None,
            static_initializer: None,
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            access_flags: AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT,
            ..Self::class(name)
        }
    }

    pub fn extends(mut self, super_name: impl Into<String>) -> Self {
        self.super_name = Some(super_name.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn flags(mut self, access_flags: AccessFlags) -> Self {
        self.access_flags = access_flags;
        self
    }

    pub fn enclosed_by(mut self, enclosing_method: EnclosingMethod) -> Self {
        self.enclosing_method = Some(enclosing_method);
        self
    }

    pub fn with_static_initializer(
        mut self,
        initializer: impl Fn(&Class) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.static_initializer = Some(Arc::new(initializer));
        self
    }

    fn is_interface(&self) -> bool {
        self.access_flags.contains(AccessFlags::INTERFACE)
    }
}

pub struct ClassLoader {
    pub id: LoaderId,
    pub name: String,
    pub source: ClassSource,
    parent: Option<LoaderId>,
    /// Definitions this loader can define, keyed by internal name.
    definitions: DashMap<String, ClassDef>,
    /// Arena of descriptors this loader defined. Indices are stable.
    classes: RwLock<Vec<Arc<Class>>>,
    /// Every class this loader has been an initiating loader for.
    by_name: DashMap<String, ClassId>,
    /// Serializes definition; holds the names currently being linked.
    define_lock: ReentrantMutex<RefCell<HashSet<String>>>,
    /// The loader's `java/lang/ClassLoader` handle.
    pub(crate) mirror: OnceLock<ObjectRef>,
}

impl Debug for ClassLoader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassLoader")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("source", &self.source)
            .field("classes", &self.classes.read().len())
            .finish()
    }
}

impl ClassLoader {
    fn new(id: LoaderId, name: String, source: ClassSource, parent: Option<LoaderId>) -> Self {
        Self {
            id,
            name,
            source,
            parent,
            definitions: DashMap::new(),
            classes: RwLock::new(vec![]),
            by_name: DashMap::new(),
            define_lock: ReentrantMutex::new(RefCell::new(HashSet::new())),
            mirror: OnceLock::new(),
        }
    }

    /// Makes `def` available for definition. Replaces an earlier definition
    /// of the same name that has not been loaded yet.
    pub fn add_definition(&self, def: ClassDef) {
        self.definitions.insert(def.name.clone(), def);
    }

    pub fn find_loaded(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).map(|e| *e)
    }

    /// Names of the definitions this loader can define, sorted.
    pub fn definition_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.definitions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    fn push(&self, make: impl FnOnce(ClassId) -> Class) -> ClassId {
        let mut classes = self.classes.write();
        let id = ClassId {
            loader: self.id,
            index: classes.len() as u32,
        };
        classes.push(Arc::new(make(id)));
        id
    }
}

/// All loaders of a runtime and their descriptors.
pub struct MethodArea {
    loaders: RwLock<Vec<Arc<ClassLoader>>>,
    assignability_cache: DashMap<(ClassId, ClassId), bool>,
    metrics: Arc<RuntimeMetrics>,
}

impl Debug for MethodArea {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.loaders.read().iter()).finish()
    }
}

impl ClassResolver for MethodArea {
    fn class(&self, id: ClassId) -> Arc<Class> {
        let loader = self.loader(id.loader);
        let classes = loader.classes.read();
        classes
            .get(id.index as usize)
            .cloned()
            .unwrap_or_else(|| panic!("dangling class id {id:?}"))
    }
}

impl MethodArea {
    /// Creates the method area with a bootstrap loader that can define
    /// `boot_class_path` and has the primitive classes predefined.
    pub fn new(boot_class_path: Vec<ClassDef>, metrics: Arc<RuntimeMetrics>) -> Self {
        let bootstrap = ClassLoader::new(
            LoaderId::BOOTSTRAP,
            "bootstrap".to_string(),
            ClassSource::BootClassPath,
            None,
        );
        for def in boot_class_path {
            bootstrap.add_definition(def);
        }
        for (keyword, _) in names::PRIMITIVES {
            let id = bootstrap.push(|id| Class {
                id,
                name: keyword.to_string(),
                kind: ClassKind::Primitive,
                access_flags: AccessFlags::PUBLIC | AccessFlags::FINAL | AccessFlags::ABSTRACT,
                super_class: None,
                interfaces: vec![],
                component: None,
                source: ClassSource::BootClassPath,
                enclosing_method: None,
                static_initializer: None,
                init: ClassInitState::new(),
                mirror: OnceLock::new(),
                constant_pool: OnceLock::new(),
            });
            bootstrap.by_name.insert(keyword.to_string(), id);
        }

        Self {
            loaders: RwLock::new(vec![Arc::new(bootstrap)]),
            assignability_cache: DashMap::new(),
            metrics,
        }
    }

    pub fn loader(&self, id: LoaderId) -> Arc<ClassLoader> {
        self.loaders
            .read()
            .get(id.0 as usize)
            .cloned()
            .unwrap_or_else(|| panic!("dangling loader id {id:?}"))
    }

    /// The descriptor behind `id`, or `None` if `id` was issued by another
    /// method area.
    pub fn try_class(&self, id: ClassId) -> Option<Arc<Class>> {
        let loader = self.loaders.read().get(id.loader.0 as usize).cloned()?;
        let classes = loader.classes.read();
        classes.get(id.index as usize).cloned()
    }

    pub fn bootstrap(&self) -> Arc<ClassLoader> {
        self.loader(LoaderId::BOOTSTRAP)
    }

    /// Registers a new loader delegating to `parent` (the bootstrap loader
    /// when `None`).
    pub fn new_loader(
        &self,
        name: impl Into<String>,
        source: ClassSource,
        parent: Option<LoaderId>,
    ) -> Arc<ClassLoader> {
        let mut loaders = self.loaders.write();
        let id = LoaderId(loaders.len() as u32);
        let loader = Arc::new(ClassLoader::new(
            id,
            name.into(),
            source,
            Some(parent.unwrap_or(LoaderId::BOOTSTRAP)),
        ));
        loaders.push(loader.clone());
        loader
    }

    pub fn primitive_class(&self, keyword: &str) -> Option<ClassId> {
        if !names::is_primitive_name(keyword) {
            return None;
        }
        self.bootstrap().find_loaded(keyword)
    }

    /// Resolves `name` (internal form) with `initiating` as the initiating loader.
    pub fn load_class(&self, initiating: LoaderId, name: &str) -> Result<ClassId, VmError> {
        let loader = self.loader(initiating);
        if let Some(id) = loader.find_loaded(name) {
            return Ok(id);
        }

        let id = if names::is_array_name(name) {
            self.load_array_class(initiating, name)?
        } else {
            match loader.parent {
                Some(parent) => match self.load_class(parent, name) {
                    Ok(id) => id,
                    Err(VmError::ClassNotFound(_)) => self.define_class(&loader, name)?,
                    Err(e) => return Err(e),
                },
                None => self.define_class(&loader, name)?,
            }
        };

        loader.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    fn load_array_class(&self, initiating: LoaderId, name: &str) -> Result<ClassId, VmError> {
        let component_name =
            names::component_class_name(name).ok_or_else(|| VmError::ClassNotFound(name.into()))?;
        let component_id = self.load_class(initiating, &component_name)?;
        let component = self.class(component_id);

        let object = self.load_class(LoaderId::BOOTSTRAP, "java/lang/Object")?;
        let interfaces = vec![
            self.load_class(LoaderId::BOOTSTRAP, "java/lang/Cloneable")?,
            self.load_class(LoaderId::BOOTSTRAP, "java/io/Serializable")?,
        ];

        let defining = self.loader(component.defining_loader());
        let _guard = defining.define_lock.lock();
        if let Some(id) = defining.find_loaded(name) {
            return Ok(id);
        }
        let visibility = if component.is_primitive() {
            AccessFlags::PUBLIC
        } else {
            component.access_flags & AccessFlags::VISIBILITY
        };

        let id = defining.push(|id| Class {
            id,
            name: name.to_string(),
            kind: ClassKind::Array,
            access_flags: visibility | AccessFlags::FINAL | AccessFlags::ABSTRACT,
            super_class: Some(object),
            interfaces,
            component: Some(component_id),
            source: component.source.clone(),
            enclosing_method: None,
            static_initializer: None,
            init: ClassInitState::new(),
            mirror: OnceLock::new(),
            constant_pool: OnceLock::new(),
        });
        defining.by_name.insert(name.to_string(), id);
        trace!(class = name, loader = defining.id.0, "defined array class");
        Ok(id)
    }

    fn define_class(&self, loader: &ClassLoader, name: &str) -> Result<ClassId, VmError> {
        let guard = loader.define_lock.lock();
        if let Some(id) = loader.find_loaded(name) {
            return Ok(id);
        }

        let def = loader
            .definitions
            .get(name)
            .map(|d| d.value().clone())
            .ok_or_else(|| VmError::ClassNotFound(name.to_string()))?;

        if !guard.borrow_mut().insert(name.to_string()) {
            return Err(VmError::ClassCircularity(name.to_string()));
        }
        let linked = self.link(loader, &def);
        guard.borrow_mut().remove(name);
        let (super_class, interfaces) = linked?;

        let kind = if def.is_interface() {
            ClassKind::Interface
        } else {
            ClassKind::Class
        };
        let id = loader.push(|id| Class {
            id,
            name: def.name.clone(),
            kind,
            access_flags: def.access_flags,
            super_class,
            interfaces,
            component: None,
            source: loader.source.clone(),
            enclosing_method: def.enclosing_method.clone(),
            static_initializer: def.static_initializer.clone(),
            init: ClassInitState::new(),
            mirror: OnceLock::new(),
            constant_pool: OnceLock::new(),
        });
        loader.by_name.insert(name.to_string(), id);
        trace!(class = name, loader = loader.id.0, "defined class");
        Ok(id)
    }

    /// Resolves the superclass and direct interfaces of `def`.
    fn link(
        &self,
        loader: &ClassLoader,
        def: &ClassDef,
    ) -> Result<(Option<ClassId>, Vec<ClassId>), VmError> {
        let super_class = match (&def.super_name, def.is_interface()) {
            (Some(super_name), false) => {
                let id = self.load_class(loader.id, super_name)?;
                let super_class = self.class(id);
                if super_class.is_interface()
                    || super_class.is_array()
                    || super_class.is_primitive()
                {
                    return Err(VmError::IncompatibleClassChange(
                        def.name.clone(),
                        super_class.name.clone(),
                    ));
                }
                Some(id)
            }
            _ => None,
        };

        let mut interfaces = Vec::with_capacity(def.interfaces.len());
        for name in &def.interfaces {
            let id = self.load_class(loader.id, name)?;
            if !self.class(id).is_interface() {
                return Err(VmError::IncompatibleClassChange(
                    def.name.clone(),
                    name.clone(),
                ));
            }
            interfaces.push(id);
        }
        Ok((super_class, interfaces))
    }

    /// Memoized [`ClassHierarchy::is_assignable`].
    pub fn is_assignable(&self, source: ClassId, target: ClassId) -> bool {
        if let Some(cached) = self.assignability_cache.get(&(source, target)) {
            self.metrics.record_assignability_cache_hit();
            return *cached;
        }
        self.metrics.record_assignability_cache_miss();
        let result = ClassHierarchy::new(self).is_assignable(source, target);
        self.assignability_cache.insert((source, target), result);
        result
    }
}
