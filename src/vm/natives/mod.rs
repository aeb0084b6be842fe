//! Host implementations of guest `native` methods.
//!
//! A handler is looked up by the exact `(owner, name, descriptor)` triple of
//! the method being invoked. It reads its arguments from the frame's locals,
//! pushes exactly as many values as the descriptor returns and reports
//! [`StepResult::Return`].
//!
//! A handler that needs another class initialized pushes nothing, rewinds
//! the frame with [`Frame::revert_next_pc`] and returns
//! [`StepResult::InitRequired`]; the driver initializes the class and
//! dispatches the call again from the start, so handlers re-check
//! initialization state on every entry.
use crate::{
    error::VmError,
    types::{descriptor::MethodDescriptor, hierarchy::ClassResolver, Class, ClassId, LoaderId},
    vm::{Frame, Runtime, StepResult, Thread},
};
use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
    sync::{Arc, LazyLock},
};
use tracing::warn;

pub mod class;
pub mod object;

pub type NativeMethod = fn(&mut NativeContext<'_>) -> Result<StepResult, VmError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeKey {
    /// Internal name of the declaring class.
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl NativeKey {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

impl Display for NativeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}{}", self.owner, self.name, self.descriptor)
    }
}

#[derive(Clone)]
pub struct NativeEntry {
    pub handler: NativeMethod,
    pub descriptor: Arc<MethodDescriptor>,
}

/// Handlers by method. Mutable until shared; the process-wide instance is
/// never modified after it is built.
#[derive(Default)]
pub struct NativeRegistry {
    entries: HashMap<NativeKey, NativeEntry>,
}

static GLOBAL: LazyLock<Arc<NativeRegistry>> =
    LazyLock::new(|| Arc::new(NativeRegistry::with_builtins()));

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the natives of `java/lang/Object` and `java/lang/Class`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (owner, name, descriptor, handler) in object::NATIVES.iter().chain(class::NATIVES) {
            if let Err(e) = registry.register(*owner, *name, *descriptor, *handler) {
                panic!("invalid builtin native {owner}.{name}{descriptor}: {e}");
            }
        }
        registry
    }

    pub fn global() -> Arc<NativeRegistry> {
        GLOBAL.clone()
    }

    /// Registers `handler` for the method, returning the handler it replaced.
    pub fn register(
        &mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        handler: NativeMethod,
    ) -> Result<Option<NativeMethod>, VmError> {
        let key = NativeKey::new(owner, name, descriptor);
        let parsed = Arc::new(MethodDescriptor::parse(&key.descriptor)?);
        let entry = NativeEntry {
            handler,
            descriptor: parsed,
        };
        let previous = self.entries.insert(key.clone(), entry).map(|e| e.handler);
        if previous.is_some() {
            warn!(method = %key, "native registered twice; keeping the later handler");
        }
        Ok(previous)
    }

    pub fn lookup(
        &self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<&NativeEntry, VmError> {
        let key = NativeKey::new(owner, name, descriptor);
        self.entries.get(&key).ok_or(VmError::UnsatisfiedLink {
            owner: key.owner,
            name: key.name,
            descriptor: key.descriptor,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a native handler can see of the invocation.
pub struct NativeContext<'a> {
    pub runtime: &'a Runtime,
    pub thread: Thread,
    pub frame: &'a mut Frame,
    pub method: &'a NativeKey,
}

impl<'a> NativeContext<'a> {
    /// The descriptor behind the `java/lang/Class` receiver in slot 0.
    pub fn receiver_class(&self) -> Result<Arc<Class>, VmError> {
        let this = self.frame.this()?;
        if this.is_null() {
            return Err(VmError::NullReceiver(self.method.to_string()));
        }
        this.as_class()
            .and_then(|id| self.runtime.area.try_class(id))
            .ok_or_else(|| self.malformed("java/lang/Class"))
    }

    /// The descriptor behind the `java/lang/Class` argument in `index`.
    /// `Ok(None)` for null.
    pub fn class_arg(&self, index: usize) -> Result<Option<ClassId>, VmError> {
        let arg = self.frame.get_ref(index)?;
        if arg.is_null() {
            return Ok(None);
        }
        arg.as_class()
            .filter(|&id| self.runtime.area.try_class(id).is_some())
            .map(Some)
            .ok_or_else(|| self.malformed("java/lang/Class"))
    }

    /// An argument that does not carry a payload of `expected` issued by
    /// this runtime.
    pub fn malformed(&self, expected: &'static str) -> VmError {
        VmError::MalformedReceiver {
            method: self.method.to_string(),
            expected,
        }
    }

    /// Loads `name` through `loader`. Returns the class if its
    /// initialization has not started yet, in which case the call must defer.
    /// A class whose initializer failed cannot be used at all.
    pub fn pending_initialization(
        &self,
        loader: LoaderId,
        name: &str,
    ) -> Result<Option<ClassId>, VmError> {
        let id = self.runtime.load_class(loader, name)?;
        let class = self.runtime.area.class(id);
        if class.is_erroneous() {
            return Err(VmError::Erroneous(class.name.clone()));
        }
        if class.initialization_not_started() {
            Ok(Some(id))
        } else {
            Ok(None)
        }
    }

    /// Suspends the call until `class` is initialized.
    pub fn defer(&mut self, class: ClassId) -> Result<StepResult, VmError> {
        self.frame.revert_next_pc();
        Ok(StepResult::InitRequired(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
        Ok(StepResult::Return)
    }

    fn other(_: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
        Ok(StepResult::Return)
    }

    #[test]
    fn test_lookup_missing() {
        let registry = NativeRegistry::new();
        let err = registry
            .lookup("java/lang/Class", "isArray", "()Z")
            .err()
            .unwrap();
        assert_eq!(
            err,
            VmError::UnsatisfiedLink {
                owner: "java/lang/Class".into(),
                name: "isArray".into(),
                descriptor: "()Z".into(),
            }
        );
        assert_eq!(err.guest_exception(), Some("java/lang/UnsatisfiedLinkError"));
    }

    #[test]
    fn test_descriptor_is_part_of_key() {
        let mut registry = NativeRegistry::new();
        registry.register("a/B", "f", "()I", noop).unwrap();
        assert!(registry.lookup("a/B", "f", "()I").is_ok());
        assert!(registry.lookup("a/B", "f", "()J").is_err());
        assert!(registry.lookup("a/C", "f", "()I").is_err());
    }

    #[test]
    fn test_rejects_malformed_descriptor() {
        let mut registry = NativeRegistry::new();
        let err = registry.register("a/B", "f", "(I", noop).err().unwrap();
        assert!(matches!(err, VmError::MalformedDescriptor { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_registration_last_wins() {
        let mut registry = NativeRegistry::new();
        assert!(registry.register("a/B", "f", "()V", noop).unwrap().is_none());
        let displaced = registry.register("a/B", "f", "()V", other).unwrap();
        assert_eq!(displaced.map(|h| h as usize), Some(noop as NativeMethod as usize));
        let entry = registry.lookup("a/B", "f", "()V").unwrap();
        assert_eq!(entry.handler as usize, other as NativeMethod as usize);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_every_builtin_table_entry_is_kept() {
        let registry = NativeRegistry::with_builtins();
        assert_eq!(registry.len(), object::NATIVES.len() + class::NATIVES.len());
        for (owner, name, descriptor, _) in object::NATIVES.iter().chain(class::NATIVES) {
            let entry = registry.lookup(owner, name, descriptor).unwrap();
            assert_eq!(entry.descriptor.to_string(), *descriptor);
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = NativeRegistry::global();
        for (name, descriptor) in [
            ("getClassLoader0", "()Ljava/lang/ClassLoader;"),
            ("getComponentType", "()Ljava/lang/Class;"),
            ("getConstantPool", "()Lsun/reflect/ConstantPool;"),
            ("getDeclaringClass0", "()Ljava/lang/Class;"),
            ("getEnclosingMethod0", "()[Ljava/lang/Object;"),
            ("getInterfaces0", "()[Ljava/lang/Class;"),
            ("getModifiers", "()I"),
            ("getName0", "()Ljava/lang/String;"),
            ("getSuperclass", "()Ljava/lang/Class;"),
            ("isArray", "()Z"),
            ("isAssignableFrom", "(Ljava/lang/Class;)Z"),
            ("isInstance", "(Ljava/lang/Object;)Z"),
            ("isInterface", "()Z"),
            ("isPrimitive", "()Z"),
        ] {
            assert!(
                registry.lookup("java/lang/Class", name, descriptor).is_ok(),
                "{name}{descriptor}"
            );
        }
        assert!(registry
            .lookup("java/lang/Object", "getClass", "()Ljava/lang/Class;")
            .is_ok());
    }
}
