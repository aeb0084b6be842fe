use crate::{
    value::ObjectRef,
    vm::statics::{ClassInitState, StaticInitializer},
};
use std::{
    fmt::{Debug, Formatter},
    sync::OnceLock,
};

pub mod access;
pub mod descriptor;
pub mod hierarchy;
pub mod names;

pub use access::AccessFlags;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct LoaderId(pub(crate) u32);

impl LoaderId {
    pub const BOOTSTRAP: Self = Self(0);
}

/// Stable handle to a descriptor in its defining loader's arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ClassId {
    pub loader: LoaderId,
    pub index: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ClassKind {
    Class,
    Interface,
    Array,
    Primitive,
}

/// Where a class definition was found.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ClassSource {
    /// The runtime's built-in search path.
    BootClassPath,
    /// A user class path entry, e.g. a directory or jar.
    ClassPath(String),
}

impl ClassSource {
    pub fn is_boot_class_path(&self) -> bool {
        matches!(self, ClassSource::BootClassPath)
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct MethodRef {
    pub name: String,
    pub descriptor: String,
}

/// `EnclosingMethod` attribute of a local or anonymous class (JVMS §4.7.7).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct EnclosingMethod {
    pub class_name: String,
    /// `None` when the class is enclosed by an initializer rather than a method.
    pub method: Option<MethodRef>,
}

impl EnclosingMethod {
    pub fn in_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method: None,
        }
    }

    pub fn in_method(
        class_name: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method: Some(MethodRef {
                name: name.into(),
                descriptor: descriptor.into(),
            }),
        }
    }
}

/// Runtime descriptor of one loaded type.
///
/// Everything but the initialization state and the lazily created mirror and
/// constant-pool peer is fixed once the defining loader links the class.
pub struct Class {
    pub id: ClassId,
    /// Internal name, e.g. `java/lang/String`, `[I` or `int`.
    pub name: String,
    pub kind: ClassKind,
    pub access_flags: AccessFlags,
    pub super_class: Option<ClassId>,
    /// Directly declared interfaces, in declaration order.
    pub interfaces: Vec<ClassId>,
    pub component: Option<ClassId>,
    pub source: ClassSource,
    pub enclosing_method: Option<EnclosingMethod>,
    pub(crate) static_initializer: Option<StaticInitializer>,
    pub(crate) init: ClassInitState,
    pub(crate) mirror: OnceLock<ObjectRef>,
    pub(crate) constant_pool: OnceLock<ObjectRef>,
}

impl Debug for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.id.loader.0)
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Class {}

impl Class {
    pub fn is_array(&self) -> bool {
        self.kind == ClassKind::Array
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == ClassKind::Primitive
    }

    pub fn defining_loader(&self) -> LoaderId {
        self.id.loader
    }

    /// `java/lang/Object` as defined by the bootstrap loader.
    pub fn is_root(&self) -> bool {
        self.id.loader == LoaderId::BOOTSTRAP
            && self.kind == ClassKind::Class
            && self.name == "java/lang/Object"
    }

    /// The name `Class.getName()` reports.
    pub fn binary_name(&self) -> String {
        names::to_binary_name(&self.name)
    }

    /// Name of the class this one is a member of, derived from the `$`
    /// naming convention. Arrays and primitives have none.
    pub fn declaring_class_name(&self) -> Option<&str> {
        match self.kind {
            ClassKind::Array | ClassKind::Primitive => None,
            ClassKind::Class | ClassKind::Interface => names::declaring_class_name(&self.name),
        }
    }

    pub fn initialization_not_started(&self) -> bool {
        self.init.not_started()
    }

    pub fn is_initialized(&self) -> bool {
        self.init.is_initialized()
    }

    /// Whether a static initializer of this class failed.
    pub fn is_erroneous(&self) -> bool {
        self.init.is_failed()
    }
}
