use crate::types::{descriptor::ValueCategory, ClassId, LoaderId};
use std::{
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

/// A local variable or operand stack slot.
#[derive(Clone, Debug, PartialEq)]
pub enum StackValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Ref(ObjectRef),
}

impl StackValue {
    pub fn null() -> Self {
        Self::Ref(ObjectRef::NULL)
    }

    pub fn category(&self) -> ValueCategory {
        match self {
            Self::Int(_) => ValueCategory::Int,
            Self::Long(_) => ValueCategory::Long,
            Self::Float(_) => ValueCategory::Float,
            Self::Double(_) => ValueCategory::Double,
            Self::Ref(_) => ValueCategory::Reference,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_i32().map(|i| i != 0)
    }

    pub fn as_object_ref(&self) -> Option<&ObjectRef> {
        match self {
            Self::Ref(r) => Some(r),
            _ => None,
        }
    }
}

impl From<ObjectRef> for StackValue {
    fn from(value: ObjectRef) -> Self {
        Self::Ref(value)
    }
}

impl From<bool> for StackValue {
    fn from(value: bool) -> Self {
        Self::Int(i32::from(value))
    }
}

impl From<i32> for StackValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

/// Host data attached to an object of a reflective type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extra {
    /// `java/lang/Class` mirror of a descriptor.
    Class(ClassId),
    /// `java/lang/ClassLoader` handle of a loader.
    Loader(LoaderId),
    /// `sun/reflect/ConstantPool` peer of a class.
    ConstantPool(ClassId),
}

#[derive(Debug)]
pub enum HeapStorage {
    Obj { extra: Option<Extra> },
    Str(String),
    Vec(Vec<ObjectRef>),
}

#[derive(Debug)]
pub struct Object {
    /// Runtime class of the object.
    pub class: ClassId,
    pub storage: HeapStorage,
}

/// A possibly-null reference. Equality is identity.
#[derive(Clone, Default)]
pub struct ObjectRef(pub Option<Arc<Object>>);

impl ObjectRef {
    pub const NULL: Self = Self(None);

    pub fn new(class: ClassId, storage: HeapStorage) -> Self {
        Self(Some(Arc::new(Object { class, storage })))
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn object(&self) -> Option<&Object> {
        self.0.as_deref()
    }

    pub fn class(&self) -> Option<ClassId> {
        self.object().map(|o| o.class)
    }

    pub fn extra(&self) -> Option<Extra> {
        match &self.object()?.storage {
            HeapStorage::Obj { extra } => *extra,
            _ => None,
        }
    }

    /// Descriptor behind a `java/lang/Class` mirror.
    pub fn as_class(&self) -> Option<ClassId> {
        match self.extra()? {
            Extra::Class(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.object()?.storage {
            HeapStorage::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ObjectRef]> {
        match &self.object()?.storage {
            HeapStorage::Vec(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(l), Some(r)) => Arc::ptr_eq(l, r),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_ref().map(Arc::as_ptr).hash(state);
    }
}

impl Debug for ObjectRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            None => write!(f, "null"),
            Some(o) => match &o.storage {
                HeapStorage::Str(s) => write!(f, "{s:?}"),
                HeapStorage::Vec(v) => f.debug_list().entries(v).finish(),
                HeapStorage::Obj { extra } => {
                    write!(f, "object@{:p}", Arc::as_ptr(o))?;
                    if let Some(extra) = extra {
                        write!(f, " ({extra:?})")?;
                    }
                    Ok(())
                }
            },
        }
    }
}
