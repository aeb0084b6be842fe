//! The reflective view of a class that the `java/lang/Class` natives expose.
//!
//! These functions assume any class they need has been initialized; the
//! natives take care of deferring beforehand.
use crate::{
    error::VmError,
    types::{Class, LoaderId},
    value::ObjectRef,
    vm::Runtime,
};

/// `null` for classes from the boot class path, otherwise the handle of the
/// defining loader.
pub fn class_loader_of(runtime: &Runtime, class: &Class) -> Result<ObjectRef, VmError> {
    if class.source.is_boot_class_path() {
        return Ok(ObjectRef::NULL);
    }
    runtime.loader_object(class.defining_loader())
}

pub fn component_type_of(runtime: &Runtime, class: &Class) -> Result<ObjectRef, VmError> {
    match class.component {
        Some(component) => runtime.class_object(component),
        None => Ok(ObjectRef::NULL),
    }
}

/// Directly declared interfaces, in declaration order, as a `Class[]`.
pub fn interfaces_of(runtime: &Runtime, class: &Class) -> Result<ObjectRef, VmError> {
    let mirrors = class
        .interfaces
        .iter()
        .map(|&i| runtime.class_object(i))
        .collect::<Result<Vec<_>, _>>()?;
    let class_class = runtime.load_class(LoaderId::BOOTSTRAP, "java/lang/Class")?;
    runtime.new_object_array(class_class, mirrors)
}

/// The class this one is a member of, resolved through its defining loader.
pub fn declaring_class_of(runtime: &Runtime, class: &Class) -> Result<ObjectRef, VmError> {
    match class.declaring_class_name() {
        Some(name) => {
            let id = runtime.load_class(class.defining_loader(), name)?;
            runtime.class_object(id)
        }
        None => Ok(ObjectRef::NULL),
    }
}

/// `{enclosing class, method name, method descriptor}` as an `Object[3]`,
/// or `null` for a class that is not local or anonymous.
pub fn enclosing_method_of(runtime: &Runtime, class: &Class) -> Result<ObjectRef, VmError> {
    let Some(enclosing) = &class.enclosing_method else {
        return Ok(ObjectRef::NULL);
    };
    let enclosing_class = runtime.load_class(class.defining_loader(), &enclosing.class_name)?;
    let (name, descriptor) = match &enclosing.method {
        Some(m) => (
            runtime.new_string(m.name.as_str())?,
            runtime.new_string(m.descriptor.as_str())?,
        ),
        None => (ObjectRef::NULL, ObjectRef::NULL),
    };
    let object = runtime.load_class(LoaderId::BOOTSTRAP, "java/lang/Object")?;
    runtime.new_object_array(
        object,
        vec![runtime.class_object(enclosing_class)?, name, descriptor],
    )
}

pub fn name_of(runtime: &Runtime, class: &Class) -> Result<ObjectRef, VmError> {
    runtime.new_string(class.binary_name())
}

pub fn superclass_of(runtime: &Runtime, class: &Class) -> Result<ObjectRef, VmError> {
    match class.super_class {
        Some(super_class) => runtime.class_object(super_class),
        None => Ok(ObjectRef::NULL),
    }
}

/// Access flags without `ACC_SUPER`. Array and primitive descriptors get
/// their flags when they are created.
pub fn modifiers_of(class: &Class) -> i32 {
    class.access_flags.modifiers()
}

pub fn constant_pool_of(runtime: &Runtime, class: &Class) -> Result<ObjectRef, VmError> {
    runtime.constant_pool_object(class.id)
}
