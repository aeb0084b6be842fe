//! Natives of `java/lang/Class`.
use super::{NativeContext, NativeMethod};
use crate::{
    error::VmError,
    types::LoaderId,
    vm::{reflection, StepResult},
};
use tracing::trace;

const CLASS: &str = "java/lang/Class";

pub const NATIVES: &[(&str, &str, &str, NativeMethod)] = &[
    (CLASS, "registerNatives", "()V", register_natives),
    (
        CLASS,
        "getPrimitiveClass",
        "(Ljava/lang/String;)Ljava/lang/Class;",
        get_primitive_class,
    ),
    (
        CLASS,
        "desiredAssertionStatus0",
        "(Ljava/lang/Class;)Z",
        desired_assertion_status0,
    ),
    (
        CLASS,
        "getClassLoader0",
        "()Ljava/lang/ClassLoader;",
        get_class_loader0,
    ),
    (CLASS, "getComponentType", "()Ljava/lang/Class;", get_component_type),
    (
        CLASS,
        "getConstantPool",
        "()Lsun/reflect/ConstantPool;",
        get_constant_pool,
    ),
    (CLASS, "getDeclaringClass0", "()Ljava/lang/Class;", get_declaring_class0),
    (
        CLASS,
        "getEnclosingMethod0",
        "()[Ljava/lang/Object;",
        get_enclosing_method0,
    ),
    (CLASS, "getInterfaces0", "()[Ljava/lang/Class;", get_interfaces0),
    (CLASS, "getModifiers", "()I", get_modifiers),
    (CLASS, "getName0", "()Ljava/lang/String;", get_name0),
    (CLASS, "getSuperclass", "()Ljava/lang/Class;", get_superclass),
    (CLASS, "isArray", "()Z", is_array),
    (CLASS, "isAssignableFrom", "(Ljava/lang/Class;)Z", is_assignable_from),
    (CLASS, "isInstance", "(Ljava/lang/Object;)Z", is_instance),
    (CLASS, "isInterface", "()Z", is_interface),
    (CLASS, "isPrimitive", "()Z", is_primitive),
];

fn register_natives(_ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    Ok(StepResult::Return)
}

/// `static Class getPrimitiveClass(String name)`
fn get_primitive_class(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let name = ctx.frame.get_ref(0)?;
    if name.is_null() {
        return Err(VmError::NullPointer(ctx.method.to_string()));
    }
    let name = name
        .as_str()
        .ok_or_else(|| ctx.malformed("java/lang/String"))?;
    let id = ctx
        .runtime
        .area
        .primitive_class(name)
        .ok_or_else(|| VmError::ClassNotFound(name.to_string()))?;
    let mirror = ctx.runtime.class_object(id)?;
    ctx.frame.push_ref(mirror);
    Ok(StepResult::Return)
}

/// Assertions are never enabled.
fn desired_assertion_status0(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    ctx.frame.push_boolean(false);
    Ok(StepResult::Return)
}

fn get_class_loader0(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    if !class.source.is_boot_class_path() {
        if let Some(dependency) =
            ctx.pending_initialization(class.defining_loader(), "java/lang/ClassLoader")?
        {
            trace!(class = %class.name, "getClassLoader0 waiting on java/lang/ClassLoader");
            return ctx.defer(dependency);
        }
    }
    let handle = reflection::class_loader_of(ctx.runtime, &class)?;
    ctx.frame.push_ref(handle);
    Ok(StepResult::Return)
}

fn get_component_type(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    let component = reflection::component_type_of(ctx.runtime, &class)?;
    ctx.frame.push_ref(component);
    Ok(StepResult::Return)
}

fn get_constant_pool(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    if let Some(dependency) =
        ctx.pending_initialization(LoaderId::BOOTSTRAP, "sun/reflect/ConstantPool")?
    {
        trace!(class = %class.name, "getConstantPool waiting on sun/reflect/ConstantPool");
        return ctx.defer(dependency);
    }
    let peer = reflection::constant_pool_of(ctx.runtime, &class)?;
    ctx.frame.push_ref(peer);
    Ok(StepResult::Return)
}

fn get_declaring_class0(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    let declaring = reflection::declaring_class_of(ctx.runtime, &class)?;
    ctx.frame.push_ref(declaring);
    Ok(StepResult::Return)
}

fn get_enclosing_method0(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    let info = reflection::enclosing_method_of(ctx.runtime, &class)?;
    ctx.frame.push_ref(info);
    Ok(StepResult::Return)
}

fn get_interfaces0(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    let interfaces = reflection::interfaces_of(ctx.runtime, &class)?;
    ctx.frame.push_ref(interfaces);
    Ok(StepResult::Return)
}

fn get_modifiers(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    ctx.frame.push_int(reflection::modifiers_of(&class));
    Ok(StepResult::Return)
}

fn get_name0(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    let name = reflection::name_of(ctx.runtime, &class)?;
    ctx.frame.push_ref(name);
    Ok(StepResult::Return)
}

fn get_superclass(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    let super_class = reflection::superclass_of(ctx.runtime, &class)?;
    ctx.frame.push_ref(super_class);
    Ok(StepResult::Return)
}

fn is_array(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    ctx.frame.push_boolean(class.is_array());
    Ok(StepResult::Return)
}

/// `boolean isAssignableFrom(Class<?> cls)`: whether `cls` converts to `this`.
fn is_assignable_from(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let target = ctx.receiver_class()?;
    let source = ctx
        .class_arg(1)?
        .ok_or_else(|| VmError::NullPointer(ctx.method.to_string()))?;
    let result = ctx.runtime.is_assignable(source, target.id);
    ctx.frame.push_boolean(result);
    Ok(StepResult::Return)
}

fn is_instance(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    let value = ctx.frame.get_ref(1)?.clone();
    let result = ctx.runtime.is_instance(&value, class.id);
    ctx.frame.push_boolean(result);
    Ok(StepResult::Return)
}

fn is_interface(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    ctx.frame.push_boolean(class.is_interface());
    Ok(StepResult::Return)
}

fn is_primitive(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx.receiver_class()?;
    ctx.frame.push_boolean(class.is_primitive());
    Ok(StepResult::Return)
}
