//! Natives of `java/lang/Object`.
use super::{NativeContext, NativeMethod};
use crate::{error::VmError, vm::StepResult};

pub const NATIVES: &[(&str, &str, &str, NativeMethod)] =
    &[("java/lang/Object", "getClass", "()Ljava/lang/Class;", get_class)];

fn get_class(ctx: &mut NativeContext<'_>) -> Result<StepResult, VmError> {
    let class = ctx
        .frame
        .this()?
        .class()
        .ok_or_else(|| VmError::NullReceiver(ctx.method.to_string()))?;
    if ctx.runtime.area.try_class(class).is_none() {
        return Err(ctx.malformed("java/lang/Object"));
    }
    let mirror = ctx.runtime.class_object(class)?;
    ctx.frame.push_ref(mirror);
    Ok(StepResult::Return)
}
