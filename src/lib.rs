//! The part of a Java virtual machine that sits between the interpreter and
//! the host: class descriptors and their loaders, the `java/lang/Class`
//! natives that expose them to guest code, and the driver that completes a
//! native call when it has to wait for a class to be initialized.
use clap::Parser;
use std::{process::ExitCode, sync::Arc};

pub mod error;
pub mod loader;
pub mod types;
pub mod value;
pub mod vm;

use error::VmError;
use types::LoaderId;
use value::{ObjectRef, StackValue};
use vm::{Executor, Runtime};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Prints the reflective view of classes on the boot class path"
)]
pub struct Args {
    /// Class names in dot or slash form, array descriptors or primitive keywords
    #[arg(value_name = "CLASS")]
    pub classes: Vec<String>,
    /// List the boot class path
    #[arg(short, long)]
    pub list: bool,
}

pub fn run_cli() -> ExitCode {
    let args = Args::parse();
    let executor = Executor::new(Arc::new(Runtime::new()));

    if args.list {
        for name in executor.runtime.area.bootstrap().definition_names() {
            println!("{}", types::names::to_binary_name(&name));
        }
    }

    let mut status = ExitCode::SUCCESS;
    for name in &args.classes {
        match describe(&executor, name) {
            Ok(description) => println!("{description}"),
            Err(e) => {
                eprintln!("{name}: {e}");
                status = ExitCode::FAILURE;
            }
        }
    }
    status
}

fn describe(executor: &Executor, name: &str) -> Result<String, VmError> {
    let runtime = &executor.runtime;
    let id = runtime.resolve_user_name(LoaderId::BOOTSTRAP, name)?;
    let mirror = runtime.class_object(id)?;

    let call = |method: &str, descriptor: &str| {
        executor
            .invoke(
                "java/lang/Class",
                method,
                descriptor,
                vec![StackValue::Ref(mirror.clone())],
            )
            .map(|value| value.unwrap_or_else(StackValue::null))
    };
    let class_name = |value: &StackValue| -> String {
        match value.as_object_ref().and_then(ObjectRef::as_class) {
            Some(id) => runtime.class(id).binary_name(),
            None => "-".to_string(),
        }
    };

    let name = call("getName0", "()Ljava/lang/String;")?;
    let modifiers = call("getModifiers", "()I")?;
    let super_class = call("getSuperclass", "()Ljava/lang/Class;")?;
    let component = call("getComponentType", "()Ljava/lang/Class;")?;
    let declaring = call("getDeclaringClass0", "()Ljava/lang/Class;")?;
    let interfaces = call("getInterfaces0", "()[Ljava/lang/Class;")?;
    let kind = if call("isPrimitive", "()Z")?.as_bool() == Some(true) {
        "primitive"
    } else if call("isArray", "()Z")?.as_bool() == Some(true) {
        "array"
    } else if call("isInterface", "()Z")?.as_bool() == Some(true) {
        "interface"
    } else {
        "class"
    };

    let interfaces = interfaces
        .as_object_ref()
        .and_then(ObjectRef::as_array)
        .unwrap_or_default()
        .iter()
        .map(|i| class_name(&StackValue::Ref(i.clone())))
        .collect::<Vec<_>>();

    Ok(format!(
        concat!(
            "{} ({})\n",
            "  modifiers:  {:#06x}\n",
            "  superclass: {}\n",
            "  interfaces: [{}]\n",
            "  component:  {}\n",
            "  declaring:  {}",
        ),
        name.as_object_ref().and_then(ObjectRef::as_str).unwrap_or("-"),
        kind,
        modifiers.as_i32().unwrap_or_default(),
        class_name(&super_class),
        interfaces.join(", "),
        class_name(&component),
        class_name(&declaring),
    ))
}
