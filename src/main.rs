use std::process::ExitCode;

fn main() -> ExitCode {
    jvm_rs::run_cli()
}
