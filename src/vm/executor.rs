use super::{
    natives::{NativeContext, NativeKey},
    statics::{StaticInitResult, INIT_STATE_INITIALIZED},
    Frame, Runtime, StepResult, Thread,
};
use crate::{error::VmError, types::ClassId, value::StackValue};
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, trace, warn};

/// Drives native invocations for one thread.
#[derive(Clone)]
pub struct Executor {
    pub runtime: Arc<Runtime>,
    pub thread: Thread,
}

impl Executor {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        let thread = runtime.attach_thread();
        Self { runtime, thread }
    }

    /// Invokes the native `owner.name descriptor` with `args` as its locals
    /// and returns the value it produced, `None` for `void`.
    pub fn invoke(
        &self,
        owner: &str,
        name: &str,
        descriptor: &str,
        args: Vec<StackValue>,
    ) -> Result<Option<StackValue>, VmError> {
        let mut frame = Frame::new(args);
        self.invoke_in(&mut frame, owner, name, descriptor)?;
        Ok(frame.pop())
    }

    /// Completes the invoke at `frame.pc()`, initializing whatever classes the
    /// handler defers on. On return the frame's stack holds the result.
    pub fn invoke_in(
        &self,
        frame: &mut Frame,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<(), VmError> {
        let natives = self.runtime.natives();
        let entry = natives.lookup(owner, name, descriptor)?;
        let method = NativeKey::new(owner, name, descriptor);
        let expected = entry.descriptor.result_count();
        let expected_category = entry.descriptor.return_category();
        let mut deferred_on = HashSet::new();

        loop {
            frame.restart();
            trace!(method = %method, thread = self.thread.id, "dispatching native");
            self.runtime.metrics.record_native_dispatch();

            let mut ctx = NativeContext {
                runtime: &self.runtime,
                thread: self.thread,
                frame: &mut *frame,
                method: &method,
            };
            match (entry.handler)(&mut ctx)? {
                StepResult::Return => {
                    let pushed = frame.stack().len();
                    if pushed != expected {
                        return Err(VmError::ResultMismatch {
                            method: method.to_string(),
                            pushed,
                            expected,
                        });
                    }
                    if let Some(result) = frame.stack().last() {
                        if result.category() != expected_category {
                            return Err(VmError::ResultTypeMismatch {
                                method: method.to_string(),
                                pushed: result.category(),
                                expected: expected_category,
                            });
                        }
                    }
                    return Ok(());
                }
                StepResult::InitRequired(dependency) => {
                    let pushed = frame.stack().len();
                    if pushed != 0 {
                        return Err(VmError::ResultMismatch {
                            method: method.to_string(),
                            pushed,
                            expected: 0,
                        });
                    }
                    if !frame.is_reverted() {
                        return Err(VmError::DeferredWithoutRewind {
                            method: method.to_string(),
                        });
                    }
                    if !deferred_on.insert(dependency) {
                        return Err(VmError::InitializationStalled {
                            method: method.to_string(),
                            class: self.runtime.class(dependency).name.clone(),
                        });
                    }
                    self.runtime.metrics.record_deferred_dependency();
                    debug!(
                        method = %method,
                        class = %self.runtime.class(dependency).name,
                        "native deferred on class initialization"
                    );
                    self.initialize_class(dependency)?;
                }
            }
        }
    }

    /// Initializes `id` and its superclasses, running each static initializer
    /// at most once across all threads.
    pub fn initialize_class(&self, id: ClassId) -> Result<(), VmError> {
        let class = self.runtime.class(id);
        if class.is_initialized() {
            return Ok(());
        }
        if let Some(super_class) = class.super_class {
            self.initialize_class(super_class)?;
        }

        match class.init.begin(self.thread.id) {
            StaticInitResult::Initialized | StaticInitResult::Recursive => Ok(()),
            StaticInitResult::Failed => Err(VmError::Erroneous(class.name.clone())),
            StaticInitResult::Waiting => {
                debug!(class = %class.name, thread = self.thread.id, "waiting for initialization");
                if class.init.wait_for_init() == INIT_STATE_INITIALIZED {
                    Ok(())
                } else {
                    Err(VmError::Erroneous(class.name.clone()))
                }
            }
            StaticInitResult::Execute => {
                let result = match &class.static_initializer {
                    Some(initializer) => {
                        self.runtime.metrics.record_static_initializer();
                        initializer(&class)
                    }
                    None => Ok(()),
                };
                match result {
                    Ok(()) => {
                        class.init.mark_initialized();
                        debug!(class = %class.name, "class initialized");
                        Ok(())
                    }
                    Err(reason) => {
                        class.init.mark_failed();
                        warn!(class = %class.name, %reason, "static initializer failed");
                        Err(VmError::InitializationFailed {
                            class: class.name.clone(),
                            reason,
                        })
                    }
                }
            }
        }
    }
}
