use crate::types::descriptor::ValueCategory;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VmError {
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    #[error("Class circularity detected while loading {0}")]
    ClassCircularity(String),

    #[error("Class {0} cannot extend interface or array type {1}")]
    IncompatibleClassChange(String, String),

    #[error("No native handler registered for {owner}.{name}{descriptor}")]
    UnsatisfiedLink {
        owner: String,
        name: String,
        descriptor: String,
    },

    #[error("Malformed method descriptor {descriptor:?}: {reason}")]
    MalformedDescriptor { descriptor: String, reason: String },

    #[error("Native {method} invoked on a receiver without a {expected} payload")]
    MalformedReceiver { method: String, expected: &'static str },

    #[error("Native {0} invoked with a null receiver")]
    NullReceiver(String),

    #[error("Null reference passed to {0}")]
    NullPointer(String),

    #[error("Native {method} pushed {pushed} result values, descriptor expects {expected}")]
    ResultMismatch {
        method: String,
        pushed: usize,
        expected: usize,
    },

    #[error("Native {method} returned a {pushed:?} result, descriptor expects {expected:?}")]
    ResultTypeMismatch {
        method: String,
        pushed: ValueCategory,
        expected: ValueCategory,
    },

    #[error("Native {method} deferred without rewinding its frame")]
    DeferredWithoutRewind { method: String },

    #[error("Native {method} deferred on {class} again after it was initialized")]
    InitializationStalled { method: String, class: String },

    #[error("Static initializer of {class} failed: {reason}")]
    InitializationFailed { class: String, reason: String },

    #[error("Class {0} is in an erroneous state after a failed initialization")]
    Erroneous(String),

    #[error("Argument slot {index} out of range ({length} slots)")]
    SlotOutOfRange { index: usize, length: usize },

    #[error("Type mismatch in slot {index}: expected {expected}")]
    SlotTypeMismatch { index: usize, expected: &'static str },
}

impl VmError {
    /// The guest throwable a driver raises for this error, or `None` when the
    /// error is a host-side fault that must abort the call.
    pub fn guest_exception(&self) -> Option<&'static str> {
        match self {
            VmError::ClassNotFound(_) | VmError::Erroneous(_) => {
                Some("java/lang/NoClassDefFoundError")
            }
            VmError::ClassCircularity(_) => Some("java/lang/ClassCircularityError"),
            VmError::IncompatibleClassChange(_, _) => {
                Some("java/lang/IncompatibleClassChangeError")
            }
            VmError::NullPointer(_) => Some("java/lang/NullPointerException"),
            VmError::InitializationFailed { .. } => Some("java/lang/ExceptionInInitializerError"),
            VmError::UnsatisfiedLink { .. } => Some("java/lang/UnsatisfiedLinkError"),
            VmError::MalformedDescriptor { .. }
            | VmError::MalformedReceiver { .. }
            | VmError::NullReceiver(_)
            | VmError::ResultMismatch { .. }
            | VmError::ResultTypeMismatch { .. }
            | VmError::DeferredWithoutRewind { .. }
            | VmError::InitializationStalled { .. }
            | VmError::SlotOutOfRange { .. }
            | VmError::SlotTypeMismatch { .. } => None,
        }
    }
}
