use crate::types::ClassId;

mod executor;
pub mod metrics;
pub mod natives;
pub mod reflection;
mod stack;
mod state;
pub mod statics;

pub use executor::*;
pub use stack::*;
pub use state::*;

/// Outcome of a native handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// The handler pushed its result (if any) and the call is complete.
    Return,
    /// The handler needs the class initialized first. It pushed nothing and
    /// rewound the frame, so the driver must initialize the class and
    /// dispatch the same call again.
    InitRequired(ClassId),
}
