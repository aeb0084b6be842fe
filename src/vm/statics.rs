use crate::types::Class;
use parking_lot::{Condvar, Mutex};
use std::{
    fmt::{Debug, Formatter},
    sync::{
        atomic::{AtomicU64, AtomicU8, Ordering},
        Arc,
    },
};

/// Initialization states for class static initializers (`<clinit>`).
/// Transitions are monotonic: a state is never revisited.
pub const INIT_STATE_NOT_STARTED: u8 = 0;
pub const INIT_STATE_IN_PROGRESS: u8 = 1;
pub const INIT_STATE_INITIALIZED: u8 = 2;
pub const INIT_STATE_FAILED: u8 = 3;

/// Runs the static initializer of a class on behalf of the interpreter.
/// An `Err` carries the description of the exception it threw.
pub type StaticInitializer = Arc<dyn Fn(&Class) -> Result<(), String> + Send + Sync>;

#[derive(Debug, PartialEq, Eq)]
pub enum StaticInitResult {
    /// This thread must run the static initializer.
    Execute,
    /// The class is already fully initialized.
    Initialized,
    /// This thread is already initializing the class; proceed as if initialized.
    Recursive,
    /// Initialization failed previously.
    Failed,
    /// Another thread is currently initializing the class.
    Waiting,
}

pub struct ClassInitState {
    state: AtomicU8,
    /// The thread currently initializing the class. Only valid while
    /// `state` is `INIT_STATE_IN_PROGRESS`.
    initializing_thread: AtomicU64,
    init_cond: Condvar,
    init_mutex: Mutex<()>,
}

impl Default for ClassInitState {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ClassInitState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.state() {
            INIT_STATE_NOT_STARTED => write!(f, "not started"),
            INIT_STATE_IN_PROGRESS => write!(
                f,
                "in progress on thread {}",
                self.initializing_thread.load(Ordering::Acquire)
            ),
            INIT_STATE_INITIALIZED => write!(f, "initialized"),
            _ => write!(f, "failed"),
        }
    }
}

impl ClassInitState {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(INIT_STATE_NOT_STARTED),
            initializing_thread: AtomicU64::new(0),
            init_cond: Condvar::new(),
            init_mutex: Mutex::new(()),
        }
    }

    pub fn state(&self) -> u8 {
        self.state.load(Ordering::Acquire)
    }

    pub fn not_started(&self) -> bool {
        self.state() == INIT_STATE_NOT_STARTED
    }

    pub fn is_initialized(&self) -> bool {
        self.state() == INIT_STATE_INITIALIZED
    }

    pub fn is_failed(&self) -> bool {
        self.state() == INIT_STATE_FAILED
    }

    /// Claims initialization for `thread_id`, or reports why it cannot.
    ///
    /// Exactly one thread receives `Execute` for a class, even when several
    /// race on it; that thread must later call `mark_initialized` or
    /// `mark_failed`.
    pub fn begin(&self, thread_id: u64) -> StaticInitResult {
        match self.state.compare_exchange(
            INIT_STATE_NOT_STARTED,
            INIT_STATE_IN_PROGRESS,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                self.initializing_thread.store(thread_id, Ordering::Release);
                StaticInitResult::Execute
            }
            Err(INIT_STATE_INITIALIZED) => StaticInitResult::Initialized,
            Err(INIT_STATE_FAILED) => StaticInitResult::Failed,
            Err(_) => {
                if self.initializing_thread.load(Ordering::Acquire) == thread_id {
                    StaticInitResult::Recursive
                } else {
                    StaticInitResult::Waiting
                }
            }
        }
    }

    pub fn mark_initialized(&self) {
        self.finish(INIT_STATE_INITIALIZED);
    }

    pub fn mark_failed(&self) {
        self.finish(INIT_STATE_FAILED);
    }

    fn finish(&self, state: u8) {
        let _lock = self.init_mutex.lock();
        self.state.store(state, Ordering::Release);
        self.init_cond.notify_all();
    }

    /// Blocks until the initializing thread finishes, returning the final state.
    pub fn wait_for_init(&self) -> u8 {
        let mut lock = self.init_mutex.lock();
        loop {
            let state = self.state();
            if state != INIT_STATE_IN_PROGRESS {
                return state;
            }
            self.init_cond.wait(&mut lock);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    #[test]
    fn test_single_thread_transitions() {
        let init = ClassInitState::new();
        assert!(init.not_started());
        assert_eq!(init.begin(1), StaticInitResult::Execute);
        assert_eq!(init.begin(1), StaticInitResult::Recursive);
        assert_eq!(init.begin(2), StaticInitResult::Waiting);
        init.mark_initialized();
        assert_eq!(init.begin(1), StaticInitResult::Initialized);
        assert_eq!(init.begin(2), StaticInitResult::Initialized);
        assert_eq!(init.wait_for_init(), INIT_STATE_INITIALIZED);
    }

    #[test]
    fn test_failure_is_sticky() {
        let init = ClassInitState::new();
        assert_eq!(init.begin(7), StaticInitResult::Execute);
        init.mark_failed();
        assert_eq!(init.begin(7), StaticInitResult::Failed);
        assert!(!init.not_started());
        assert!(!init.is_initialized());
        assert!(init.is_failed());
    }

    #[test]
    fn test_exactly_one_thread_executes() {
        let init = ClassInitState::new();
        let barrier = Barrier::new(8);
        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (1..=8u64)
                .map(|tid| {
                    let (init, barrier) = (&init, &barrier);
                    s.spawn(move || {
                        barrier.wait();
                        init.begin(tid)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let executed = results
            .iter()
            .filter(|r| **r == StaticInitResult::Execute)
            .count();
        assert_eq!(executed, 1);
        assert!(results
            .iter()
            .all(|r| matches!(r, StaticInitResult::Execute | StaticInitResult::Waiting)));
    }

    #[test]
    fn test_waiter_wakes_on_completion() {
        let init = ClassInitState::new();
        assert_eq!(init.begin(1), StaticInitResult::Execute);
        std::thread::scope(|s| {
            let waiter = s.spawn(|| init.wait_for_init());
            init.mark_initialized();
            assert_eq!(waiter.join().unwrap(), INIT_STATE_INITIALIZED);
        });
    }
}
