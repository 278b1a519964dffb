//! Adapters for the primitives the harness ships with.

mod futex_lock;
mod no_lock;
mod parking;
mod reentrant;
mod semaphore;
mod serial_queue;
mod spin_lock;

use std::fmt;

pub use futex_lock::UnfairLock;
pub use no_lock::NoLock;
pub use parking::ParkingMutex;
pub use reentrant::ReentrantLock;
pub use semaphore::Semaphore;
pub use serial_queue::SerialQueue;
pub use spin_lock::SpinLock;

use crate::{error::LockError, lock::RawLock};

/// The built-in lock implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockKind {
    Spin,
    Unfair,
    Semaphore,
    Mutex,
    Recursive,
    SerialQueue,
    NoLock,
}

impl LockKind {
    /// Every built-in lock that actually provides exclusion.
    pub const CORRECT: [LockKind; 6] = [
        LockKind::Spin,
        LockKind::Unfair,
        LockKind::Semaphore,
        LockKind::Mutex,
        LockKind::Recursive,
        LockKind::SerialQueue,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            LockKind::Spin => "spin",
            LockKind::Unfair => "unfair",
            LockKind::Semaphore => "semaphore",
            LockKind::Mutex => "mutex",
            LockKind::Recursive => "recursive",
            LockKind::SerialQueue => "serial_queue",
            LockKind::NoLock => "no_lock",
        }
    }

    /// Creates a fresh, unlocked instance.
    pub fn build(self) -> Result<Box<dyn RawLock>, LockError> {
        Ok(match self {
            LockKind::Spin => Box::new(SpinLock::new()),
            LockKind::Unfair => Box::new(UnfairLock::new()),
            LockKind::Semaphore => Box::new(Semaphore::new(1)),
            LockKind::Mutex => Box::new(ParkingMutex::new()),
            LockKind::Recursive => Box::new(ReentrantLock::new()),
            LockKind::SerialQueue => Box::new(SerialQueue::new("lockbench-serial-queue")?),
            LockKind::NoLock => Box::new(NoLock),
        })
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
