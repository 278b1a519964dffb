//! The contract every primitive under test is adapted to.

use crate::error::LockError;

/// Mutual exclusion split into separate acquire and release calls.
///
/// A successful [`acquire`](RawLock::acquire) must synchronize-with the previous
/// [`release`](RawLock::release), so everything the previous holder wrote is visible to
/// the next one.
pub trait RawLock: Send + Sync {
    /// Blocks until the calling thread holds the lock.
    ///
    /// An error is fatal for the caller's run; it is never retried.
    fn acquire(&self) -> Result<(), LockError>;

    /// Gives up the lock.
    ///
    /// # Safety
    ///
    /// The calling thread must hold the lock through a matching [`acquire`](RawLock::acquire).
    /// Implementations are free not to detect violations.
    unsafe fn release(&self);

    /// Whether the holder may acquire again without releasing first.
    fn is_recursive(&self) -> bool {
        false
    }

    /// The non-blocking facet, for primitives that have one.
    fn as_try_lock(&self) -> Option<&dyn TryLock> {
        None
    }
}

/// Optional non-blocking acquisition.
pub trait TryLock: RawLock {
    /// Returns `true` if the lock is now held by the calling thread.
    fn try_acquire(&self) -> bool;
}

/// Summary of what an adapter supports, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub try_acquire: bool,
    pub recursive: bool,
}

impl Capabilities {
    pub fn of(lock: &dyn RawLock) -> Self {
        Self {
            try_acquire: lock.as_try_lock().is_some(),
            recursive: lock.is_recursive(),
        }
    }
}
