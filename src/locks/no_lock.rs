use crate::{
    error::LockError,
    lock::{RawLock, TryLock},
};

/// Grants every request immediately. Only useful to show that a run without
/// exclusion loses updates.
#[derive(Debug, Default)]
pub struct NoLock;

impl RawLock for NoLock {
    fn acquire(&self) -> Result<(), LockError> {
        Ok(())
    }

    unsafe fn release(&self) {}

    fn is_recursive(&self) -> bool {
        true
    }

    fn as_try_lock(&self) -> Option<&dyn TryLock> {
        Some(self)
    }
}

impl TryLock for NoLock {
    fn try_acquire(&self) -> bool {
        true
    }
}
