use parking_lot::lock_api::RawMutex as _;

use crate::{
    error::LockError,
    lock::{RawLock, TryLock},
};

/// General-purpose mutex: `parking_lot`'s word-sized lock with adaptive spinning
/// before parking.
pub struct ParkingMutex {
    raw: parking_lot::RawMutex,
}

impl ParkingMutex {
    pub const fn new() -> Self {
        Self {
            raw: parking_lot::RawMutex::INIT,
        }
    }
}

impl Default for ParkingMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl RawLock for ParkingMutex {
    fn acquire(&self) -> Result<(), LockError> {
        self.raw.lock();
        Ok(())
    }

    unsafe fn release(&self) {
        // SAFETY: forwarded from the caller's contract.
        unsafe { self.raw.unlock() };
    }

    fn as_try_lock(&self) -> Option<&dyn TryLock> {
        Some(self)
    }
}

impl TryLock for ParkingMutex {
    fn try_acquire(&self) -> bool {
        self.raw.try_lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locks::tests::hammer;

    #[test]
    fn excludes() {
        let lock = ParkingMutex::new();
        assert_eq!(hammer(&lock, 8, 10_000), 80_000);
        assert!(!lock.raw.is_locked());
    }
}
