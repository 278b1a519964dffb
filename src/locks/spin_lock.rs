use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    error::LockError,
    lock::{RawLock, TryLock},
};

/// Busy-polls until the flag is free. Fastest when critical sections are tiny,
/// but a descheduled holder burns every waiter's time slice.
pub struct SpinLock {
    locked: AtomicBool,
}

impl SpinLock {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }
}

impl Default for SpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl RawLock for SpinLock {
    fn acquire(&self) -> Result<(), LockError> {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            // spin on a plain load so waiters don't bounce the cache line
            while self.locked.load(Ordering::Relaxed) {
                std::hint::spin_loop();
            }
        }
        Ok(())
    }

    unsafe fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }

    fn as_try_lock(&self) -> Option<&dyn TryLock> {
        Some(self)
    }
}

impl TryLock for SpinLock {
    fn try_acquire(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locks::tests::hammer;

    #[test]
    fn excludes() {
        let lock = SpinLock::new();
        assert_eq!(hammer(&lock, 4, 10_000), 40_000);
    }

    #[test]
    fn try_acquire_fails_while_held() {
        let lock = SpinLock::new();
        let facet = lock.as_try_lock().unwrap();

        assert!(facet.try_acquire());
        std::thread::scope(|s| {
            s.spawn(|| assert!(!lock.try_acquire()));
        });
        unsafe { lock.release() };
        assert!(lock.try_acquire());
        unsafe { lock.release() };
    }
}
