use std::sync::atomic::{AtomicU32, Ordering};

use atomic_wait::{wait, wake_one};

use crate::{
    error::LockError,
    lock::{RawLock, TryLock},
};

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;
const CONTENDED: u32 = 2;

/// Kernel-assisted lock with no hand-off: a waiter that is woken has to race
/// for the lock again, and a running thread may barge ahead of it.
pub struct UnfairLock {
    /// 0: unlocked
    /// 1: locked, no other threads waiting
    /// 2: locked, other threads waiting
    state: AtomicU32,
}

impl UnfairLock {
    pub const fn new() -> Self {
        Self {
            state: AtomicU32::new(UNLOCKED),
        }
    }
}

impl Default for UnfairLock {
    fn default() -> Self {
        Self::new()
    }
}

impl RawLock for UnfairLock {
    fn acquire(&self) -> Result<(), LockError> {
        if self
            .state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            // once we've slept we can't know whether others are waiting, so claim CONTENDED
            while self.state.swap(CONTENDED, Ordering::Acquire) != UNLOCKED {
                wait(&self.state, CONTENDED);
            }
        }
        Ok(())
    }

    unsafe fn release(&self) {
        if self.state.swap(UNLOCKED, Ordering::Release) == CONTENDED {
            wake_one(&self.state);
        }
    }

    fn as_try_lock(&self) -> Option<&dyn TryLock> {
        Some(self)
    }
}

impl TryLock for UnfairLock {
    fn try_acquire(&self) -> bool {
        self.state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locks::tests::hammer;

    #[test]
    fn excludes() {
        let lock = UnfairLock::new();
        assert_eq!(hammer(&lock, 8, 10_000), 80_000);
    }

    #[test]
    fn release_resets_state() {
        let lock = UnfairLock::new();
        lock.acquire().unwrap();
        assert!(!lock.try_acquire());
        unsafe { lock.release() };
        assert_eq!(lock.state.load(Ordering::Relaxed), UNLOCKED);
    }
}
