use std::sync::atomic::{AtomicU32, Ordering};

use atomic_wait::{wait, wake_one};

use crate::{
    error::LockError,
    lock::{RawLock, TryLock},
};

/// Counting semaphore. With a single permit it behaves as a lock.
pub struct Semaphore {
    permits: AtomicU32,
}

impl Semaphore {
    pub const fn new(permits: u32) -> Self {
        Self {
            permits: AtomicU32::new(permits),
        }
    }

    /// Takes one permit, sleeping while none are left.
    pub fn wait(&self) {
        let mut available = self.permits.load(Ordering::Relaxed);
        loop {
            if available == 0 {
                wait(&self.permits, 0);
                available = self.permits.load(Ordering::Relaxed);
                continue;
            }
            match self.permits.compare_exchange_weak(
                available,
                available - 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(current) => available = current,
            }
        }
    }

    /// Returns one permit and wakes a sleeper, if any.
    pub fn signal(&self) {
        self.permits.fetch_add(1, Ordering::Release);
        // no waiter count is kept, so every signal pays for a wake
        wake_one(&self.permits);
    }

    pub fn available(&self) -> u32 {
        self.permits.load(Ordering::Relaxed)
    }
}

impl RawLock for Semaphore {
    fn acquire(&self) -> Result<(), LockError> {
        self.wait();
        Ok(())
    }

    unsafe fn release(&self) {
        self.signal();
    }

    fn as_try_lock(&self) -> Option<&dyn TryLock> {
        Some(self)
    }
}

impl TryLock for Semaphore {
    fn try_acquire(&self) -> bool {
        let mut available = self.permits.load(Ordering::Relaxed);
        while available > 0 {
            match self.permits.compare_exchange_weak(
                available,
                available - 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(current) => available = current,
            }
        }
        false
    }
}
