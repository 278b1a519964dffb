use std::{
    cell::Cell,
    sync::atomic::{AtomicU64, Ordering},
};

use super::futex_lock::UnfairLock;
use crate::{
    error::LockError,
    lock::{RawLock, TryLock},
};

const NO_OWNER: u64 = 0;

static NEXT_THREAD_TOKEN: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_TOKEN: u64 = NEXT_THREAD_TOKEN.fetch_add(1, Ordering::Relaxed);
}

fn current_thread_token() -> u64 {
    THREAD_TOKEN.with(|token| *token)
}

/// Recursive lock in the style of a per-object monitor: the owning thread may
/// enter again, and the lock is free once every entry has been released.
pub struct ReentrantLock {
    inner: UnfairLock,
    owner: AtomicU64,
    // only touched by the owner
    depth: Cell<usize>,
}

// depth is only read or written by the thread recorded in `owner`
unsafe impl Sync for ReentrantLock {}

impl ReentrantLock {
    pub const fn new() -> Self {
        Self {
            inner: UnfairLock::new(),
            owner: AtomicU64::new(NO_OWNER),
            depth: Cell::new(0),
        }
    }

    fn is_owned_by_current_thread(&self) -> bool {
        self.owner.load(Ordering::Relaxed) == current_thread_token()
    }

    fn enter(&self) {
        self.owner.store(current_thread_token(), Ordering::Relaxed);
        self.depth.set(1);
    }
}

impl Default for ReentrantLock {
    fn default() -> Self {
        Self::new()
    }
}

impl RawLock for ReentrantLock {
    fn acquire(&self) -> Result<(), LockError> {
        if self.is_owned_by_current_thread() {
            self.depth.set(self.depth.get() + 1);
            return Ok(());
        }
        self.inner.acquire()?;
        self.enter();
        Ok(())
    }

    unsafe fn release(&self) {
        let depth = self.depth.get() - 1;
        self.depth.set(depth);
        if depth == 0 {
            self.owner.store(NO_OWNER, Ordering::Relaxed);
            // SAFETY: depth hit zero, so this thread holds the inner lock exactly once.
            unsafe { self.inner.release() };
        }
    }

    fn is_recursive(&self) -> bool {
        true
    }

    fn as_try_lock(&self) -> Option<&dyn TryLock> {
        Some(self)
    }
}

impl TryLock for ReentrantLock {
    fn try_acquire(&self) -> bool {
        if self.is_owned_by_current_thread() {
            self.depth.set(self.depth.get() + 1);
            return true;
        }
        if !self.inner.try_acquire() {
            return false;
        }
        self.enter();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locks::tests::hammer;

    #[test]
    fn excludes() {
        let lock = ReentrantLock::new();
        assert_eq!(hammer(&lock, 8, 10_000), 80_000);
    }

    #[test]
    fn owner_can_reenter() {
        let lock = ReentrantLock::new();
        lock.acquire().unwrap();
        lock.acquire().unwrap();
        assert!(lock.try_acquire());

        std::thread::scope(|s| {
            s.spawn(|| assert!(!lock.try_acquire()));
        });

        unsafe {
            lock.release();
            lock.release();
        }
        std::thread::scope(|s| {
            s.spawn(|| assert!(!lock.try_acquire()));
        });

        unsafe { lock.release() };
        std::thread::scope(|s| {
            s.spawn(|| {
                assert!(lock.try_acquire());
                unsafe { lock.release() };
            });
        });
    }
}
