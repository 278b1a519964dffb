//! The contended list every worker mutates.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use crate::workload::{Op, WorkloadUnit};

/// Length and element sum of a resource, enough to compare two runs' outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceSummary {
    pub len: usize,
    pub checksum: i64,
}

impl ResourceSummary {
    pub fn of(values: &[i64]) -> Self {
        Self {
            len: values.len(),
            checksum: values.iter().fold(0_i64, |acc, v| acc.wrapping_add(*v)),
        }
    }
}

/// A ring-buffer list of integers shared by reference across the workers of one run.
///
/// Every cell is a relaxed atomic and every update is a separate load and store,
/// so the lock held around [`apply`](SharedResource::apply) is the only thing that
/// makes a workload unit atomic. Without it updates get lost, but indices wrap
/// inside the buffer and memory stays valid.
pub struct SharedResource {
    slots: Box<[AtomicI64]>,
    mask: usize,
    head: AtomicUsize,
    len: AtomicUsize,
}

impl SharedResource {
    /// Capacity is rounded up to a power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        Self {
            slots: (0..capacity).map(|_| AtomicI64::new(0)).collect(),
            mask: capacity - 1,
            head: AtomicUsize::new(0),
            len: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Runs one workload unit. Must only be called with the run's lock held.
    pub fn apply(&self, unit: &WorkloadUnit) {
        for op in unit.ops() {
            match *op {
                Op::Append(value) => self.push_back(value),
                Op::RemoveAt(index) => self.remove(index),
            }
        }
    }

    fn slot(&self, head: usize, index: usize) -> &AtomicI64 {
        &self.slots[head.wrapping_add(index) & self.mask]
    }

    fn push_back(&self, value: i64) {
        let head = self.head.load(Ordering::Relaxed);
        let len = self.len.load(Ordering::Relaxed);
        self.slot(head, len).store(value, Ordering::Relaxed);
        self.len.store(len + 1, Ordering::Relaxed);
    }

    fn remove(&self, index: usize) {
        let head = self.head.load(Ordering::Relaxed);
        let len = self.len.load(Ordering::Relaxed);
        if index >= len {
            // only reachable when another thread mutated concurrently
            return;
        }

        // move whichever side of the gap is shorter
        if index < len / 2 {
            for i in (0..index).rev() {
                let value = self.slot(head, i).load(Ordering::Relaxed);
                self.slot(head, i + 1).store(value, Ordering::Relaxed);
            }
            self.head
                .store(head.wrapping_add(1) & self.mask, Ordering::Relaxed);
        } else {
            for i in index..len - 1 {
                let value = self.slot(head, i + 1).load(Ordering::Relaxed);
                self.slot(head, i).store(value, Ordering::Relaxed);
            }
        }
        self.len.store(len - 1, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies out the contents, front to back.
    ///
    /// Only meaningful once every mutator has finished.
    pub fn snapshot(&self) -> Vec<i64> {
        let head = self.head.load(Ordering::Relaxed);
        let len = self.len().min(self.capacity());
        (0..len)
            .map(|i| self.slot(head, i).load(Ordering::Relaxed))
            .collect()
    }

    pub fn summary(&self) -> ResourceSummary {
        ResourceSummary::of(&self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn standard_unit_sequence() {
        let resource = SharedResource::with_capacity(8);
        let unit = WorkloadUnit::standard();

        resource.apply(&unit);
        assert_eq!(resource.snapshot(), [1]);
        resource.apply(&unit);
        assert_eq!(resource.snapshot(), [1, 2]);
        resource.apply(&unit);
        assert_eq!(resource.snapshot(), [1, 1, 2]);
        assert_eq!(
            resource.summary(),
            ResourceSummary {
                len: 3,
                checksum: 4
            }
        );
    }

    #[test]
    fn capacity_is_power_of_two() {
        assert_eq!(SharedResource::with_capacity(0).capacity(), 1);
        assert_eq!(SharedResource::with_capacity(5).capacity(), 8);
        assert!(SharedResource::with_capacity(3).is_empty());
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<i8>().prop_map(|v| Op::Append(i64::from(v))),
            (0_usize..8).prop_map(Op::RemoveAt),
        ]
    }

    proptest! {
        // Single-threaded, the ring buffer behaves exactly like a VecDeque,
        // including after the head wraps.
        #[test]
        fn matches_vec_deque(ops in prop::collection::vec(op(), 0..200)) {
            let resource = SharedResource::with_capacity(16);
            let mut model = VecDeque::new();
            for op in ops {
                match op {
                    Op::Append(v) if model.len() < 16 => {
                        model.push_back(v);
                        resource.push_back(v);
                    }
                    Op::RemoveAt(i) if i < model.len() => {
                        model.remove(i);
                        resource.remove(i);
                    }
                    _ => {}
                }
            }
            prop_assert_eq!(resource.snapshot(), Vec::from(model));
        }
    }
}
