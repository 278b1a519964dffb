//! Post-run correctness check.
//!
//! Every worker applies the same unit, so under real exclusion the final contents
//! do not depend on which worker went when. The verifier replays the unit on a
//! plain `VecDeque` to get the expected contents, and compares length (the
//! primary lost-update signal) and element sum. This catches corruption, not
//! every possible reordering.

use std::collections::VecDeque;

use crate::{
    config::RunConfig,
    error::ConfigError,
    resource::ResourceSummary,
    workload::{Op, WorkloadUnit},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub expected: ResourceSummary,
    pub actual: ResourceSummary,
    pub passed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Verifier {
    expected: ResourceSummary,
}

impl Verifier {
    pub fn new(config: &RunConfig, unit: &WorkloadUnit) -> Result<Self, ConfigError> {
        let expected_len = config.expected_len(unit)?;
        let applications = config.worker_count() * config.iterations_per_worker();

        let mut model = VecDeque::with_capacity(expected_len + unit.peak_growth());
        for _ in 0..applications {
            for op in unit.ops() {
                match *op {
                    Op::Append(value) => model.push_back(value),
                    Op::RemoveAt(index) => {
                        model.remove(index);
                    }
                }
            }
        }
        debug_assert_eq!(model.len(), expected_len);

        let (front, back) = model.as_slices();
        let checksum = ResourceSummary::of(front)
            .checksum
            .wrapping_add(ResourceSummary::of(back).checksum);

        Ok(Self {
            expected: ResourceSummary {
                len: expected_len,
                checksum,
            },
        })
    }

    pub fn expected(&self) -> ResourceSummary {
        self.expected
    }

    pub fn check(&self, actual: ResourceSummary) -> Verification {
        Verification {
            expected: self.expected,
            actual,
            passed: actual == self.expected,
        }
    }
}
