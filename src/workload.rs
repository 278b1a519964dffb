//! The fixed unit of work executed inside every critical section.

use crate::error::ConfigError;

/// One mutation of the shared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Push a value at the back.
    Append(i64),
    /// Remove the element at this position, shifting later ones forward.
    RemoveAt(usize),
}

/// An immutable, validated sequence of [`Op`]s.
///
/// Validation applies the unit once to an empty resource: every removal must be
/// in range and the unit must not shrink the resource. Since later applications
/// start from a longer resource, they stay in range too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadUnit {
    ops: Vec<Op>,
    net_effect: usize,
    peak_growth: usize,
}

impl WorkloadUnit {
    pub fn new(ops: Vec<Op>) -> Result<Self, ConfigError> {
        if ops.is_empty() {
            return Err(ConfigError::EmptyWorkload);
        }

        let mut len = 0_usize;
        let mut peak = 0_usize;
        for (op, step) in ops.iter().enumerate() {
            match *step {
                Op::Append(_) => {
                    len += 1;
                    peak = peak.max(len);
                }
                Op::RemoveAt(index) if index < len => len -= 1,
                Op::RemoveAt(index) => {
                    return Err(ConfigError::RemoveOutOfRange { op, index, len });
                }
            }
        }
        if len == 0 {
            return Err(ConfigError::ShrinkingWorkload);
        }

        Ok(Self {
            ops,
            net_effect: len,
            peak_growth: peak,
        })
    }

    /// Append two elements, then remove the second one.
    ///
    /// The removal depends on the length the appends produced, so an interleaved
    /// critical section corrupts both the length and the contents.
    pub fn standard() -> Self {
        Self {
            ops: vec![Op::Append(1), Op::Append(2), Op::RemoveAt(1)],
            net_effect: 1,
            peak_growth: 2,
        }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Elements added to the resource by one application.
    pub fn net_effect(&self) -> usize {
        self.net_effect
    }

    /// Largest length above the starting length reached during one application.
    pub fn peak_growth(&self) -> usize {
        self.peak_growth
    }
}

impl Default for WorkloadUnit {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn standard_matches_validation() {
        let standard = WorkloadUnit::standard();
        assert_eq!(WorkloadUnit::new(standard.ops().to_vec()).unwrap(), standard);
    }

    #[test]
    fn rejects_bad_units() {
        assert_eq!(WorkloadUnit::new(vec![]), Err(ConfigError::EmptyWorkload));
        assert_eq!(
            WorkloadUnit::new(vec![Op::Append(1), Op::RemoveAt(1)]),
            Err(ConfigError::RemoveOutOfRange {
                op: 1,
                index: 1,
                len: 1
            })
        );
        assert_eq!(
            WorkloadUnit::new(vec![Op::Append(1), Op::RemoveAt(0)]),
            Err(ConfigError::ShrinkingWorkload)
        );
    }

    proptest! {
        #[test]
        fn appends_only(values in prop::collection::vec(any::<i64>(), 1..16)) {
            let unit = WorkloadUnit::new(values.iter().copied().map(Op::Append).collect()).unwrap();
            prop_assert_eq!(unit.net_effect(), values.len());
            prop_assert_eq!(unit.peak_growth(), values.len());
        }
    }
}
