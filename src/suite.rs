//! Runs every lock of a comparison under the same workload shape.

use std::fmt;

use tracing::info;

use crate::{
    config::{RunConfig, SuiteConfig},
    error::{ConfigError, LockError, RunFailure},
    lock::RawLock,
    locks::LockKind,
    report::{Comparison, compare},
    run::{RunResult, run_benchmark},
    verify::Verifier,
    workload::WorkloadUnit,
};

type Factory = Box<dyn Fn() -> Result<Box<dyn RawLock>, LockError> + Send + Sync>;

/// A named lock implementation. The factory is called once per run, so no lock
/// instance is ever reused.
pub struct LockEntry {
    name: String,
    factory: Factory,
}

impl LockEntry {
    pub fn new(
        name: impl Into<String>,
        factory: impl Fn() -> Result<Box<dyn RawLock>, LockError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            factory: Box::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<LockKind> for LockEntry {
    fn from(kind: LockKind) -> Self {
        Self::new(kind.name(), move || kind.build())
    }
}

impl fmt::Debug for LockEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Every built-in lock that provides exclusion.
pub fn default_entries() -> Vec<LockEntry> {
    LockKind::CORRECT.into_iter().map(LockEntry::from).collect()
}

/// Runs `entry` `repeat_count` times, each time with a fresh lock.
///
/// A lock that cannot be built produces a failed result for that repetition.
pub fn run_repeated(
    config: &RunConfig,
    workload: &WorkloadUnit,
    entry: &LockEntry,
    repeat_count: usize,
) -> Result<Vec<RunResult>, ConfigError> {
    if repeat_count == 0 {
        return Err(ConfigError::ZeroRepeats);
    }

    let mut results = Vec::with_capacity(repeat_count);
    for _ in 0..repeat_count {
        let result = match (entry.factory)() {
            Ok(lock) => run_benchmark(config, workload, lock)?,
            Err(err) => {
                let expected = Verifier::new(config, workload)?.expected();
                RunResult::not_run(config, expected, RunFailure::Construction(err))
            }
        };
        results.push(result);
    }
    Ok(results)
}

/// Runs every entry in order and ranks the outcome.
///
/// One entry failing, whether by losing updates or by a broken lock, never stops
/// the others.
pub fn run_suite(
    config: &SuiteConfig,
    workload: &WorkloadUnit,
    entries: &[LockEntry],
) -> Result<Comparison, ConfigError> {
    config.validate()?;
    // results are grouped by name, so two entries sharing one would be merged
    for (index, entry) in entries.iter().enumerate() {
        if entries[..index].iter().any(|seen| seen.name == entry.name) {
            return Err(ConfigError::DuplicateLockName(entry.name.clone()));
        }
    }

    let mut results = Vec::with_capacity(entries.len() * config.repeat_count);
    for entry in entries {
        let run_config = config.run_config(entry.name())?;
        results.extend(run_repeated(&run_config, workload, entry, config.repeat_count)?);
    }

    let comparison = compare(&results);
    for entry in comparison.entries() {
        info!(
            target: "lockbench::suite",
            rank = ?entry.rank,
            lock = %entry.lock_name,
            mean = ?entry.stats.mean,
            min = ?entry.stats.min,
            max = ?entry.stats.max,
            passed = entry.verification_passed,
            "ranked"
        );
    }
    Ok(comparison)
}
