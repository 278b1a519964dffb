//! Run and suite parameters.

use crate::{error::ConfigError, workload::WorkloadUnit};

pub const DEFAULT_WORKERS: usize = 16;
pub const DEFAULT_ITERATIONS: usize = 10_000;
pub const DEFAULT_REPEATS: usize = 10;

pub const WORKERS_ENV: &str = "LOCKBENCH_WORKERS";
pub const ITERATIONS_ENV: &str = "LOCKBENCH_ITERATIONS";
pub const REPEAT_ENV: &str = "LOCKBENCH_REPEAT";

/// Parameters of a single run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    lock_name: String,
    worker_count: usize,
    iterations_per_worker: usize,
}

impl RunConfig {
    pub fn new(
        lock_name: impl Into<String>,
        worker_count: usize,
        iterations_per_worker: usize,
    ) -> Result<Self, ConfigError> {
        if worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if iterations_per_worker == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(Self {
            lock_name: lock_name.into(),
            worker_count,
            iterations_per_worker,
        })
    }

    pub fn lock_name(&self) -> &str {
        &self.lock_name
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn iterations_per_worker(&self) -> usize {
        self.iterations_per_worker
    }

    /// Length of the resource after a run in which no update was lost.
    pub fn expected_len(&self, unit: &WorkloadUnit) -> Result<usize, ConfigError> {
        self.worker_count
            .checked_mul(self.iterations_per_worker)
            .and_then(|applications| applications.checked_mul(unit.net_effect()))
            .ok_or(ConfigError::TooLarge {
                workers: self.worker_count,
                iterations: self.iterations_per_worker,
                net_effect: unit.net_effect(),
            })
    }
}

/// Shape shared by every run of a suite, so results stay comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteConfig {
    pub worker_count: usize,
    pub iterations_per_worker: usize,
    /// Runs per lock. Each one gets a fresh lock and resource.
    pub repeat_count: usize,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKERS,
            iterations_per_worker: DEFAULT_ITERATIONS,
            repeat_count: DEFAULT_REPEATS,
        }
    }
}

impl SuiteConfig {
    /// Defaults, overridden by `LOCKBENCH_WORKERS`, `LOCKBENCH_ITERATIONS` and
    /// `LOCKBENCH_REPEAT` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |key: &'static str, default: usize| match lookup(key) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key, value }),
        };

        let config = Self {
            worker_count: read(WORKERS_ENV, defaults.worker_count)?,
            iterations_per_worker: read(ITERATIONS_ENV, defaults.iterations_per_worker)?,
            repeat_count: read(REPEAT_ENV, defaults.repeat_count)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repeat_count == 0 {
            return Err(ConfigError::ZeroRepeats);
        }
        self.run_config("").map(|_| ())
    }

    pub fn run_config(&self, lock_name: &str) -> Result<RunConfig, ConfigError> {
        RunConfig::new(lock_name, self.worker_count, self.iterations_per_worker)
    }
}
