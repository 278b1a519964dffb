use thiserror::Error;

/// Rejected configuration or workload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("iterations per worker must be at least 1")]
    ZeroIterations,

    #[error("repeat count must be at least 1")]
    ZeroRepeats,

    #[error("{workers} workers x {iterations} iterations x {net_effect} elements overflows usize")]
    TooLarge {
        workers: usize,
        iterations: usize,
        net_effect: usize,
    },

    #[error("workload unit has no operations")]
    EmptyWorkload,

    #[error("operation {op} removes index {index} from a resource holding {len} elements")]
    RemoveOutOfRange { op: usize, index: usize, len: usize },

    #[error("workload unit removes more elements than it appends")]
    ShrinkingWorkload,

    #[error("more than one lock entry is named {0:?}")]
    DuplicateLockName(String),

    #[error("environment variable {key}={value:?} is not a valid count")]
    InvalidEnv { key: &'static str, value: String },
}

/// A lock implementation could not be built or could not grant access.
///
/// Acquisition failures are fatal for the run that hits them; the suite moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("lock could not be created: {0}")]
    Construction(String),

    #[error("lock is unavailable: {0}")]
    Unavailable(String),
}

/// Why a run is reported as failed, independent of its verification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunFailure {
    #[error("lock construction failed: {0}")]
    Construction(#[source] LockError),

    #[error("worker {worker} could not be spawned: {message}")]
    Spawn { worker: usize, message: String },

    #[error("worker {worker} failed to acquire after {completed} iterations: {source}")]
    Acquisition {
        worker: usize,
        completed: usize,
        #[source]
        source: LockError,
    },

    #[error("worker {worker} terminated abnormally")]
    WorkerPanicked { worker: usize },
}
