//! Compare mutual-exclusion primitives under heavy contention.
//!
//! Every lock is driven through the same workload: `worker_count` threads, each
//! running `iterations_per_worker` critical sections that apply one
//! [`WorkloadUnit`] to a shared list. A run is timed between a start gate and the
//! last worker finishing, then the list is checked for lost updates. A fast lock
//! that loses updates is flagged and never ranked first.
//!
//! ```no_run
//! use lockbench::{SuiteConfig, WorkloadUnit, default_entries, run_suite};
//!
//! let comparison = run_suite(&SuiteConfig::default(), &WorkloadUnit::standard(), &default_entries())?;
//! if let Some(fastest) = comparison.fastest() {
//!     println!("{} in {:?}", fastest.lock_name, fastest.stats.mean);
//! }
//! # Ok::<(), lockbench::ConfigError>(())
//! ```

mod config;
mod error;
mod gate;
mod lock;
pub mod locks;
mod priority;
mod report;
mod resource;
mod run;
mod suite;
mod verify;
mod workload;

pub use config::{RunConfig, SuiteConfig};
pub use error::{ConfigError, LockError, RunFailure};
pub use lock::{Capabilities, RawLock, TryLock};
pub use priority::PriorityClass;
pub use report::{Comparison, RankedEntry, TimingStats, compare};
pub use resource::{ResourceSummary, SharedResource};
pub use run::{RunPhase, RunResult, run_benchmark};
pub use suite::{LockEntry, default_entries, run_repeated, run_suite};
pub use verify::{Verification, Verifier};
pub use workload::{Op, WorkloadUnit};
