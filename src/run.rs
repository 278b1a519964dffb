//! One benchmark run: spawn the workers, time them, verify what they left behind.

use std::{
    sync::mpsc::{self, Sender},
    thread,
    time::{Duration, Instant},
};

use tracing::{debug, info, warn};

use crate::{
    config::RunConfig,
    error::{ConfigError, LockError, RunFailure},
    gate::StartGate,
    lock::RawLock,
    priority::PriorityClass,
    resource::{ResourceSummary, SharedResource},
    verify::Verifier,
    workload::WorkloadUnit,
};

/// Lifecycle of a run, logged at `debug` level as it advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    Idle,
    Spawned,
    Running,
    AllCompleted,
    Verified,
    Reported,
}

/// Outcome of one run. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub lock_name: String,
    /// Wall-clock time from releasing the workers until the last one finished.
    pub elapsed: Duration,
    /// `false` on a lost update or on any [`RunFailure`].
    pub verification_passed: bool,
    pub final_resource_summary: ResourceSummary,
    pub expected_resource_summary: ResourceSummary,
    pub failures: Vec<RunFailure>,
}

impl RunResult {
    /// A run that never got as far as spawning workers.
    pub(crate) fn not_run(
        config: &RunConfig,
        expected: ResourceSummary,
        failure: RunFailure,
    ) -> Self {
        warn!(target: "lockbench::run", lock = config.lock_name(), error = %failure, "run failed");
        Self {
            lock_name: config.lock_name().to_owned(),
            elapsed: Duration::ZERO,
            verification_passed: false,
            final_resource_summary: ResourceSummary::default(),
            expected_resource_summary: expected,
            failures: vec![failure],
        }
    }

    /// Whether the lost-update check itself tripped, as opposed to a worker failing.
    pub fn lost_updates(&self) -> bool {
        self.failures.is_empty() && self.final_resource_summary != self.expected_resource_summary
    }
}

struct WorkerReport {
    worker: usize,
    completed: usize,
    outcome: Result<(), LockError>,
}

fn enter(config: &RunConfig, phase: RunPhase) {
    debug!(target: "lockbench::run", lock = config.lock_name(), ?phase, "run phase");
}

/// Measures `lock` under `config`, with every worker applying `workload` once per
/// critical section.
///
/// The lock and a freshly created resource live exactly as long as this call.
/// Failures during the run end up in [`RunResult::failures`]; only a config that
/// cannot be run at all is returned as an error. A lock that never grants access
/// hangs the call.
pub fn run_benchmark(
    config: &RunConfig,
    workload: &WorkloadUnit,
    lock: Box<dyn RawLock>,
) -> Result<RunResult, ConfigError> {
    let verifier = Verifier::new(config, workload)?;
    let resource =
        SharedResource::with_capacity(verifier.expected().len + workload.peak_growth());
    enter(config, RunPhase::Idle);

    let (elapsed, failures) = drive(config, workload, lock.as_ref(), &resource);
    enter(config, RunPhase::AllCompleted);

    let verification = verifier.check(resource.summary());
    let verification_passed = verification.passed && failures.is_empty();
    enter(config, RunPhase::Verified);

    if !verification.passed {
        warn!(
            target: "lockbench::run",
            lock = config.lock_name(),
            expected_len = verification.expected.len,
            actual_len = verification.actual.len,
            "lost updates detected"
        );
    }
    for failure in &failures {
        warn!(target: "lockbench::run", lock = config.lock_name(), error = %failure, "worker failed");
    }
    info!(
        target: "lockbench::run",
        lock = config.lock_name(),
        workers = config.worker_count(),
        iterations = config.iterations_per_worker(),
        ?elapsed,
        passed = verification_passed,
        "run finished"
    );

    drop(lock);
    drop(resource);
    enter(config, RunPhase::Reported);

    Ok(RunResult {
        lock_name: config.lock_name().to_owned(),
        elapsed,
        verification_passed,
        final_resource_summary: verification.actual,
        expected_resource_summary: verification.expected,
        failures,
    })
}

/// Runs the worker pool and returns the measured time plus anything that went wrong.
fn drive(
    config: &RunConfig,
    workload: &WorkloadUnit,
    lock: &dyn RawLock,
    resource: &SharedResource,
) -> (Duration, Vec<RunFailure>) {
    let workers = config.worker_count();
    let iterations = config.iterations_per_worker();
    let gate = StartGate::new();
    let (reports_tx, reports) = mpsc::channel();
    let mut failures = Vec::new();

    let elapsed = thread::scope(|s| {
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let reports_tx = reports_tx.clone();
            let gate = &gate;
            let spawned = thread::Builder::new()
                .name(format!("lockbench-worker-{worker}"))
                .spawn_scoped(s, move || {
                    work(worker, gate, lock, resource, workload, iterations, reports_tx)
                });
            match spawned {
                Ok(handle) => handles.push((worker, handle)),
                Err(err) => {
                    failures.push(RunFailure::Spawn {
                        worker,
                        message: err.to_string(),
                    });
                    break;
                }
            }
        }
        drop(reports_tx);

        let elapsed = if failures.is_empty() {
            gate.wait_for(workers);
            enter(config, RunPhase::Spawned);

            let start = Instant::now();
            gate.open();
            enter(config, RunPhase::Running);

            // ends once every worker has dropped its sender, including ones that panicked
            for report in reports.iter() {
                if let Err(source) = report.outcome {
                    failures.push(RunFailure::Acquisition {
                        worker: report.worker,
                        completed: report.completed,
                        source,
                    });
                }
            }
            start.elapsed()
        } else {
            gate.abort();
            Duration::ZERO
        };

        for (worker, handle) in handles {
            if handle.join().is_err() {
                failures.push(RunFailure::WorkerPanicked { worker });
            }
        }
        elapsed
    });

    (elapsed, failures)
}

fn work(
    worker: usize,
    gate: &StartGate,
    lock: &dyn RawLock,
    resource: &SharedResource,
    workload: &WorkloadUnit,
    iterations: usize,
    reports: Sender<WorkerReport>,
) {
    PriorityClass::for_worker(worker).apply_to_current_thread();
    if !gate.arrive_and_wait() {
        return;
    }

    let mut completed = 0;
    let mut outcome = Ok(());
    for _ in 0..iterations {
        if let Err(err) = lock.acquire() {
            outcome = Err(err);
            break;
        }
        resource.apply(workload);
        // SAFETY: acquired above on this thread.
        unsafe { lock.release() };
        completed += 1;
    }

    // the receiver outlives every worker
    let _ = reports.send(WorkerReport {
        worker,
        completed,
        outcome,
    });
}
