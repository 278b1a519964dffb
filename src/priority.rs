//! Heterogeneous scheduling priority for workers.
//!
//! Workers are dealt round-robin into three classes so the lock sees requesters
//! the scheduler treats differently. Priorities can only be lowered without
//! privileges, so the classes are expressed as nice values at or above normal.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityClass {
    Interactive,
    Default,
    Utility,
}

impl PriorityClass {
    pub const ALL: [PriorityClass; 3] = [
        PriorityClass::Interactive,
        PriorityClass::Default,
        PriorityClass::Utility,
    ];

    pub fn for_worker(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub const fn name(self) -> &'static str {
        match self {
            PriorityClass::Interactive => "interactive",
            PriorityClass::Default => "default",
            PriorityClass::Utility => "utility",
        }
    }

    /// Nice value applied to threads of this class.
    pub const fn nice(self) -> i32 {
        match self {
            PriorityClass::Interactive => 0,
            PriorityClass::Default => 5,
            PriorityClass::Utility => 10,
        }
    }

    /// Moves the calling thread into this class. Best-effort: a refusal from the
    /// OS is logged and the thread keeps its priority.
    pub fn apply_to_current_thread(self) {
        if let Err(err) = set_current_thread_nice(self.nice()) {
            debug!(
                target: "lockbench::priority",
                class = self.name(),
                error = %err,
                "could not set thread priority"
            );
        }
    }
}

#[cfg(target_os = "linux")]
fn set_current_thread_nice(nice: i32) -> std::io::Result<()> {
    // SAFETY: gettid has no preconditions.
    let tid = unsafe { libc::syscall(libc::SYS_gettid) };
    let tid = libc::id_t::try_from(tid).map_err(std::io::Error::other)?;

    // On Linux PRIO_PROCESS with a thread id targets that thread only.
    // SAFETY: plain syscall wrapper, no pointers involved.
    if unsafe { libc::setpriority(libc::PRIO_PROCESS, tid, nice) } == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(target_os = "linux"))]
fn set_current_thread_nice(_nice: i32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "per-thread priority is only supported on Linux",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin() {
        let classes: Vec<_> = (0..7).map(PriorityClass::for_worker).collect();
        assert_eq!(
            classes,
            [
                PriorityClass::Interactive,
                PriorityClass::Default,
                PriorityClass::Utility,
                PriorityClass::Interactive,
                PriorityClass::Default,
                PriorityClass::Utility,
                PriorityClass::Interactive,
            ]
        );
    }

    #[test]
    fn applying_never_panics() {
        std::thread::spawn(|| PriorityClass::Utility.apply_to_current_thread())
            .join()
            .unwrap();
    }
}
