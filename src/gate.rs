use parking_lot::{Condvar, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Pending,
    Open,
    Abort,
}

struct State {
    arrived: usize,
    signal: Signal,
}

/// Start barrier between the coordinator and its workers.
///
/// Unlike `std::sync::Barrier` it can be aborted, so workers that were already
/// spawned are released when spawning a later one fails.
pub(crate) struct StartGate {
    state: Mutex<State>,
    changed: Condvar,
}

impl StartGate {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                arrived: 0,
                signal: Signal::Pending,
            }),
            changed: Condvar::new(),
        }
    }

    /// Called by a worker. Returns `true` if the run is on.
    pub(crate) fn arrive_and_wait(&self) -> bool {
        let mut state = self.state.lock();
        state.arrived += 1;
        self.changed.notify_all();
        while state.signal == Signal::Pending {
            self.changed.wait(&mut state);
        }
        state.signal == Signal::Open
    }

    /// Blocks until `count` workers are parked at the gate.
    pub(crate) fn wait_for(&self, count: usize) {
        let mut state = self.state.lock();
        while state.arrived < count {
            self.changed.wait(&mut state);
        }
    }

    pub(crate) fn open(&self) {
        self.release(Signal::Open);
    }

    pub(crate) fn abort(&self) {
        self.release(Signal::Abort);
    }

    fn release(&self, signal: Signal) {
        self.state.lock().signal = signal;
        self.changed.notify_all();
    }
}
