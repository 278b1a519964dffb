use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    thread::{self, JoinHandle},
};

use atomic_wait::{wait, wake_one};
use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::{error::LockError, lock::RawLock};

const WAITING: u32 = 0;
const GRANTED: u32 = 1;
const REFUSED: u32 = 2;

const IDLE: u32 = 0;
const BUSY: u32 = 1;

/// One requester's slot in the queue.
struct Ticket {
    state: AtomicU32,
}

impl Ticket {
    fn settle(&self, outcome: u32) {
        self.state.store(outcome, Ordering::Release);
        wake_one(&self.state);
    }
}

/// FIFO of pending tickets.
struct Channel {
    queue: Mutex<Pending>,
    item_ready: Condvar,
}

struct Pending {
    tickets: VecDeque<Arc<Ticket>>,
    closed: bool,
}

impl Channel {
    fn new() -> Self {
        Self {
            queue: Mutex::new(Pending {
                tickets: VecDeque::new(),
                closed: false,
            }),
            item_ready: Condvar::new(),
        }
    }

    fn send(&self, ticket: Arc<Ticket>) -> bool {
        let mut pending = self.queue.lock();
        if pending.closed {
            return false;
        }
        pending.tickets.push_back(ticket);
        self.item_ready.notify_one();
        true
    }

    /// Blocks until a ticket arrives. `None` once closed and drained.
    fn receive(&self) -> Option<Arc<Ticket>> {
        let mut pending = self.queue.lock();
        loop {
            if let Some(ticket) = pending.tickets.pop_front() {
                return Some(ticket);
            }
            if pending.closed {
                return None;
            }
            self.item_ready.wait(&mut pending);
        }
    }

    fn close(&self) {
        self.queue.lock().closed = true;
        self.item_ready.notify_all();
    }
}

struct Shared {
    channel: Channel,
    /// BUSY while a granted requester is inside its critical section.
    section: AtomicU32,
}

/// Serializes requesters through a dedicated drain thread that admits one
/// ticket at a time, in arrival order, and waits for it to finish before
/// admitting the next.
pub struct SerialQueue {
    shared: Arc<Shared>,
    drain: Option<JoinHandle<()>>,
}

impl SerialQueue {
    pub fn new(label: &str) -> Result<Self, LockError> {
        let shared = Arc::new(Shared {
            channel: Channel::new(),
            section: AtomicU32::new(IDLE),
        });

        let drain = thread::Builder::new()
            .name(label.to_owned())
            .spawn({
                let shared = Arc::clone(&shared);
                move || drain(&shared)
            })
            .map_err(|e| LockError::Construction(e.to_string()))?;

        Ok(Self {
            shared,
            drain: Some(drain),
        })
    }
}

fn drain(shared: &Shared) {
    while let Some(ticket) = shared.channel.receive() {
        shared.section.store(BUSY, Ordering::Relaxed);
        ticket.settle(GRANTED);
        while shared.section.load(Ordering::Acquire) == BUSY {
            wait(&shared.section, BUSY);
        }
    }
    debug!(target: "lockbench::locks", "serial queue drained");
}

impl RawLock for SerialQueue {
    fn acquire(&self) -> Result<(), LockError> {
        let ticket = Arc::new(Ticket {
            state: AtomicU32::new(WAITING),
        });
        if !self.shared.channel.send(Arc::clone(&ticket)) {
            return Err(LockError::Unavailable("serial queue is closed".to_owned()));
        }

        loop {
            match ticket.state.load(Ordering::Acquire) {
                WAITING => wait(&ticket.state, WAITING),
                GRANTED => return Ok(()),
                _ => return Err(LockError::Unavailable("serial queue refused the request".to_owned())),
            }
        }
    }

    unsafe fn release(&self) {
        self.shared.section.store(IDLE, Ordering::Release);
        wake_one(&self.shared.section);
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        self.shared.channel.close();
        // refuse anything still queued so no requester sleeps forever
        for ticket in self.shared.channel.queue.lock().tickets.drain(..) {
            ticket.settle(REFUSED);
        }
        if let Some(drain) = self.drain.take() {
            if drain.join().is_err() {
                debug!(target: "lockbench::locks", "serial queue drain thread panicked");
            }
        }
    }
}
