//! FIFO hand-off of update units from the engine thread to the owner thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use playsync_core::{EngineEvent, UpdateUnit};
use tracing::{debug, trace};

type Waker = Box<dyn Fn() + Send + Sync>;

struct Admission {
    next_seq: u64,
    tx: Option<Sender<UpdateUnit>>,
}

struct Shared {
    /// Sequence assignment and enqueue happen under this lock, so sequence
    /// order is queue order even with several posting threads.
    admission: Mutex<Admission>,
    closed: AtomicBool,
    waker: Option<Waker>,
}

/// Sending side of a [`Dispatcher`], usable from any thread.
#[derive(Clone)]
pub struct DispatchHandle {
    shared: Arc<Shared>,
}

impl DispatchHandle {
    /// Enqueue `event` for the owner thread. Never blocks on the owner.
    ///
    /// Returns `false` and drops the event once teardown has begun.
    pub fn post(&self, event: EngineEvent) -> bool {
        let seq = {
            let mut admission = self.shared.admission.lock();
            let seq = admission.next_seq;
            let Some(tx) = admission.tx.as_ref() else {
                trace!("Dispatcher closed, dropping {}", event.kind());
                return false;
            };
            if tx.send(UpdateUnit::new(seq, event)).is_err() {
                return false;
            }
            admission.next_seq += 1;
            seq
        };

        trace!("Admitted update #{seq}");
        if let Some(waker) = &self.shared.waker {
            waker();
        }
        true
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

/// Owner-thread end of the update queue.
pub struct Dispatcher {
    shared: Arc<Shared>,
    rx: Receiver<UpdateUnit>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Dispatcher that calls `waker` after every admitted unit, so an event
    /// loop can schedule a drain. `waker` runs on the posting thread.
    pub fn with_waker(waker: impl Fn() + Send + Sync + 'static) -> Self {
        Self::build(Some(Box::new(waker)))
    }

    fn build(waker: Option<Waker>) -> Self {
        let (tx, rx) = unbounded();
        Self {
            shared: Arc::new(Shared {
                admission: Mutex::new(Admission {
                    next_seq: 1,
                    tx: Some(tx),
                }),
                closed: AtomicBool::new(false),
                waker,
            }),
            rx,
        }
    }

    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            shared: self.shared.clone(),
        }
    }

    /// The queue itself, for use in `select!` by an owner loop.
    pub const fn receiver(&self) -> &Receiver<UpdateUnit> {
        &self.rx
    }

    /// Next unit in admission order, if any and not closed.
    pub fn try_next(&self) -> Option<UpdateUnit> {
        if self.is_closed() {
            return None;
        }
        self.rx.try_recv().ok()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Stop admitting and discard everything not yet applied.
    ///
    /// Returns the number of discarded units. Calling it again is a no-op.
    pub fn close(&self) -> usize {
        let was_open = self.shared.admission.lock().tx.take().is_some();
        self.shared.closed.store(true, Ordering::Release);
        if !was_open {
            return 0;
        }
        let discarded = self.rx.try_iter().count();
        debug!("Dispatcher closed, discarded {discarded} pending updates");
        discarded
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.close();
    }
}
