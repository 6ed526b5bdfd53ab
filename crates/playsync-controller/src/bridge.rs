//! Engine listener that forwards callbacks into the dispatcher.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use playsync_core::{EngineEvent, EngineListener};
use tracing::trace;

use crate::dispatcher::DispatchHandle;

/// Registered with the engine on behalf of one controller.
///
/// Runs on the engine thread. It never touches controller state: each
/// callback becomes one update unit in the dispatcher queue.
pub struct ListenerBridge {
    dispatch: DispatchHandle,
    detached: AtomicBool,
    dropped: AtomicU64,
}

impl ListenerBridge {
    pub fn new(dispatch: DispatchHandle) -> Arc<Self> {
        Arc::new(Self {
            dispatch,
            detached: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
        })
    }

    /// Mark the bridge as detached; later callbacks are dropped.
    ///
    /// Returns `true` on the first call only.
    pub fn detach(&self) -> bool {
        !self.detached.swap(true, Ordering::AcqRel)
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    /// Callbacks that arrived after detach or teardown and were dropped.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl EngineListener for ListenerBridge {
    fn on_event(&self, event: EngineEvent) {
        if self.is_detached() {
            trace!("Dropping late {} callback", event.kind());
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        if !self.dispatch.post(event) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}
