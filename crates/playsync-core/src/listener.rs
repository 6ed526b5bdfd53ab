//! The seam between a playlist engine and its observers.

use std::fmt;
use std::sync::Arc;

use crate::{EngineEvent, Result};

/// Opaque handle returned by listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Receives engine notifications.
///
/// Called on the engine's own thread. Implementations must not block and
/// must not call back into the engine for a fresh read.
pub trait EngineListener: Send + Sync {
    fn on_event(&self, event: EngineEvent);
}

/// A playback engine playlist that accepts listeners.
pub trait PlaylistEngine: Send + Sync {
    /// Registers `listener`. When `notify_current_state` is set the engine
    /// immediately replays its current state to this listener only.
    fn add_listener(
        &self,
        listener: Arc<dyn EngineListener>,
        notify_current_state: bool,
    ) -> Result<ListenerId>;

    /// Detaches a listener.
    ///
    /// Returns only once no callback for `id` is running and none will be
    /// issued again. Unknown or already removed ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}
