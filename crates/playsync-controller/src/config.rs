//! Controller configuration.

use serde::{Deserialize, Serialize};

/// Settings for [`crate::PlaylistController`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Maximum units applied per `process_pending` call; 0 means unlimited.
    pub max_units_per_tick: usize,
    /// Ask the engine to replay its current state on registration.
    pub notify_initial_state: bool,
    /// Validate every snapshot before publishing it.
    pub check_invariants: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_units_per_tick: 0,
            notify_initial_state: true,
            check_invariants: true,
        }
    }
}

impl ControllerConfig {
    pub(crate) const fn tick_limit(&self) -> usize {
        if self.max_units_per_tick == 0 {
            usize::MAX
        } else {
            self.max_units_per_tick
        }
    }
}
