//! Synchronous engine double: the test thread plays the engine thread.

use std::sync::Arc;

use parking_lot::Mutex;
use playsync_core::{EngineEvent, EngineListener, Error, ListenerId, PlaylistEngine, Result};

#[derive(Default)]
struct Registry {
    next_id: u64,
    active: Vec<(ListenerId, Arc<dyn EngineListener>)>,
    removed: Vec<Arc<dyn EngineListener>>,
    removals: usize,
}

#[derive(Default)]
pub struct ManualEngine {
    registry: Mutex<Registry>,
    refuse: bool,
    initial_state: Vec<EngineEvent>,
}

impl ManualEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refusing() -> Arc<Self> {
        Arc::new(Self {
            refuse: true,
            ..Self::default()
        })
    }

    pub fn with_initial_state(events: Vec<EngineEvent>) -> Arc<Self> {
        Arc::new(Self {
            initial_state: events,
            ..Self::default()
        })
    }

    /// Deliver `event` to every active listener.
    pub fn emit(&self, event: EngineEvent) {
        let targets: Vec<_> = self
            .registry
            .lock()
            .active
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in targets {
            listener.on_event(event.clone());
        }
    }

    /// Deliver `event` to listeners that were already removed, as a racing
    /// engine might.
    pub fn emit_late(&self, event: EngineEvent) {
        let targets = self.registry.lock().removed.clone();
        for listener in targets {
            listener.on_event(event.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.lock().active.len()
    }

    pub fn removals(&self) -> usize {
        self.registry.lock().removals
    }
}

impl PlaylistEngine for ManualEngine {
    fn add_listener(
        &self,
        listener: Arc<dyn EngineListener>,
        notify_current_state: bool,
    ) -> Result<ListenerId> {
        if self.refuse {
            return Err(Error::Registration("out of listener slots".to_string()));
        }
        let id = {
            let mut registry = self.registry.lock();
            registry.next_id += 1;
            let id = ListenerId::new(registry.next_id);
            registry.active.push((id, listener.clone()));
            id
        };
        if notify_current_state {
            for event in &self.initial_state {
                listener.on_event(event.clone());
            }
        }
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        let mut registry = self.registry.lock();
        if let Some(position) = registry.active.iter().position(|(i, _)| *i == id) {
            let (_, listener) = registry.active.remove(position);
            registry.removed.push(listener);
            registry.removals += 1;
        }
    }
}
