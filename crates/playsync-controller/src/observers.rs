//! Per-field change notification on the owner thread.

use playsync_core::{PlaylistSnapshot, SnapshotField};

/// Callback fired with the snapshot that introduced the change.
pub type FieldCallback = Box<dyn FnMut(&PlaylistSnapshot)>;

/// Handle returned by [`FieldObservers::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Observers keyed by field. Not `Send`: they live on the owner thread.
#[derive(Default)]
pub struct FieldObservers {
    next_id: u64,
    entries: Vec<(ObserverId, SnapshotField, FieldCallback)>,
}

impl FieldObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(
        &mut self,
        field: SnapshotField,
        callback: impl FnMut(&PlaylistSnapshot) + 'static,
    ) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.entries.push((id, field, Box::new(callback)));
        id
    }

    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _, _)| *entry_id != id);
        before != self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fire every observer of `field`, in connection order.
    pub fn notify(&mut self, field: SnapshotField, snapshot: &PlaylistSnapshot) {
        for (_, _, callback) in self.entries.iter_mut().filter(|(_, f, _)| *f == field) {
            callback(snapshot);
        }
    }
}
