//! Playlist controller: the owner-thread mirror of one engine playlist.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use playsync_core::{
    sort, ListenerId, PlaylistEngine, PlaylistItem, PlaylistSnapshot, RepeatMode, Result,
    SnapshotField, SortDescriptor, SortKey, SortOrder, UpdateUnit,
};
use tracing::{debug, error, info, trace, warn};

use crate::bridge::ListenerBridge;
use crate::config::ControllerConfig;
use crate::dispatcher::Dispatcher;
use crate::observers::{FieldObservers, ObserverId};
use crate::state;

/// Mirrored state, mutated only by the owner thread.
///
/// Each applied unit replaces the snapshot in one step and then fires one
/// notification per field whose value changed.
pub struct PlaylistControllerPrivate {
    snapshot: Arc<PlaylistSnapshot>,
    last_seq: u64,
    observers: FieldObservers,
    check_invariants: bool,
    sort_key_title_list: &'static [SortDescriptor],
}

impl PlaylistControllerPrivate {
    pub fn new(check_invariants: bool) -> Self {
        Self {
            snapshot: Arc::new(PlaylistSnapshot::new()),
            last_seq: 0,
            observers: FieldObservers::new(),
            check_invariants,
            sort_key_title_list: sort::catalog(),
        }
    }

    /// Apply one unit. Returns whether the snapshot was replaced.
    pub fn apply(&mut self, unit: UpdateUnit) -> bool {
        if unit.seq <= self.last_seq {
            warn!(
                "Dropping duplicate update #{} (last applied #{})",
                unit.seq, self.last_seq
            );
            return false;
        }
        if unit.seq != self.last_seq + 1 {
            warn!(
                "Update gap: expected #{}, got #{}",
                self.last_seq + 1,
                unit.seq
            );
        }
        self.last_seq = unit.seq;

        let next = state::next_snapshot(&self.snapshot, &unit.event);
        if self.check_invariants {
            if let Err(e) = next.validate() {
                error!("Discarding update #{} ({}): {e}", unit.seq, unit.event.kind());
                return false;
            }
        }

        let changed = next.changed_fields(&self.snapshot);
        self.snapshot = Arc::new(next);
        trace!(
            "Applied update #{} ({}), {} fields changed",
            unit.seq,
            unit.event.kind(),
            changed.len()
        );

        let snapshot = Arc::clone(&self.snapshot);
        for field in changed {
            self.observers.notify(field, &snapshot);
        }
        true
    }

    pub fn snapshot(&self) -> Arc<PlaylistSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub const fn last_applied_seq(&self) -> u64 {
        self.last_seq
    }

    pub fn observers_mut(&mut self) -> &mut FieldObservers {
        &mut self.observers
    }

    pub const fn sort_key_title_list(&self) -> &'static [SortDescriptor] {
        self.sort_key_title_list
    }
}

/// Mirror of an engine playlist, owned by one thread.
///
/// Construct it on the owner thread and call [`Self::process_pending`] from
/// that thread's loop; observers run there too. Dropping the controller
/// detaches it from the engine before any state is released.
pub struct PlaylistController {
    engine: Arc<dyn PlaylistEngine>,
    listener: Option<ListenerId>,
    bridge: Arc<ListenerBridge>,
    dispatcher: Dispatcher,
    tick_limit: usize,
    d: PlaylistControllerPrivate,
}

impl PlaylistController {
    /// Register with `engine` and mirror its playlist.
    ///
    /// Fails if the engine refuses the listener: a controller without a
    /// listener could never stay consistent.
    pub fn new(engine: Arc<dyn PlaylistEngine>, config: ControllerConfig) -> Result<Self> {
        Self::with_dispatcher(engine, config, Dispatcher::new())
    }

    /// Like [`Self::new`], calling `waker` from the engine thread whenever an
    /// update is queued.
    pub fn with_waker(
        engine: Arc<dyn PlaylistEngine>,
        config: ControllerConfig,
        waker: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self> {
        Self::with_dispatcher(engine, config, Dispatcher::with_waker(waker))
    }

    fn with_dispatcher(
        engine: Arc<dyn PlaylistEngine>,
        config: ControllerConfig,
        dispatcher: Dispatcher,
    ) -> Result<Self> {
        let bridge = ListenerBridge::new(dispatcher.handle());
        let listener = engine
            .add_listener(bridge.clone(), config.notify_initial_state)
            .inspect_err(|e| error!("Playlist controller initialization failed: {e}"))?;
        info!("Playlist controller attached as {listener}");

        let mut controller = Self {
            engine,
            listener: Some(listener),
            bridge,
            dispatcher,
            tick_limit: config.tick_limit(),
            d: PlaylistControllerPrivate::new(config.check_invariants),
        };
        // Converge on any replayed state before the first read.
        controller.drain(usize::MAX);
        Ok(controller)
    }

    /// Apply queued updates, up to the configured per-tick limit.
    ///
    /// Returns the number of units applied.
    pub fn process_pending(&mut self) -> usize {
        self.drain(self.tick_limit)
    }

    fn drain(&mut self, limit: usize) -> usize {
        let mut applied = 0;
        while applied < limit {
            let Some(unit) = self.dispatcher.try_next() else {
                break;
            };
            if self.d.apply(unit) {
                applied += 1;
            }
        }
        if applied > 0 {
            debug!("Applied {applied} playlist updates");
        }
        applied
    }

    /// The update queue, for `select!` in an owner loop.
    pub const fn receiver(&self) -> &Receiver<UpdateUnit> {
        self.dispatcher.receiver()
    }

    pub fn pending(&self) -> usize {
        self.dispatcher.pending()
    }

    /// Detach from the engine and discard queued updates.
    ///
    /// Blocks until the engine confirms that no callback is running or will
    /// run. Later calls do nothing.
    pub fn shutdown(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        debug!("Detaching {listener}");
        self.bridge.detach();
        self.engine.remove_listener(listener);

        let discarded = self.dispatcher.close();
        info!(
            "Playlist controller detached ({discarded} pending updates discarded, {} late callbacks dropped)",
            self.bridge.dropped()
        );
    }

    pub const fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    /// Call `callback` on the owner thread whenever `field` changes.
    pub fn connect(
        &mut self,
        field: SnapshotField,
        callback: impl FnMut(&PlaylistSnapshot) + 'static,
    ) -> ObserverId {
        self.d.observers_mut().connect(field, callback)
    }

    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        self.d.observers_mut().disconnect(id)
    }

    /// The whole current state as one coherent value.
    pub fn snapshot(&self) -> Arc<PlaylistSnapshot> {
        self.d.snapshot()
    }

    pub const fn last_applied_seq(&self) -> u64 {
        self.d.last_applied_seq()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.d.snapshot.current_index()
    }

    pub fn current_item(&self) -> Option<&PlaylistItem> {
        self.d.snapshot.current_item()
    }

    pub fn has_next(&self) -> bool {
        self.d.snapshot.has_next()
    }

    pub fn has_prev(&self) -> bool {
        self.d.snapshot.has_prev()
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.d.snapshot.repeat_mode()
    }

    pub fn is_random(&self) -> bool {
        self.d.snapshot.is_random()
    }

    pub fn is_play_and_exit(&self) -> bool {
        self.d.snapshot.is_play_and_exit()
    }

    pub fn count(&self) -> usize {
        self.d.snapshot.count()
    }

    pub fn is_empty(&self) -> bool {
        self.d.snapshot.is_empty()
    }

    pub fn sort_key(&self) -> SortKey {
        self.d.snapshot.sort_key()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.d.snapshot.sort_order()
    }

    /// Sort keys offered to the user, as ordered `(key, label)` pairs.
    pub const fn sort_key_title_list(&self) -> &'static [SortDescriptor] {
        self.d.sort_key_title_list()
    }
}

impl Drop for PlaylistController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::testing::ManualEngine;
    use playsync_core::{
        ContentChange, CurrentEntry, CurrentUpdate, EngineEvent, Error, ItemMetadata,
    };
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn item(title: &str) -> PlaylistItem {
        PlaylistItem::new(ItemMetadata::new(title, format!("file:///{title}")))
    }

    fn inserted(index: usize, count: usize) -> EngineEvent {
        EngineEvent::ContentChanged {
            change: ContentChange::Inserted { index, count },
            current: CurrentUpdate::Unchanged,
        }
    }

    fn attached(engine: &Arc<ManualEngine>) -> PlaylistController {
        PlaylistController::new(engine.clone(), ControllerConfig::default()).unwrap()
    }

    #[test]
    fn test_registration_failure_is_fatal() {
        let engine = ManualEngine::refusing();
        let result = PlaylistController::new(engine, ControllerConfig::default());
        assert!(matches!(result, Err(Error::Registration(_))));
    }

    #[test]
    fn test_initial_state_is_applied_on_construction() {
        let current = item("b");
        let engine = ManualEngine::with_initial_state(vec![
            EngineEvent::ContentChanged {
                change: ContentChange::Reset { count: 3 },
                current: CurrentUpdate::Set(CurrentEntry::new(1, current.clone())),
            },
            EngineEvent::RepeatModeChanged(RepeatMode::All),
        ]);
        let controller = attached(&engine);

        assert_eq!(controller.count(), 3);
        assert_eq!(controller.current_index(), Some(1));
        assert_eq!(controller.current_item(), Some(&current));
        assert_eq!(controller.repeat_mode(), RepeatMode::All);
        assert!(controller.has_next() && controller.has_prev());
        assert_eq!(controller.last_applied_seq(), 2);
    }

    #[test]
    fn test_updates_wait_for_owner_tick() {
        let engine = ManualEngine::new();
        let mut controller = attached(&engine);

        engine.emit(inserted(0, 3));
        assert_eq!(controller.count(), 0);
        assert_eq!(controller.pending(), 1);

        assert_eq!(controller.process_pending(), 1);
        assert_eq!(controller.count(), 3);
        assert!(!controller.is_empty());
        assert_eq!(controller.current_index(), None);
    }

    #[test]
    fn test_tick_limit_bounds_work_per_call() {
        let engine = ManualEngine::new();
        let config = ControllerConfig {
            max_units_per_tick: 2,
            ..ControllerConfig::default()
        };
        let mut controller = PlaylistController::new(engine.clone(), config).unwrap();
        for _ in 0..5 {
            engine.emit(inserted(0, 1));
        }
        assert_eq!(controller.process_pending(), 2);
        assert_eq!(controller.process_pending(), 2);
        assert_eq!(controller.process_pending(), 1);
        assert_eq!(controller.count(), 5);
    }

    #[test]
    fn test_one_notification_per_changed_field() {
        let engine = ManualEngine::new();
        let mut controller = attached(&engine);
        let fired = Rc::new(RefCell::new(Vec::new()));

        for field in SnapshotField::ALL {
            let log = fired.clone();
            controller.connect(field, move |_| log.borrow_mut().push(field));
        }

        engine.emit(inserted(0, 3));
        controller.process_pending();
        assert_eq!(
            *fired.borrow(),
            vec![SnapshotField::Count, SnapshotField::Empty]
        );

        fired.borrow_mut().clear();
        engine.emit(EngineEvent::RandomChanged(false));
        controller.process_pending();
        assert!(fired.borrow().is_empty());

        engine.emit(EngineEvent::CurrentChanged(Some(CurrentEntry::new(0, item("a")))));
        controller.process_pending();
        assert_eq!(
            *fired.borrow(),
            vec![
                SnapshotField::CurrentIndex,
                SnapshotField::CurrentItem,
                SnapshotField::HasNext,
            ]
        );
    }

    #[test]
    fn test_observers_see_complete_snapshot() {
        let engine = ManualEngine::new();
        let mut controller = attached(&engine);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        controller.connect(SnapshotField::Empty, move |s| {
            log.borrow_mut().push((s.count(), s.is_empty()));
        });

        engine.emit(inserted(0, 2));
        engine.emit(EngineEvent::ContentChanged {
            change: ContentChange::Reset { count: 0 },
            current: CurrentUpdate::Cleared,
        });
        controller.process_pending();
        assert_eq!(*seen.borrow(), vec![(2, false), (0, true)]);
    }

    #[test]
    fn test_removal_of_current_scenario() {
        let engine = ManualEngine::new();
        let mut controller = attached(&engine);
        engine.emit(inserted(0, 5));
        engine.emit(EngineEvent::CurrentChanged(Some(CurrentEntry::new(2, item("c")))));
        controller.process_pending();
        assert!(controller.has_next() && controller.has_prev());

        engine.emit(EngineEvent::ContentChanged {
            change: ContentChange::Removed { index: 2, count: 1 },
            current: CurrentUpdate::Unchanged,
        });
        controller.process_pending();
        assert_eq!(controller.snapshot().current_index_or_sentinel(), -1);
        assert!(!controller.has_next());
        assert!(!controller.has_prev());
        assert_eq!(controller.count(), 4);
    }

    #[test]
    fn test_shutdown_is_idempotent_and_drops_late_callbacks() {
        let engine = ManualEngine::new();
        let mut controller = attached(&engine);
        engine.emit(inserted(0, 2));
        controller.process_pending();
        engine.emit(inserted(0, 1));

        controller.shutdown();
        let after_first = controller.snapshot();
        controller.shutdown();

        assert!(!controller.is_attached());
        assert_eq!(engine.removals(), 1);
        assert_eq!(engine.listener_count(), 0);

        engine.emit_late(EngineEvent::RandomChanged(true));
        assert_eq!(controller.process_pending(), 0);
        assert_eq!(controller.snapshot(), after_first);
        assert_eq!(controller.count(), 2);
    }

    #[test]
    fn test_drop_detaches_from_engine() {
        let engine = ManualEngine::new();
        let controller = attached(&engine);
        assert_eq!(engine.listener_count(), 1);
        drop(controller);
        assert_eq!(engine.listener_count(), 0);
        assert_eq!(engine.removals(), 1);
    }

    #[test]
    fn test_duplicate_sequence_is_dropped() {
        let mut d = PlaylistControllerPrivate::new(true);
        assert!(d.apply(UpdateUnit::new(1, inserted(0, 1))));
        assert!(!d.apply(UpdateUnit::new(1, inserted(0, 1))));
        assert_eq!(d.snapshot().count(), 1);
        assert!(d.apply(UpdateUnit::new(3, inserted(0, 1))));
        assert_eq!(d.last_applied_seq(), 3);
    }

    #[test]
    fn test_sort_key_title_list() {
        let engine = ManualEngine::new();
        let controller = attached(&engine);
        let list = controller.sort_key_title_list();
        assert_eq!(list.len(), 11);
        assert_eq!(list[0].key, SortKey::Title);
        assert_eq!(list[10].key, SortKey::Rating);
    }

    fn arb_event() -> impl Strategy<Value = EngineEvent> {
        let entry = (0usize..12).prop_map(|i| CurrentEntry::new(i, item("x")));
        let update = prop_oneof![
            Just(CurrentUpdate::Unchanged),
            Just(CurrentUpdate::Cleared),
            entry.clone().prop_map(CurrentUpdate::Set),
        ];
        let change = prop_oneof![
            (0usize..10).prop_map(|count| ContentChange::Reset { count }),
            (0usize..12, 0usize..4).prop_map(|(index, count)| ContentChange::Inserted { index, count }),
            (0usize..12, 0usize..4).prop_map(|(index, count)| ContentChange::Removed { index, count }),
            (0usize..12, 1usize..3, 0usize..12)
                .prop_map(|(index, count, target)| ContentChange::Moved { index, count, target }),
            (0usize..12, 0usize..3).prop_map(|(index, n)| ContentChange::Updated {
                index,
                items: (0..n).map(|_| item("y")).collect(),
            }),
        ];
        let sort_key = prop_oneof![
            Just(SortKey::None),
            Just(SortKey::Title),
            Just(SortKey::Artist),
            Just(SortKey::Rating),
        ];
        let sort_order = prop_oneof![Just(SortOrder::Ascending), Just(SortOrder::Descending)];
        prop_oneof![
            proptest::option::of(entry).prop_map(EngineEvent::CurrentChanged),
            prop_oneof![
                Just(RepeatMode::None),
                Just(RepeatMode::Current),
                Just(RepeatMode::All)
            ]
            .prop_map(EngineEvent::RepeatModeChanged),
            any::<bool>().prop_map(EngineEvent::RandomChanged),
            any::<bool>().prop_map(EngineEvent::PlayAndExitChanged),
            (sort_key, sort_order).prop_map(|(key, order)| EngineEvent::SortChanged { key, order }),
            (change, update).prop_map(|(change, current)| EngineEvent::ContentChanged { change, current }),
        ]
    }

    proptest! {
        #[test]
        fn test_invariants_hold_after_every_update(events in proptest::collection::vec(arb_event(), 1..64)) {
            let mut d = PlaylistControllerPrivate::new(true);
            for (n, event) in events.into_iter().enumerate() {
                prop_assert!(d.apply(UpdateUnit::new(n as u64 + 1, event)));
                let snapshot = d.snapshot();
                prop_assert!(snapshot.validate().is_ok());
                prop_assert_eq!(snapshot.is_empty(), snapshot.count() == 0);
                if snapshot.count() == 0 {
                    prop_assert_eq!(snapshot.current_index(), None);
                }
                if snapshot.current_index().is_none() {
                    prop_assert!(!snapshot.has_next() && !snapshot.has_prev());
                }
            }
        }

        #[test]
        fn test_repeat_all_navigation(count in 1usize..32, offset in 0usize..32) {
            let mut d = PlaylistControllerPrivate::new(true);
            let index = offset % count;
            d.apply(UpdateUnit::new(1, inserted(0, count)));
            d.apply(UpdateUnit::new(2, EngineEvent::RepeatModeChanged(RepeatMode::All)));
            d.apply(UpdateUnit::new(3, EngineEvent::CurrentChanged(Some(CurrentEntry::new(index, item("x"))))));
            prop_assert!(d.snapshot().has_next());

            d.apply(UpdateUnit::new(4, EngineEvent::RepeatModeChanged(RepeatMode::None)));
            prop_assert_eq!(d.snapshot().has_next(), index < count - 1);
        }
    }
}
