//! Pure snapshot transitions: previous snapshot + one event = next snapshot.
//!
//! The controller mirrors the engine and never guesses. Without an explicit
//! current entry from the engine, the mirrored index is kept when it is still
//! in range and was not removed, and cleared otherwise. Positions that no
//! longer exist (stale updates) are invalidated, never reported as errors.

use playsync_core::{
    ContentChange, CurrentEntry, CurrentUpdate, EngineEvent, PlaylistItem, PlaylistSnapshot,
};
use tracing::debug;

/// Compute the snapshot that results from applying `event` to `previous`.
pub fn next_snapshot(previous: &PlaylistSnapshot, event: &EngineEvent) -> PlaylistSnapshot {
    let base = previous.clone();
    match event {
        EngineEvent::CurrentChanged(current) => {
            let count = base.count();
            base.with_current(in_range(current.clone(), count))
        }
        EngineEvent::RepeatModeChanged(mode) => base.with_repeat_mode(*mode),
        EngineEvent::RandomChanged(random) => base.with_random(*random),
        EngineEvent::PlayAndExitChanged(value) => base.with_play_and_exit(*value),
        EngineEvent::SortChanged { key, order } => base.with_sort(*key, *order),
        EngineEvent::ContentChanged { change, current } => apply_content(base, change, current),
    }
}

/// Fold a sequence of events over `initial`.
pub fn replay<'a>(
    initial: PlaylistSnapshot,
    events: impl IntoIterator<Item = &'a EngineEvent>,
) -> PlaylistSnapshot {
    events
        .into_iter()
        .fold(initial, |snapshot, event| next_snapshot(&snapshot, event))
}

fn apply_content(
    snapshot: PlaylistSnapshot,
    change: &ContentChange,
    update: &CurrentUpdate,
) -> PlaylistSnapshot {
    let count = snapshot.count();
    let kept = snapshot.current().cloned();

    let (new_count, kept) = match change {
        ContentChange::Reset { count } => (*count, None),
        ContentChange::Inserted { count: added, .. } => (count.saturating_add(*added), kept),
        ContentChange::Removed {
            index,
            count: removed,
        } => {
            let removed = (*removed).min(count.saturating_sub(*index));
            if removed == 0 {
                debug!("Stale removal at {index} ignored (count {count})");
            }
            let range = *index..index.saturating_add(removed);
            let kept = kept.filter(|entry| !range.contains(&entry.index));
            (count - removed, kept)
        }
        ContentChange::Moved { .. } => (count, kept),
        ContentChange::Updated { index, items } => {
            (count, kept.map(|entry| refreshed(entry, *index, items)))
        }
    };

    let current = match update {
        CurrentUpdate::Unchanged => kept,
        CurrentUpdate::Cleared => None,
        CurrentUpdate::Set(entry) => Some(entry.clone()),
    };

    snapshot
        .with_count(new_count)
        .with_current(in_range(current, new_count))
}

/// Replace the current item by its refreshed version when it was updated.
fn refreshed(entry: CurrentEntry, index: usize, items: &[PlaylistItem]) -> CurrentEntry {
    let fresh = entry
        .index
        .checked_sub(index)
        .and_then(|offset| items.get(offset))
        .filter(|item| item.id() == entry.item.id());
    match fresh {
        Some(item) => CurrentEntry::new(entry.index, item.clone()),
        None => entry,
    }
}

fn in_range(current: Option<CurrentEntry>, count: usize) -> Option<CurrentEntry> {
    match current {
        Some(entry) if entry.index >= count => {
            debug!(
                "Stale current index {} dropped (count {count})",
                entry.index
            );
            None
        }
        other => other,
    }
}
