//! Engine-side playlist model: the ground truth mirrored by controllers.
//!
//! Every mutating method returns the events describing what changed, in the
//! order listeners must see them. An operation that changes nothing returns
//! no events.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use std::cmp::Ordering;

use playsync_core::{
    ContentChange, CurrentEntry, CurrentUpdate, EngineEvent, ItemMetadata, PlaylistItem,
    RepeatMode, SortKey, SortOrder,
};
use tracing::warn;

const RNG_SEED: u64 = 0x853c_49e6_748f_ea9b;

/// The playlist owned by the engine worker.
#[derive(Debug, Clone)]
pub struct Playlist {
    items: Vec<PlaylistItem>,
    current: Option<usize>,
    repeat_mode: RepeatMode,
    random: bool,
    play_and_exit: bool,
    sort_key: SortKey,
    sort_order: SortOrder,
    rng_state: u64,
}

impl Default for Playlist {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
            repeat_mode: RepeatMode::None,
            random: false,
            play_and_exit: false,
            sort_key: SortKey::None,
            sort_order: SortOrder::Ascending,
            rng_state: RNG_SEED,
        }
    }
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[PlaylistItem] {
        &self.items
    }

    pub const fn len(&self) -> usize {
        self.items.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub const fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<CurrentEntry> {
        self.current
            .and_then(|i| self.items.get(i).map(|item| CurrentEntry::new(i, item.clone())))
    }

    pub const fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub const fn is_random(&self) -> bool {
        self.random
    }

    /// Events replaying the whole state, for a newly registered listener.
    pub fn state_events(&self) -> Vec<EngineEvent> {
        vec![
            EngineEvent::ContentChanged {
                change: ContentChange::Reset {
                    count: self.items.len(),
                },
                current: self.current().into(),
            },
            EngineEvent::RepeatModeChanged(self.repeat_mode),
            EngineEvent::RandomChanged(self.random),
            EngineEvent::PlayAndExitChanged(self.play_and_exit),
            EngineEvent::SortChanged {
                key: self.sort_key,
                order: self.sort_order,
            },
        ]
    }

    /// Insert items at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, items: Vec<PlaylistItem>) -> Vec<EngineEvent> {
        if items.is_empty() {
            return Vec::new();
        }
        let index = index.min(self.items.len());
        let count = items.len();
        self.items.splice(index..index, items);

        let current = match self.current {
            Some(current) if index <= current => self.set_current(Some(current + count)),
            _ => CurrentUpdate::Unchanged,
        };

        vec![EngineEvent::ContentChanged {
            change: ContentChange::Inserted { index, count },
            current,
        }]
    }

    /// Append items at the end.
    pub fn append(&mut self, items: Vec<PlaylistItem>) -> Vec<EngineEvent> {
        self.insert(self.items.len(), items)
    }

    /// Remove up to `count` items starting at `index`.
    ///
    /// Removing the current item makes the item that takes its place current,
    /// or clears the current item if none does.
    pub fn remove(&mut self, index: usize, count: usize) -> Vec<EngineEvent> {
        if index >= self.items.len() || count == 0 {
            warn!("Ignoring removal of {count} items at {index}");
            return Vec::new();
        }
        let count = count.min(self.items.len() - index);
        self.items.drain(index..index + count);

        let current = match self.current {
            Some(current) if current >= index + count => self.set_current(Some(current - count)),
            Some(current) if current >= index => {
                let replacement = (index < self.items.len()).then_some(index);
                self.set_current(replacement)
            }
            _ => CurrentUpdate::Unchanged,
        };

        vec![EngineEvent::ContentChanged {
            change: ContentChange::Removed { index, count },
            current,
        }]
    }

    /// Move `count` items starting at `index` so that they start at `target`.
    pub fn move_items(&mut self, index: usize, count: usize, target: usize) -> Vec<EngineEvent> {
        let len = self.items.len();
        let past_end = |start: usize| start.checked_add(count).map_or(true, |end| end > len);
        if count == 0 || past_end(index) || past_end(target) || index == target {
            warn!("Ignoring move of {count} items from {index} to {target}");
            return Vec::new();
        }
        let moved: Vec<PlaylistItem> = self.items.drain(index..index + count).collect();
        self.items.splice(target..target, moved);

        let current = match self.current {
            Some(current) => {
                let moved_to = if (index..index + count).contains(&current) {
                    target + (current - index)
                } else {
                    let without = if current >= index + count {
                        current - count
                    } else {
                        current
                    };
                    if without >= target {
                        without + count
                    } else {
                        without
                    }
                };
                if moved_to == current {
                    CurrentUpdate::Unchanged
                } else {
                    self.set_current(Some(moved_to))
                }
            }
            None => CurrentUpdate::Unchanged,
        };

        vec![EngineEvent::ContentChanged {
            change: ContentChange::Moved {
                index,
                count,
                target,
            },
            current,
        }]
    }

    /// Remove everything.
    pub fn clear(&mut self) -> Vec<EngineEvent> {
        if self.items.is_empty() && self.current.is_none() {
            return Vec::new();
        }
        self.items.clear();
        self.current = None;
        vec![EngineEvent::ContentChanged {
            change: ContentChange::Reset { count: 0 },
            current: CurrentUpdate::Cleared,
        }]
    }

    /// Replace the metadata of the item at `index`, keeping its identity.
    pub fn update_item(&mut self, index: usize, metadata: ItemMetadata) -> Vec<EngineEvent> {
        let Some(existing) = self.items.get(index) else {
            warn!("Ignoring update of missing item {index}");
            return Vec::new();
        };
        let updated = existing.updated(metadata);
        self.items[index] = updated.clone();
        vec![EngineEvent::ContentChanged {
            change: ContentChange::Updated {
                index,
                items: vec![updated],
            },
            current: CurrentUpdate::Unchanged,
        }]
    }

    /// Jump to a specific index, or clear the current item with `None`.
    pub fn go_to(&mut self, index: Option<usize>) -> Vec<EngineEvent> {
        if index.is_some_and(|i| i >= self.items.len()) {
            warn!("Ignoring jump to out-of-range index {index:?}");
            return Vec::new();
        }
        if index == self.current {
            return Vec::new();
        }
        self.current = index;
        vec![EngineEvent::CurrentChanged(self.current())]
    }

    /// Move to the next item.
    #[allow(clippy::should_implement_trait)] // Not implementing Iterator
    pub fn next(&mut self) -> Vec<EngineEvent> {
        let target = if self.random {
            self.random_index()
        } else {
            self.next_sequential_index()
        };
        target.map_or_else(Vec::new, |index| self.go_to(Some(index)))
    }

    /// Move to the previous item.
    pub fn prev(&mut self) -> Vec<EngineEvent> {
        if self.current.is_none() {
            return Vec::new();
        }
        let target = if self.random {
            self.random_index()
        } else {
            self.prev_sequential_index()
        };
        target.map_or_else(Vec::new, |index| self.go_to(Some(index)))
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) -> Vec<EngineEvent> {
        if self.repeat_mode == mode {
            return Vec::new();
        }
        self.repeat_mode = mode;
        vec![EngineEvent::RepeatModeChanged(mode)]
    }

    pub fn set_random(&mut self, random: bool) -> Vec<EngineEvent> {
        if self.random == random {
            return Vec::new();
        }
        self.random = random;
        vec![EngineEvent::RandomChanged(random)]
    }

    pub fn set_play_and_exit(&mut self, play_and_exit: bool) -> Vec<EngineEvent> {
        if self.play_and_exit == play_and_exit {
            return Vec::new();
        }
        self.play_and_exit = play_and_exit;
        vec![EngineEvent::PlayAndExitChanged(play_and_exit)]
    }

    /// Stable sort by `key`; the current item keeps being current.
    pub fn sort(&mut self, key: SortKey, order: SortOrder) -> Vec<EngineEvent> {
        let current_id = self.current.and_then(|i| self.items.get(i)).map(PlaylistItem::id);

        self.items.sort_by(|a, b| {
            let ordering = compare(a, b, key);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
        self.sort_key = key;
        self.sort_order = order;
        self.current = current_id.and_then(|id| self.items.iter().position(|i| i.id() == id));

        vec![
            EngineEvent::SortChanged { key, order },
            EngineEvent::ContentChanged {
                change: ContentChange::Reset {
                    count: self.items.len(),
                },
                current: self.current().into(),
            },
        ]
    }

    fn set_current(&mut self, index: Option<usize>) -> CurrentUpdate {
        self.current = index;
        self.current().into()
    }

    fn next_sequential_index(&self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let Some(current) = self.current else {
            return Some(0);
        };

        match self.repeat_mode {
            RepeatMode::All => Some((current + 1) % self.items.len()),
            RepeatMode::None | RepeatMode::Current => {
                (current + 1 < self.items.len()).then_some(current + 1)
            }
        }
    }

    fn prev_sequential_index(&self) -> Option<usize> {
        let current = self.current?;

        match self.repeat_mode {
            RepeatMode::All => Some(if current == 0 {
                self.items.len() - 1
            } else {
                current - 1
            }),
            RepeatMode::None | RepeatMode::Current => current.checked_sub(1),
        }
    }

    /// Random index different from the current one, if another item exists.
    fn random_index(&mut self) -> Option<usize> {
        let len = self.items.len();
        let current = self.current;
        let candidates = if current.is_some() { len.checked_sub(1)? } else { len };
        if candidates == 0 {
            return None;
        }

        self.rng_state = self
            .rng_state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        let pick = ((self.rng_state >> 33) as usize) % candidates;

        Some(match current {
            Some(current) if pick >= current => pick + 1,
            _ => pick,
        })
    }
}

fn compare(a: &PlaylistItem, b: &PlaylistItem, key: SortKey) -> Ordering {
    let (a, b) = (a.metadata(), b.metadata());
    match key {
        SortKey::None => Ordering::Equal,
        SortKey::Title => a.title.cmp(&b.title),
        SortKey::Duration => a.duration.cmp(&b.duration),
        SortKey::Artist => a.artist.cmp(&b.artist),
        SortKey::Album => a.album.cmp(&b.album),
        SortKey::AlbumArtist => a.album_artist.cmp(&b.album_artist),
        SortKey::Genre => a.genre.cmp(&b.genre),
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::TrackNumber => a.track_number.cmp(&b.track_number),
        SortKey::DiscNumber => a.disc_number.cmp(&b.disc_number),
        SortKey::Url => a.url.cmp(&b.url),
        SortKey::Rating => a.rating.cmp(&b.rating),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_item(title: &str) -> PlaylistItem {
        PlaylistItem::new(ItemMetadata::new(title, format!("file:///{title}.ogg")))
    }

    fn filled(titles: &[&str]) -> Playlist {
        let mut playlist = Playlist::new();
        playlist.append(titles.iter().map(|t| make_item(t)).collect());
        playlist
    }

    fn titles(playlist: &Playlist) -> Vec<&str> {
        playlist.items().iter().map(PlaylistItem::title).collect()
    }

    #[test]
    fn test_append_does_not_select() {
        let mut playlist = Playlist::new();
        let events = playlist.append(vec![make_item("1"), make_item("2")]);
        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist.current_index(), None);
        assert_eq!(
            events,
            vec![EngineEvent::ContentChanged {
                change: ContentChange::Inserted { index: 0, count: 2 },
                current: CurrentUpdate::Unchanged,
            }]
        );
    }

    #[test]
    fn test_insert_before_current_shifts_it() {
        let mut playlist = filled(&["1", "2", "3"]);
        playlist.go_to(Some(1));
        let events = playlist.insert(0, vec![make_item("0")]);
        assert_eq!(playlist.current_index(), Some(2));
        let EngineEvent::ContentChanged { current, .. } = &events[0] else {
            panic!("expected content change");
        };
        assert!(matches!(current, CurrentUpdate::Set(entry) if entry.index == 2 && entry.item.title() == "2"));
    }

    #[test]
    fn test_next_and_repeat() {
        let mut playlist = filled(&["1", "2", "3"]);
        playlist.next();
        assert_eq!(playlist.current_index(), Some(0));
        playlist.next();
        playlist.next();
        assert_eq!(playlist.current_index(), Some(2));
        assert!(playlist.next().is_empty()); // No repeat

        playlist.set_repeat_mode(RepeatMode::All);
        playlist.next();
        assert_eq!(playlist.current_index(), Some(0)); // wraps around
        playlist.prev();
        assert_eq!(playlist.current_index(), Some(2));
    }

    #[test]
    fn test_remove_current_selects_successor() {
        let mut playlist = filled(&["1", "2", "3"]);
        playlist.go_to(Some(1));
        playlist.remove(1, 1);
        assert_eq!(titles(&playlist), vec!["1", "3"]);
        assert_eq!(playlist.current().unwrap().item.title(), "3");

        playlist.remove(1, 1);
        assert_eq!(playlist.current_index(), None);
    }

    #[test]
    fn test_remove_before_current_shifts_it() {
        let mut playlist = filled(&["1", "2", "3", "4"]);
        playlist.go_to(Some(3));
        playlist.remove(0, 2);
        assert_eq!(playlist.current_index(), Some(1));
        assert_eq!(playlist.current().unwrap().item.title(), "4");
    }

    #[test]
    fn test_move_tracks_current() {
        let mut playlist = filled(&["a", "b", "c", "d"]);
        playlist.go_to(Some(0));
        playlist.move_items(0, 1, 3);
        assert_eq!(titles(&playlist), vec!["b", "c", "d", "a"]);
        assert_eq!(playlist.current_index(), Some(3));

        playlist.go_to(Some(1));
        playlist.move_items(2, 2, 0);
        assert_eq!(titles(&playlist), vec!["d", "a", "b", "c"]);
        assert_eq!(playlist.current().unwrap().item.title(), "c");
    }

    #[test]
    fn test_out_of_range_move_is_ignored() {
        let mut playlist = filled(&["a"]);
        playlist.go_to(Some(0));
        assert!(playlist.move_items(usize::MAX, 1, 0).is_empty());
        assert!(playlist.move_items(0, usize::MAX, 0).is_empty());
        assert!(playlist.move_items(0, 1, usize::MAX).is_empty());
        assert_eq!(titles(&playlist), vec!["a"]);
        assert_eq!(playlist.current_index(), Some(0));
    }

    #[test]
    fn test_sort_keeps_current_item() {
        let mut playlist = filled(&["c", "a", "b"]);
        playlist.go_to(Some(0));
        let events = playlist.sort(SortKey::Title, SortOrder::Ascending);
        assert_eq!(titles(&playlist), vec!["a", "b", "c"]);
        assert_eq!(playlist.current_index(), Some(2));
        assert_eq!(
            events[0],
            EngineEvent::SortChanged {
                key: SortKey::Title,
                order: SortOrder::Ascending
            }
        );

        playlist.sort(SortKey::Title, SortOrder::Descending);
        assert_eq!(titles(&playlist), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_random_next_picks_another_item() {
        let mut playlist = filled(&["1", "2", "3", "4"]);
        playlist.set_random(true);
        playlist.go_to(Some(2));
        for _ in 0..20 {
            let before = playlist.current_index();
            playlist.next();
            assert_ne!(playlist.current_index(), before);
        }

        let mut single = filled(&["only"]);
        single.set_random(true);
        single.go_to(Some(0));
        assert!(single.next().is_empty());
    }

    #[test]
    fn test_unchanged_settings_emit_nothing() {
        let mut playlist = Playlist::new();
        assert!(playlist.set_random(false).is_empty());
        assert!(playlist.set_repeat_mode(RepeatMode::None).is_empty());
        assert!(playlist.clear().is_empty());
        assert_eq!(playlist.set_play_and_exit(true).len(), 1);
    }
}
