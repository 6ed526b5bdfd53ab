//! Snapshot of all observable playlist state at one instant.

use serde::{Deserialize, Serialize};

use super::PlaylistItem;
use crate::{Error, Result};

/// Repeat mode for playback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// No repeat.
    #[default]
    None,
    /// Repeat the current item.
    Current,
    /// Repeat the entire playlist.
    All,
}

/// Key the playlist is ordered by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Insertion order.
    #[default]
    None,
    Title,
    Duration,
    Artist,
    Album,
    AlbumArtist,
    Genre,
    Date,
    TrackNumber,
    DiscNumber,
    Url,
    Rating,
}

/// Direction of the ordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// The current position together with the item found there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentEntry {
    pub index: usize,
    pub item: PlaylistItem,
}

impl CurrentEntry {
    pub const fn new(index: usize, item: PlaylistItem) -> Self {
        Self { index, item }
    }
}

/// Computes `(has_next, has_prev)` from the authoritative fields.
///
/// Without a current item there is no relative navigation. Repeat-all always
/// permits moving. Random playback can move as long as another item exists.
/// Repeat-current only affects auto-advance, so it navigates like `None`.
pub const fn navigation(
    current: Option<usize>,
    count: usize,
    repeat: RepeatMode,
    random: bool,
) -> (bool, bool) {
    let Some(index) = current else {
        return (false, false);
    };
    if index >= count {
        return (false, false);
    }

    match repeat {
        RepeatMode::All => (true, true),
        _ if random => (count > 1, count > 1),
        _ => (index + 1 < count, index > 0),
    }
}

/// Observable fields of a [`PlaylistSnapshot`], one change channel each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SnapshotField {
    CurrentIndex,
    CurrentItem,
    HasNext,
    HasPrev,
    RepeatMode,
    Random,
    PlayAndExit,
    Count,
    Empty,
    SortKey,
    SortOrder,
}

impl SnapshotField {
    pub const ALL: [Self; 11] = [
        Self::CurrentIndex,
        Self::CurrentItem,
        Self::HasNext,
        Self::HasPrev,
        Self::RepeatMode,
        Self::Random,
        Self::PlayAndExit,
        Self::Count,
        Self::Empty,
        Self::SortKey,
        Self::SortOrder,
    ];
}

/// Immutable aggregate of the mirrored playlist state.
///
/// Every `with_*` constructor re-normalizes: a current entry outside
/// `0..count` is dropped and the derived fields (`has_next`, `has_prev`,
/// `empty`) are recomputed. Derived values are never taken from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSnapshot {
    current: Option<CurrentEntry>,
    count: usize,
    repeat_mode: RepeatMode,
    random: bool,
    play_and_exit: bool,
    sort_key: SortKey,
    sort_order: SortOrder,
    has_next: bool,
    has_prev: bool,
    empty: bool,
}

impl Default for PlaylistSnapshot {
    fn default() -> Self {
        Self {
            current: None,
            count: 0,
            repeat_mode: RepeatMode::None,
            random: false,
            play_and_exit: false,
            sort_key: SortKey::None,
            sort_order: SortOrder::Ascending,
            has_next: false,
            has_prev: false,
            empty: true,
        }
    }
}

impl PlaylistSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&CurrentEntry> {
        self.current.as_ref()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current.as_ref().map(|c| c.index)
    }

    /// Current index using `-1` for "no current item".
    pub fn current_index_or_sentinel(&self) -> i64 {
        self.current_index()
            .and_then(|i| i64::try_from(i).ok())
            .unwrap_or(-1)
    }

    pub fn current_item(&self) -> Option<&PlaylistItem> {
        self.current.as_ref().map(|c| &c.item)
    }

    pub const fn count(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.empty
    }

    pub const fn has_next(&self) -> bool {
        self.has_next
    }

    pub const fn has_prev(&self) -> bool {
        self.has_prev
    }

    pub const fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub const fn is_random(&self) -> bool {
        self.random
    }

    pub const fn is_play_and_exit(&self) -> bool {
        self.play_and_exit
    }

    pub const fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub const fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self.normalized()
    }

    #[must_use]
    pub fn with_current(mut self, current: Option<CurrentEntry>) -> Self {
        self.current = current;
        self.normalized()
    }

    #[must_use]
    pub fn with_repeat_mode(mut self, repeat_mode: RepeatMode) -> Self {
        self.repeat_mode = repeat_mode;
        self.normalized()
    }

    #[must_use]
    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self.normalized()
    }

    #[must_use]
    pub fn with_play_and_exit(mut self, play_and_exit: bool) -> Self {
        self.play_and_exit = play_and_exit;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_key = key;
        self.sort_order = order;
        self
    }

    fn normalized(mut self) -> Self {
        if self.current.as_ref().is_some_and(|c| c.index >= self.count) {
            self.current = None;
        }
        let (has_next, has_prev) = navigation(
            self.current_index(),
            self.count,
            self.repeat_mode,
            self.random,
        );
        self.has_next = has_next;
        self.has_prev = has_prev;
        self.empty = self.count == 0;
        self
    }

    /// Checks the snapshot invariants.
    pub fn validate(&self) -> Result<()> {
        if self.empty != (self.count == 0) {
            return Err(Error::InvariantViolation(format!(
                "empty={} but count={}",
                self.empty, self.count
            )));
        }
        if let Some(index) = self.current_index() {
            if index >= self.count {
                return Err(Error::InvariantViolation(format!(
                    "current index {index} out of range for count {}",
                    self.count
                )));
            }
        } else if self.has_next || self.has_prev {
            return Err(Error::InvariantViolation(
                "navigation flags set without a current item".to_string(),
            ));
        }
        let expected = navigation(
            self.current_index(),
            self.count,
            self.repeat_mode,
            self.random,
        );
        if (self.has_next, self.has_prev) != expected {
            return Err(Error::InvariantViolation(format!(
                "navigation flags {:?} differ from computed {expected:?}",
                (self.has_next, self.has_prev)
            )));
        }
        Ok(())
    }

    /// Whether `field` differs between `self` and `other`.
    pub fn field_differs(&self, other: &Self, field: SnapshotField) -> bool {
        match field {
            SnapshotField::CurrentIndex => self.current_index() != other.current_index(),
            SnapshotField::CurrentItem => self.current_item() != other.current_item(),
            SnapshotField::HasNext => self.has_next != other.has_next,
            SnapshotField::HasPrev => self.has_prev != other.has_prev,
            SnapshotField::RepeatMode => self.repeat_mode != other.repeat_mode,
            SnapshotField::Random => self.random != other.random,
            SnapshotField::PlayAndExit => self.play_and_exit != other.play_and_exit,
            SnapshotField::Count => self.count != other.count,
            SnapshotField::Empty => self.empty != other.empty,
            SnapshotField::SortKey => self.sort_key != other.sort_key,
            SnapshotField::SortOrder => self.sort_order != other.sort_order,
        }
    }

    /// Fields that changed from `previous` to `self`, in declaration order.
    pub fn changed_fields(&self, previous: &Self) -> Vec<SnapshotField> {
        SnapshotField::ALL
            .into_iter()
            .filter(|&field| self.field_differs(previous, field))
            .collect()
    }
}
