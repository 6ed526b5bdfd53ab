//! Engine events and the update units that carry them across threads.

use super::{CurrentEntry, PlaylistItem, RepeatMode, SortKey, SortOrder};

/// How the playlist content changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentChange {
    /// The whole content was replaced; `count` is the new total.
    Reset { count: usize },
    /// `count` items were inserted at `index`.
    Inserted { index: usize, count: usize },
    /// `count` items starting at `index` were removed.
    Removed { index: usize, count: usize },
    /// `count` items starting at `index` were moved so they now start at `target`.
    Moved {
        index: usize,
        count: usize,
        target: usize,
    },
    /// Metadata of the items starting at `index` was refreshed.
    Updated {
        index: usize,
        items: Vec<PlaylistItem>,
    },
}

/// What the engine says about the current position alongside a content change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CurrentUpdate {
    /// Nothing supplied; the mirror keeps or invalidates its own index.
    #[default]
    Unchanged,
    /// The engine no longer has a current item.
    Cleared,
    /// The engine's current entry after the change.
    Set(CurrentEntry),
}

impl From<Option<CurrentEntry>> for CurrentUpdate {
    fn from(current: Option<CurrentEntry>) -> Self {
        current.map_or(Self::Cleared, Self::Set)
    }
}

/// The closed set of notifications a playlist engine emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    CurrentChanged(Option<CurrentEntry>),
    RepeatModeChanged(RepeatMode),
    RandomChanged(bool),
    PlayAndExitChanged(bool),
    ContentChanged {
        change: ContentChange,
        current: CurrentUpdate,
    },
    SortChanged {
        key: SortKey,
        order: SortOrder,
    },
}

impl EngineEvent {
    /// Short name for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CurrentChanged(_) => "current-changed",
            Self::RepeatModeChanged(_) => "repeat-mode-changed",
            Self::RandomChanged(_) => "random-changed",
            Self::PlayAndExitChanged(_) => "play-and-exit-changed",
            Self::ContentChanged { .. } => "content-changed",
            Self::SortChanged { .. } => "sort-changed",
        }
    }
}

/// One engine event tagged with its admission sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUnit {
    pub seq: u64,
    pub event: EngineEvent,
}

impl UpdateUnit {
    pub const fn new(seq: u64, event: EngineEvent) -> Self {
        Self { seq, event }
    }
}
