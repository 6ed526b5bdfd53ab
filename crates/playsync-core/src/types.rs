//! Core domain types for playsync.

pub mod common;
pub mod event;
pub mod item;
pub mod snapshot;

pub use common::Duration;
pub use event::{ContentChange, CurrentUpdate, EngineEvent, UpdateUnit};
pub use item::{ItemId, ItemMetadata, PlaylistItem};
pub use snapshot::{
    navigation, CurrentEntry, PlaylistSnapshot, RepeatMode, SnapshotField, SortKey, SortOrder,
};
