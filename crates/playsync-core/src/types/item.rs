//! Playlist item: one playable entry.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Duration;

/// Opaque identifier of a playlist item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display metadata of a playlist item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemMetadata {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    /// Release date as reported by the media, usually a year.
    pub date: Option<String>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub url: String,
    /// Rating in the 0..=5 range.
    pub rating: Option<u8>,
    pub duration: Duration,
}

impl ItemMetadata {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub const fn with_track_number(mut self, track_number: u32) -> Self {
        self.track_number = Some(track_number);
        self
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ItemInner {
    id: ItemId,
    metadata: ItemMetadata,
}

/// An immutable playlist entry.
///
/// Cloning is cheap: the engine and every snapshot holding the item share the
/// same allocation.
#[derive(Debug, Clone)]
pub struct PlaylistItem(Arc<ItemInner>);

impl PlaylistItem {
    pub fn new(metadata: ItemMetadata) -> Self {
        Self::with_id(ItemId::new(), metadata)
    }

    pub fn with_id(id: ItemId, metadata: ItemMetadata) -> Self {
        Self(Arc::new(ItemInner { id, metadata }))
    }

    pub fn id(&self) -> ItemId {
        self.0.id
    }

    pub fn metadata(&self) -> &ItemMetadata {
        &self.0.metadata
    }

    pub fn title(&self) -> &str {
        &self.0.metadata.title
    }

    pub fn artist(&self) -> Option<&str> {
        self.0.metadata.artist.as_deref()
    }

    pub fn album(&self) -> Option<&str> {
        self.0.metadata.album.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.0.metadata.url
    }

    pub fn duration(&self) -> Duration {
        self.0.metadata.duration
    }

    /// Returns a new item with the same id and refreshed metadata.
    #[must_use]
    pub fn updated(&self, metadata: ItemMetadata) -> Self {
        Self::with_id(self.0.id, metadata)
    }
}

impl PartialEq for PlaylistItem {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for PlaylistItem {}
