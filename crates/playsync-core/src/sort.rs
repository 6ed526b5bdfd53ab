//! Sort-key catalog: the keys a playlist can be ordered by, with labels.

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::debug;

use crate::SortKey;

/// One entry of the sort-key catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortDescriptor {
    pub key: SortKey,
    pub title: String,
}

/// Keys offered to the user, in display order, with untranslated labels.
const SORT_KEYS: [(SortKey, &str); 11] = [
    (SortKey::Title, "Title"),
    (SortKey::Duration, "Duration"),
    (SortKey::Artist, "Artist"),
    (SortKey::Album, "Album"),
    (SortKey::AlbumArtist, "Album Artist"),
    (SortKey::Genre, "Genre"),
    (SortKey::Date, "Date"),
    (SortKey::TrackNumber, "Track Number"),
    (SortKey::DiscNumber, "Disc Number"),
    (SortKey::Url, "URL"),
    (SortKey::Rating, "Rating"),
];

static CATALOG: OnceCell<Vec<SortDescriptor>> = OnceCell::new();

fn build(translate: impl Fn(&'static str) -> String) -> Vec<SortDescriptor> {
    SORT_KEYS
        .iter()
        .map(|&(key, label)| SortDescriptor {
            key,
            title: translate(label),
        })
        .collect()
}

/// Initializes the catalog, passing each label through `translate`.
///
/// Only the first initialization takes effect. Returns whether this call did it.
pub fn init_catalog(translate: impl Fn(&'static str) -> String) -> bool {
    let mut initialized = false;
    CATALOG.get_or_init(|| {
        initialized = true;
        build(translate)
    });
    if initialized {
        debug!("Sort-key catalog initialized");
    }
    initialized
}

/// The catalog as ordered `(key, label)` pairs.
///
/// Falls back to untranslated labels if [`init_catalog`] was never called.
pub fn catalog() -> &'static [SortDescriptor] {
    CATALOG.get_or_init(|| build(str::to_string))
}

/// Label for a single key, if it is offered in the catalog.
pub fn title_of(key: SortKey) -> Option<&'static str> {
    catalog()
        .iter()
        .find(|d| d.key == key)
        .map(|d| d.title.as_str())
}
