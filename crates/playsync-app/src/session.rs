//! Scripted user session issuing commands to the engine.

use std::thread;
use std::time::Duration;

use playsync_core::{
    Duration as ItemDuration, ItemMetadata, PlaylistItem, RepeatMode, Result, SortKey, SortOrder,
};
use playsync_engine::ThreadedEngine;
use tracing::info;

const STEP_DELAY: Duration = Duration::from_millis(40);

type Step = fn(&ThreadedEngine) -> Result<()>;

fn demo_items() -> Vec<PlaylistItem> {
    [
        ("Teardrop", "Massive Attack", "Mezzanine", 330),
        ("Angel", "Massive Attack", "Mezzanine", 379),
        ("Roads", "Portishead", "Dummy", 305),
        ("Glory Box", "Portishead", "Dummy", 306),
        ("Hymn of the Big Wheel", "Massive Attack", "Blue Lines", 396),
    ]
    .into_iter()
    .enumerate()
    .map(|(n, (title, artist, album, secs))| {
        PlaylistItem::new(
            ItemMetadata::new(title, format!("file:///music/{album}/{title}.flac"))
                .with_artist(artist)
                .with_album(album)
                .with_track_number(n as u32 + 1)
                .with_duration(ItemDuration::from_seconds(secs)),
        )
    })
    .collect()
}

/// Run a short session against `engine`, pausing between steps.
pub fn run(engine: &ThreadedEngine) -> Result<()> {
    let steps: [(&str, Step); 11] = [
        ("append", |e| e.append(demo_items())),
        ("play first", |e| e.go_to(Some(0))),
        ("next", ThreadedEngine::next),
        ("repeat all", |e| e.set_repeat_mode(RepeatMode::All)),
        ("sort by artist", |e| e.sort(SortKey::Artist, SortOrder::Ascending)),
        ("remove current", |e| e.remove(1, 1)),
        ("move first to end", |e| e.move_items(0, 1, 3)),
        ("shuffle", |e| e.set_random(true)),
        ("next", ThreadedEngine::next),
        ("play and exit", |e| e.set_play_and_exit(true)),
        ("clear", ThreadedEngine::clear),
    ];

    for (name, step) in steps {
        info!("Session step: {name}");
        step(engine)?;
        thread::sleep(STEP_DELAY);
    }
    engine.flush()
}
