//! # playsync
//!
//! Runs the threaded playlist engine, mirrors it on the main thread through a
//! `PlaylistController`, and logs every field change a UI would bind to.

mod config;
mod session;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config::AppConfig;
use crossbeam_channel::{bounded, select, tick};
use playsync_controller::PlaylistController;
use playsync_core::{sort, PlaylistSnapshot, SnapshotField};
use playsync_engine::ThreadedEngine;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn describe(field: SnapshotField, snapshot: &PlaylistSnapshot) -> String {
    match field {
        SnapshotField::CurrentIndex => format!("{}", snapshot.current_index_or_sentinel()),
        SnapshotField::CurrentItem => snapshot.current_item().map_or_else(
            || "<none>".to_string(),
            |item| format!("{} ({})", item.title(), item.duration().format()),
        ),
        SnapshotField::HasNext => snapshot.has_next().to_string(),
        SnapshotField::HasPrev => snapshot.has_prev().to_string(),
        SnapshotField::RepeatMode => format!("{:?}", snapshot.repeat_mode()),
        SnapshotField::Random => snapshot.is_random().to_string(),
        SnapshotField::PlayAndExit => snapshot.is_play_and_exit().to_string(),
        SnapshotField::Count => snapshot.count().to_string(),
        SnapshotField::Empty => snapshot.is_empty().to_string(),
        SnapshotField::SortKey => sort::title_of(snapshot.sort_key())
            .unwrap_or("None")
            .to_string(),
        SnapshotField::SortOrder => format!("{:?}", snapshot.sort_order()),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playsync=info,playsync_controller=debug".into()),
        )
        .init();

    info!("Starting playsync v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("Failed to load configuration")?;
    sort::init_catalog(str::to_string);

    let engine = Arc::new(ThreadedEngine::new(config.engine.clone())?);

    // Wake the owner loop when an update is queued; a pending wake is enough.
    let (wake_tx, wake_rx) = bounded::<()>(1);
    let mut controller =
        PlaylistController::with_waker(engine.clone(), config.controller.clone(), move || {
            let _ = wake_tx.try_send(());
        })
        .context("Failed to attach playlist controller")?;

    for field in SnapshotField::ALL {
        controller.connect(field, move |snapshot| {
            info!("{field:?} -> {}", describe(field, snapshot));
        });
    }

    let (done_tx, done_rx) = bounded::<playsync_core::Result<()>>(1);
    let session_engine = engine.clone();
    let session = std::thread::Builder::new()
        .name("session".to_string())
        .spawn(move || {
            let _ = done_tx.send(session::run(&session_engine));
        })
        .context("Failed to spawn session thread")?;

    let ticker = tick(Duration::from_millis(config.tick_ms.max(1)));
    let outcome = loop {
        select! {
            recv(wake_rx) -> _ => {}
            recv(ticker) -> _ => {}
            recv(done_rx) -> result => break result.unwrap_or(Ok(())),
        }
        controller.process_pending();
    };
    controller.process_pending();

    let snapshot = controller.snapshot();
    info!(
        "Session finished: {} items, current {}",
        snapshot.count(),
        snapshot.current_index_or_sentinel()
    );

    controller.shutdown();
    if session.join().is_err() {
        error!("Session thread panicked");
    }
    engine.shutdown();

    outcome.context("Session failed")
}
