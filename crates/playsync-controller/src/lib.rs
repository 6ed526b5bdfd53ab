//! # playsync-controller
//!
//! Mirrors the state of a playlist engine, which notifies from its own
//! thread, into a snapshot read and observed on a single owner thread.
//!
//! Data flow: engine callback, [`ListenerBridge`], [`Dispatcher`] queue,
//! then [`PlaylistController::process_pending`] on the owner thread, which
//! applies each unit atomically and fires one notification per changed field.

pub mod bridge;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod observers;
pub mod state;

#[cfg(test)]
mod testing;

pub use bridge::ListenerBridge;
pub use config::ControllerConfig;
pub use controller::{PlaylistController, PlaylistControllerPrivate};
pub use dispatcher::{DispatchHandle, Dispatcher};
pub use observers::{FieldObservers, ObserverId};
