//! # playsync-engine
//!
//! An in-process playlist engine that owns the playlist truth on its own
//! worker thread and notifies registered listeners from that thread.
//!
//! Features:
//! - Command channel so callers never share the playlist with the worker
//! - Listener registration with optional replay of the current state
//! - Unregistration handshake: `remove_listener` returns once no callback
//!   for that listener can run again

pub mod config;
pub mod engine;
pub mod playlist;

pub use config::EngineConfig;
pub use engine::ThreadedEngine;
pub use playlist::Playlist;
