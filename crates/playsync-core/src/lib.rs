//! # playsync-core
//!
//! Core types, traits, and error handling shared by the playlist engine and
//! the controller that mirrors it onto an owner thread.

pub mod config;
pub mod error;
pub mod listener;
pub mod sort;
pub mod types;

pub use error::{Error, Result};
pub use listener::{EngineListener, ListenerId, PlaylistEngine};
pub use sort::SortDescriptor;
pub use types::*;
