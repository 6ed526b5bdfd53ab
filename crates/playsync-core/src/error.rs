//! Error types for playsync.

use thiserror::Error;

/// Result type alias using playsync's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for playsync.
#[derive(Error, Debug)]
pub enum Error {
    // Engine errors
    #[error("Listener registration failed: {0}")]
    Registration(String),

    #[error("Playlist engine unavailable: {0}")]
    EngineUnavailable(String),

    // State errors
    #[error("Snapshot invariant violated: {0}")]
    InvariantViolation(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
