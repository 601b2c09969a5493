//! Strict error handling with the EngineError enum
//!
//! All errors are serializable so a host shell (tray app, IPC bridge) can
//! forward them to a frontend unchanged.

use serde::Serialize;
use thiserror::Error;

/// Engine operation errors
///
/// None of these are fatal to the engine: pasteboard failures are treated as
/// "no content this tick", persist failures leave in-memory state
/// authoritative, and load failures reset the affected store to empty.
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum EngineError {
    /// Pasteboard read/write error
    #[error("Pasteboard error: {0}")]
    Pasteboard(String),

    /// Durable storage error (database open, read, write)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

// Helper type alias for engine results
pub type EngineResult<T> = Result<T, EngineError>;
