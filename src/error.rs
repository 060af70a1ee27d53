//! Error types for tiptrie

use thiserror::Error;

/// Result type alias for tiptrie operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tiptrie operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A strict path lookup hit a segment that is not a child at that depth
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("No best tip reported by {0}")]
    NoBestTip(String),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Config error: {0}")]
    Config(String),
}
