//! Error types for ss33-core
//!
//! Every operation in the workspace reports failures through this enum.
//! Each variant maps to a stable CLI exit code.

use thiserror::Error;

/// Result type alias for ss33 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ss33 operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing storage configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key absent from the bucket
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network, authentication or protocol failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local filesystem failure
    #[error("Local IO error: {0}")]
    LocalIo(#[from] std::io::Error),

    /// Key rejected before any request was made
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Transferred byte count differs from the source size
    #[error("Size mismatch for '{key}': expected {expected} bytes, transferred {actual}")]
    SizeMismatch {
        key: String,
        expected: u64,
        actual: u64,
    },
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::InvalidKey(_) => 2, // UsageError
            Error::Transport(_) => 3,                     // TransportError
            Error::NotFound(_) => 5,                      // NotFound
            Error::SizeMismatch { .. } => 6,              // PartialFailure
            Error::LocalIo(_) => 1,                       // GeneralError
        }
    }

    /// Whether this error reports an absent key
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
