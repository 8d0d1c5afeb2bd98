//! Error types for the sluice crate.

use thiserror::Error;

/// Main error type for sluice operations.
///
/// Errors only arise from configuration loading and validation. The
/// admission path itself is infallible: rejection is an ordinary result,
/// not an error.
#[derive(Error, Debug)]
pub enum SluiceError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sluice operations.
pub type Result<T> = std::result::Result<T, SluiceError>;
