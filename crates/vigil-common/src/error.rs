//! Common error types for Vigil components.

use thiserror::Error;

/// Common errors across Vigil components
#[derive(Debug, Error)]
pub enum VigilError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed replay trace
    #[error("Trace error at line {line}: {message}")]
    Trace { line: usize, message: String },

    /// Engine runtime failure (closed channels, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias for Vigil operations
pub type Result<T> = std::result::Result<T, VigilError>;
