//! Error types for AtlasRow
//!
//! Provides a unified error type for all operations. Every variant is a
//! local validation or invariant failure; none of them is transient, so
//! callers should never retry on these.

use thiserror::Error;

/// Result type alias using AtlasError
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Unified error type for AtlasRow operations
#[derive(Debug, Error)]
pub enum AtlasError {
    // -------------------------------------------------------------------------
    // Write Validation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid write: {0}")]
    InvalidWrite(String),

    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    // -------------------------------------------------------------------------
    // History / Log Errors
    // -------------------------------------------------------------------------
    #[error("History corruption detected: {0}")]
    HistoryCorruption(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AtlasError {
    /// Shorthand for building an `InvalidWrite` from anything displayable
    pub(crate) fn invalid_write(msg: impl Into<String>) -> Self {
        AtlasError::InvalidWrite(msg.into())
    }

    /// Shorthand for building a `HistoryCorruption`
    pub(crate) fn corruption(msg: impl Into<String>) -> Self {
        AtlasError::HistoryCorruption(msg.into())
    }
}
