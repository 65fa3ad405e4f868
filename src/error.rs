//! Error types for MiniKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using MiniKvError
pub type Result<T> = std::result::Result<T, MiniKvError>;

/// Unified error type for MiniKV operations
#[derive(Debug, Error)]
pub enum MiniKvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("corruption detected: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("illegal state: {0}")]
    IllegalState(String),
}
