//! Error types for carrent-binio
//!
//! Provides a unified error type for the table engine and the rental layer.

use std::io;

use thiserror::Error;

/// Result type alias using BinioError
pub type Result<T> = std::result::Result<T, BinioError>;

/// Unified error type for table and application operations
#[derive(Debug, Error)]
pub enum BinioError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Format Errors (fatal for the file, never partially recovered)
    // -------------------------------------------------------------------------
    #[error("Format error: {0}")]
    Format(String),

    // -------------------------------------------------------------------------
    // Index Errors
    // -------------------------------------------------------------------------
    #[error("Duplicate key: {0}")]
    DuplicateKey(u32),

    #[error("Index full: all {capacity} slots are occupied")]
    IndexFull { capacity: u32 },

    #[error("Key not found: {0}")]
    NotFound(u32),

    /// Key 0 and the tombstone value can never be stored as live keys
    #[error("Reserved key: {0}")]
    ReservedKey(u32),

    // -------------------------------------------------------------------------
    // Application Errors
    // -------------------------------------------------------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BinioError {
    /// Map a short read to a format error; other I/O failures pass through.
    ///
    /// `what` names the region being read ("header", "index slot 7", ...).
    pub(crate) fn from_read(err: io::Error, what: &str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            BinioError::Format(format!("truncated {}", what))
        } else {
            BinioError::Io(err)
        }
    }
}
