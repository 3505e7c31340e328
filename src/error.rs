//! This module defines the single, unified error type for the entire litepack
//! library. It uses the `thiserror` crate to provide ergonomic, context-aware
//! error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, LitepackError>;

#[derive(Error, Debug)]
pub enum LitepackError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    #[error("no database found at {0}")]
    SourceNotFound(PathBuf),

    /// The `zstd_dicts` table exists but holds no rows. A store that
    /// advertises dictionary compression without a dictionary cannot be
    /// decoded; falling back to plain decoding would be wrong.
    #[error("zstd_dicts table is present but contains no dictionary")]
    MissingDictionaryData,

    #[error("cannot train a dictionary: the entries table has no content rows")]
    InsufficientSampleData,

    #[error("content payload is not valid for the detected codec: {0}")]
    CorruptPayload(String),

    #[error("destination schema is incompatible: {0}")]
    SchemaMismatch(String),

    #[error("dictionary training failed: {0}")]
    DictTraining(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the SQLite engine or its client library.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
