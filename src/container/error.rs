use std::path::PathBuf;

use crate::config::{ConfigurationError, DatasetKind};

/// Errors raised by container I/O
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Layout lookup failed
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The file is not a triMS5 container, or its version is incompatible
    #[error("Format mismatch: {0}")]
    FormatMismatch(String),

    /// The file, a group, or a required dataset does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The file or dataset already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A range exceeds the number of elements in a dataset
    #[error("Range [{start}, {end}) out of bounds for {kind} of cluster {cluster_id} with {count} elements")]
    OutOfRange {
        /// Dataset being read
        kind: DatasetKind,
        /// Cluster of the dataset
        cluster_id: i32,
        /// Requested start
        start: u64,
        /// Requested end (exclusive)
        end: u64,
        /// Number of elements in the dataset
        count: u64,
    },

    /// The container was not finalized; its writer was cancelled or failed
    #[error("Incomplete write: {0} has no FileInformation record")]
    IncompleteWrite(PathBuf),

    /// A write was attempted on a container opened read-only
    #[error("Container is open read-only")]
    ReadOnly,

    /// The container was already closed
    #[error("Container is closed")]
    Closed,

    /// Column not found
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Invalid dataset contents
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A table grew past what its integer handles can address
    #[error("{table} holds {len} entries, more than its handles can address")]
    HandleOverflow {
        /// Table or arena that overflowed
        table: &'static str,
        /// Number of entries
        len: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
