use crate::config::ConfigurationError;
use crate::container::ContainerError;
use crate::model::SourceError;

/// Errors that can occur during writing
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// Error from the underlying container
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Error resolving a dataset or group kind
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The spectrum or chromatogram source failed
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// A spectrum or chromatogram cannot be stored as given
    #[error("Invalid data at index {index}: {reason}")]
    InvalidData {
        /// Index of the offending item in its source
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Writing was cancelled. The container is left without its version
    /// record and will not open.
    #[error("Write cancelled after {spectra_written} spectra")]
    Cancelled {
        /// Spectra stored before the cancellation was observed
        spectra_written: usize,
    },

    /// I/O error outside the container, e.g. reading the final file size
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
