use crate::container::ContainerError;

/// Errors that can occur during reading
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// Error from the underlying container
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Index outside `[0, size)`
    #[error("Index {index} out of range for {size} items")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of items
        size: usize,
    },

    /// Decoding a spectrum failed
    #[error("Failed to read spectrum {index}: {source}")]
    SpectrumFetch {
        /// Global index of the spectrum
        index: usize,
        /// Underlying failure
        #[source]
        source: ContainerError,
    },

    /// Decoding a chromatogram failed
    #[error("Failed to read chromatogram {index}: {source}")]
    ChromatogramFetch {
        /// Index of the chromatogram
        index: usize,
        /// Underlying failure
        #[source]
        source: ContainerError,
    },

    /// Index tables of a cluster contradict each other
    #[error("Corrupt index in cluster {cluster_id}: {reason}")]
    CorruptIndex {
        /// Cluster holding the inconsistent tables
        cluster_id: i32,
        /// Which invariant is violated
        reason: String,
    },
}

impl ReaderError {
    pub(super) fn corrupt(cluster_id: i32, reason: impl Into<String>) -> Self {
        ReaderError::CorruptIndex {
            cluster_id,
            reason: reason.into(),
        }
    }
}
