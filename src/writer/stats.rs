use std::fmt;

/// Statistics from a completed write operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Number of spectra written to the file
    pub spectra_written: usize,
    /// Number of clusters the spectra were partitioned into
    pub clusters: usize,
    /// Total number of raw samples across all clusters
    pub raw_data_points: u64,
    /// Number of chromatograms written
    pub chromatograms_written: usize,
    /// Total file size in bytes
    pub file_size_bytes: u64,
}

impl fmt::Display for WriterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} spectra ({} raw data points) in {} clusters and {} chromatograms, {} bytes",
            self.spectra_written,
            self.raw_data_points,
            self.clusters,
            self.chromatograms_written,
            self.file_size_bytes
        )
    }
}
