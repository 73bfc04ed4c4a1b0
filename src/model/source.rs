//! Boundary abstractions between this crate and the rest of a processing
//! pipeline.
//!
//! The writer consumes, and the reader produces, ordered spectrum and
//! chromatogram sources. Nothing outside the crate touches the physical
//! layout of a container.

use super::chromatogram::Chromatogram;
use super::run::MsRun;
use super::spectrum::Spectrum;

/// Errors produced by a spectrum or chromatogram source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Index outside `[0, len())`
    #[error("Index {index} out of range for source of length {size}")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Source length
        size: usize,
    },

    /// The source failed to produce the item
    #[error("Failed to fetch item {index}: {source}")]
    Fetch {
        /// Requested index
        index: usize,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// An ordered, random-access list of spectra
pub trait SpectrumSource {
    /// Number of spectra
    fn len(&self) -> usize;

    /// Whether the source holds no spectra
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spectrum at `index`. Arrays are only attached when `include_binary`.
    fn spectrum(&self, index: usize, include_binary: bool) -> Result<Spectrum, SourceError>;
}

/// An ordered, random-access list of chromatograms
pub trait ChromatogramSource {
    /// Number of chromatograms
    fn len(&self) -> usize;

    /// Whether the source holds no chromatograms
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Chromatogram at `index`. Arrays are only attached when `include_binary`.
    fn chromatogram(&self, index: usize, include_binary: bool) -> Result<Chromatogram, SourceError>;
}

impl SpectrumSource for [Spectrum] {
    fn len(&self) -> usize {
        <[Spectrum]>::len(self)
    }

    fn spectrum(&self, index: usize, include_binary: bool) -> Result<Spectrum, SourceError> {
        let spectrum = self.get(index).ok_or(SourceError::OutOfRange {
            index,
            size: <[Spectrum]>::len(self),
        })?;
        if include_binary {
            return Ok(spectrum.clone());
        }
        Ok(Spectrum {
            mz: None,
            intensity: None,
            ..spectrum.clone()
        })
    }
}

impl SpectrumSource for Vec<Spectrum> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn spectrum(&self, index: usize, include_binary: bool) -> Result<Spectrum, SourceError> {
        self.as_slice().spectrum(index, include_binary)
    }
}

impl ChromatogramSource for [Chromatogram] {
    fn len(&self) -> usize {
        <[Chromatogram]>::len(self)
    }

    fn chromatogram(&self, index: usize, include_binary: bool) -> Result<Chromatogram, SourceError> {
        let chromatogram = self.get(index).ok_or(SourceError::OutOfRange {
            index,
            size: <[Chromatogram]>::len(self),
        })?;
        if include_binary {
            return Ok(chromatogram.clone());
        }
        Ok(Chromatogram {
            time: None,
            intensity: None,
            ..chromatogram.clone()
        })
    }
}

impl ChromatogramSource for Vec<Chromatogram> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn chromatogram(&self, index: usize, include_binary: bool) -> Result<Chromatogram, SourceError> {
        self.as_slice().chromatogram(index, include_binary)
    }
}

impl SpectrumSource for MsRun {
    fn len(&self) -> usize {
        self.spectra.len()
    }

    fn spectrum(&self, index: usize, include_binary: bool) -> Result<Spectrum, SourceError> {
        self.spectra.spectrum(index, include_binary)
    }
}

impl ChromatogramSource for MsRun {
    fn len(&self) -> usize {
        self.chromatograms.len()
    }

    fn chromatogram(&self, index: usize, include_binary: bool) -> Result<Chromatogram, SourceError> {
        self.chromatograms.chromatogram(index, include_binary)
    }
}
