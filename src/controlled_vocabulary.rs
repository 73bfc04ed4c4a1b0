//! # HUPO-PSI Mass Spectrometry Controlled Vocabulary
//!
//! CV terms used by the triMS5 writer and reader. Spectra are partitioned by
//! the `MS:1000616` (preset scan configuration) term of their scan, and the
//! binary array descriptions written next to every spectrum use the array and
//! precision terms below.
//!
//! ## Reference
//! - OBO file: https://raw.githubusercontent.com/HUPO-PSI/psi-ms-CV/master/psi-ms.obo

use serde::{Deserialize, Serialize};
use std::fmt;

/// Accession of the preset scan configuration term
pub const PRESET_SCAN_CONFIGURATION: &str = "MS:1000616";

/// A controlled vocabulary term with its accession and name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CvTerm {
    /// CV accession (e.g., "MS:1000040")
    pub accession: String,
    /// Human-readable name
    pub name: String,
    /// Optional value associated with the term
    pub value: Option<String>,
    /// Optional unit accession for the value
    pub unit_accession: Option<String>,
    /// Optional unit name
    pub unit_name: Option<String>,
}

impl CvTerm {
    /// Create a new CV term with accession and name
    pub fn new(accession: &str, name: &str) -> Self {
        Self {
            accession: accession.to_string(),
            name: name.to_string(),
            value: None,
            unit_accession: None,
            unit_name: None,
        }
    }

    /// Add a value to the CV term
    pub fn with_value(mut self, value: impl ToString) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// Add a unit to the CV term value
    pub fn with_unit(mut self, unit_accession: &str, unit_name: &str) -> Self {
        self.unit_accession = Some(unit_accession.to_string());
        self.unit_name = Some(unit_name.to_string());
        self
    }

    /// CV prefix of the accession (`MS` for `MS:1000511`).
    pub fn prefix(&self) -> &str {
        split_accession(&self.accession).0
    }

    /// Parse the value as an integer, if present and well formed.
    pub fn value_as_i32(&self) -> Option<i32> {
        self.value.as_deref()?.trim().parse().ok()
    }
}

impl fmt::Display for CvTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "[{}: {}={}]", self.accession, self.name, v),
            None => write!(f, "[{}: {}]", self.accession, self.name),
        }
    }
}

/// Split `PREFIX:NUMBER` into its two halves. Accessions without a colon
/// have an empty prefix.
pub fn split_accession(accession: &str) -> (&str, &str) {
    accession.split_once(':').unwrap_or(("", accession))
}

/// Common MS CV terms
pub mod ms_terms {
    use super::CvTerm;

    // =========================================================================
    // Scan-level terms
    // =========================================================================

    /// MS:1000616 - preset scan configuration
    pub fn preset_scan_configuration(id: i32) -> CvTerm {
        CvTerm::new(super::PRESET_SCAN_CONFIGURATION, "preset scan configuration").with_value(id)
    }

    /// MS:1000016 - scan start time
    pub fn scan_start_time(time_seconds: f64) -> CvTerm {
        CvTerm::new("MS:1000016", "scan start time")
            .with_value(time_seconds)
            .with_unit("UO:0000010", "second")
    }

    /// MS:1000511 - ms level
    pub fn ms_level(level: i16) -> CvTerm {
        CvTerm::new("MS:1000511", "ms level").with_value(level)
    }

    /// MS:1000579 - MS1 spectrum
    pub fn ms1_spectrum() -> CvTerm {
        CvTerm::new("MS:1000579", "MS1 spectrum")
    }

    /// MS:1000580 - MSn spectrum
    pub fn msn_spectrum() -> CvTerm {
        CvTerm::new("MS:1000580", "MSn spectrum")
    }

    /// MS:1000128 - profile spectrum
    pub fn profile_spectrum() -> CvTerm {
        CvTerm::new("MS:1000128", "profile spectrum")
    }

    // =========================================================================
    // Precursor terms
    // =========================================================================

    /// MS:1000744 - selected ion m/z
    pub fn selected_ion_mz(mz: f64) -> CvTerm {
        CvTerm::new("MS:1000744", "selected ion m/z")
            .with_value(mz)
            .with_unit("MS:1000040", "m/z")
    }

    /// MS:1000827 - isolation window target m/z
    pub fn isolation_window_target(mz: f64) -> CvTerm {
        CvTerm::new("MS:1000827", "isolation window target m/z")
            .with_value(mz)
            .with_unit("MS:1000040", "m/z")
    }

    /// MS:1000133 - collision-induced dissociation
    pub fn cid() -> CvTerm {
        CvTerm::new("MS:1000133", "collision-induced dissociation")
    }

    // =========================================================================
    // Binary array terms
    // =========================================================================

    /// MS:1000514 - m/z array
    pub fn mz_array() -> CvTerm {
        CvTerm::new("MS:1000514", "m/z array").with_unit("MS:1000040", "m/z")
    }

    /// MS:1000515 - intensity array
    pub fn intensity_array() -> CvTerm {
        CvTerm::new("MS:1000515", "intensity array")
            .with_unit("MS:1000131", "number of detector counts")
    }

    /// MS:1000595 - time array
    pub fn time_array() -> CvTerm {
        CvTerm::new("MS:1000595", "time array").with_unit("UO:0000010", "second")
    }

    /// MS:1000521 - 32-bit float
    pub fn float32() -> CvTerm {
        CvTerm::new("MS:1000521", "32-bit float")
    }

    /// MS:1000523 - 64-bit float
    pub fn float64() -> CvTerm {
        CvTerm::new("MS:1000523", "64-bit float")
    }

    /// MS:1000576 - no compression
    pub fn no_compression() -> CvTerm {
        CvTerm::new("MS:1000576", "no compression")
    }

    // =========================================================================
    // Chromatogram terms
    // =========================================================================

    /// MS:1000235 - total ion current chromatogram
    pub fn tic_chromatogram() -> CvTerm {
        CvTerm::new("MS:1000235", "total ion current chromatogram")
    }

    // =========================================================================
    // File content and processing terms
    // =========================================================================

    /// MS:1000544 - Conversion to mzML
    pub fn conversion_to_mzml() -> CvTerm {
        CvTerm::new("MS:1000544", "Conversion to mzML")
    }

    /// MS:1000615 - ProteoWizard software
    pub fn proteowizard() -> CvTerm {
        CvTerm::new("MS:1000615", "ProteoWizard software")
    }

    /// MS:1000031 - instrument model
    pub fn instrument_model(model: &str) -> CvTerm {
        CvTerm::new("MS:1000031", "instrument model").with_value(model)
    }
}
