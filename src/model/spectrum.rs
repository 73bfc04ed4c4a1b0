use serde::{Deserialize, Serialize};

use crate::controlled_vocabulary::{ms_terms, PRESET_SCAN_CONFIGURATION};

use super::params::ParamList;

/// One scan event of a spectrum
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scan {
    /// Scan parameters (scan start time, preset scan configuration, ...)
    pub params: ParamList,
    /// Id of the instrument configuration used for the scan
    pub instrument_configuration_ref: Option<String>,
    /// Native id of the scan in an external source
    pub external_spectrum_id: Option<String>,
}

/// Precursor of an MSn spectrum
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Precursor {
    /// Native id of the precursor spectrum
    pub spectrum_ref: Option<String>,
    /// Precursor parameters
    pub params: ParamList,
    /// Isolation window parameters
    pub isolation_window: ParamList,
    /// Selected ion parameters
    pub selected_ion: ParamList,
    /// Activation parameters
    pub activation: ParamList,
}

/// Descriptions of the two binary arrays of a spectrum or chromatogram
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BinaryArrays {
    /// Parameters of the x array (m/z or time)
    pub x_params: ParamList,
    /// Parameters of the y array (intensity)
    pub y_params: ParamList,
    /// Data processing applied to the x array
    pub x_data_processing_ref: Option<String>,
    /// Data processing applied to the y array
    pub y_data_processing_ref: Option<String>,
}

/// In-memory spectrum exchanged with the writer and the reader
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Spectrum {
    /// Position in acquisition order
    pub index: usize,
    /// Native id, e.g. `controllerType=0 controllerNumber=1 scan=17`
    pub id: String,
    /// Spot id (MALDI); empty when not applicable
    pub spot_id: String,
    /// Spectrum level parameters
    pub params: ParamList,
    /// Scan event
    pub scan: Option<Scan>,
    /// Precursor (MSn spectra)
    pub precursor: Option<Precursor>,
    /// Data processing applied to the spectrum
    pub data_processing_ref: Option<String>,
    /// Source file the spectrum was read from
    pub source_file_ref: Option<String>,
    /// Number of samples in each binary array
    pub default_array_length: usize,
    /// Binary array descriptions
    pub binary: BinaryArrays,
    /// m/z array, present when binary data was requested
    pub mz: Option<Vec<f64>>,
    /// Intensity array, present when binary data was requested
    pub intensity: Option<Vec<f32>>,
}

impl Spectrum {
    /// Create a spectrum without arrays
    pub fn new(index: usize, id: impl Into<String>) -> Self {
        Self {
            index,
            id: id.into(),
            ..Self::default()
        }
    }

    /// Attach m/z and intensity arrays (builder pattern)
    pub fn with_arrays(mut self, mz: Vec<f64>, intensity: Vec<f32>) -> Self {
        self.default_array_length = mz.len();
        self.binary.x_params = ParamList::new().with_cv(ms_terms::mz_array());
        self.binary.y_params = ParamList::new().with_cv(ms_terms::intensity_array());
        self.mz = Some(mz);
        self.intensity = Some(intensity);
        self
    }

    /// Tag the scan with a preset scan configuration (builder pattern)
    pub fn with_preset_scan_configuration(mut self, id: i32) -> Self {
        let scan = self.scan.get_or_insert_with(Scan::default);
        scan.params
            .cv_params
            .retain(|p| p.accession != PRESET_SCAN_CONFIGURATION);
        scan.params
            .cv_params
            .push(ms_terms::preset_scan_configuration(id));
        self
    }

    /// Preset scan configuration of the scan, if tagged with a valid integer
    pub fn preset_scan_configuration(&self) -> Option<i32> {
        self.scan
            .as_ref()?
            .params
            .cv(PRESET_SCAN_CONFIGURATION)?
            .value_as_i32()
    }

    /// Number of samples in the attached arrays
    pub fn peak_count(&self) -> usize {
        self.mz.as_ref().map_or(0, Vec::len)
    }

    /// Identity fields of the spectrum
    pub fn identity(&self) -> SpectrumIdentity {
        SpectrumIdentity {
            index: self.index,
            id: self.id.clone(),
            spot_id: self.spot_id.clone(),
        }
    }
}

/// Position and ids of a spectrum, available without decoding it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SpectrumIdentity {
    /// Global index (acquisition order)
    pub index: usize,
    /// Native id
    pub id: String,
    /// Spot id; empty when not applicable
    pub spot_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controlled_vocabulary::CvTerm;

    #[test]
    fn test_preset_scan_configuration_roundtrip() {
        let spectrum = Spectrum::new(0, "scan=1").with_preset_scan_configuration(3);
        assert_eq!(spectrum.preset_scan_configuration(), Some(3));

        let retagged = spectrum.with_preset_scan_configuration(5);
        assert_eq!(retagged.preset_scan_configuration(), Some(5));
        let scan = retagged.scan.as_ref().unwrap();
        assert_eq!(scan.params.cv_params.len(), 1);
    }

    #[test]
    fn test_untagged_spectrum() {
        assert_eq!(Spectrum::new(0, "scan=1").preset_scan_configuration(), None);

        let mut spectrum = Spectrum::new(0, "scan=1");
        spectrum.scan = Some(Scan {
            params: ParamList::new().with_cv(
                CvTerm::new(PRESET_SCAN_CONFIGURATION, "preset scan configuration")
                    .with_value("n/a"),
            ),
            ..Scan::default()
        });
        assert_eq!(spectrum.preset_scan_configuration(), None);
    }

    #[test]
    fn test_with_arrays_sets_length() {
        let spectrum = Spectrum::new(2, "scan=3").with_arrays(vec![1.0, 2.0], vec![10.0, 20.0]);
        assert_eq!(spectrum.default_array_length, 2);
        assert_eq!(spectrum.peak_count(), 2);
        assert_eq!(spectrum.identity().index, 2);
    }
}
