use serde::{Deserialize, Serialize};

use crate::controlled_vocabulary::ms_terms;

use super::params::ParamList;
use super::spectrum::{BinaryArrays, Precursor};

/// In-memory chromatogram exchanged with the writer and the reader
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Chromatogram {
    /// Position in the chromatogram list
    pub index: usize,
    /// Native id, e.g. `TIC`
    pub id: String,
    /// Chromatogram level parameters
    pub params: ParamList,
    /// Precursor (SRM transitions)
    pub precursor: Option<Precursor>,
    /// Product isolation window (SRM transitions)
    pub product: ParamList,
    /// Data processing applied to the chromatogram
    pub data_processing_ref: Option<String>,
    /// Number of samples in each binary array
    pub default_array_length: usize,
    /// Binary array descriptions
    pub binary: BinaryArrays,
    /// Time array in seconds, present when binary data was requested
    pub time: Option<Vec<f64>>,
    /// Intensity array, present when binary data was requested
    pub intensity: Option<Vec<f32>>,
}

impl Chromatogram {
    /// Create a chromatogram without arrays
    pub fn new(index: usize, id: impl Into<String>) -> Self {
        Self {
            index,
            id: id.into(),
            ..Self::default()
        }
    }

    /// Attach time and intensity arrays (builder pattern)
    pub fn with_arrays(mut self, time: Vec<f64>, intensity: Vec<f32>) -> Self {
        self.default_array_length = time.len();
        self.binary.x_params = ParamList::new().with_cv(ms_terms::time_array());
        self.binary.y_params = ParamList::new().with_cv(ms_terms::intensity_array());
        self.time = Some(time);
        self.intensity = Some(intensity);
        self
    }

    /// Number of samples in the attached arrays
    pub fn point_count(&self) -> usize {
        self.time.as_ref().map_or(0, Vec::len)
    }
}
