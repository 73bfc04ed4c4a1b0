use serde::{Deserialize, Serialize};

use super::chromatogram::Chromatogram;
use super::params::ParamList;
use super::spectrum::Spectrum;

/// A controlled vocabulary referenced by the run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlledVocabulary {
    /// Short id, e.g. `MS`
    pub id: String,
    /// Full name
    pub full_name: String,
    /// Location of the OBO file
    pub uri: String,
    /// Vocabulary version
    pub version: String,
}

impl ControlledVocabulary {
    /// The PSI-MS vocabulary
    pub fn psi_ms() -> Self {
        Self {
            id: "MS".to_string(),
            full_name: "Proteomics Standards Initiative Mass Spectrometry Ontology".to_string(),
            uri: "https://raw.githubusercontent.com/HUPO-PSI/psi-ms-CV/master/psi-ms.obo"
                .to_string(),
            version: "4.1.0".to_string(),
        }
    }

    /// The Unit Ontology
    pub fn unit_ontology() -> Self {
        Self {
            id: "UO".to_string(),
            full_name: "Unit Ontology".to_string(),
            uri: "https://raw.githubusercontent.com/bio-ontology-research-group/unit-ontology/master/unit.obo"
                .to_string(),
            version: String::new(),
        }
    }
}

/// A referenceable parameter group
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParamGroup {
    /// Group id
    pub id: String,
    /// Parameters of the group
    pub params: ParamList,
}

/// A source file the run was converted from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceFile {
    /// Source file id
    pub id: String,
    /// File name
    pub name: String,
    /// Directory or URI of the file
    pub location: String,
    /// File parameters (format, checksum, native id format)
    pub params: ParamList,
}

/// A sample
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Sample id
    pub id: String,
    /// Sample name
    pub name: String,
    /// Sample parameters
    pub params: ParamList,
}

/// A software entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Software {
    /// Software id
    pub id: String,
    /// Software version
    pub version: String,
    /// Software parameters
    pub params: ParamList,
}

/// Acquisition scan settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Scan settings id
    pub id: String,
    /// Scan settings parameters
    pub params: ParamList,
}

/// An instrument configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstrumentConfiguration {
    /// Configuration id
    pub id: String,
    /// Configuration parameters
    pub params: ParamList,
    /// Id of the acquisition software
    pub software_ref: Option<String>,
}

/// A data processing description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataProcessing {
    /// Data processing id
    pub id: String,
    /// Id of the software that performed the processing
    pub software_ref: Option<String>,
    /// Processing parameters
    pub params: ParamList,
}

/// Run level description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Run {
    /// Run id
    pub id: String,
    /// Acquisition start time stamp
    pub start_time_stamp: String,
    /// Default instrument configuration id
    pub default_instrument_configuration_ref: Option<String>,
    /// Default source file id
    pub default_source_file_ref: Option<String>,
    /// Sample id
    pub sample_ref: Option<String>,
    /// Default data processing of spectra
    pub default_spectrum_data_processing_ref: Option<String>,
    /// Default data processing of chromatograms
    pub default_chromatogram_data_processing_ref: Option<String>,
    /// Run parameters
    pub params: ParamList,
}

/// File-wide shared metadata of a run, written once per container
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MsRunMetadata {
    /// Controlled vocabularies
    pub controlled_vocabularies: Vec<ControlledVocabulary>,
    /// File content description
    pub file_content: ParamList,
    /// Contacts
    pub contacts: Vec<ParamList>,
    /// Referenceable parameter groups
    pub param_groups: Vec<ParamGroup>,
    /// Source files
    pub source_files: Vec<SourceFile>,
    /// Samples
    pub samples: Vec<Sample>,
    /// Software
    pub software: Vec<Software>,
    /// Scan settings
    pub scan_settings: Vec<ScanSettings>,
    /// Instrument configurations
    pub instrument_configurations: Vec<InstrumentConfiguration>,
    /// Data processing descriptions
    pub data_processing: Vec<DataProcessing>,
    /// Run description
    pub run: Run,
}

impl MsRunMetadata {
    /// Empty metadata referencing the PSI-MS and unit vocabularies
    pub fn new() -> Self {
        Self {
            controlled_vocabularies: vec![
                ControlledVocabulary::psi_ms(),
                ControlledVocabulary::unit_ontology(),
            ],
            ..Self::default()
        }
    }
}

/// A complete in-memory run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MsRun {
    /// Shared metadata
    pub metadata: MsRunMetadata,
    /// Spectra in acquisition order
    pub spectra: Vec<Spectrum>,
    /// Chromatograms
    pub chromatograms: Vec<Chromatogram>,
}
