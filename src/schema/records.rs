//! Compound records of the shared metadata tables and the spectrum and
//! chromatogram metadata lists.
//!
//! Handles into other tables are `i32` row numbers with [`NO_REF`] for "none";
//! parameter lists are [`ParamRange`]s into the parameter arenas.

use super::ParamRange;
use crate::config::FormatVersion;
use crate::record;

/// Handle value meaning "no reference"
pub const NO_REF: i32 = -1;

record! {
    /// Version record; the last dataset written, its presence marks a
    /// complete container.
    pub struct FileInformation as "FileInformation" {
        /// Major version of the base layout
        pub base_major: u16,
        /// Minor version of the base layout
        pub base_minor: u16,
        /// Major version of the triMS5 extension
        pub format_major: u16,
        /// Minor version of the triMS5 extension
        pub format_minor: u16,
    }
}

impl FileInformation {
    /// Record for a format version
    pub fn from_version(version: FormatVersion) -> Self {
        Self {
            base_major: version.base_major,
            base_minor: version.base_minor,
            format_major: version.format_major,
            format_minor: version.format_minor,
        }
    }

    /// The recorded format version
    pub fn version(&self) -> FormatVersion {
        FormatVersion {
            base_major: self.base_major,
            base_minor: self.base_minor,
            format_major: self.format_major,
            format_minor: self.format_minor,
        }
    }
}

record! {
    /// One GlobalIndex entry: the cluster holding a spectrum and its
    /// position inside that cluster.
    pub struct SpectrumListIndex as "SpectrumListIndex" {
        /// Cluster id
        pub cluster_id: i32,
        /// Index of the spectrum within the cluster
        pub local_index: u32,
    }
}

record! {
    /// A controlled vocabulary
    pub struct ControlledVocabularyRecord as "ControlledVocabulary" {
        /// Short id
        pub id: String,
        /// Full name
        pub full_name: String,
        /// OBO location
        pub uri: String,
        /// Version
        pub version: String,
    }
}

record! {
    /// An interned CV term
    pub struct CvReference as "CVReference" {
        /// Accession prefix, e.g. `MS`
        pub prefix: String,
        /// Full accession, e.g. `MS:1000511`
        pub accession: String,
        /// Term name
        pub name: String,
    }
}

record! {
    /// CV parameter arena entry
    pub struct CvParamRecord as "CVParam" {
        /// Parameter value
        pub value: Option<String>,
        /// Row of the term in `CVReference`
        pub term_ref: u32,
        /// Row of the unit term in `CVReference`, or [`NO_REF`]
        pub unit_ref: i32 = NO_REF,
    }
}

record! {
    /// User parameter arena entry
    pub struct UserParamRecord as "UserParam" {
        /// Parameter name
        pub name: String,
        /// Parameter value
        pub value: String,
        /// Value type
        pub value_type: Option<String>,
        /// Row of the unit term in `CVReference`, or [`NO_REF`]
        pub unit_ref: i32 = NO_REF,
    }
}

record! {
    /// Parameter group reference arena entry
    pub struct RefParamRecord as "RefParam" {
        /// Row of the group in `ParamGroups`
        pub group_ref: u32,
    }
}

record! {
    /// A bare parameter list (file content, contacts)
    pub struct ParamListRecord as "ParamList" {
        /// Parameters
        pub params: ParamRange,
    }
}

record! {
    /// A referenceable parameter group
    pub struct ParamGroupRecord as "ParamGroup" {
        /// Group id
        pub id: String,
        /// Parameters
        pub params: ParamRange,
    }
}

record! {
    /// A source file
    pub struct SourceFileRecord as "SourceFile" {
        /// Source file id
        pub id: String,
        /// File name
        pub name: String,
        /// Location
        pub location: String,
        /// Parameters
        pub params: ParamRange,
    }
}

record! {
    /// A sample
    pub struct SampleRecord as "Sample" {
        /// Sample id
        pub id: String,
        /// Sample name
        pub name: String,
        /// Parameters
        pub params: ParamRange,
    }
}

record! {
    /// A software entry
    pub struct SoftwareRecord as "Software" {
        /// Software id
        pub id: String,
        /// Version
        pub version: String,
        /// Parameters
        pub params: ParamRange,
    }
}

record! {
    /// Scan settings
    pub struct ScanSettingRecord as "ScanSetting" {
        /// Scan settings id
        pub id: String,
        /// Parameters
        pub params: ParamRange,
    }
}

record! {
    /// An instrument configuration
    pub struct InstrumentConfigurationRecord as "InstrumentConfiguration" {
        /// Configuration id
        pub id: String,
        /// Parameters
        pub params: ParamRange,
        /// Row in `Software`, or [`NO_REF`]
        pub software_ref: i32 = NO_REF,
    }
}

record! {
    /// A data processing description
    pub struct DataProcessingRecord as "DataProcessing" {
        /// Data processing id
        pub id: String,
        /// Row in `Software`, or [`NO_REF`]
        pub software_ref: i32 = NO_REF,
        /// Parameters
        pub params: ParamRange,
    }
}

record! {
    /// The run description
    pub struct RunRecord as "Run" {
        /// Run id
        pub id: String,
        /// Start time stamp
        pub start_time_stamp: String,
        /// Row in `InstrumentConfiguration`, or [`NO_REF`]
        pub default_instrument_configuration_ref: i32 = NO_REF,
        /// Row in `SourceFiles`, or [`NO_REF`]
        pub default_source_file_ref: i32 = NO_REF,
        /// Row in `Samples`, or [`NO_REF`]
        pub sample_ref: i32 = NO_REF,
        /// Row in `DataProcessing`, or [`NO_REF`]
        pub default_spectrum_data_processing_ref: i32 = NO_REF,
        /// Row in `DataProcessing`, or [`NO_REF`]
        pub default_chromatogram_data_processing_ref: i32 = NO_REF,
        /// Parameters
        pub params: ParamRange,
    }
}

record! {
    /// Metadata of one spectrum, stored in cluster-local order
    pub struct SpectrumMetaDataRecord as "SpectrumMetaData" {
        /// Global acquisition index
        pub index: u64,
        /// Native id
        pub id: String,
        /// Spot id
        pub spot_id: String,
        /// Spectrum parameters
        pub params: ParamRange,
        /// Whether the spectrum has a scan event
        pub scan_present: bool,
        /// Scan parameters
        pub scan_params: ParamRange,
        /// Row in `InstrumentConfiguration`, or [`NO_REF`]
        pub scan_instrument_configuration_ref: i32 = NO_REF,
        /// External spectrum id of the scan
        pub scan_external_spectrum_id: Option<String>,
        /// Whether the spectrum has a precursor
        pub precursor_present: bool,
        /// Native id of the precursor spectrum
        pub precursor_spectrum_ref: Option<String>,
        /// Precursor parameters
        pub precursor_params: ParamRange,
        /// Isolation window parameters
        pub isolation_window: ParamRange,
        /// Selected ion parameters
        pub selected_ion: ParamRange,
        /// Activation parameters
        pub activation: ParamRange,
        /// Row in `DataProcessing`, or [`NO_REF`]
        pub data_processing_ref: i32 = NO_REF,
        /// Row in `SourceFiles`, or [`NO_REF`]
        pub source_file_ref: i32 = NO_REF,
        /// Declared array length
        pub default_array_length: u64,
    }
}

record! {
    /// Binary array descriptions of a spectrum or chromatogram
    pub struct BinaryMetaDataRecord as "BinaryMetaData" {
        /// Whether arrays were attached when written
        pub has_arrays: bool,
        /// Parameters of the x array
        pub x_params: ParamRange,
        /// Parameters of the y array
        pub y_params: ParamRange,
        /// Row in `DataProcessing`, or [`NO_REF`]
        pub x_data_processing_ref: i32 = NO_REF,
        /// Row in `DataProcessing`, or [`NO_REF`]
        pub y_data_processing_ref: i32 = NO_REF,
    }
}

record! {
    /// Metadata of one chromatogram
    pub struct ChromatogramMetaDataRecord as "ChromatogramMetaData" {
        /// Position in the chromatogram list
        pub index: u64,
        /// Native id
        pub id: String,
        /// Chromatogram parameters
        pub params: ParamRange,
        /// Whether the chromatogram has a precursor
        pub precursor_present: bool,
        /// Native id of the precursor spectrum
        pub precursor_spectrum_ref: Option<String>,
        /// Precursor parameters
        pub precursor_params: ParamRange,
        /// Isolation window parameters
        pub isolation_window: ParamRange,
        /// Selected ion parameters
        pub selected_ion: ParamRange,
        /// Activation parameters
        pub activation: ParamRange,
        /// Product isolation window parameters
        pub product: ParamRange,
        /// Row in `DataProcessing`, or [`NO_REF`]
        pub data_processing_ref: i32 = NO_REF,
        /// Declared array length
        pub default_array_length: u64,
    }
}
