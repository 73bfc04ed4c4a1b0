//! # Layout Configuration
//!
//! Translates the semantic identifiers used throughout the crate
//! ([`DatasetKind`], [`GroupKind`]) into the physical layout of a container:
//! entry names, element types, row group ("chunk") lengths, write buffer
//! lengths and group parentage. Reverse lookups turn physical names back into
//! kinds when an existing container is catalogued.
//!
//! A [`Configuration`] is either built from defaults or derived from a
//! [`WriteConfig`]. The triMS5 specific datasets (mass axis, mass indices,
//! global index, file information) keep fixed layouts regardless of the
//! write policy.

mod error;
mod kinds;
mod write_config;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt;

use parquet::file::properties::WriterProperties;

pub use error::ConfigurationError;
pub use kinds::{DatasetKind, ElementType, GroupKind, Precision};
pub use write_config::{CompressionType, WriteConfig};

/// Cluster id used for groups and datasets that do not belong to a cluster
pub const NO_CLUSTER: i32 = -1;

/// Chunk size meaning "a single row group"
pub const EMPTY_CHUNK_SIZE: usize = 0;

/// Buffer size meaning "write through without buffering"
pub const NO_BUFFER_SIZE: usize = 0;

/// File extension of dataset entries inside the archive
pub const DATASET_EXTENSION: &str = ".parquet";

const CLUSTER_PREFIX: &str = "Cluster_";

/// Version record stored in the trailing `FileInformation` dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatVersion {
    /// Major version of the base layout
    pub base_major: u16,
    /// Minor version of the base layout
    pub base_minor: u16,
    /// Major version of the triMS5 extension
    pub format_major: u16,
    /// Minor version of the triMS5 extension
    pub format_minor: u16,
}

impl FormatVersion {
    /// Version written by this crate.
    pub const CURRENT: FormatVersion = FormatVersion {
        base_major: 0,
        base_minor: 10,
        format_major: 0,
        format_minor: 1,
    };

    /// Whether a file written with `other` can be read by code expecting `self`.
    ///
    /// Major versions must match exactly; minor versions may differ.
    pub fn is_compatible_with(&self, other: &FormatVersion) -> bool {
        self.base_major == other.base_major && self.format_major == other.format_major
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "base {}.{}, format {}.{}",
            self.base_major, self.base_minor, self.format_major, self.format_minor
        )
    }
}

/// Semantic name to physical layout translation
#[derive(Debug, Clone)]
pub struct Configuration {
    version: FormatVersion,
    write: WriteConfig,
    names: HashMap<DatasetKind, &'static str>,
    types: HashMap<DatasetKind, ElementType>,
    chunk_sizes: HashMap<DatasetKind, usize>,
    buffer_sizes: HashMap<DatasetKind, usize>,
    dataset_groups: HashMap<DatasetKind, GroupKind>,
    group_names: HashMap<GroupKind, &'static str>,
    group_parents: HashMap<GroupKind, GroupKind>,
    kinds_by_name: HashMap<&'static str, DatasetKind>,
    groups_by_name: HashMap<&'static str, GroupKind>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration {
    /// Configuration with the default write policy.
    pub fn new() -> Self {
        Self::from_write_config(&WriteConfig::default())
    }

    /// Configuration derived from a generic write policy.
    pub fn from_write_config(write: &WriteConfig) -> Self {
        let mut config = Self {
            version: FormatVersion::CURRENT,
            write: write.clone(),
            names: HashMap::new(),
            types: HashMap::new(),
            chunk_sizes: HashMap::new(),
            buffer_sizes: HashMap::new(),
            dataset_groups: HashMap::new(),
            group_names: HashMap::new(),
            group_parents: HashMap::new(),
            kinds_by_name: HashMap::new(),
            groups_by_name: HashMap::new(),
        };
        config.init();
        config
    }

    /// Replace the version this configuration writes and accepts.
    pub fn with_version(mut self, version: FormatVersion) -> Self {
        self.version = version;
        self
    }

    /// Version written into `FileInformation` and checked on open.
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// The write policy this configuration was derived from.
    pub fn write_config(&self) -> &WriteConfig {
        &self.write
    }

    fn init(&mut self) {
        use DatasetKind as D;
        use GroupKind as G;

        // =====================================================================
        // Physical names
        // =====================================================================
        let names = [
            (D::ControlledVocabulary, "ControlledVocabulary"),
            (D::FileContent, "FileContent"),
            (D::Contact, "Contact"),
            (D::CvReference, "CVReference"),
            (D::CvParam, "CVParam"),
            (D::UserParam, "UserParam"),
            (D::RefParam, "RefParam"),
            (D::ParamGroups, "ParamGroups"),
            (D::SourceFiles, "SourceFiles"),
            (D::Samples, "Samples"),
            (D::Software, "Software"),
            (D::ScanSetting, "ScanSetting"),
            (D::InstrumentConfiguration, "InstrumentConfiguration"),
            (D::DataProcessing, "DataProcessing"),
            (D::Run, "Run"),
            (D::FileInformation, "FileInformation"),
            (D::SpectrumListIndices, "SpectrumListIndices"),
            (D::SpectrumMetaData, "SpectrumMetaData"),
            (D::SpectrumBinaryMetaData, "SpectrumListBinaryData"),
            (D::SpectrumIndex, "SpectrumIndex"),
            (D::SpectrumIntensity, "SpectrumIntensity"),
            (D::SpectrumMassAxis, "SpectrumMassAxis"),
            (D::SpectrumMassIndices, "SpectrumMassIndices"),
            (D::ChromatogramMetaData, "ChromatogramList"),
            (D::ChromatogramBinaryMetaData, "ChromatogramListBinaryData"),
            (D::ChromatogramTime, "ChromatogramTime"),
            (D::ChromatogramTimeIndices, "ChromatogramTimeIndices"),
            (D::ChromatogramIntensity, "ChromatogramIntensity"),
            (D::ChromatogramIndex, "ChromatogramIndex"),
        ];
        for (kind, name) in names {
            self.names.insert(kind, name);
            self.kinds_by_name.insert(name, kind);
        }

        // =====================================================================
        // Element types
        // =====================================================================
        let types = [
            (D::ControlledVocabulary, ElementType::Compound("ControlledVocabulary")),
            (D::FileContent, ElementType::Compound("ParamList")),
            (D::Contact, ElementType::Compound("ParamList")),
            (D::CvReference, ElementType::Compound("CVReference")),
            (D::CvParam, ElementType::Compound("CVParam")),
            (D::UserParam, ElementType::Compound("UserParam")),
            (D::RefParam, ElementType::Compound("RefParam")),
            (D::ParamGroups, ElementType::Compound("ParamGroup")),
            (D::SourceFiles, ElementType::Compound("SourceFile")),
            (D::Samples, ElementType::Compound("Sample")),
            (D::Software, ElementType::Compound("Software")),
            (D::ScanSetting, ElementType::Compound("ScanSetting")),
            (D::InstrumentConfiguration, ElementType::Compound("InstrumentConfiguration")),
            (D::DataProcessing, ElementType::Compound("DataProcessing")),
            (D::Run, ElementType::Compound("Run")),
            (D::FileInformation, ElementType::Compound("FileInformation")),
            (D::SpectrumListIndices, ElementType::Compound("SpectrumListIndex")),
            (D::SpectrumMetaData, ElementType::Compound("SpectrumMetaData")),
            (D::SpectrumBinaryMetaData, ElementType::Compound("BinaryMetaData")),
            (D::SpectrumIndex, ElementType::UInt32),
            (D::SpectrumIntensity, ElementType::Float32),
            (D::SpectrumMassAxis, self.write.mz_precision.element_type()),
            (D::SpectrumMassIndices, ElementType::UInt32),
            (D::ChromatogramMetaData, ElementType::Compound("ChromatogramMetaData")),
            (D::ChromatogramBinaryMetaData, ElementType::Compound("BinaryMetaData")),
            (D::ChromatogramTime, self.write.time_precision.element_type()),
            (D::ChromatogramTimeIndices, ElementType::UInt32),
            (D::ChromatogramIntensity, ElementType::Float32),
            (D::ChromatogramIndex, ElementType::UInt32),
        ];
        self.types.extend(types);

        // =====================================================================
        // Chunk and buffer sizes
        // =====================================================================
        let spectrum_chunk = self.write.spectrum_chunk_size;
        let chromatogram_chunk = self.write.chromatogram_chunk_size;
        let spectrum_buffer = if spectrum_chunk == 0 {
            NO_BUFFER_SIZE
        } else {
            let chunks_in_buffer = (self.write.buffer_mib * 1024 * 1024 / 8) / spectrum_chunk;
            spectrum_chunk * (chunks_in_buffer / 4)
        };
        let chromatogram_buffer = chromatogram_chunk * 10;

        for kind in DatasetKind::ALL {
            self.chunk_sizes.insert(kind, EMPTY_CHUNK_SIZE);
            self.buffer_sizes.insert(kind, NO_BUFFER_SIZE);
        }
        for kind in [D::SpectrumIntensity, D::SpectrumMassIndices] {
            self.chunk_sizes.insert(kind, spectrum_chunk);
            self.buffer_sizes.insert(kind, spectrum_buffer);
        }
        for kind in [
            D::ChromatogramTime,
            D::ChromatogramTimeIndices,
            D::ChromatogramIntensity,
        ] {
            self.chunk_sizes.insert(kind, chromatogram_chunk);
            self.buffer_sizes.insert(kind, chromatogram_buffer);
        }
        if self.write.compression.is_enabled() {
            for kind in [D::SpectrumMetaData, D::SpectrumBinaryMetaData, D::SpectrumIndex] {
                self.chunk_sizes.insert(kind, 2000);
            }
            self.chunk_sizes.insert(D::CvParam, 5000);
            self.chunk_sizes.insert(D::UserParam, 100);
        }

        // =====================================================================
        // Group membership
        // =====================================================================
        for kind in DatasetKind::ALL {
            let group = match kind {
                D::FileInformation => G::Root,
                D::SpectrumListIndices => G::RawData,
                D::SpectrumMetaData
                | D::SpectrumBinaryMetaData
                | D::SpectrumIndex
                | D::SpectrumIntensity
                | D::SpectrumMassAxis
                | D::SpectrumMassIndices => G::Spectrum,
                D::ChromatogramMetaData
                | D::ChromatogramBinaryMetaData
                | D::ChromatogramTime
                | D::ChromatogramTimeIndices
                | D::ChromatogramIntensity
                | D::ChromatogramIndex => G::Chromatogram,
                _ => G::MetaData,
            };
            self.dataset_groups.insert(kind, group);
        }

        let groups = [
            (G::Root, "/"),
            (G::MetaData, "MetaData"),
            (G::RawData, "RawData"),
            (G::Cluster, "Cluster"),
            (G::Spectrum, "Spectrum"),
            (G::Chromatogram, "Chromatogram"),
        ];
        for (group, name) in groups {
            self.group_names.insert(group, name);
            self.groups_by_name.insert(name, group);
        }
        self.group_parents.insert(G::MetaData, G::Root);
        self.group_parents.insert(G::RawData, G::Root);
        self.group_parents.insert(G::Cluster, G::RawData);
        self.group_parents.insert(G::Spectrum, G::Cluster);
        self.group_parents.insert(G::Chromatogram, G::Cluster);
    }

    // =========================================================================
    // Forward lookups
    // =========================================================================

    /// Physical dataset name, e.g. `SpectrumMassAxis`.
    pub fn name_for(&self, kind: DatasetKind) -> Result<&'static str, ConfigurationError> {
        self.names
            .get(&kind)
            .copied()
            .ok_or(ConfigurationError::UnknownDataset(kind))
    }

    /// Element type of a dataset.
    pub fn type_for(&self, kind: DatasetKind) -> Result<ElementType, ConfigurationError> {
        self.types
            .get(&kind)
            .copied()
            .ok_or(ConfigurationError::UnknownDataset(kind))
    }

    /// Row group length; [`EMPTY_CHUNK_SIZE`] for a single row group.
    pub fn chunk_size_for(&self, kind: DatasetKind) -> Result<usize, ConfigurationError> {
        self.chunk_sizes
            .get(&kind)
            .copied()
            .ok_or(ConfigurationError::UnknownDataset(kind))
    }

    /// Elements buffered before a staged dataset is flushed; [`NO_BUFFER_SIZE`]
    /// writes through.
    pub fn buffer_size_for(&self, kind: DatasetKind) -> Result<usize, ConfigurationError> {
        self.buffer_sizes
            .get(&kind)
            .copied()
            .ok_or(ConfigurationError::UnknownDataset(kind))
    }

    /// Group a dataset lives in.
    pub fn group_for(&self, kind: DatasetKind) -> Result<GroupKind, ConfigurationError> {
        self.dataset_groups
            .get(&kind)
            .copied()
            .ok_or(ConfigurationError::UnknownDataset(kind))
    }

    /// Parent of a group; `None` for the root.
    pub fn parent_group(&self, group: GroupKind) -> Result<Option<GroupKind>, ConfigurationError> {
        if group == GroupKind::Root {
            return Ok(None);
        }
        self.group_parents
            .get(&group)
            .copied()
            .map(Some)
            .ok_or(ConfigurationError::UnknownGroup(group))
    }

    /// Physical group name (without cluster suffix).
    pub fn group_name_for(&self, group: GroupKind) -> Result<&'static str, ConfigurationError> {
        self.group_names
            .get(&group)
            .copied()
            .ok_or(ConfigurationError::UnknownGroup(group))
    }

    // =========================================================================
    // Reverse lookups
    // =========================================================================

    /// Dataset kind for a physical dataset name.
    pub fn kind_for(&self, name: &str) -> Result<DatasetKind, ConfigurationError> {
        self.kinds_by_name
            .get(name)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownName(name.to_string()))
    }

    /// Group kind for a physical group name. Cluster groups are recognised
    /// with their `_<id>` suffix.
    pub fn group_kind_for(&self, name: &str) -> Result<GroupKind, ConfigurationError> {
        if let Some(id) = name.strip_prefix(CLUSTER_PREFIX) {
            if id.parse::<i32>().is_ok() {
                return Ok(GroupKind::Cluster);
            }
        }
        self.groups_by_name
            .get(name)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownName(name.to_string()))
    }

    // =========================================================================
    // Archive paths
    // =========================================================================

    /// Archive path of a group, without trailing slash. The root is `""`.
    ///
    /// `cluster_id` is only consulted for per-cluster groups, where it must
    /// not be [`NO_CLUSTER`].
    pub fn group_path(&self, group: GroupKind, cluster_id: i32) -> Result<String, ConfigurationError> {
        if group.is_per_cluster() && cluster_id == NO_CLUSTER {
            return Err(ConfigurationError::ClusterId {
                group,
                reason: "requires a cluster id",
            });
        }
        let path = match group {
            GroupKind::Root => String::new(),
            GroupKind::Cluster => format!(
                "{}/{}{}",
                self.group_name_for(GroupKind::RawData)?,
                CLUSTER_PREFIX,
                cluster_id
            ),
            GroupKind::MetaData | GroupKind::RawData => self.group_name_for(group)?.to_string(),
            GroupKind::Spectrum | GroupKind::Chromatogram => format!(
                "{}/{}",
                self.group_path(GroupKind::Cluster, cluster_id)?,
                self.group_name_for(group)?
            ),
        };
        Ok(path)
    }

    /// Archive entry name of a dataset, e.g.
    /// `RawData/Cluster_2/Spectrum/SpectrumIndex.parquet`.
    pub fn dataset_entry(&self, kind: DatasetKind, cluster_id: i32) -> Result<String, ConfigurationError> {
        let group = self.group_path(self.group_for(kind)?, cluster_id)?;
        let name = self.name_for(kind)?;
        if group.is_empty() {
            Ok(format!("{}{}", name, DATASET_EXTENSION))
        } else {
            Ok(format!("{}/{}{}", group, name, DATASET_EXTENSION))
        }
    }

    /// Inverse of [`Configuration::dataset_entry`].
    pub fn parse_dataset_entry(&self, entry: &str) -> Result<(DatasetKind, i32), ConfigurationError> {
        let unknown = || ConfigurationError::UnknownName(entry.to_string());
        let stem = entry.strip_suffix(DATASET_EXTENSION).ok_or_else(unknown)?;
        let (group, name) = match stem.rsplit_once('/') {
            Some((group, name)) => (group, name),
            None => ("", stem),
        };
        let kind = self.kind_for(name)?;

        let cluster_id = group
            .split('/')
            .find_map(|part| part.strip_prefix(CLUSTER_PREFIX))
            .map(|id| id.parse::<i32>().map_err(|_| unknown()))
            .transpose()?
            .unwrap_or(NO_CLUSTER);

        if self.group_path(self.group_for(kind)?, cluster_id)? != group {
            return Err(unknown());
        }
        Ok((kind, cluster_id))
    }

    /// Parquet writer properties of a dataset.
    pub(crate) fn writer_properties(
        &self,
        kind: DatasetKind,
        float_columns: &[&str],
    ) -> Result<WriterProperties, ConfigurationError> {
        let key_values = vec![
            ("trims5:dataset".to_string(), self.name_for(kind)?.to_string()),
            ("trims5:format_version".to_string(), self.version.to_string()),
        ];
        Ok(self
            .write
            .to_writer_properties(self.chunk_size_for(kind)?, float_columns, key_values))
    }
}
