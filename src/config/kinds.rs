use std::fmt;

/// Semantic identifier of every dataset a triMS5 container may hold.
///
/// The physical name, element type and group of each kind are resolved
/// through [`Configuration`](super::Configuration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetKind {
    // =========================================================================
    // File-wide metadata tables (group `MetaData`)
    // =========================================================================
    /// Controlled vocabularies referenced by the run
    ControlledVocabulary,
    /// File content description (a single parameter list)
    FileContent,
    /// Contact persons (one parameter list each)
    Contact,
    /// Interned CV terms referenced by [`DatasetKind::CvParam`]
    CvReference,
    /// Flat arena of CV parameters
    CvParam,
    /// Flat arena of user parameters
    UserParam,
    /// Flat arena of referenceable parameter group references
    RefParam,
    /// Referenceable parameter groups
    ParamGroups,
    /// Source files
    SourceFiles,
    /// Samples
    Samples,
    /// Software entries
    Software,
    /// Scan settings
    ScanSetting,
    /// Instrument configurations
    InstrumentConfiguration,
    /// Data processing descriptions
    DataProcessing,
    /// The run record
    Run,

    // =========================================================================
    // Root and raw data index
    // =========================================================================
    /// Trailing version record, written last
    FileInformation,
    /// Global index: one `(cluster, local index)` per spectrum
    SpectrumListIndices,

    // =========================================================================
    // Per-cluster spectrum datasets
    // =========================================================================
    /// Spectrum metadata records
    SpectrumMetaData,
    /// Spectrum binary metadata records
    SpectrumBinaryMetaData,
    /// Cumulative end offsets (32-bit, wrapping)
    SpectrumIndex,
    /// Raw intensity samples
    SpectrumIntensity,
    /// Sorted distinct m/z values of the cluster
    SpectrumMassAxis,
    /// Per-sample index into the mass axis
    SpectrumMassIndices,

    // =========================================================================
    // Chromatogram datasets (designated cluster)
    // =========================================================================
    /// Chromatogram metadata records
    ChromatogramMetaData,
    /// Chromatogram binary metadata records
    ChromatogramBinaryMetaData,
    /// Sorted distinct time values of all chromatograms
    ChromatogramTime,
    /// Per-sample index into the chromatogram time axis
    ChromatogramTimeIndices,
    /// Raw chromatogram intensity samples
    ChromatogramIntensity,
    /// Cumulative end offsets of each chromatogram
    ChromatogramIndex,
}

impl DatasetKind {
    /// Every dataset kind, in declaration order.
    pub const ALL: [DatasetKind; 29] = [
        DatasetKind::ControlledVocabulary,
        DatasetKind::FileContent,
        DatasetKind::Contact,
        DatasetKind::CvReference,
        DatasetKind::CvParam,
        DatasetKind::UserParam,
        DatasetKind::RefParam,
        DatasetKind::ParamGroups,
        DatasetKind::SourceFiles,
        DatasetKind::Samples,
        DatasetKind::Software,
        DatasetKind::ScanSetting,
        DatasetKind::InstrumentConfiguration,
        DatasetKind::DataProcessing,
        DatasetKind::Run,
        DatasetKind::FileInformation,
        DatasetKind::SpectrumListIndices,
        DatasetKind::SpectrumMetaData,
        DatasetKind::SpectrumBinaryMetaData,
        DatasetKind::SpectrumIndex,
        DatasetKind::SpectrumIntensity,
        DatasetKind::SpectrumMassAxis,
        DatasetKind::SpectrumMassIndices,
        DatasetKind::ChromatogramMetaData,
        DatasetKind::ChromatogramBinaryMetaData,
        DatasetKind::ChromatogramTime,
        DatasetKind::ChromatogramTimeIndices,
        DatasetKind::ChromatogramIntensity,
        DatasetKind::ChromatogramIndex,
    ];
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Semantic identifier of the fixed group hierarchy.
///
/// ```text
/// Root
/// ├── MetaData
/// └── RawData
///     └── Cluster_k
///         ├── Spectrum
///         └── Chromatogram
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKind {
    /// Archive root
    Root,
    /// File-wide metadata tables
    MetaData,
    /// Raw data root holding the global index and the clusters
    RawData,
    /// One cluster (all spectra sharing a scan configuration)
    Cluster,
    /// Spectrum datasets of a cluster
    Spectrum,
    /// Chromatogram datasets of a cluster
    Chromatogram,
}

impl GroupKind {
    /// Every group kind, parents before children.
    pub const ALL: [GroupKind; 6] = [
        GroupKind::Root,
        GroupKind::MetaData,
        GroupKind::RawData,
        GroupKind::Cluster,
        GroupKind::Spectrum,
        GroupKind::Chromatogram,
    ];

    /// Whether groups of this kind exist once per cluster.
    pub fn is_per_cluster(&self) -> bool {
        matches!(
            self,
            GroupKind::Cluster | GroupKind::Spectrum | GroupKind::Chromatogram
        )
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Element type of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Unsigned 32-bit integer
    UInt32,
    /// Signed 32-bit integer
    Int32,
    /// Single precision float
    Float32,
    /// Double precision float
    Float64,
    /// Record table with a named column layout
    Compound(&'static str),
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::UInt32 => write!(f, "u32"),
            ElementType::Int32 => write!(f, "i32"),
            ElementType::Float32 => write!(f, "f32"),
            ElementType::Float64 => write!(f, "f64"),
            ElementType::Compound(name) => write!(f, "compound<{}>", name),
        }
    }
}

/// Floating point precision policy for m/z and time values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Store as 64-bit floats (lossless)
    #[default]
    Float64,
    /// Store as 32-bit floats
    Float32,
}

impl Precision {
    /// Element type used for datasets stored with this precision.
    pub fn element_type(&self) -> ElementType {
        match self {
            Precision::Float64 => ElementType::Float64,
            Precision::Float32 => ElementType::Float32,
        }
    }
}
