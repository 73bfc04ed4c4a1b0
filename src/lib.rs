//! # triMS5 - Clustered, Dictionary-Compressed Mass Spectrometry Containers
//!
//! `trims5` reads and writes triMS5 containers: a single file holding one
//! mass spectrometry acquisition, with spectra partitioned into clusters by
//! preset scan configuration and the m/z values of each cluster stored once
//! in a sorted mass axis.
//!
//! ## Key Features
//!
//! - **Cluster Partitioning**: Spectra acquired with the same scan
//!   configuration share a mass axis, so repeated m/z values across scans are
//!   stored as 32-bit indices instead of doubles.
//!
//! - **Chunked Random Access**: Every dataset is an Apache Parquet file whose
//!   row groups are the chunks; reading one spectrum decodes only the chunks
//!   that overlap it.
//!
//! - **Self-Describing Hierarchy**: Groups are ZIP directories, datasets are
//!   uncompressed ZIP entries and group attributes are small JSON documents,
//!   so the layout can be inspected with standard tools.
//!
//! - **Versioned**: A trailing `FileInformation` record is written last. Files
//!   without it were not completely written and are rejected.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trims5::prelude::*;
//!
//! let spectra = vec![
//!     Spectrum::new(0, "scan=1")
//!         .with_arrays(vec![100.0, 200.0], vec![10.0, 20.0])
//!         .with_preset_scan_configuration(1),
//! ];
//! let run = MsRun {
//!     metadata: MsRunMetadata::new(),
//!     spectra,
//!     chromatograms: Vec::new(),
//! };
//!
//! let stats = TriMs5Writer::create("run.trims5", OpenPolicy::FailIfExists, &WriteConfig::default())?
//!     .write_run(&run)?;
//! println!("{}", stats);
//!
//! let reader = TriMs5Reader::open("run.trims5")?;
//! let spectrum = reader.spectrum(0, true)?;
//! assert_eq!(spectrum.mz, Some(vec![100.0, 200.0]));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Layout
//!
//! ```text
//! run.trims5 (ZIP)
//! ├── mimetype                                   application/vnd.trims5
//! ├── .attributes.json                           triMS5, created, writer
//! ├── FileInformation.parquet                    written last
//! ├── MetaData/                                  file-wide reference tables
//! └── RawData/
//!     ├── SpectrumListIndices.parquet            (cluster, local index) per spectrum
//!     └── Cluster_1/
//!         ├── Spectrum/                          index, metadata, intensities, mass axis
//!         └── Chromatogram/                      chromatograms (smallest cluster only)
//! ```
//!
//! ## Architecture
//!
//! - [`config`]: dataset and group naming, element types, chunk and buffer sizes
//! - [`container`]: the archive, its catalog and typed dataset I/O
//! - [`schema`]: record layouts of the metadata datasets
//! - [`references`]: shared reference tables and parameter arenas
//! - [`model`]: in-memory spectra, chromatograms and run metadata
//! - [`writer`]: turns spectrum sources into containers
//! - [`reader`]: random access to the spectra of a container
//! - [`controlled_vocabulary`]: PSI-MS terms used by the model

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
// Allow some patterns common in scientific code
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod container;
pub mod controlled_vocabulary;
pub mod model;
pub mod reader;
pub mod references;
pub mod schema;
pub mod writer;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{
        CompressionType, Configuration, DatasetKind, FormatVersion, GroupKind, Precision,
        WriteConfig, NO_CLUSTER,
    };
    pub use crate::container::{Container, ContainerError, OpenPolicy};
    pub use crate::controlled_vocabulary::{ms_terms, CvTerm};
    pub use crate::model::{
        Chromatogram, ChromatogramSource, MsRun, MsRunMetadata, ParamList, SourceError, Spectrum,
        SpectrumIdentity, SpectrumSource, UserParam,
    };
    pub use crate::reader::{LoadPolicy, ReaderConfig, ReaderError, TriMs5Reader};
    pub use crate::writer::{CancellationToken, TriMs5Writer, WriterError, WriterStats};
}
