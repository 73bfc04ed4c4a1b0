//! # triMS5 Reader Module
//!
//! Random access to the spectra and chromatograms of a triMS5 container.
//!
//! ## Lifecycle
//!
//! Opening validates the container and loads the file-wide metadata. The
//! per-cluster index tables (offsets, mass axis, metadata records) are loaded
//! once, either on the first query or while opening under
//! [`LoadPolicy::OnOpen`], and then shared by every query. Identity lookups
//! after that point take no lock.
//!
//! Binary arrays are read per spectrum: only the row groups of the mass index
//! and intensity datasets overlapping the spectrum are decoded, and the mass
//! indices are translated through the cluster's mass axis.
//!
//! ## Example
//!
//! ```rust,no_run
//! use trims5::reader::TriMs5Reader;
//!
//! let reader = TriMs5Reader::open("run.trims5")?;
//! println!("{} spectra", reader.size());
//!
//! let index = reader.find("controllerType=0 controllerNumber=1 scan=42")?;
//! if index < reader.size() {
//!     let spectrum = reader.spectrum(index, true)?;
//!     println!("scan 42 has {} peaks", spectrum.peak_count());
//! }
//! # Ok::<(), trims5::reader::ReaderError>(())
//! ```

mod chromatograms;
mod cluster;
mod config;
mod error;
mod index;
mod metadata;
mod open;
mod spectra;


use std::sync::{Mutex, OnceLock};

pub use config::{LoadPolicy, ReaderConfig};
pub use error::ReaderError;
pub use index::correct_offsets;

use chromatograms::ChromatogramCatalog;
use spectra::SpectrumCatalog;

use crate::container::Container;
use crate::model::MsRunMetadata;
use crate::references::ReferenceTables;

/// Reader for triMS5 files
pub struct TriMs5Reader {
    container: Container,
    config: ReaderConfig,
    tables: ReferenceTables,
    metadata: MsRunMetadata,
    size: usize,
    init: Mutex<()>,
    spectra: OnceLock<SpectrumCatalog>,
    chromatograms: OnceLock<ChromatogramCatalog>,
}

impl std::fmt::Debug for TriMs5Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriMs5Reader")
            .field("path", &self.container.path())
            .field("size", &self.size)
            .field("config", &self.config)
            .field("initialized", &self.spectra.get().is_some())
            .finish()
    }
}
