use std::path::Path;
use std::sync::{Mutex, OnceLock};

use crate::config::{Configuration, DatasetKind, NO_CLUSTER};
use crate::container::{Container, OpenPolicy};
use crate::references::ReferenceTables;

use super::{LoadPolicy, ReaderConfig, ReaderError, TriMs5Reader};

impl TriMs5Reader {
    /// Open a triMS5 file with the default configuration
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReaderError> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    /// Open a triMS5 file
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: ReaderConfig) -> Result<Self, ReaderError> {
        let container = Container::open(path, OpenPolicy::ReadOnly, Configuration::new())?;
        Self::from_container(container, config)
    }

    /// Read from an already opened container
    pub fn from_container(container: Container, config: ReaderConfig) -> Result<Self, ReaderError> {
        let tables = ReferenceTables::load(&container)?;
        let metadata = tables.metadata()?;
        let size = container
            .count(DatasetKind::SpectrumListIndices, NO_CLUSTER)
            .map_or(0, |count| count as usize);

        let reader = Self {
            container,
            config,
            tables,
            metadata,
            size,
            init: Mutex::new(()),
            spectra: OnceLock::new(),
            chromatograms: OnceLock::new(),
        };
        if reader.config.load_policy == LoadPolicy::OnOpen {
            reader.spectra()?;
            reader.chromatograms()?;
        }
        log::info!(
            "Opened {} ({} spectra, {} chromatograms)",
            reader.container.path().display(),
            reader.size,
            reader.chromatogram_count()
        );
        Ok(reader)
    }

    /// Number of spectra. Available without loading the index tables.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the file holds no spectra
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Reader configuration
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}
