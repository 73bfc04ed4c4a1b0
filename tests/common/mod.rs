//! Shared builders for the integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use trims5::prelude::*;

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Spectrum with a Thermo-style native id, tagged with `cluster` when given.
/// Intensities are derived from the position so every sample is distinct.
pub fn spectrum(index: usize, cluster: Option<i32>, mz: Vec<f64>) -> Spectrum {
    let intensity = (0..mz.len())
        .map(|i| (index * 1000 + i) as f32 + 0.5)
        .collect();
    let spectrum = Spectrum::new(
        index,
        format!("controllerType=0 controllerNumber=1 scan={}", index + 1),
    )
    .with_arrays(mz, intensity);
    match cluster {
        Some(id) => spectrum.with_preset_scan_configuration(id),
        None => spectrum,
    }
}

/// A run holding `spectra` and no chromatograms
pub fn run_of(spectra: Vec<Spectrum>) -> MsRun {
    MsRun {
        metadata: MsRunMetadata::new(),
        spectra,
        chromatograms: Vec::new(),
    }
}

/// Write `run` into `dir` with the default configuration
pub fn write(dir: &TempDir, name: &str, run: &MsRun) -> PathBuf {
    write_with(dir.path(), name, run, &WriteConfig::default())
}

/// Write `run` into `dir` with `config`
pub fn write_with(dir: &Path, name: &str, run: &MsRun, config: &WriteConfig) -> PathBuf {
    init_logging();
    let path = dir.join(name);
    TriMs5Writer::create(&path, OpenPolicy::FailIfExists, config)
        .expect("Failed to create writer")
        .write_run(run)
        .expect("Failed to write run");
    path
}
