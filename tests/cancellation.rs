//! Integration tests for cancelled and failed writes
//!
//! A container is only valid once its trailing version record is written.
//! These tests verify that interrupted writes never produce a file that reads
//! as a complete, shorter run.

mod common;

use common::{init_logging, run_of, spectrum};
use tempfile::TempDir;
use trims5::prelude::*;

/// Spectrum source that cancels a token once a given spectrum is fetched
struct CancellingSource {
    spectra: Vec<Spectrum>,
    token: CancellationToken,
    cancel_at: usize,
}

impl SpectrumSource for CancellingSource {
    fn len(&self) -> usize {
        self.spectra.len()
    }

    fn spectrum(&self, index: usize, include_binary: bool) -> Result<Spectrum, SourceError> {
        if include_binary && index == self.cancel_at {
            self.token.cancel();
        }
        self.spectra.spectrum(index, include_binary)
    }
}

/// Spectrum source failing on one index
struct FailingSource {
    spectra: Vec<Spectrum>,
    fail_at: usize,
}

impl SpectrumSource for FailingSource {
    fn len(&self) -> usize {
        self.spectra.len()
    }

    fn spectrum(&self, index: usize, include_binary: bool) -> Result<Spectrum, SourceError> {
        if include_binary && index == self.fail_at {
            return Err(SourceError::Fetch {
                index,
                source: "decoder failed".into(),
            });
        }
        self.spectra.spectrum(index, include_binary)
    }
}

fn five_spectra() -> Vec<Spectrum> {
    (0..5)
        .map(|i| spectrum(i, Some(1), vec![100.0 + i as f64, 200.0]))
        .collect()
}

#[test]
fn test_cancel_after_second_spectrum() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cancelled.trims5");
    let token = CancellationToken::new();
    let source = CancellingSource {
        spectra: five_spectra(),
        token: token.clone(),
        cancel_at: 1,
    };

    let err = TriMs5Writer::create(&path, OpenPolicy::FailIfExists, &WriteConfig::default())
        .unwrap()
        .with_cancellation(token)
        .write(&MsRunMetadata::new(), &source, &Vec::<Chromatogram>::new())
        .unwrap_err();
    assert!(
        matches!(err, WriterError::Cancelled { spectra_written: 2 }),
        "unexpected error: {}",
        err
    );

    // The file exists but must not read as a valid, truncated run
    assert!(path.exists());
    let err = TriMs5Reader::open(&path).unwrap_err();
    assert!(matches!(
        err,
        ReaderError::Container(ContainerError::IncompleteWrite(_))
    ));
}

#[test]
fn test_cancellation_token_is_shared() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shared.trims5");
    let writer = TriMs5Writer::create(&path, OpenPolicy::FailIfExists, &WriteConfig::default()).unwrap();
    let token = writer.cancellation_token();
    assert!(!token.is_cancelled());
    token.cancel();

    let err = writer.write_run(&run_of(five_spectra())).unwrap_err();
    assert!(matches!(err, WriterError::Cancelled { spectra_written: 0 }));
}

#[test]
fn test_source_failure_reports_index() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("failed.trims5");
    let source = FailingSource {
        spectra: five_spectra(),
        fail_at: 3,
    };

    let err = TriMs5Writer::create(&path, OpenPolicy::FailIfExists, &WriteConfig::default())
        .unwrap()
        .write(&MsRunMetadata::new(), &source, &Vec::<Chromatogram>::new())
        .unwrap_err();
    assert!(matches!(
        err,
        WriterError::Source(SourceError::Fetch { index: 3, .. })
    ));
    assert!(matches!(
        TriMs5Reader::open(&path).unwrap_err(),
        ReaderError::Container(ContainerError::IncompleteWrite(_))
    ));
}

#[test]
fn test_existing_file_is_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("taken.trims5");
    std::fs::write(&path, b"keep me").unwrap();

    let err = TriMs5Writer::create(&path, OpenPolicy::FailIfExists, &WriteConfig::default()).unwrap_err();
    assert!(matches!(err, WriterError::Container(ContainerError::AlreadyExists(_))));
    assert_eq!(std::fs::read(&path).unwrap(), b"keep me");

    TriMs5Writer::create(&path, OpenPolicy::RemoveAndCreate, &WriteConfig::default())
        .unwrap()
        .write_run(&run_of(five_spectra()))
        .unwrap();
    assert_eq!(TriMs5Reader::open(&path).unwrap().size(), 5);
}
