//! In-memory model of a run: spectra, chromatograms and the file-wide
//! metadata they reference by id.

mod chromatogram;
pub mod native_id;
mod params;
mod run;
mod source;
mod spectrum;

pub use chromatogram::Chromatogram;
pub use params::{CvParam, ParamList, UserParam};
pub use run::{
    ControlledVocabulary, DataProcessing, InstrumentConfiguration, MsRun, MsRunMetadata,
    ParamGroup, Run, Sample, ScanSettings, Software, SourceFile,
};
pub use source::{ChromatogramSource, SourceError, SpectrumSource};
pub use spectrum::{BinaryArrays, Precursor, Scan, Spectrum, SpectrumIdentity};
