//! # triMS5 Writer Module
//!
//! Turns ordered spectrum and chromatogram sources into a complete container.
//!
//! ## Write phases
//!
//! 1. **Discovery**: one metadata-only pass over the spectra partitions them
//!    into clusters by preset scan configuration. If any spectrum is untagged
//!    the whole run falls back to a single cluster.
//!
//! 2. **Structure**: the group hierarchy and the global index
//!    (`SpectrumListIndices`) are written up front.
//!
//! 3. **Chromatograms**: written once, file-wide, into the cluster with the
//!    smallest id. Time values are dictionary encoded like m/z values.
//!
//! 4. **Clusters**: intensities stream into the cluster's intensity dataset;
//!    m/z values are interned in a [`MassDictionary`] whose provisional ids are
//!    rewritten to ranks of the sorted mass axis when the cluster is complete.
//!
//! 5. **Shared metadata**: the reference tables and parameter arenas, then the
//!    trailing `FileInformation` record. A container without that record was
//!    not completely written and will not open.
//!
//! Writing can be stopped with a [`CancellationToken`], checked between
//! spectra.

mod cancel;
mod dictionary;
mod discovery;
mod error;
mod stats;
mod writer_impl;

#[cfg(test)]
mod tests;

pub use cancel::CancellationToken;
pub use dictionary::{DictionaryAxis, MassDictionary};
pub use discovery::{ClusterLayout, FALLBACK_CLUSTER_ID};
pub use error::WriterError;
pub use stats::WriterStats;
pub use writer_impl::TriMs5Writer;
