use crate::config::DatasetKind;
use crate::container::{Container, ContainerError};
use crate::schema::{BinaryMetaDataRecord, SpectrumMetaDataRecord};

use super::error::ReaderError;
use super::index::correct_offsets;

/// Index tables of one cluster, loaded once and shared by every query
#[derive(Debug, Clone)]
pub(super) struct ClusterIndex {
    pub(super) cluster_id: i32,
    /// Corrected cumulative end offset of each spectrum
    pub(super) offsets: Vec<u64>,
    pub(super) mass_axis: Vec<f64>,
    pub(super) metadata: Vec<SpectrumMetaDataRecord>,
    pub(super) binary: Vec<BinaryMetaDataRecord>,
}

impl ClusterIndex {
    pub(super) fn load(container: &Container, cluster_id: i32) -> Result<Self, ReaderError> {
        let raw = container.read_dataset::<u32>(DatasetKind::SpectrumIndex, cluster_id)?;
        let metadata =
            container.read_dataset::<SpectrumMetaDataRecord>(DatasetKind::SpectrumMetaData, cluster_id)?;
        let binary =
            container.read_dataset::<BinaryMetaDataRecord>(DatasetKind::SpectrumBinaryMetaData, cluster_id)?;
        let mass_axis = if container.contains(DatasetKind::SpectrumMassAxis, cluster_id) {
            container.read_dataset::<f64>(DatasetKind::SpectrumMassAxis, cluster_id)?
        } else {
            Vec::new()
        };

        let index = Self {
            cluster_id,
            offsets: correct_offsets(&raw),
            mass_axis,
            metadata,
            binary,
        };
        index.validate(container)?;
        log::debug!(
            "Loaded cluster {}: {} spectra, {} raw data points, {} distinct m/z values",
            cluster_id,
            index.len(),
            index.total(),
            index.mass_axis.len()
        );
        Ok(index)
    }

    fn validate(&self, container: &Container) -> Result<(), ReaderError> {
        let corrupt = |reason: String| ReaderError::corrupt(self.cluster_id, reason);
        if self.metadata.len() != self.offsets.len() {
            return Err(corrupt(format!(
                "{} metadata records for {} spectrum offsets",
                self.metadata.len(),
                self.offsets.len()
            )));
        }
        if self.binary.len() != self.offsets.len() {
            return Err(corrupt(format!(
                "{} binary metadata records for {} spectrum offsets",
                self.binary.len(),
                self.offsets.len()
            )));
        }

        let total = self.total();
        for kind in [DatasetKind::SpectrumMassIndices, DatasetKind::SpectrumIntensity] {
            let count = container.count(kind, self.cluster_id).unwrap_or(0);
            if count != total {
                return Err(corrupt(format!(
                    "{} holds {} samples but the spectrum index ends at {}",
                    kind, count, total
                )));
            }
        }

        if self.mass_axis.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(corrupt("mass axis is not strictly ascending".to_string()));
        }
        Ok(())
    }

    /// Number of spectra
    pub(super) fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Number of raw samples
    pub(super) fn total(&self) -> u64 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Raw sample range `[start, end)` of the spectrum at `local`
    pub(super) fn range(&self, local: usize) -> (u64, u64) {
        let start = match local {
            0 => 0,
            _ => self.offsets[local - 1],
        };
        (start, self.offsets[local])
    }

    /// Translate mass indices into m/z values
    pub(super) fn masses(&self, indices: &[u32]) -> Result<Vec<f64>, ContainerError> {
        indices
            .iter()
            .map(|index| {
                self.mass_axis.get(*index as usize).copied().ok_or_else(|| {
                    ContainerError::InvalidFormat(format!(
                        "mass index {} outside an axis of {} values in cluster {}",
                        index,
                        self.mass_axis.len(),
                        self.cluster_id
                    ))
                })
            })
            .collect()
    }
}
