use std::collections::HashMap;
use std::sync::PoisonError;

use crate::config::DatasetKind;
use crate::container::{Container, ContainerError};
use crate::model::{Chromatogram, ChromatogramSource, SourceError};
use crate::schema::{BinaryMetaDataRecord, ChromatogramMetaDataRecord};

use super::index::correct_offsets;
use super::{ReaderError, TriMs5Reader};

/// Chromatogram tables of the cluster holding them
#[derive(Debug, Default)]
pub(super) struct ChromatogramCatalog {
    cluster_id: i32,
    offsets: Vec<u64>,
    time_axis: Vec<f64>,
    metadata: Vec<ChromatogramMetaDataRecord>,
    binary: Vec<BinaryMetaDataRecord>,
    ids: HashMap<String, usize>,
}

/// Cluster holding the chromatogram datasets, if any
fn chromatogram_cluster(container: &Container) -> Option<i32> {
    container
        .cluster_ids()
        .into_iter()
        .find(|id| container.contains(DatasetKind::ChromatogramMetaData, *id))
}

impl ChromatogramCatalog {
    fn load(container: &Container) -> Result<Self, ReaderError> {
        let Some(cluster_id) = chromatogram_cluster(container) else {
            return Ok(Self::default());
        };

        let metadata = container
            .read_dataset::<ChromatogramMetaDataRecord>(DatasetKind::ChromatogramMetaData, cluster_id)?;
        let binary = container
            .read_dataset::<BinaryMetaDataRecord>(DatasetKind::ChromatogramBinaryMetaData, cluster_id)?;
        let offsets = correct_offsets(&container.read_dataset::<u32>(DatasetKind::ChromatogramIndex, cluster_id)?);
        let time_axis = if container.contains(DatasetKind::ChromatogramTime, cluster_id) {
            container.read_dataset::<f64>(DatasetKind::ChromatogramTime, cluster_id)?
        } else {
            Vec::new()
        };

        let corrupt = |reason: String| ReaderError::corrupt(cluster_id, reason);
        if metadata.len() != offsets.len() || binary.len() != offsets.len() {
            return Err(corrupt(format!(
                "{} chromatogram records, {} binary records and {} offsets",
                metadata.len(),
                binary.len(),
                offsets.len()
            )));
        }
        let total = offsets.last().copied().unwrap_or(0);
        for kind in [DatasetKind::ChromatogramTimeIndices, DatasetKind::ChromatogramIntensity] {
            let count = container.count(kind, cluster_id).unwrap_or(0);
            if count != total {
                return Err(corrupt(format!(
                    "{} holds {} samples but the chromatogram index ends at {}",
                    kind, count, total
                )));
            }
        }

        let mut ids = HashMap::with_capacity(metadata.len());
        for (index, record) in metadata.iter().enumerate() {
            ids.entry(record.id.clone()).or_insert(index);
        }
        Ok(Self {
            cluster_id,
            offsets,
            time_axis,
            metadata,
            binary,
            ids,
        })
    }

    fn range(&self, index: usize) -> (u64, u64) {
        let start = match index {
            0 => 0,
            _ => self.offsets[index - 1],
        };
        (start, self.offsets[index])
    }

    fn times(&self, indices: &[u32]) -> Result<Vec<f64>, ContainerError> {
        indices
            .iter()
            .map(|index| {
                self.time_axis.get(*index as usize).copied().ok_or_else(|| {
                    ContainerError::InvalidFormat(format!(
                        "time index {} outside an axis of {} values in cluster {}",
                        index,
                        self.time_axis.len(),
                        self.cluster_id
                    ))
                })
            })
            .collect()
    }
}

impl TriMs5Reader {
    pub(super) fn chromatograms(&self) -> Result<&ChromatogramCatalog, ReaderError> {
        if let Some(catalog) = self.chromatograms.get() {
            return Ok(catalog);
        }
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(catalog) = self.chromatograms.get() {
            return Ok(catalog);
        }
        let catalog = ChromatogramCatalog::load(&self.container)?;
        Ok(self.chromatograms.get_or_init(|| catalog))
    }

    /// Number of chromatograms. Available without loading the index tables.
    pub fn chromatogram_count(&self) -> usize {
        chromatogram_cluster(&self.container)
            .and_then(|id| self.container.count(DatasetKind::ChromatogramMetaData, id))
            .map_or(0, |count| count as usize)
    }

    /// Index of the chromatogram with native id `id`, or
    /// [`chromatogram_count`](Self::chromatogram_count) when there is none
    pub fn find_chromatogram(&self, id: &str) -> Result<usize, ReaderError> {
        let catalog = self.chromatograms()?;
        Ok(catalog.ids.get(id).copied().unwrap_or(catalog.metadata.len()))
    }

    /// Chromatogram at `index`, with its time and intensity arrays when
    /// `include_binary`
    pub fn chromatogram(&self, index: usize, include_binary: bool) -> Result<Chromatogram, ReaderError> {
        let catalog = self.chromatograms()?;
        let (Some(record), Some(binary)) = (catalog.metadata.get(index), catalog.binary.get(index)) else {
            return Err(ReaderError::OutOfRange {
                index,
                size: catalog.metadata.len(),
            });
        };

        let fetch_error = |source| ReaderError::ChromatogramFetch { index, source };

        let mut chromatogram = self.tables.chromatogram(record, binary).map_err(fetch_error)?;
        chromatogram.index = index;
        if include_binary && binary.has_arrays {
            let (start, end) = catalog.range(index);
            let indices = self
                .container
                .get_range::<u32>(DatasetKind::ChromatogramTimeIndices, catalog.cluster_id, start, end)
                .map_err(fetch_error)?;
            let intensity = self
                .container
                .get_range::<f32>(DatasetKind::ChromatogramIntensity, catalog.cluster_id, start, end)
                .map_err(fetch_error)?;
            chromatogram.time = Some(catalog.times(&indices).map_err(fetch_error)?);
            chromatogram.intensity = Some(intensity);
            chromatogram.default_array_length = (end - start) as usize;
        }
        Ok(chromatogram)
    }
}

impl ChromatogramSource for TriMs5Reader {
    fn len(&self) -> usize {
        self.chromatogram_count()
    }

    fn chromatogram(&self, index: usize, include_binary: bool) -> Result<Chromatogram, SourceError> {
        TriMs5Reader::chromatogram(self, index, include_binary).map_err(|err| match err {
            ReaderError::OutOfRange { index, size } => SourceError::OutOfRange { index, size },
            err => SourceError::Fetch {
                index,
                source: Box::new(err),
            },
        })
    }
}
