use std::collections::{BTreeMap, HashMap};
use std::sync::PoisonError;

use crate::config::{DatasetKind, NO_CLUSTER};
use crate::container::{Container, ContainerError};
use crate::model::{native_id, SourceError, Spectrum, SpectrumIdentity, SpectrumSource};
use crate::schema::SpectrumListIndex;

use super::cluster::ClusterIndex;
use super::{ReaderError, TriMs5Reader};

/// Global index, cluster tables and identity lookups, built once per reader
#[derive(Debug)]
pub(super) struct SpectrumCatalog {
    global: Vec<SpectrumListIndex>,
    clusters: BTreeMap<i32, ClusterIndex>,
    identities: Vec<SpectrumIdentity>,
    ids: HashMap<String, usize>,
    spots: HashMap<String, Vec<usize>>,
}

impl SpectrumCatalog {
    fn load(container: &Container) -> Result<Self, ReaderError> {
        let global = if container.contains(DatasetKind::SpectrumListIndices, NO_CLUSTER) {
            container.read_dataset::<SpectrumListIndex>(DatasetKind::SpectrumListIndices, NO_CLUSTER)?
        } else {
            Vec::new()
        };

        let mut clusters = BTreeMap::new();
        for cluster_id in container.cluster_ids() {
            if container.contains(DatasetKind::SpectrumIndex, cluster_id) {
                clusters.insert(cluster_id, ClusterIndex::load(container, cluster_id)?);
            }
        }

        let spectra_count: usize = clusters.values().map(ClusterIndex::len).sum();
        if spectra_count != global.len() {
            return Err(ReaderError::corrupt(
                NO_CLUSTER,
                format!(
                    "global index lists {} spectra but the clusters hold {}",
                    global.len(),
                    spectra_count
                ),
            ));
        }

        let mut identities = Vec::with_capacity(global.len());
        let mut ids = HashMap::with_capacity(global.len());
        let mut spots: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, entry) in global.iter().enumerate() {
            let cluster = clusters.get(&entry.cluster_id).ok_or_else(|| {
                ReaderError::corrupt(entry.cluster_id, "referenced by the global index but not stored")
            })?;
            let record = cluster.metadata.get(entry.local_index as usize).ok_or_else(|| {
                ReaderError::corrupt(
                    entry.cluster_id,
                    format!(
                        "local index {} of spectrum {} exceeds {} spectra",
                        entry.local_index,
                        index,
                        cluster.len()
                    ),
                )
            })?;

            ids.entry(record.id.clone()).or_insert(index);
            if !record.spot_id.is_empty() {
                spots.entry(record.spot_id.clone()).or_default().push(index);
            }
            identities.push(SpectrumIdentity {
                index,
                id: record.id.clone(),
                spot_id: record.spot_id.clone(),
            });
        }

        Ok(Self {
            global,
            clusters,
            identities,
            ids,
            spots,
        })
    }
}

impl TriMs5Reader {
    /// Index tables, loaded on first use
    pub(super) fn spectra(&self) -> Result<&SpectrumCatalog, ReaderError> {
        if let Some(catalog) = self.spectra.get() {
            return Ok(catalog);
        }
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(catalog) = self.spectra.get() {
            return Ok(catalog);
        }
        let catalog = SpectrumCatalog::load(&self.container)?;
        log::debug!(
            "Loaded spectrum index: {} spectra in {} clusters",
            catalog.global.len(),
            catalog.clusters.len()
        );
        Ok(self.spectra.get_or_init(|| catalog))
    }

    fn check_index(&self, index: usize) -> Result<(), ReaderError> {
        if index >= self.size {
            return Err(ReaderError::OutOfRange {
                index,
                size: self.size,
            });
        }
        Ok(())
    }

    /// Global index and ids of a spectrum, without decoding it
    pub fn spectrum_identity(&self, index: usize) -> Result<&SpectrumIdentity, ReaderError> {
        self.check_index(index)?;
        self.spectra()?
            .identities
            .get(index)
            .ok_or(ReaderError::OutOfRange {
                index,
                size: self.size,
            })
    }

    /// Global index of the spectrum with native id `id`, or [`size`](Self::size)
    /// when there is none
    pub fn find(&self, id: &str) -> Result<usize, ReaderError> {
        Ok(self.spectra()?.ids.get(id).copied().unwrap_or(self.size))
    }

    /// Global index of the first spectrum with spot id `spot_id`, or
    /// [`size`](Self::size) when there is none
    pub fn find_by_spot(&self, spot_id: &str) -> Result<usize, ReaderError> {
        Ok(self
            .spectra()?
            .spots
            .get(spot_id)
            .and_then(|indices| indices.first().copied())
            .unwrap_or(self.size))
    }

    /// Global indices of every spectrum with spot id `spot_id`, ascending
    pub fn find_all_by_spot(&self, spot_id: &str) -> Result<Vec<usize>, ReaderError> {
        Ok(self.spectra()?.spots.get(spot_id).cloned().unwrap_or_default())
    }

    /// Global index of the first spectrum whose native id contains
    /// `name=value`, or [`size`](Self::size) when there is none.
    ///
    /// This is a linear scan over all native ids.
    pub fn find_by_name_value(&self, name: &str, value: &str) -> Result<usize, ReaderError> {
        Ok(self
            .spectra()?
            .identities
            .iter()
            .position(|identity| native_id::value(&identity.id, name) == Some(value))
            .unwrap_or(self.size))
    }

    /// Global indices of every spectrum whose native id contains
    /// `name=value`, ascending. This is a linear scan.
    pub fn find_all_by_name_value(&self, name: &str, value: &str) -> Result<Vec<usize>, ReaderError> {
        Ok(self
            .spectra()?
            .identities
            .iter()
            .filter(|identity| native_id::value(&identity.id, name) == Some(value))
            .map(|identity| identity.index)
            .collect())
    }

    /// Spectrum at global `index`.
    ///
    /// Metadata is always returned. With `include_binary`, the m/z and
    /// intensity arrays are read and the m/z values restored from the
    /// cluster's mass axis.
    pub fn spectrum(&self, index: usize, include_binary: bool) -> Result<Spectrum, ReaderError> {
        self.check_index(index)?;
        let catalog = self.spectra()?;
        let entry = catalog.global.get(index).ok_or(ReaderError::OutOfRange {
            index,
            size: catalog.global.len(),
        })?;
        let cluster = catalog
            .clusters
            .get(&entry.cluster_id)
            .ok_or_else(|| ReaderError::corrupt(entry.cluster_id, "cluster is not stored"))?;
        let local = entry.local_index as usize;
        let fetch_error = |source| ReaderError::SpectrumFetch { index, source };

        let binary = &cluster.binary[local];
        let mut spectrum = self
            .tables
            .spectrum(&cluster.metadata[local], binary)
            .map_err(fetch_error)?;
        spectrum.index = index;

        if include_binary && binary.has_arrays {
            let (start, end) = cluster.range(local);
            let indices = self
                .container
                .get_range::<u32>(DatasetKind::SpectrumMassIndices, entry.cluster_id, start, end)
                .map_err(fetch_error)?;
            let intensity = self
                .container
                .get_range::<f32>(DatasetKind::SpectrumIntensity, entry.cluster_id, start, end)
                .map_err(fetch_error)?;
            spectrum.mz = Some(cluster.masses(&indices).map_err(fetch_error)?);
            spectrum.intensity = Some(intensity);
            spectrum.default_array_length = (end - start) as usize;
        }
        Ok(spectrum)
    }

    /// Ids of the clusters holding spectra, ascending
    pub fn cluster_ids(&self) -> Result<Vec<i32>, ReaderError> {
        Ok(self.spectra()?.clusters.keys().copied().collect())
    }

    /// Sorted distinct m/z values of a cluster
    pub fn mass_axis(&self, cluster_id: i32) -> Result<&[f64], ReaderError> {
        Ok(self.cluster(cluster_id)?.mass_axis.as_slice())
    }

    /// Corrected cumulative end offsets of the spectra of a cluster
    pub fn spectrum_offsets(&self, cluster_id: i32) -> Result<&[u64], ReaderError> {
        Ok(self.cluster(cluster_id)?.offsets.as_slice())
    }

    fn cluster(&self, cluster_id: i32) -> Result<&ClusterIndex, ReaderError> {
        self.spectra()?
            .clusters
            .get(&cluster_id)
            .ok_or_else(|| ContainerError::NotFound(format!("cluster {}", cluster_id)).into())
    }
}

impl SpectrumSource for TriMs5Reader {
    fn len(&self) -> usize {
        self.size
    }

    fn spectrum(&self, index: usize, include_binary: bool) -> Result<Spectrum, SourceError> {
        TriMs5Reader::spectrum(self, index, include_binary).map_err(|err| match err {
            ReaderError::OutOfRange { index, size } => SourceError::OutOfRange { index, size },
            err => SourceError::Fetch {
                index,
                source: Box::new(err),
            },
        })
    }
}
