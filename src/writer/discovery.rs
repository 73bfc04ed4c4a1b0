use std::collections::BTreeMap;

use crate::model::SpectrumSource;
use crate::schema::SpectrumListIndex;

use super::cancel::CancellationToken;
use super::error::WriterError;

/// Cluster id used when spectra cannot be partitioned by their tags
pub const FALLBACK_CLUSTER_ID: i32 = 1;

/// Partition of a spectrum source into clusters of equal preset scan
/// configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterLayout {
    members: BTreeMap<i32, Vec<usize>>,
    global_index: Vec<SpectrumListIndex>,
    fallback: bool,
}

impl ClusterLayout {
    /// Scan `source` once without binary data and partition it by the
    /// preset scan configuration tag of each spectrum.
    pub fn discover<S: SpectrumSource + ?Sized>(
        source: &S,
        cancel: &CancellationToken,
    ) -> Result<Self, WriterError> {
        let mut tags = Vec::with_capacity(source.len());
        for index in 0..source.len() {
            if cancel.is_cancelled() {
                return Err(WriterError::Cancelled { spectra_written: 0 });
            }
            let spectrum = source.spectrum(index, false)?;
            tags.push(spectrum.preset_scan_configuration());
        }
        Ok(Self::from_tags(&tags))
    }

    /// Partition spectra given the tag of each one, in acquisition order.
    ///
    /// A single untagged spectrum (or a negative tag, which would collide with
    /// the "no cluster" sentinel) collapses the whole run into one cluster
    /// with id [`FALLBACK_CLUSTER_ID`]. An empty run gets that cluster too.
    pub fn from_tags(tags: &[Option<i32>]) -> Self {
        let tagged: Option<Vec<i32>> = tags
            .iter()
            .map(|tag| tag.filter(|id| *id >= 0))
            .collect();
        let (tags, fallback) = match tagged {
            Some(tags) if !tags.is_empty() => (tags, false),
            _ => (vec![FALLBACK_CLUSTER_ID; tags.len()], true),
        };

        let mut members: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        let mut global_index = Vec::with_capacity(tags.len());
        for (index, cluster_id) in tags.into_iter().enumerate() {
            let cluster = members.entry(cluster_id).or_default();
            global_index.push(SpectrumListIndex {
                cluster_id,
                local_index: cluster.len() as u32,
            });
            cluster.push(index);
        }
        if members.is_empty() {
            members.insert(FALLBACK_CLUSTER_ID, Vec::new());
        }

        Self {
            members,
            global_index,
            fallback,
        }
    }

    /// Distinct cluster ids, ascending
    pub fn cluster_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.members.keys().copied()
    }

    /// Number of clusters
    pub fn cluster_count(&self) -> usize {
        self.members.len()
    }

    /// Global indices of the spectra of a cluster, in acquisition order
    pub fn members(&self, cluster_id: i32) -> &[usize] {
        self.members.get(&cluster_id).map_or(&[], Vec::as_slice)
    }

    /// `(cluster, local index)` of every spectrum, in acquisition order
    pub fn global_index(&self) -> &[SpectrumListIndex] {
        &self.global_index
    }

    /// Cluster holding the file-wide chromatogram datasets: the smallest id
    pub fn chromatogram_cluster(&self) -> i32 {
        self.members
            .keys()
            .next()
            .copied()
            .unwrap_or(FALLBACK_CLUSTER_ID)
    }

    /// Whether the tags were ignored and every spectrum went to one cluster
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}
