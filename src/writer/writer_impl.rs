use std::fs;
use std::path::Path;

use crate::config::{Configuration, DatasetKind, GroupKind, Precision, WriteConfig, NO_CLUSTER};
use crate::container::{Container, OpenPolicy};
use crate::model::{ChromatogramSource, MsRun, MsRunMetadata, SpectrumSource};
use crate::references::ReferenceWriter;
use crate::schema::FileInformation;

use super::cancel::CancellationToken;
use super::dictionary::MassDictionary;
use super::discovery::ClusterLayout;
use super::error::WriterError;
use super::stats::WriterStats;

/// Spectra between two progress log lines
const PROGRESS_INTERVAL: usize = 1000;

/// Writer turning spectrum and chromatogram sources into a triMS5 container.
///
/// A writer owns its container and consumes itself in [`TriMs5Writer::write`]:
/// one writer produces exactly one file.
#[derive(Debug)]
pub struct TriMs5Writer {
    container: Container,
    cancel: CancellationToken,
}

impl TriMs5Writer {
    /// Create a new container at `path`
    pub fn create<P: AsRef<Path>>(
        path: P,
        policy: OpenPolicy,
        config: &WriteConfig,
    ) -> Result<Self, WriterError> {
        let container = Container::open(path, policy, Configuration::from_write_config(config))?;
        Ok(Self::from_container(container))
    }

    /// Write into an already opened container
    pub fn from_container(container: Container) -> Self {
        Self {
            container,
            cancel: CancellationToken::new(),
        }
    }

    /// Observe `token` between spectra (builder pattern)
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token cancelling this writer
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Target container
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Write an in-memory run
    pub fn write_run(self, run: &MsRun) -> Result<WriterStats, WriterError> {
        self.write(&run.metadata, &run.spectra, &run.chromatograms)
    }

    /// Write every spectrum and chromatogram of the sources together with the
    /// file-wide metadata, then close the container.
    ///
    /// On cancellation the container is closed without its version record and
    /// [`WriterError::Cancelled`] is returned.
    pub fn write<S, C>(
        mut self,
        metadata: &MsRunMetadata,
        spectra: &S,
        chromatograms: &C,
    ) -> Result<WriterStats, WriterError>
    where
        S: SpectrumSource + ?Sized,
        C: ChromatogramSource + ?Sized,
    {
        let path = self.container.path().to_path_buf();
        match self.write_all(metadata, spectra, chromatograms) {
            Ok(mut stats) => {
                self.container.close()?;
                stats.file_size_bytes = fs::metadata(&path)?.len();
                log::info!("{} to {}", stats, path.display());
                Ok(stats)
            }
            Err(WriterError::Cancelled { spectra_written }) => {
                log::warn!(
                    "Write to {} cancelled after {} spectra, file is incomplete",
                    path.display(),
                    spectra_written
                );
                self.container.close()?;
                Err(WriterError::Cancelled { spectra_written })
            }
            Err(err) => Err(err),
        }
    }

    fn write_all<S, C>(
        &mut self,
        metadata: &MsRunMetadata,
        spectra: &S,
        chromatograms: &C,
    ) -> Result<WriterStats, WriterError>
    where
        S: SpectrumSource + ?Sized,
        C: ChromatogramSource + ?Sized,
    {
        let layout = ClusterLayout::discover(spectra, &self.cancel)?;
        if layout.is_fallback() && !spectra.is_empty() {
            log::info!(
                "Not every spectrum carries a preset scan configuration, writing all {} spectra into one cluster",
                spectra.len()
            );
        }
        log::info!(
            "Discovered {} clusters for {} spectra",
            layout.cluster_count(),
            spectra.len()
        );

        let mut references = ReferenceWriter::new(metadata)?;
        self.write_structure(&layout)?;

        let mut stats = WriterStats {
            clusters: layout.cluster_count(),
            ..WriterStats::default()
        };
        stats.chromatograms_written = self.write_chromatograms(&layout, chromatograms, &mut references)?;

        for cluster_id in layout.cluster_ids() {
            self.write_cluster(cluster_id, layout.members(cluster_id), spectra, &mut references, &mut stats)?;
        }

        log::info!("Writing file-wide metadata");
        references.write_to(&mut self.container)?;
        let version = FileInformation::from_version(self.container.config().version());
        self.container
            .create_and_write(DatasetKind::FileInformation, NO_CLUSTER, &[version])?;
        Ok(stats)
    }

    fn write_structure(&mut self, layout: &ClusterLayout) -> Result<(), WriterError> {
        self.container.open_group(GroupKind::MetaData, NO_CLUSTER)?;
        self.container.open_group(GroupKind::RawData, NO_CLUSTER)?;
        for cluster_id in layout.cluster_ids() {
            self.container.open_group(GroupKind::Spectrum, cluster_id)?;
            self.container.open_group(GroupKind::Chromatogram, cluster_id)?;
        }

        self.container.create_and_write(
            DatasetKind::SpectrumListIndices,
            NO_CLUSTER,
            layout.global_index(),
        )?;
        self.container.write_attribute(
            GroupKind::RawData,
            NO_CLUSTER,
            "NumberOfPresetScanConfigurations",
            layout.cluster_count(),
        )?;
        self.container.write_attribute(
            GroupKind::Root,
            NO_CLUSTER,
            "created",
            chrono::Utc::now().to_rfc3339(),
        )?;
        self.container.write_attribute(
            GroupKind::Root,
            NO_CLUSTER,
            "writer",
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        )?;
        Ok(())
    }

    fn write_chromatograms<C: ChromatogramSource + ?Sized>(
        &mut self,
        layout: &ClusterLayout,
        chromatograms: &C,
        references: &mut ReferenceWriter,
    ) -> Result<usize, WriterError> {
        let cluster_id = layout.chromatogram_cluster();
        let precision = self.container.config().write_config().time_precision;
        let mut times = MassDictionary::new(precision);
        let mut offsets = Vec::with_capacity(chromatograms.len());
        let mut metadata = Vec::with_capacity(chromatograms.len());
        let mut binary = Vec::with_capacity(chromatograms.len());
        let mut end = 0u64;

        for index in 0..chromatograms.len() {
            if self.cancel.is_cancelled() {
                return Err(WriterError::Cancelled { spectra_written: 0 });
            }
            let chromatogram = chromatograms.chromatogram(index, true)?;
            let (time, intensity) =
                sample_arrays(index, chromatogram.time.as_deref(), chromatogram.intensity.as_deref())?;
            times.extend(time).ok_or_else(|| WriterError::InvalidData {
                index,
                reason: "too many distinct chromatogram time values".to_string(),
            })?;
            if !intensity.is_empty() {
                self.container
                    .extend(DatasetKind::ChromatogramIntensity, cluster_id, intensity)?;
            }
            end += time.len() as u64;
            // Wraps at 2^32, readers correct
            offsets.push(end as u32);

            let (mut record, binary_record) = references.chromatogram_records(&chromatogram)?;
            record.index = index as u64;
            record.default_array_length = time.len() as u64;
            metadata.push(record);
            binary.push(binary_record);
        }

        let time = times.finish();
        let axis_length = time.axis.len();
        self.write_axis(DatasetKind::ChromatogramTime, cluster_id, time.axis, precision)?;
        self.container
            .create_and_write(DatasetKind::ChromatogramTimeIndices, cluster_id, &time.indices)?;
        self.container
            .finish_dataset::<f32>(DatasetKind::ChromatogramIntensity, cluster_id)?;
        self.container
            .create_and_write(DatasetKind::ChromatogramIndex, cluster_id, &offsets)?;
        self.container
            .create_and_write(DatasetKind::ChromatogramMetaData, cluster_id, &metadata)?;
        self.container
            .create_and_write(DatasetKind::ChromatogramBinaryMetaData, cluster_id, &binary)?;

        for id in layout.cluster_ids() {
            let length = if id == cluster_id { axis_length } else { 0 };
            self.container
                .write_attribute(GroupKind::Chromatogram, id, "ChromatogramLength", length)?;
        }
        log::info!(
            "Wrote {} chromatograms ({} points) into cluster {}",
            metadata.len(),
            end,
            cluster_id
        );
        Ok(metadata.len())
    }

    fn write_cluster<S: SpectrumSource + ?Sized>(
        &mut self,
        cluster_id: i32,
        members: &[usize],
        spectra: &S,
        references: &mut ReferenceWriter,
        stats: &mut WriterStats,
    ) -> Result<(), WriterError> {
        let precision = self.container.config().write_config().mz_precision;
        let mut dictionary = MassDictionary::new(precision);
        let mut offsets = Vec::with_capacity(members.len());
        let mut metadata = Vec::with_capacity(members.len());
        let mut binary = Vec::with_capacity(members.len());
        let mut end = 0u64;

        for &index in members {
            if self.cancel.is_cancelled() {
                return Err(WriterError::Cancelled {
                    spectra_written: stats.spectra_written,
                });
            }
            let spectrum = spectra.spectrum(index, true)?;
            let (mz, intensity) = sample_arrays(index, spectrum.mz.as_deref(), spectrum.intensity.as_deref())?;
            dictionary.extend(mz).ok_or_else(|| WriterError::InvalidData {
                index,
                reason: format!("too many distinct m/z values in cluster {}", cluster_id),
            })?;
            if !intensity.is_empty() {
                self.container
                    .extend(DatasetKind::SpectrumIntensity, cluster_id, intensity)?;
            }
            end += mz.len() as u64;
            // Wraps at 2^32, readers correct
            offsets.push(end as u32);

            let (mut record, binary_record) = references.spectrum_records(&spectrum)?;
            record.index = index as u64;
            record.default_array_length = mz.len() as u64;
            metadata.push(record);
            binary.push(binary_record);

            stats.spectra_written += 1;
            stats.raw_data_points += mz.len() as u64;
            if stats.spectra_written % PROGRESS_INTERVAL == 0 {
                log::debug!("Wrote {} spectra", stats.spectra_written);
            }
        }

        let mass = dictionary.finish();
        let axis_length = mass.axis.len();
        self.write_axis(DatasetKind::SpectrumMassAxis, cluster_id, mass.axis, precision)?;
        self.container
            .create_and_write(DatasetKind::SpectrumMassIndices, cluster_id, &mass.indices)?;
        self.container
            .finish_dataset::<f32>(DatasetKind::SpectrumIntensity, cluster_id)?;
        self.container
            .create_and_write(DatasetKind::SpectrumIndex, cluster_id, &offsets)?;
        self.container
            .create_and_write(DatasetKind::SpectrumMetaData, cluster_id, &metadata)?;
        self.container
            .create_and_write(DatasetKind::SpectrumBinaryMetaData, cluster_id, &binary)?;

        self.container
            .write_attribute(GroupKind::Spectrum, cluster_id, "NumberOfRawDataPoints", end)?;
        self.container
            .write_attribute(GroupKind::Spectrum, cluster_id, "MassAxisLength", axis_length)?;
        self.container
            .write_attribute(GroupKind::Spectrum, cluster_id, "NumberOfDTbins", 0i32)?;

        log::debug!(
            "Cluster {}: {} spectra, {} raw data points, {} distinct m/z values",
            cluster_id,
            members.len(),
            end,
            axis_length
        );
        Ok(())
    }

    fn write_axis(
        &mut self,
        kind: DatasetKind,
        cluster_id: i32,
        axis: Vec<f64>,
        precision: Precision,
    ) -> Result<(), WriterError> {
        match precision {
            Precision::Float64 => self.container.create_and_write(kind, cluster_id, &axis)?,
            Precision::Float32 => {
                let axis: Vec<f32> = axis.iter().map(|value| *value as f32).collect();
                self.container.create_and_write(kind, cluster_id, &axis)?
            }
        }
        Ok(())
    }
}

/// Paired x and intensity samples; a missing array counts as empty.
fn sample_arrays<'a>(
    index: usize,
    x: Option<&'a [f64]>,
    intensity: Option<&'a [f32]>,
) -> Result<(&'a [f64], &'a [f32]), WriterError> {
    let x = x.unwrap_or_default();
    let intensity = intensity.unwrap_or_default();
    if x.len() != intensity.len() {
        return Err(WriterError::InvalidData {
            index,
            reason: format!(
                "{} x values but {} intensities",
                x.len(),
                intensity.len()
            ),
        });
    }
    Ok((x, intensity))
}
