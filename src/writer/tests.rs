use super::*;
use crate::config::{Configuration, DatasetKind, GroupKind, Precision, WriteConfig, NO_CLUSTER};
use crate::container::{AttributeValue, Container, ContainerError, OpenPolicy};
use crate::model::{Chromatogram, MsRun, MsRunMetadata, Spectrum};
use crate::schema::{SpectrumListIndex, SpectrumMetaDataRecord};
use tempfile::TempDir;

fn tagged(index: usize, cluster: i32, mz: Vec<f64>) -> Spectrum {
    let intensity = mz.iter().map(|v| *v as f32 / 10.0).collect();
    Spectrum::new(index, format!("scan={}", index + 1))
        .with_arrays(mz, intensity)
        .with_preset_scan_configuration(cluster)
}

fn two_cluster_run() -> MsRun {
    MsRun {
        metadata: MsRunMetadata::new(),
        spectra: vec![
            tagged(0, 1, vec![100.0, 100.0, 200.0]),
            tagged(1, 2, vec![50.0]),
            tagged(2, 1, vec![150.0]),
            tagged(3, 1, vec![100.0, 300.0]),
        ],
        chromatograms: vec![
            Chromatogram::new(0, "TIC").with_arrays(vec![0.5, 1.0, 1.5], vec![10.0, 20.0, 30.0]),
            Chromatogram::new(1, "BPC").with_arrays(vec![1.0, 2.0], vec![5.0, 6.0]),
        ],
    }
}

fn open_read_only(path: &std::path::Path) -> Result<Container, ContainerError> {
    Container::open(path, OpenPolicy::ReadOnly, Configuration::new())
}

#[test]
fn test_dictionary_ranks_provisional_ids() {
    let mut dictionary = MassDictionary::new(Precision::Float64);
    for value in [300.0, 100.0, 300.0, 200.0, 100.0] {
        dictionary.push(value).unwrap();
    }
    assert_eq!(dictionary.len(), 3);
    assert_eq!(dictionary.sample_count(), 5);

    let axis = dictionary.finish();
    assert_eq!(axis.axis, vec![100.0, 200.0, 300.0]);
    assert_eq!(axis.indices, vec![2, 0, 2, 1, 0]);
}

#[test]
fn test_dictionary_folds_negative_zero() {
    let mut dictionary = MassDictionary::new(Precision::Float64);
    dictionary.extend(&[0.0, -0.0, 1.0]).unwrap();
    let axis = dictionary.finish();
    assert_eq!(axis.axis.len(), 2);
    assert_eq!(axis.indices, vec![0, 0, 1]);
}

#[test]
fn test_dictionary_keys_by_stored_precision() {
    let close = [400.000_000_1, 400.000_000_2];

    let mut wide = MassDictionary::new(Precision::Float64);
    wide.extend(&close).unwrap();
    assert_eq!(wide.len(), 2);

    let mut narrow = MassDictionary::new(Precision::Float32);
    narrow.extend(&close).unwrap();
    assert_eq!(narrow.len(), 1);
    assert_eq!(narrow.finish().axis, vec![400.0f32 as f64]);
}

#[test]
fn test_layout_partitions_by_tag() {
    let layout = ClusterLayout::from_tags(&[Some(4), Some(2), Some(4), Some(4)]);
    assert!(!layout.is_fallback());
    assert_eq!(layout.cluster_ids().collect::<Vec<_>>(), vec![2, 4]);
    assert_eq!(layout.members(4), &[0, 2, 3]);
    assert_eq!(layout.members(2), &[1]);
    assert_eq!(layout.chromatogram_cluster(), 2);
    assert_eq!(
        layout.global_index()[3],
        SpectrumListIndex {
            cluster_id: 4,
            local_index: 2
        }
    );
}

#[test]
fn test_layout_falls_back_when_any_tag_is_missing() {
    let layout = ClusterLayout::from_tags(&[Some(4), None, Some(2)]);
    assert!(layout.is_fallback());
    assert_eq!(layout.cluster_ids().collect::<Vec<_>>(), vec![FALLBACK_CLUSTER_ID]);
    assert_eq!(layout.members(FALLBACK_CLUSTER_ID), &[0, 1, 2]);
    let locals: Vec<u32> = layout.global_index().iter().map(|e| e.local_index).collect();
    assert_eq!(locals, vec![0, 1, 2]);

    let negative = ClusterLayout::from_tags(&[Some(-1), Some(3)]);
    assert!(negative.is_fallback());

    let empty = ClusterLayout::from_tags(&[]);
    assert_eq!(empty.cluster_count(), 1);
    assert!(empty.members(FALLBACK_CLUSTER_ID).is_empty());
}

#[test]
fn test_discovered_layout_matches_tags() {
    let spectra: Vec<Spectrum> = [3, 1, 3]
        .iter()
        .enumerate()
        .map(|(i, tag)| Spectrum::new(i, format!("scan={}", i + 1)).with_preset_scan_configuration(*tag))
        .collect();
    let discovered = ClusterLayout::discover(&spectra, &CancellationToken::new()).unwrap();
    assert_eq!(discovered, ClusterLayout::from_tags(&[Some(3), Some(1), Some(3)]));
    assert_ne!(discovered, ClusterLayout::from_tags(&[Some(3), Some(3), Some(1)]));
}

#[test]
fn test_cluster_datasets() -> Result<(), WriterError> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clusters.trims5");
    let run = two_cluster_run();

    let stats = TriMs5Writer::create(&path, OpenPolicy::FailIfExists, &WriteConfig::default())?
        .write_run(&run)?;
    assert_eq!(stats.spectra_written, 4);
    assert_eq!(stats.clusters, 2);
    assert_eq!(stats.raw_data_points, 7);
    assert_eq!(stats.chromatograms_written, 2);
    assert!(stats.file_size_bytes > 0);

    let container = open_read_only(&path)?;
    assert_eq!(
        container.read_dataset::<f64>(DatasetKind::SpectrumMassAxis, 1)?,
        vec![100.0, 150.0, 200.0, 300.0]
    );
    assert_eq!(
        container.read_dataset::<u32>(DatasetKind::SpectrumMassIndices, 1)?,
        vec![0, 0, 2, 1, 0, 3]
    );
    assert_eq!(
        container.read_dataset::<u32>(DatasetKind::SpectrumIndex, 1)?,
        vec![3, 4, 6]
    );
    assert_eq!(
        container.read_dataset::<f32>(DatasetKind::SpectrumIntensity, 2)?,
        vec![5.0]
    );

    let global = container.read_dataset::<SpectrumListIndex>(DatasetKind::SpectrumListIndices, NO_CLUSTER)?;
    let clusters: Vec<i32> = global.iter().map(|e| e.cluster_id).collect();
    assert_eq!(clusters, vec![1, 2, 1, 1]);

    let records = container.read_dataset::<SpectrumMetaDataRecord>(DatasetKind::SpectrumMetaData, 1)?;
    let indices: Vec<u64> = records.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 2, 3]);

    assert_eq!(
        container.attribute(GroupKind::RawData, NO_CLUSTER, "NumberOfPresetScanConfigurations"),
        Some(&AttributeValue::from(2usize))
    );
    let mass_axis_length = container
        .attribute(GroupKind::Spectrum, 1, "MassAxisLength")
        .and_then(AttributeValue::as_u64);
    assert_eq!(mass_axis_length, Some(4));
    let dt_bins = container
        .attribute(GroupKind::Spectrum, 2, "NumberOfDTbins")
        .and_then(AttributeValue::as_i64);
    assert_eq!(dt_bins, Some(0));
    assert!(container.attribute(GroupKind::Root, NO_CLUSTER, "created").is_some());
    Ok(())
}

#[test]
fn test_chromatograms_in_smallest_cluster() -> Result<(), WriterError> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chromatograms.trims5");
    TriMs5Writer::create(&path, OpenPolicy::FailIfExists, &WriteConfig::default())?
        .write_run(&two_cluster_run())?;

    let container = open_read_only(&path)?;
    assert!(container.contains(DatasetKind::ChromatogramTime, 1));
    assert!(!container.contains(DatasetKind::ChromatogramTime, 2));
    assert_eq!(
        container.read_dataset::<f64>(DatasetKind::ChromatogramTime, 1)?,
        vec![0.5, 1.0, 1.5, 2.0]
    );
    assert_eq!(
        container.read_dataset::<u32>(DatasetKind::ChromatogramTimeIndices, 1)?,
        vec![0, 1, 2, 1, 3]
    );
    assert_eq!(
        container.read_dataset::<u32>(DatasetKind::ChromatogramIndex, 1)?,
        vec![3, 5]
    );
    let lengths: Vec<Option<u64>> = [1, 2]
        .iter()
        .map(|id| {
            container
                .attribute(GroupKind::Chromatogram, *id, "ChromatogramLength")
                .and_then(AttributeValue::as_u64)
        })
        .collect();
    assert_eq!(lengths, vec![Some(4), Some(0)]);
    Ok(())
}

#[test]
fn test_float32_mass_axis() -> Result<(), WriterError> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("narrow.trims5");
    let config = WriteConfig {
        mz_precision: Precision::Float32,
        ..WriteConfig::default()
    };
    TriMs5Writer::create(&path, OpenPolicy::FailIfExists, &config)?.write_run(&two_cluster_run())?;

    let container = Container::open(&path, OpenPolicy::ReadOnly, Configuration::from_write_config(&config))?;
    assert_eq!(
        container.read_dataset::<f32>(DatasetKind::SpectrumMassAxis, 1)?,
        vec![100.0, 150.0, 200.0, 300.0]
    );
    Ok(())
}

#[test]
fn test_mismatched_arrays_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("invalid.trims5");
    let spectrum = Spectrum::new(0, "scan=1").with_arrays(vec![1.0, 2.0], vec![1.0]);

    let err = TriMs5Writer::create(&path, OpenPolicy::FailIfExists, &WriteConfig::default())
        .unwrap()
        .write(&MsRunMetadata::new(), &[spectrum][..], &Vec::<Chromatogram>::new())
        .unwrap_err();
    assert!(matches!(err, WriterError::InvalidData { index: 0, .. }));
    assert!(matches!(
        open_read_only(&path).unwrap_err(),
        ContainerError::IncompleteWrite(_)
    ));
}

#[test]
fn test_cancelled_before_start() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cancelled.trims5");
    let token = CancellationToken::new();
    token.cancel();

    let err = TriMs5Writer::create(&path, OpenPolicy::FailIfExists, &WriteConfig::default())
        .unwrap()
        .with_cancellation(token.clone())
        .write_run(&two_cluster_run())
        .unwrap_err();
    assert!(matches!(err, WriterError::Cancelled { spectra_written: 0 }));
    assert!(token.is_cancelled());
    assert!(matches!(
        open_read_only(&path).unwrap_err(),
        ContainerError::IncompleteWrite(_)
    ));
}

#[test]
fn test_empty_run() -> Result<(), WriterError> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.trims5");
    let stats = TriMs5Writer::create(&path, OpenPolicy::FailIfExists, &WriteConfig::default())?
        .write_run(&MsRun::default())?;
    assert_eq!(stats.spectra_written, 0);
    assert_eq!(stats.clusters, 1);

    let container = open_read_only(&path)?;
    assert_eq!(container.count(DatasetKind::SpectrumIndex, FALLBACK_CLUSTER_ID), Some(0));
    assert_eq!(container.count(DatasetKind::SpectrumListIndices, NO_CLUSTER), Some(0));
    Ok(())
}

#[test]
fn test_stats_display() {
    let stats = WriterStats {
        spectra_written: 4,
        clusters: 2,
        raw_data_points: 7,
        chromatograms_written: 1,
        file_size_bytes: 2048,
    };
    let text = stats.to_string();
    assert!(text.contains("4 spectra"));
    assert!(text.contains("2 clusters"));
}
