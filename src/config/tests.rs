use super::*;

#[test]
fn test_default_buffer_sizes() {
    let config = Configuration::new();
    assert_eq!(config.chunk_size_for(DatasetKind::SpectrumIntensity).unwrap(), 5000);
    assert_eq!(config.buffer_size_for(DatasetKind::SpectrumIntensity).unwrap(), 260_000);
    assert_eq!(config.buffer_size_for(DatasetKind::SpectrumMassIndices).unwrap(), 260_000);
    assert_eq!(config.chunk_size_for(DatasetKind::ChromatogramIntensity).unwrap(), 1000);
    assert_eq!(config.buffer_size_for(DatasetKind::ChromatogramIntensity).unwrap(), 10_000);
}

#[test]
fn test_fixed_layouts_ignore_write_policy() {
    let write = WriteConfig {
        spectrum_chunk_size: 123,
        ..WriteConfig::default()
    };
    let config = Configuration::from_write_config(&write);
    for kind in [
        DatasetKind::SpectrumMassAxis,
        DatasetKind::SpectrumListIndices,
        DatasetKind::FileInformation,
    ] {
        assert_eq!(config.chunk_size_for(kind).unwrap(), EMPTY_CHUNK_SIZE);
        assert_eq!(config.buffer_size_for(kind).unwrap(), NO_BUFFER_SIZE);
    }
    assert_eq!(config.chunk_size_for(DatasetKind::SpectrumMassIndices).unwrap(), 123);
    assert_eq!(config.type_for(DatasetKind::SpectrumMassIndices).unwrap(), ElementType::UInt32);
}

#[test]
fn test_uncompressed_drops_metadata_chunking() {
    let compressed = Configuration::new();
    assert_eq!(compressed.chunk_size_for(DatasetKind::SpectrumMetaData).unwrap(), 2000);
    assert_eq!(compressed.chunk_size_for(DatasetKind::CvParam).unwrap(), 5000);
    assert_eq!(compressed.chunk_size_for(DatasetKind::UserParam).unwrap(), 100);

    let write = WriteConfig {
        compression: CompressionType::Uncompressed,
        ..WriteConfig::default()
    };
    let plain = Configuration::from_write_config(&write);
    assert_eq!(plain.chunk_size_for(DatasetKind::SpectrumMetaData).unwrap(), EMPTY_CHUNK_SIZE);
    assert_eq!(plain.chunk_size_for(DatasetKind::CvParam).unwrap(), EMPTY_CHUNK_SIZE);
}

#[test]
fn test_mass_axis_follows_precision() {
    let write = WriteConfig {
        mz_precision: Precision::Float32,
        ..WriteConfig::default()
    };
    let config = Configuration::from_write_config(&write);
    assert_eq!(config.type_for(DatasetKind::SpectrumMassAxis).unwrap(), ElementType::Float32);
    assert_eq!(
        Configuration::new().type_for(DatasetKind::SpectrumMassAxis).unwrap(),
        ElementType::Float64
    );
}

#[test]
fn test_name_round_trip_for_every_kind() {
    let config = Configuration::new();
    for kind in DatasetKind::ALL {
        let name = config.name_for(kind).unwrap();
        assert_eq!(config.kind_for(name).unwrap(), kind);
    }
    assert_eq!(config.name_for(DatasetKind::SpectrumBinaryMetaData).unwrap(), "SpectrumListBinaryData");
    assert!(matches!(
        config.kind_for("NotADataset"),
        Err(ConfigurationError::UnknownName(_))
    ));
}

#[test]
fn test_group_parentage() {
    let config = Configuration::new();
    assert_eq!(config.parent_group(GroupKind::Root).unwrap(), None);
    assert_eq!(config.parent_group(GroupKind::Spectrum).unwrap(), Some(GroupKind::Cluster));
    assert_eq!(config.parent_group(GroupKind::Cluster).unwrap(), Some(GroupKind::RawData));
    assert_eq!(config.parent_group(GroupKind::MetaData).unwrap(), Some(GroupKind::Root));
    assert_eq!(config.group_kind_for("Cluster_7").unwrap(), GroupKind::Cluster);
    assert_eq!(config.group_kind_for("Chromatogram").unwrap(), GroupKind::Chromatogram);
}

#[test]
fn test_dataset_entries() {
    let config = Configuration::new();
    assert_eq!(
        config.dataset_entry(DatasetKind::SpectrumIndex, 3).unwrap(),
        "RawData/Cluster_3/Spectrum/SpectrumIndex.parquet"
    );
    assert_eq!(
        config.dataset_entry(DatasetKind::FileInformation, NO_CLUSTER).unwrap(),
        "FileInformation.parquet"
    );
    assert_eq!(
        config.dataset_entry(DatasetKind::CvParam, NO_CLUSTER).unwrap(),
        "MetaData/CVParam.parquet"
    );
    assert!(matches!(
        config.dataset_entry(DatasetKind::SpectrumIndex, NO_CLUSTER),
        Err(ConfigurationError::ClusterId { .. })
    ));

    for kind in DatasetKind::ALL {
        let group = config.group_for(kind).unwrap();
        let cluster = if group.is_per_cluster() { 12 } else { NO_CLUSTER };
        let entry = config.dataset_entry(kind, cluster).unwrap();
        assert_eq!(config.parse_dataset_entry(&entry).unwrap(), (kind, cluster));
    }

    assert!(config.parse_dataset_entry("MetaData/SpectrumIndex.parquet").is_err());
    assert!(config.parse_dataset_entry("RawData/Cluster_x/Spectrum/SpectrumIndex.parquet").is_err());
    assert!(config.parse_dataset_entry("notes.txt").is_err());
}

#[test]
fn test_version_compatibility() {
    let current = FormatVersion::CURRENT;
    let newer_minor = FormatVersion {
        base_minor: 11,
        format_minor: 7,
        ..current
    };
    let newer_major = FormatVersion {
        base_major: 1,
        ..current
    };
    assert!(current.is_compatible_with(&newer_minor));
    assert!(!current.is_compatible_with(&newer_major));

    let config = Configuration::new().with_version(newer_minor);
    assert_eq!(config.version(), newer_minor);
}

#[test]
fn test_parse_toml_config() {
    let toml = r#"
        [write]
        compression = "snappy"
        mz_precision = "float32"
        spectrum_chunk_size = 2000
        buffer_mib = 16
    "#;

    let config = WriteConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.compression, CompressionType::Snappy);
    assert_eq!(config.mz_precision, Precision::Float32);
    assert_eq!(config.time_precision, Precision::Float64);
    assert_eq!(config.spectrum_chunk_size, 2000);
    assert_eq!(config.buffer_mib, 16);
}

#[test]
fn test_parse_toml_compression_level_only() {
    let config = WriteConfig::from_toml_str("[write]\ncompression_level = 12\n").unwrap();
    assert_eq!(config.compression, CompressionType::Zstd(12));

    let config = WriteConfig::from_toml_str("").unwrap();
    assert_eq!(config, WriteConfig::default());
}

#[test]
fn test_parse_toml_rejects_bad_values() {
    assert!(matches!(
        WriteConfig::from_toml_str("[write]\ncompression = \"lzma\"\n"),
        Err(ConfigurationError::InvalidValue { key: "compression", .. })
    ));
    assert!(matches!(
        WriteConfig::from_toml_str("[write]\nunknown_key = 1\n"),
        Err(ConfigurationError::Toml(_))
    ));
}

#[test]
fn test_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trims5.toml");
    std::fs::write(&path, "[write]\ncompression = \"none\"\n").unwrap();
    let config = WriteConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.compression, CompressionType::Uncompressed);

    assert!(matches!(
        WriteConfig::from_toml_file(dir.path().join("missing.toml")),
        Err(ConfigurationError::Io { .. })
    ));
}
