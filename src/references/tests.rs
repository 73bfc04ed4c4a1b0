use super::*;
use crate::config::{Configuration, DatasetKind, NO_CLUSTER};
use crate::container::{Container, ContainerError, OpenPolicy};
use crate::controlled_vocabulary::{ms_terms, CvTerm};
use crate::model::{
    Chromatogram, DataProcessing, InstrumentConfiguration, MsRunMetadata, ParamGroup, ParamList,
    Precursor, Run, Sample, Scan, Software, SourceFile, Spectrum, UserParam,
};
use crate::schema::{FileInformation, ParamRange};
use tempfile::TempDir;

fn sample_metadata() -> MsRunMetadata {
    let mut metadata = MsRunMetadata::new();
    metadata.file_content = ParamList::new().with_cv(ms_terms::ms1_spectrum());
    metadata.contacts.push(
        ParamList::new().with_cv(CvTerm::new("MS:1000586", "contact name").with_value("Jane Doe")),
    );
    metadata.param_groups.push(ParamGroup {
        id: "CommonInstrumentParams".to_string(),
        params: ParamList::new().with_cv(ms_terms::instrument_model("Q Exactive")),
    });
    metadata.source_files.push(SourceFile {
        id: "RAW1".to_string(),
        name: "sample.raw".to_string(),
        location: "file:///data".to_string(),
        params: ParamList::new(),
    });
    metadata.samples.push(Sample {
        id: "S1".to_string(),
        name: "plasma".to_string(),
        params: ParamList::new(),
    });
    metadata.software.push(Software {
        id: "pwiz".to_string(),
        version: "3.0".to_string(),
        params: ParamList::new().with_cv(ms_terms::proteowizard()),
    });
    metadata.instrument_configurations.push(InstrumentConfiguration {
        id: "IC1".to_string(),
        params: ParamList::new().with_group_ref("CommonInstrumentParams"),
        software_ref: Some("pwiz".to_string()),
    });
    metadata.data_processing.push(DataProcessing {
        id: "pwiz_Reader_conversion".to_string(),
        software_ref: Some("pwiz".to_string()),
        params: ParamList::new().with_cv(ms_terms::conversion_to_mzml()),
    });
    metadata.run = Run {
        id: "run_1".to_string(),
        start_time_stamp: "2024-03-01T10:00:00Z".to_string(),
        default_instrument_configuration_ref: Some("IC1".to_string()),
        default_source_file_ref: Some("RAW1".to_string()),
        sample_ref: Some("S1".to_string()),
        default_spectrum_data_processing_ref: Some("pwiz_Reader_conversion".to_string()),
        default_chromatogram_data_processing_ref: Some("pwiz_Reader_conversion".to_string()),
        params: ParamList::new().with_user(
            UserParam::new("operator", "jd")
                .with_type("xsd:string"),
        ),
    };
    metadata
}

fn sample_spectrum() -> Spectrum {
    let mut spectrum = Spectrum::new(4, "scan=5").with_arrays(vec![100.0, 200.0], vec![1.0, 2.0]);
    spectrum.params = ParamList::new()
        .with_cv(ms_terms::ms_level(2))
        .with_cv(ms_terms::msn_spectrum())
        .with_user(UserParam {
            name: "ion injection".to_string(),
            value: "12.5".to_string(),
            value_type: Some("xsd:double".to_string()),
            unit_accession: Some("UO:0000028".to_string()),
            unit_name: Some("millisecond".to_string()),
        });
    spectrum.scan = Some(Scan {
        params: ParamList::new().with_cv(ms_terms::scan_start_time(61.5)),
        instrument_configuration_ref: Some("IC1".to_string()),
        external_spectrum_id: None,
    });
    spectrum.precursor = Some(Precursor {
        spectrum_ref: Some("scan=4".to_string()),
        params: ParamList::new(),
        isolation_window: ParamList::new().with_cv(ms_terms::isolation_window_target(445.3)),
        selected_ion: ParamList::new().with_cv(ms_terms::selected_ion_mz(445.34)),
        activation: ParamList::new().with_cv(ms_terms::cid()),
    });
    spectrum.source_file_ref = Some("RAW1".to_string());
    spectrum.binary.x_data_processing_ref = Some("pwiz_Reader_conversion".to_string());
    spectrum
}

fn write_and_reopen(
    dir: &TempDir,
    build: impl FnOnce(&mut Container),
) -> Container {
    let path = dir.path().join("refs.trims5");
    let mut container = Container::open(&path, OpenPolicy::FailIfExists, Configuration::new()).unwrap();
    build(&mut container);
    container
        .create_and_write(
            DatasetKind::FileInformation,
            NO_CLUSTER,
            &[FileInformation::from_version(container.config().version())],
        )
        .unwrap();
    container.close().unwrap();
    Container::open(&path, OpenPolicy::ReadOnly, Configuration::new()).unwrap()
}

#[test]
fn test_metadata_round_trip() {
    let dir = TempDir::new().unwrap();
    let metadata = sample_metadata();
    let container = write_and_reopen(&dir, |container| {
        ReferenceWriter::new(&metadata).unwrap().write_to(container).unwrap();
    });

    let tables = ReferenceTables::load(&container).unwrap();
    assert_eq!(tables.metadata().unwrap(), metadata);
}

#[test]
fn test_spectrum_and_chromatogram_records() {
    let dir = TempDir::new().unwrap();
    let metadata = sample_metadata();
    let spectrum = sample_spectrum();
    let mut chromatogram = Chromatogram::new(0, "TIC").with_arrays(vec![1.0, 2.0], vec![5.0, 6.0]);
    chromatogram.params = ParamList::new().with_cv(ms_terms::tic_chromatogram());
    chromatogram.product = ParamList::new().with_cv(ms_terms::isolation_window_target(300.0));
    chromatogram.data_processing_ref = Some("pwiz_Reader_conversion".to_string());

    let mut records = None;
    let container = write_and_reopen(&dir, |container| {
        let mut writer = ReferenceWriter::new(&metadata).unwrap();
        let spectrum_records = writer.spectrum_records(&spectrum).unwrap();
        let chromatogram_records = writer.chromatogram_records(&chromatogram).unwrap();
        writer.write_to(container).unwrap();
        records = Some((spectrum_records, chromatogram_records));
    });
    let ((spectrum_meta, spectrum_binary), (chromatogram_meta, chromatogram_binary)) =
        records.unwrap();
    assert!(spectrum_binary.has_arrays);
    assert_eq!(spectrum_meta.default_array_length, 2);

    let tables = ReferenceTables::load(&container).unwrap();

    let mut expected = spectrum.clone();
    expected.mz = None;
    expected.intensity = None;
    assert_eq!(tables.spectrum(&spectrum_meta, &spectrum_binary).unwrap(), expected);

    let mut expected = chromatogram.clone();
    expected.time = None;
    expected.intensity = None;
    assert_eq!(
        tables
            .chromatogram(&chromatogram_meta, &chromatogram_binary)
            .unwrap(),
        expected
    );
}

#[test]
fn test_terms_are_interned() {
    let mut writer = ReferenceWriter::new(&MsRunMetadata::default()).unwrap();
    let before = writer.term_count();
    let list = ParamList::new()
        .with_cv(ms_terms::ms_level(1))
        .with_cv(ms_terms::ms_level(2));
    let first = writer.params(&list).unwrap();
    let second = writer.params(&list).unwrap();

    assert_eq!(writer.term_count(), before + 1);
    assert_eq!(first.cv(), 0..2);
    assert_eq!(second.cv(), 2..4);
    assert!(first.user().is_empty());
}

#[test]
fn test_unknown_references_are_dropped() {
    let mut writer = ReferenceWriter::new(&sample_metadata()).unwrap();
    let mut spectrum = Spectrum::new(0, "scan=1");
    spectrum.params = ParamList::new().with_group_ref("NoSuchGroup");
    spectrum.data_processing_ref = Some("missing".to_string());

    let (record, _) = writer.spectrum_records(&spectrum).unwrap();
    assert!(record.params.refs().is_empty());
    assert_eq!(record.data_processing_ref, crate::schema::NO_REF);
}

#[test]
fn test_out_of_bounds_ranges_fail() {
    let tables = ReferenceTables::default();
    let err = tables
        .params(ParamRange {
            cv_start: 0,
            cv_end: 3,
            ..ParamRange::default()
        })
        .unwrap_err();
    assert!(matches!(err, ContainerError::InvalidFormat(_)));
    assert_eq!(tables.params(ParamRange::default()).unwrap(), ParamList::new());
}

#[test]
fn test_handles_outside_u32_fail() {
    assert_eq!(super::write::arena_offset("CVParam", 7).unwrap(), 7);
    assert_eq!(
        super::write::arena_offset("CVParam", u32::MAX as usize).unwrap(),
        u32::MAX
    );
    let err = super::write::arena_offset("CVParam", u32::MAX as usize + 1).unwrap_err();
    assert!(matches!(
        err,
        ContainerError::HandleOverflow { table: "CVParam", .. }
    ));

    assert_eq!(super::write::ref_handle("Software", 3).unwrap(), 3);
    assert!(matches!(
        super::write::ref_handle("Software", i32::MAX as usize + 1),
        Err(ContainerError::HandleOverflow { table: "Software", .. })
    ));
}
