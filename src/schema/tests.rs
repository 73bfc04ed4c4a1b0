use super::*;
use crate::config::{Configuration, DatasetKind, FormatVersion};
use crate::container::Element;

use arrow::datatypes::DataType;

#[test]
fn test_record_layouts_match_configuration() {
    let config = Configuration::new();
    let pairs = [
        (DatasetKind::FileInformation, FileInformation::ELEMENT_TYPE),
        (DatasetKind::SpectrumListIndices, SpectrumListIndex::ELEMENT_TYPE),
        (DatasetKind::ControlledVocabulary, ControlledVocabularyRecord::ELEMENT_TYPE),
        (DatasetKind::CvReference, CvReference::ELEMENT_TYPE),
        (DatasetKind::CvParam, CvParamRecord::ELEMENT_TYPE),
        (DatasetKind::UserParam, UserParamRecord::ELEMENT_TYPE),
        (DatasetKind::RefParam, RefParamRecord::ELEMENT_TYPE),
        (DatasetKind::FileContent, ParamListRecord::ELEMENT_TYPE),
        (DatasetKind::Contact, ParamListRecord::ELEMENT_TYPE),
        (DatasetKind::ParamGroups, ParamGroupRecord::ELEMENT_TYPE),
        (DatasetKind::SourceFiles, SourceFileRecord::ELEMENT_TYPE),
        (DatasetKind::Samples, SampleRecord::ELEMENT_TYPE),
        (DatasetKind::Software, SoftwareRecord::ELEMENT_TYPE),
        (DatasetKind::ScanSetting, ScanSettingRecord::ELEMENT_TYPE),
        (DatasetKind::InstrumentConfiguration, InstrumentConfigurationRecord::ELEMENT_TYPE),
        (DatasetKind::DataProcessing, DataProcessingRecord::ELEMENT_TYPE),
        (DatasetKind::Run, RunRecord::ELEMENT_TYPE),
        (DatasetKind::SpectrumMetaData, SpectrumMetaDataRecord::ELEMENT_TYPE),
        (DatasetKind::SpectrumBinaryMetaData, BinaryMetaDataRecord::ELEMENT_TYPE),
        (DatasetKind::ChromatogramMetaData, ChromatogramMetaDataRecord::ELEMENT_TYPE),
        (DatasetKind::ChromatogramBinaryMetaData, BinaryMetaDataRecord::ELEMENT_TYPE),
    ];
    for (kind, element_type) in pairs {
        assert_eq!(config.type_for(kind).unwrap(), element_type, "{}", kind);
    }
}

#[test]
fn test_record_schema_columns() {
    let schema = SpectrumListIndex::schema();
    assert_eq!(schema.fields().len(), 2);
    assert_eq!(schema.field(0).name(), "cluster_id");
    assert_eq!(schema.field(0).data_type(), &DataType::Int32);
    assert_eq!(schema.field(1).name(), "local_index");
    assert_eq!(schema.field(1).data_type(), &DataType::UInt32);

    let schema = CvParamRecord::schema();
    assert!(schema.field_with_name("value").unwrap().is_nullable());
    assert!(!schema.field_with_name("term_ref").unwrap().is_nullable());

    let schema = SpectrumMetaDataRecord::schema();
    assert!(matches!(
        schema.field_with_name("scan_params").unwrap().data_type(),
        DataType::Struct(fields) if fields.len() == 6
    ));
}

#[test]
fn test_record_batch_decoding() {
    let records = vec![
        SpectrumMetaDataRecord {
            index: 7,
            id: "scan=8".to_string(),
            params: ParamRange {
                cv_start: 0,
                cv_end: 2,
                ..ParamRange::default()
            },
            scan_present: true,
            scan_external_spectrum_id: Some("ext".to_string()),
            data_processing_ref: NO_REF,
            source_file_ref: 0,
            default_array_length: 3,
            ..SpectrumMetaDataRecord::default()
        },
        SpectrumMetaDataRecord {
            index: 9,
            id: "scan=10".to_string(),
            precursor_present: true,
            precursor_spectrum_ref: Some("scan=8".to_string()),
            activation: ParamRange {
                cv_start: 2,
                cv_end: 3,
                user_start: 0,
                user_end: 1,
                ref_start: 0,
                ref_end: 0,
            },
            data_processing_ref: NO_REF,
            source_file_ref: NO_REF,
            ..SpectrumMetaDataRecord::default()
        },
    ];

    let batch = SpectrumMetaDataRecord::to_batch(&records).unwrap();
    assert_eq!(batch.num_rows(), 2);
    let decoded = SpectrumMetaDataRecord::from_batch(&batch).unwrap();
    assert_eq!(decoded, records);
}

#[test]
fn test_missing_column_is_reported() {
    let batch = SpectrumListIndex::to_batch(&[SpectrumListIndex::default()]).unwrap();
    let err = FileInformation::from_batch(&batch).unwrap_err();
    assert!(err.to_string().contains("base_major"));
}

#[test]
fn test_param_range_accessors() {
    let range = ParamRange {
        cv_start: 1,
        cv_end: 4,
        user_start: 2,
        user_end: 2,
        ref_start: 0,
        ref_end: 1,
    };
    assert_eq!(range.cv(), 1..4);
    assert!(range.user().is_empty());
    assert_eq!(range.refs(), 0..1);
    assert!(!range.is_empty());
    assert!(ParamRange::default().is_empty());
}

#[test]
fn test_file_information_version() {
    let info = FileInformation::from_version(FormatVersion::CURRENT);
    assert_eq!(info.base_minor, 10);
    assert_eq!(info.format_minor, 1);
    assert_eq!(info.version(), FormatVersion::CURRENT);
}

#[test]
fn test_default_records_reference_nothing() {
    let spectrum = SpectrumMetaDataRecord::default();
    assert_eq!(spectrum.scan_instrument_configuration_ref, NO_REF);
    assert_eq!(spectrum.data_processing_ref, NO_REF);
    assert_eq!(spectrum.source_file_ref, NO_REF);

    let binary = BinaryMetaDataRecord::default();
    assert_eq!(binary.x_data_processing_ref, NO_REF);
    assert_eq!(binary.y_data_processing_ref, NO_REF);
    assert!(!binary.has_arrays);

    let run = RunRecord::default();
    assert_eq!(run.default_instrument_configuration_ref, NO_REF);
    assert_eq!(run.sample_ref, NO_REF);
    assert_eq!(ChromatogramMetaDataRecord::default().data_processing_ref, NO_REF);
    assert_eq!(UserParamRecord::default().unit_ref, NO_REF);

    // Handles that are always set keep the zero default
    assert_eq!(CvParamRecord::default().term_ref, 0);
    assert!(SpectrumMetaDataRecord::default().params.is_empty());
}
