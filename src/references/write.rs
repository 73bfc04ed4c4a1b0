use std::collections::HashMap;

use log::warn;

use crate::config::{DatasetKind, NO_CLUSTER};
use crate::container::{Container, ContainerError};
use crate::controlled_vocabulary::split_accession;
use crate::model::{
    BinaryArrays, Chromatogram, MsRunMetadata, ParamList, Precursor, Spectrum,
};
use crate::schema::{
    BinaryMetaDataRecord, ChromatogramMetaDataRecord, ControlledVocabularyRecord, CvParamRecord,
    CvReference, DataProcessingRecord, InstrumentConfigurationRecord, ParamGroupRecord,
    ParamListRecord, ParamRange, RefParamRecord, RunRecord, SampleRecord, ScanSettingRecord,
    SoftwareRecord, SourceFileRecord, SpectrumMetaDataRecord, UserParamRecord, NO_REF,
};

/// Ids of one referenceable table
#[derive(Debug, Default)]
struct IdTable {
    table: &'static str,
    handles: HashMap<String, i32>,
}

impl IdTable {
    fn new(table: &'static str) -> Self {
        Self {
            table,
            handles: HashMap::new(),
        }
    }

    fn register(&mut self, id: &str, row: usize) -> Result<(), ContainerError> {
        let handle = ref_handle(self.table, row)?;
        if self.handles.insert(id.to_string(), handle).is_some() {
            warn!("Duplicate {} id {}; later entry wins", self.table, id);
        }
        Ok(())
    }

    /// Handle of an id; unknown ids are dropped
    fn resolve(&self, id: Option<&str>) -> i32 {
        let Some(id) = id else {
            return NO_REF;
        };
        match self.handles.get(id) {
            Some(handle) => *handle,
            None => {
                warn!("Dropping reference to unknown {} {}", self.table, id);
                NO_REF
            }
        }
    }
}

/// Converts the in-memory model into records, interning CV terms and
/// appending every parameter list to the file-wide arenas.
///
/// The run metadata is registered first so that spectra and chromatograms
/// can refer to its tables by handle.
#[derive(Debug)]
pub struct ReferenceWriter {
    terms: Vec<CvReference>,
    term_handles: HashMap<(String, String), u32>,
    cv_params: Vec<CvParamRecord>,
    user_params: Vec<UserParamRecord>,
    ref_params: Vec<RefParamRecord>,

    param_group_ids: IdTable,
    source_file_ids: IdTable,
    sample_ids: IdTable,
    software_ids: IdTable,
    instrument_configuration_ids: IdTable,
    data_processing_ids: IdTable,

    controlled_vocabularies: Vec<ControlledVocabularyRecord>,
    file_content: Vec<ParamListRecord>,
    contacts: Vec<ParamListRecord>,
    param_groups: Vec<ParamGroupRecord>,
    source_files: Vec<SourceFileRecord>,
    samples: Vec<SampleRecord>,
    software: Vec<SoftwareRecord>,
    scan_settings: Vec<ScanSettingRecord>,
    instrument_configurations: Vec<InstrumentConfigurationRecord>,
    data_processing: Vec<DataProcessingRecord>,
    run: Vec<RunRecord>,
}

impl ReferenceWriter {
    /// Register the file-wide metadata of a run.
    pub fn new(metadata: &MsRunMetadata) -> Result<Self, ContainerError> {
        let mut writer = Self {
            terms: Vec::new(),
            term_handles: HashMap::new(),
            cv_params: Vec::new(),
            user_params: Vec::new(),
            ref_params: Vec::new(),
            param_group_ids: IdTable::new("param group"),
            source_file_ids: IdTable::new("source file"),
            sample_ids: IdTable::new("sample"),
            software_ids: IdTable::new("software"),
            instrument_configuration_ids: IdTable::new("instrument configuration"),
            data_processing_ids: IdTable::new("data processing"),
            controlled_vocabularies: Vec::new(),
            file_content: Vec::new(),
            contacts: Vec::new(),
            param_groups: Vec::new(),
            source_files: Vec::new(),
            samples: Vec::new(),
            software: Vec::new(),
            scan_settings: Vec::new(),
            instrument_configurations: Vec::new(),
            data_processing: Vec::new(),
            run: Vec::new(),
        };
        writer.register(metadata)?;
        Ok(writer)
    }

    fn register(&mut self, metadata: &MsRunMetadata) -> Result<(), ContainerError> {
        self.controlled_vocabularies = metadata
            .controlled_vocabularies
            .iter()
            .map(|cv| ControlledVocabularyRecord {
                id: cv.id.clone(),
                full_name: cv.full_name.clone(),
                uri: cv.uri.clone(),
                version: cv.version.clone(),
            })
            .collect();

        // Ids first, so parameter lists and tables can point at any entry
        for (row, group) in metadata.param_groups.iter().enumerate() {
            self.param_group_ids.register(&group.id, row)?;
        }
        for (row, file) in metadata.source_files.iter().enumerate() {
            self.source_file_ids.register(&file.id, row)?;
        }
        for (row, sample) in metadata.samples.iter().enumerate() {
            self.sample_ids.register(&sample.id, row)?;
        }
        for (row, software) in metadata.software.iter().enumerate() {
            self.software_ids.register(&software.id, row)?;
        }
        for (row, config) in metadata.instrument_configurations.iter().enumerate() {
            self.instrument_configuration_ids.register(&config.id, row)?;
        }
        for (row, processing) in metadata.data_processing.iter().enumerate() {
            self.data_processing_ids.register(&processing.id, row)?;
        }

        let file_content = self.params(&metadata.file_content)?;
        self.file_content.push(ParamListRecord { params: file_content });
        for contact in &metadata.contacts {
            let params = self.params(contact)?;
            self.contacts.push(ParamListRecord { params });
        }
        for group in &metadata.param_groups {
            let params = self.params(&group.params)?;
            self.param_groups.push(ParamGroupRecord {
                id: group.id.clone(),
                params,
            });
        }
        for file in &metadata.source_files {
            let params = self.params(&file.params)?;
            self.source_files.push(SourceFileRecord {
                id: file.id.clone(),
                name: file.name.clone(),
                location: file.location.clone(),
                params,
            });
        }
        for sample in &metadata.samples {
            let params = self.params(&sample.params)?;
            self.samples.push(SampleRecord {
                id: sample.id.clone(),
                name: sample.name.clone(),
                params,
            });
        }
        for software in &metadata.software {
            let params = self.params(&software.params)?;
            self.software.push(SoftwareRecord {
                id: software.id.clone(),
                version: software.version.clone(),
                params,
            });
        }
        for settings in &metadata.scan_settings {
            let params = self.params(&settings.params)?;
            self.scan_settings.push(ScanSettingRecord {
                id: settings.id.clone(),
                params,
            });
        }
        for config in &metadata.instrument_configurations {
            let params = self.params(&config.params)?;
            let software_ref = self.software_ids.resolve(config.software_ref.as_deref());
            self.instrument_configurations.push(InstrumentConfigurationRecord {
                id: config.id.clone(),
                params,
                software_ref,
            });
        }
        for processing in &metadata.data_processing {
            let params = self.params(&processing.params)?;
            let software_ref = self.software_ids.resolve(processing.software_ref.as_deref());
            self.data_processing.push(DataProcessingRecord {
                id: processing.id.clone(),
                software_ref,
                params,
            });
        }

        let run = &metadata.run;
        let params = self.params(&run.params)?;
        self.run.push(RunRecord {
            id: run.id.clone(),
            start_time_stamp: run.start_time_stamp.clone(),
            default_instrument_configuration_ref: self
                .instrument_configuration_ids
                .resolve(run.default_instrument_configuration_ref.as_deref()),
            default_source_file_ref: self
                .source_file_ids
                .resolve(run.default_source_file_ref.as_deref()),
            sample_ref: self.sample_ids.resolve(run.sample_ref.as_deref()),
            default_spectrum_data_processing_ref: self
                .data_processing_ids
                .resolve(run.default_spectrum_data_processing_ref.as_deref()),
            default_chromatogram_data_processing_ref: self
                .data_processing_ids
                .resolve(run.default_chromatogram_data_processing_ref.as_deref()),
            params,
        });
        Ok(())
    }

    fn intern(&mut self, accession: &str, name: &str) -> Result<u32, ContainerError> {
        let key = (accession.to_string(), name.to_string());
        if let Some(handle) = self.term_handles.get(&key) {
            return Ok(*handle);
        }
        let handle = arena_offset("CVReference", self.terms.len())?;
        self.terms.push(CvReference {
            prefix: split_accession(accession).0.to_string(),
            accession: accession.to_string(),
            name: name.to_string(),
        });
        self.term_handles.insert(key, handle);
        Ok(handle)
    }

    fn unit(&mut self, accession: Option<&str>, name: Option<&str>) -> Result<i32, ContainerError> {
        match accession {
            Some(accession) => {
                let handle = self.intern(accession, name.unwrap_or_default())?;
                ref_handle("CVReference", handle as usize)
            }
            None => Ok(NO_REF),
        }
    }

    /// Append a parameter list to the arenas.
    ///
    /// Fails with [`ContainerError::HandleOverflow`] once an arena outgrows
    /// its 32-bit offsets.
    pub fn params(&mut self, list: &ParamList) -> Result<ParamRange, ContainerError> {
        let cv_start = arena_offset("CVParam", self.cv_params.len())?;
        for param in &list.cv_params {
            let term_ref = self.intern(&param.accession, &param.name)?;
            let unit_ref = self.unit(param.unit_accession.as_deref(), param.unit_name.as_deref())?;
            self.cv_params.push(CvParamRecord {
                value: param.value.clone(),
                term_ref,
                unit_ref,
            });
        }

        let user_start = arena_offset("UserParam", self.user_params.len())?;
        for param in &list.user_params {
            let unit_ref = self.unit(param.unit_accession.as_deref(), param.unit_name.as_deref())?;
            self.user_params.push(UserParamRecord {
                name: param.name.clone(),
                value: param.value.clone(),
                value_type: param.value_type.clone(),
                unit_ref,
            });
        }

        let ref_start = arena_offset("RefParam", self.ref_params.len())?;
        for id in &list.param_group_refs {
            let handle = self.param_group_ids.resolve(Some(id));
            if let Ok(group_ref) = u32::try_from(handle) {
                self.ref_params.push(RefParamRecord { group_ref });
            }
        }

        Ok(ParamRange {
            cv_start,
            cv_end: arena_offset("CVParam", self.cv_params.len())?,
            user_start,
            user_end: arena_offset("UserParam", self.user_params.len())?,
            ref_start,
            ref_end: arena_offset("RefParam", self.ref_params.len())?,
        })
    }

    fn precursor(&mut self, precursor: Option<&Precursor>) -> Result<PrecursorRanges, ContainerError> {
        Ok(match precursor {
            Some(precursor) => PrecursorRanges {
                present: true,
                spectrum_ref: precursor.spectrum_ref.clone(),
                params: self.params(&precursor.params)?,
                isolation_window: self.params(&precursor.isolation_window)?,
                selected_ion: self.params(&precursor.selected_ion)?,
                activation: self.params(&precursor.activation)?,
            },
            None => PrecursorRanges::default(),
        })
    }

    fn binary(&mut self, binary: &BinaryArrays, has_arrays: bool) -> Result<BinaryMetaDataRecord, ContainerError> {
        Ok(BinaryMetaDataRecord {
            has_arrays,
            x_params: self.params(&binary.x_params)?,
            y_params: self.params(&binary.y_params)?,
            x_data_processing_ref: self
                .data_processing_ids
                .resolve(binary.x_data_processing_ref.as_deref()),
            y_data_processing_ref: self
                .data_processing_ids
                .resolve(binary.y_data_processing_ref.as_deref()),
        })
    }

    /// Metadata and binary description records of a spectrum
    pub fn spectrum_records(
        &mut self,
        spectrum: &Spectrum,
    ) -> Result<(SpectrumMetaDataRecord, BinaryMetaDataRecord), ContainerError> {
        let params = self.params(&spectrum.params)?;
        let (scan_present, scan_params, scan_instrument_configuration_ref, scan_external_spectrum_id) =
            match &spectrum.scan {
                Some(scan) => (
                    true,
                    self.params(&scan.params)?,
                    self.instrument_configuration_ids
                        .resolve(scan.instrument_configuration_ref.as_deref()),
                    scan.external_spectrum_id.clone(),
                ),
                None => (false, ParamRange::default(), NO_REF, None),
            };
        let precursor = self.precursor(spectrum.precursor.as_ref())?;

        let record = SpectrumMetaDataRecord {
            index: spectrum.index as u64,
            id: spectrum.id.clone(),
            spot_id: spectrum.spot_id.clone(),
            params,
            scan_present,
            scan_params,
            scan_instrument_configuration_ref,
            scan_external_spectrum_id,
            precursor_present: precursor.present,
            precursor_spectrum_ref: precursor.spectrum_ref,
            precursor_params: precursor.params,
            isolation_window: precursor.isolation_window,
            selected_ion: precursor.selected_ion,
            activation: precursor.activation,
            data_processing_ref: self
                .data_processing_ids
                .resolve(spectrum.data_processing_ref.as_deref()),
            source_file_ref: self
                .source_file_ids
                .resolve(spectrum.source_file_ref.as_deref()),
            default_array_length: spectrum.default_array_length as u64,
        };
        let binary = self.binary(&spectrum.binary, spectrum.mz.is_some())?;
        Ok((record, binary))
    }

    /// Metadata and binary description records of a chromatogram
    pub fn chromatogram_records(
        &mut self,
        chromatogram: &Chromatogram,
    ) -> Result<(ChromatogramMetaDataRecord, BinaryMetaDataRecord), ContainerError> {
        let params = self.params(&chromatogram.params)?;
        let precursor = self.precursor(chromatogram.precursor.as_ref())?;
        let product = self.params(&chromatogram.product)?;

        let record = ChromatogramMetaDataRecord {
            index: chromatogram.index as u64,
            id: chromatogram.id.clone(),
            params,
            precursor_present: precursor.present,
            precursor_spectrum_ref: precursor.spectrum_ref,
            precursor_params: precursor.params,
            isolation_window: precursor.isolation_window,
            selected_ion: precursor.selected_ion,
            activation: precursor.activation,
            product,
            data_processing_ref: self
                .data_processing_ids
                .resolve(chromatogram.data_processing_ref.as_deref()),
            default_array_length: chromatogram.default_array_length as u64,
        };
        let binary = self.binary(&chromatogram.binary, chromatogram.time.is_some())?;
        Ok((record, binary))
    }

    /// Number of interned CV terms
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Write the shared tables and arenas into the `MetaData` group.
    pub fn write_to(self, container: &mut Container) -> Result<(), ContainerError> {
        container.create_and_write(DatasetKind::ControlledVocabulary, NO_CLUSTER, &self.controlled_vocabularies)?;
        container.create_and_write(DatasetKind::FileContent, NO_CLUSTER, &self.file_content)?;
        container.create_and_write(DatasetKind::Contact, NO_CLUSTER, &self.contacts)?;
        container.create_and_write(DatasetKind::CvReference, NO_CLUSTER, &self.terms)?;
        container.create_and_write(DatasetKind::CvParam, NO_CLUSTER, &self.cv_params)?;
        container.create_and_write(DatasetKind::UserParam, NO_CLUSTER, &self.user_params)?;
        container.create_and_write(DatasetKind::RefParam, NO_CLUSTER, &self.ref_params)?;
        container.create_and_write(DatasetKind::ParamGroups, NO_CLUSTER, &self.param_groups)?;
        container.create_and_write(DatasetKind::SourceFiles, NO_CLUSTER, &self.source_files)?;
        container.create_and_write(DatasetKind::Samples, NO_CLUSTER, &self.samples)?;
        container.create_and_write(DatasetKind::Software, NO_CLUSTER, &self.software)?;
        container.create_and_write(DatasetKind::ScanSetting, NO_CLUSTER, &self.scan_settings)?;
        container.create_and_write(
            DatasetKind::InstrumentConfiguration,
            NO_CLUSTER,
            &self.instrument_configurations,
        )?;
        container.create_and_write(DatasetKind::DataProcessing, NO_CLUSTER, &self.data_processing)?;
        container.create_and_write(DatasetKind::Run, NO_CLUSTER, &self.run)?;
        Ok(())
    }
}

#[derive(Default)]
struct PrecursorRanges {
    present: bool,
    spectrum_ref: Option<String>,
    params: ParamRange,
    isolation_window: ParamRange,
    selected_ion: ParamRange,
    activation: ParamRange,
}

/// Offset into an arena, which must fit the u32 columns of [`ParamRange`]
pub(super) fn arena_offset(table: &'static str, len: usize) -> Result<u32, ContainerError> {
    u32::try_from(len).map_err(|_| ContainerError::HandleOverflow { table, len })
}

/// Row handle stored in an `i32` reference column
pub(super) fn ref_handle(table: &'static str, row: usize) -> Result<i32, ContainerError> {
    i32::try_from(row).map_err(|_| ContainerError::HandleOverflow { table, len: row })
}
