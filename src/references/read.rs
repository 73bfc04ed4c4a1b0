use crate::config::{DatasetKind, NO_CLUSTER};
use crate::container::{Container, ContainerError, Element};
use crate::model::{
    BinaryArrays, Chromatogram, ControlledVocabulary, CvParam, DataProcessing,
    InstrumentConfiguration, MsRunMetadata, ParamGroup, ParamList, Precursor, Run, Sample, Scan,
    ScanSettings, Software, SourceFile, Spectrum, UserParam,
};
use crate::schema::{
    BinaryMetaDataRecord, ChromatogramMetaDataRecord, ControlledVocabularyRecord, CvParamRecord,
    CvReference, DataProcessingRecord, InstrumentConfigurationRecord, ParamGroupRecord,
    ParamListRecord, ParamRange, RefParamRecord, RunRecord, SampleRecord, ScanSettingRecord,
    SoftwareRecord, SourceFileRecord, SpectrumMetaDataRecord, UserParamRecord, NO_REF,
};

/// The shared tables and parameter arenas of a container, loaded in bulk.
///
/// Handles and ranges are resolved on demand; a handle or range outside its
/// table fails with [`ContainerError::InvalidFormat`].
#[derive(Debug, Default)]
pub struct ReferenceTables {
    terms: Vec<CvReference>,
    cv_params: Vec<CvParamRecord>,
    user_params: Vec<UserParamRecord>,
    ref_params: Vec<RefParamRecord>,
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

/// Read a file-wide table; absent tables are empty.
fn table<T: Element>(container: &Container, kind: DatasetKind) -> Result<Vec<T>, ContainerError> {
    if container.contains(kind, NO_CLUSTER) {
        container.read_dataset(kind, NO_CLUSTER)
    } else {
        Ok(Vec::new())
    }
}

fn corrupt(what: &str, handle: impl std::fmt::Display, len: usize) -> ContainerError {
    ContainerError::InvalidFormat(format!(
        "{} reference {} outside table of {} entries",
        what, handle, len
    ))
}

impl ReferenceTables {
    /// Load every shared table and arena of a container.
    pub fn load(container: &Container) -> Result<Self, ContainerError> {
        Ok(Self {
            terms: table(container, DatasetKind::CvReference)?,
            cv_params: table(container, DatasetKind::CvParam)?,
            user_params: table(container, DatasetKind::UserParam)?,
            ref_params: table(container, DatasetKind::RefParam)?,
            controlled_vocabularies: table(container, DatasetKind::ControlledVocabulary)?,
            file_content: table(container, DatasetKind::FileContent)?,
            contacts: table(container, DatasetKind::Contact)?,
            param_groups: table(container, DatasetKind::ParamGroups)?,
            source_files: table(container, DatasetKind::SourceFiles)?,
            samples: table(container, DatasetKind::Samples)?,
            software: table(container, DatasetKind::Software)?,
            scan_settings: table(container, DatasetKind::ScanSetting)?,
            instrument_configurations: table(container, DatasetKind::InstrumentConfiguration)?,
            data_processing: table(container, DatasetKind::DataProcessing)?,
            run: table(container, DatasetKind::Run)?,
        })
    }

    fn term(&self, handle: usize) -> Result<&CvReference, ContainerError> {
        self.terms
            .get(handle)
            .ok_or_else(|| corrupt("CV term", handle, self.terms.len()))
    }

    fn unit(&self, handle: i32) -> Result<(Option<String>, Option<String>), ContainerError> {
        if handle == NO_REF {
            return Ok((None, None));
        }
        let index = usize::try_from(handle).map_err(|_| corrupt("unit", handle, self.terms.len()))?;
        let term = self.term(index)?;
        Ok((Some(term.accession.clone()), Some(term.name.clone())))
    }

    fn id_of<'a, T>(
        &self,
        what: &str,
        rows: &'a [T],
        handle: i32,
        id: impl Fn(&'a T) -> &'a String,
    ) -> Result<Option<String>, ContainerError> {
        if handle == NO_REF {
            return Ok(None);
        }
        usize::try_from(handle)
            .ok()
            .and_then(|index| rows.get(index))
            .map(|row| Some(id(row).clone()))
            .ok_or_else(|| corrupt(what, handle, rows.len()))
    }

    fn software_id(&self, handle: i32) -> Result<Option<String>, ContainerError> {
        self.id_of("software", &self.software, handle, |r| &r.id)
    }

    fn source_file_id(&self, handle: i32) -> Result<Option<String>, ContainerError> {
        self.id_of("source file", &self.source_files, handle, |r| &r.id)
    }

    fn data_processing_id(&self, handle: i32) -> Result<Option<String>, ContainerError> {
        self.id_of("data processing", &self.data_processing, handle, |r| &r.id)
    }

    fn instrument_configuration_id(&self, handle: i32) -> Result<Option<String>, ContainerError> {
        self.id_of(
            "instrument configuration",
            &self.instrument_configurations,
            handle,
            |r| &r.id,
        )
    }

    /// Resolve a parameter list.
    pub fn params(&self, range: ParamRange) -> Result<ParamList, ContainerError> {
        let cv = self
            .cv_params
            .get(range.cv())
            .ok_or_else(|| corrupt("CV parameter", range.cv_end, self.cv_params.len()))?;
        let user = self
            .user_params
            .get(range.user())
            .ok_or_else(|| corrupt("user parameter", range.user_end, self.user_params.len()))?;
        let refs = self
            .ref_params
            .get(range.refs())
            .ok_or_else(|| corrupt("parameter group", range.ref_end, self.ref_params.len()))?;

        let mut list = ParamList::new();
        for param in cv {
            let term = self.term(param.term_ref as usize)?;
            let (unit_accession, unit_name) = self.unit(param.unit_ref)?;
            list.cv_params.push(CvParam {
                accession: term.accession.clone(),
                name: term.name.clone(),
                value: param.value.clone(),
                unit_accession,
                unit_name,
            });
        }
        for param in user {
            let (unit_accession, unit_name) = self.unit(param.unit_ref)?;
            list.user_params.push(UserParam {
                name: param.name.clone(),
                value: param.value.clone(),
                value_type: param.value_type.clone(),
                unit_accession,
                unit_name,
            });
        }
        for param in refs {
            let group = self
                .param_groups
                .get(param.group_ref as usize)
                .ok_or_else(|| corrupt("parameter group", param.group_ref, self.param_groups.len()))?;
            list.param_group_refs.push(group.id.clone());
        }
        Ok(list)
    }

    /// Rebuild the file-wide metadata.
    pub fn metadata(&self) -> Result<MsRunMetadata, ContainerError> {
        let mut metadata = MsRunMetadata {
            controlled_vocabularies: self
                .controlled_vocabularies
                .iter()
                .map(|cv| ControlledVocabulary {
                    id: cv.id.clone(),
                    full_name: cv.full_name.clone(),
                    uri: cv.uri.clone(),
                    version: cv.version.clone(),
                })
                .collect(),
            ..MsRunMetadata::default()
        };

        if let Some(content) = self.file_content.first() {
            metadata.file_content = self.params(content.params)?;
        }
        for contact in &self.contacts {
            metadata.contacts.push(self.params(contact.params)?);
        }
        for group in &self.param_groups {
            metadata.param_groups.push(ParamGroup {
                id: group.id.clone(),
                params: self.params(group.params)?,
            });
        }
        for file in &self.source_files {
            metadata.source_files.push(SourceFile {
                id: file.id.clone(),
                name: file.name.clone(),
                location: file.location.clone(),
                params: self.params(file.params)?,
            });
        }
        for sample in &self.samples {
            metadata.samples.push(Sample {
                id: sample.id.clone(),
                name: sample.name.clone(),
                params: self.params(sample.params)?,
            });
        }
        for software in &self.software {
            metadata.software.push(Software {
                id: software.id.clone(),
                version: software.version.clone(),
                params: self.params(software.params)?,
            });
        }
        for settings in &self.scan_settings {
            metadata.scan_settings.push(ScanSettings {
                id: settings.id.clone(),
                params: self.params(settings.params)?,
            });
        }
        for config in &self.instrument_configurations {
            metadata.instrument_configurations.push(InstrumentConfiguration {
                id: config.id.clone(),
                params: self.params(config.params)?,
                software_ref: self.software_id(config.software_ref)?,
            });
        }
        for processing in &self.data_processing {
            metadata.data_processing.push(DataProcessing {
                id: processing.id.clone(),
                software_ref: self.software_id(processing.software_ref)?,
                params: self.params(processing.params)?,
            });
        }
        if let Some(run) = self.run.first() {
            metadata.run = Run {
                id: run.id.clone(),
                start_time_stamp: run.start_time_stamp.clone(),
                default_instrument_configuration_ref: self
                    .instrument_configuration_id(run.default_instrument_configuration_ref)?,
                default_source_file_ref: self.source_file_id(run.default_source_file_ref)?,
                sample_ref: self.id_of("sample", &self.samples, run.sample_ref, |r| &r.id)?,
                default_spectrum_data_processing_ref: self
                    .data_processing_id(run.default_spectrum_data_processing_ref)?,
                default_chromatogram_data_processing_ref: self
                    .data_processing_id(run.default_chromatogram_data_processing_ref)?,
                params: self.params(run.params)?,
            };
        }
        Ok(metadata)
    }

    fn binary(&self, binary: &BinaryMetaDataRecord) -> Result<BinaryArrays, ContainerError> {
        Ok(BinaryArrays {
            x_params: self.params(binary.x_params)?,
            y_params: self.params(binary.y_params)?,
            x_data_processing_ref: self.data_processing_id(binary.x_data_processing_ref)?,
            y_data_processing_ref: self.data_processing_id(binary.y_data_processing_ref)?,
        })
    }

    fn precursor(
        &self,
        present: bool,
        spectrum_ref: &Option<String>,
        params: ParamRange,
        isolation_window: ParamRange,
        selected_ion: ParamRange,
        activation: ParamRange,
    ) -> Result<Option<Precursor>, ContainerError> {
        if !present {
            return Ok(None);
        }
        Ok(Some(Precursor {
            spectrum_ref: spectrum_ref.clone(),
            params: self.params(params)?,
            isolation_window: self.params(isolation_window)?,
            selected_ion: self.params(selected_ion)?,
            activation: self.params(activation)?,
        }))
    }

    /// Rebuild a spectrum without its arrays.
    pub fn spectrum(
        &self,
        record: &SpectrumMetaDataRecord,
        binary: &BinaryMetaDataRecord,
    ) -> Result<Spectrum, ContainerError> {
        let scan = if record.scan_present {
            Some(Scan {
                params: self.params(record.scan_params)?,
                instrument_configuration_ref: self
                    .instrument_configuration_id(record.scan_instrument_configuration_ref)?,
                external_spectrum_id: record.scan_external_spectrum_id.clone(),
            })
        } else {
            None
        };

        Ok(Spectrum {
            index: record.index as usize,
            id: record.id.clone(),
            spot_id: record.spot_id.clone(),
            params: self.params(record.params)?,
            scan,
            precursor: self.precursor(
                record.precursor_present,
                &record.precursor_spectrum_ref,
                record.precursor_params,
                record.isolation_window,
                record.selected_ion,
                record.activation,
            )?,
            data_processing_ref: self.data_processing_id(record.data_processing_ref)?,
            source_file_ref: self.source_file_id(record.source_file_ref)?,
            default_array_length: record.default_array_length as usize,
            binary: self.binary(binary)?,
            mz: None,
            intensity: None,
        })
    }

    /// Rebuild a chromatogram without its arrays.
    pub fn chromatogram(
        &self,
        record: &ChromatogramMetaDataRecord,
        binary: &BinaryMetaDataRecord,
    ) -> Result<Chromatogram, ContainerError> {
        Ok(Chromatogram {
            index: record.index as usize,
            id: record.id.clone(),
            params: self.params(record.params)?,
            precursor: self.precursor(
                record.precursor_present,
                &record.precursor_spectrum_ref,
                record.precursor_params,
                record.isolation_window,
                record.selected_ion,
                record.activation,
            )?,
            product: self.params(record.product)?,
            data_processing_ref: self.data_processing_id(record.data_processing_ref)?,
            default_array_length: record.default_array_length as usize,
            binary: self.binary(binary)?,
            time: None,
            intensity: None,
        })
    }
}
