//! # Record Layouts
//!
//! Arrow layouts of the compound datasets. Every record type declares the
//! element type name registered for it in the
//! [`Configuration`](crate::config::Configuration); the container checks the
//! two agree before a dataset is written or read.
//!
//! | Dataset | Record |
//! |---------|--------|
//! | `FileInformation` | [`FileInformation`] |
//! | `SpectrumListIndices` | [`SpectrumListIndex`] |
//! | `ControlledVocabulary` | [`ControlledVocabularyRecord`] |
//! | `CVReference` | [`CvReference`] |
//! | `CVParam` / `UserParam` / `RefParam` | [`CvParamRecord`] / [`UserParamRecord`] / [`RefParamRecord`] |
//! | `FileContent`, `Contact` | [`ParamListRecord`] |
//! | `ParamGroups`, `SourceFiles`, `Samples` | [`ParamGroupRecord`], [`SourceFileRecord`], [`SampleRecord`] |
//! | `Software`, `ScanSetting` | [`SoftwareRecord`], [`ScanSettingRecord`] |
//! | `InstrumentConfiguration`, `DataProcessing`, `Run` | [`InstrumentConfigurationRecord`], [`DataProcessingRecord`], [`RunRecord`] |
//! | `SpectrumMetaData` | [`SpectrumMetaDataRecord`] |
//! | `SpectrumListBinaryData`, `ChromatogramListBinaryData` | [`BinaryMetaDataRecord`] |
//! | `ChromatogramList` | [`ChromatogramMetaDataRecord`] |

mod param_range;
mod records;

#[cfg(test)]
mod tests;

pub use param_range::ParamRange;
pub use records::*;
