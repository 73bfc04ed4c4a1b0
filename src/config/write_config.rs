//! Generic write configuration and its TOML file form.
//!
//! ```toml
//! # trims5.toml
//! [write]
//! compression = "zstd"
//! compression_level = 3
//! mz_precision = "float32"
//! spectrum_chunk_size = 5000
//! buffer_mib = 8
//! ```

use std::path::Path;

use parquet::basic::{Compression, Encoding, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use parquet::schema::types::ColumnPath;
use serde::Deserialize;

use super::error::ConfigurationError;
use super::kinds::Precision;

/// Row group length used for unchunked datasets.
pub(crate) const SINGLE_ROW_GROUP: usize = i32::MAX as usize;

/// Compression options for dataset columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// ZSTD compression with the given level
    Zstd(i32),
    /// Snappy compression (faster, slightly larger files)
    Snappy,
    /// No compression; also disables chunking of metadata tables
    Uncompressed,
}

impl Default for CompressionType {
    fn default() -> Self {
        Self::Zstd(3)
    }
}

impl CompressionType {
    /// Whether any compression codec is applied.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, CompressionType::Uncompressed)
    }

    fn to_parquet(self) -> Compression {
        match self {
            CompressionType::Zstd(level) => {
                Compression::ZSTD(ZstdLevel::try_new(level).unwrap_or_default())
            }
            CompressionType::Snappy => Compression::SNAPPY,
            CompressionType::Uncompressed => Compression::UNCOMPRESSED,
        }
    }
}

/// Compression, precision and chunking policy applied when writing a container
#[derive(Debug, Clone, PartialEq)]
pub struct WriteConfig {
    /// Column compression codec
    pub compression: CompressionType,

    /// Precision of the stored mass axis
    pub mz_precision: Precision,

    /// Precision of the stored chromatogram time axis
    pub time_precision: Precision,

    /// Elements per row group of the spectrum sample streams.
    /// Smaller = faster random access, larger = better compression
    pub spectrum_chunk_size: usize,

    /// Elements per row group of the chromatogram sample streams
    pub chromatogram_chunk_size: usize,

    /// Memory budget for the spectrum stream buffers, in MiB
    pub buffer_mib: usize,

    /// Data page size in bytes
    pub data_page_size: usize,

    /// Whether to write column chunk statistics
    pub write_statistics: bool,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            compression: CompressionType::default(),
            mz_precision: Precision::Float64,
            time_precision: Precision::Float64,
            spectrum_chunk_size: 5000,
            chromatogram_chunk_size: 1000,
            buffer_mib: 8,
            data_page_size: 1024 * 1024,
            write_statistics: true,
        }
    }
}

impl WriteConfig {
    /// Configuration optimized for small files (slower write)
    pub fn max_compression() -> Self {
        Self {
            compression: CompressionType::Zstd(19),
            spectrum_chunk_size: 10_000,
            ..Self::default()
        }
    }

    /// Configuration optimized for fast writing (larger files)
    pub fn fast_write() -> Self {
        Self {
            compression: CompressionType::Snappy,
            spectrum_chunk_size: 1000,
            ..Self::default()
        }
    }

    /// Load a configuration from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from a TOML string.
    ///
    /// Every key of the `[write]` table is optional; missing keys keep their
    /// default value.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        let file: WriteConfigFile = toml::from_str(content)?;
        file.write.apply(Self::default())
    }

    /// Create Parquet writer properties for one dataset.
    ///
    /// `row_group_size` of zero writes a single row group. Columns listed in
    /// `float_columns` get BYTE_STREAM_SPLIT encoding and no dictionary.
    pub(crate) fn to_writer_properties(
        &self,
        row_group_size: usize,
        float_columns: &[&str],
        key_values: Vec<(String, String)>,
    ) -> WriterProperties {
        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };

        let row_group_size = if row_group_size == 0 {
            SINGLE_ROW_GROUP
        } else {
            row_group_size
        };

        let mut builder = WriterProperties::builder()
            .set_compression(self.compression.to_parquet())
            .set_data_page_size_limit(self.data_page_size)
            .set_statistics_enabled(statistics)
            .set_max_row_group_size(row_group_size);

        for col in float_columns {
            let path = ColumnPath::new(vec![col.to_string()]);
            builder = builder
                .set_column_dictionary_enabled(path.clone(), false)
                .set_column_encoding(path, Encoding::BYTE_STREAM_SPLIT);
        }

        let kv_metadata: Vec<KeyValue> = key_values
            .into_iter()
            .map(|(key, value)| KeyValue {
                key,
                value: Some(value),
            })
            .collect();

        builder.set_key_value_metadata(Some(kv_metadata)).build()
    }
}

/// Root structure of a `trims5.toml` file.
#[derive(Debug, Default, Deserialize)]
struct WriteConfigFile {
    #[serde(default)]
    write: WriteSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct WriteSection {
    compression: Option<String>,
    compression_level: Option<i32>,
    mz_precision: Option<Precision>,
    time_precision: Option<Precision>,
    spectrum_chunk_size: Option<usize>,
    chromatogram_chunk_size: Option<usize>,
    buffer_mib: Option<usize>,
    data_page_size: Option<usize>,
    write_statistics: Option<bool>,
}

impl WriteSection {
    fn apply(self, mut config: WriteConfig) -> Result<WriteConfig, ConfigurationError> {
        let level = self.compression_level;
        config.compression = match self.compression.as_deref() {
            None => level.map_or(config.compression, CompressionType::Zstd),
            Some("zstd") => CompressionType::Zstd(level.unwrap_or(3)),
            Some("snappy") => CompressionType::Snappy,
            Some("none") | Some("uncompressed") => CompressionType::Uncompressed,
            Some(other) => {
                return Err(ConfigurationError::InvalidValue {
                    key: "compression",
                    value: other.to_string(),
                })
            }
        };
        if let Some(p) = self.mz_precision {
            config.mz_precision = p;
        }
        if let Some(p) = self.time_precision {
            config.time_precision = p;
        }
        if let Some(n) = self.spectrum_chunk_size {
            config.spectrum_chunk_size = n;
        }
        if let Some(n) = self.chromatogram_chunk_size {
            config.chromatogram_chunk_size = n;
        }
        if let Some(n) = self.buffer_mib {
            config.buffer_mib = n;
        }
        if let Some(n) = self.data_page_size {
            config.data_page_size = n;
        }
        if let Some(b) = self.write_statistics {
            config.write_statistics = b;
        }
        Ok(config)
    }
}
