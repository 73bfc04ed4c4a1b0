//! Datasets under construction.
//!
//! A stored ZIP entry needs its full size before it can be streamed into the
//! archive, so every dataset is first written to a temporary Parquet file and
//! copied into the archive once it is sealed.

use std::any::Any;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};

use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use tempfile::NamedTempFile;
use zip::ZipWriter;

use super::element::Element;
use super::ContainerError;
use crate::config::{ConfigurationError, DatasetKind, ElementType};

/// 64KB buffer for stream copying (optimal for most filesystems)
const STREAM_COPY_BUFFER_SIZE: usize = 64 * 1024;

// =============================================================================
// Temp File Buffer
// =============================================================================

/// Buffer that writes Parquet data to a temp file for later ZIP inclusion.
pub(super) struct ParquetTempFile {
    temp_file: NamedTempFile,
    writer: BufWriter<File>,
}

impl ParquetTempFile {
    pub(super) fn new() -> std::io::Result<Self> {
        let temp_file = NamedTempFile::new()?;
        let file = temp_file.reopen()?;
        let writer = BufWriter::new(file);
        Ok(Self { temp_file, writer })
    }

    fn size(&self) -> std::io::Result<u64> {
        self.temp_file.as_file().metadata().map(|m| m.len())
    }

    pub(super) fn into_reader(mut self) -> std::io::Result<(u64, BufReader<File>)> {
        self.writer.flush()?;
        let size = self.size()?;
        let mut file = self.temp_file.reopen()?;
        file.seek(SeekFrom::Start(0))?;
        Ok((size, BufReader::new(file)))
    }
}

impl Write for ParquetTempFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

/// Stream data from a reader into the current ZIP entry.
pub(super) fn stream_copy_to_zip<R: Read, W: Write + Seek>(
    mut reader: R,
    zip_writer: &mut ZipWriter<W>,
) -> std::io::Result<u64> {
    let mut buffer = vec![0u8; STREAM_COPY_BUFFER_SIZE];
    let mut total_written = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        zip_writer.write_all(&buffer[..bytes_read])?;
        total_written += bytes_read as u64;
    }

    Ok(total_written)
}

// =============================================================================
// Pending element buffers
// =============================================================================

trait PendingBuffer: Send {
    fn len(&self) -> usize;
    fn write_to(&mut self, writer: &mut ArrowWriter<ParquetTempFile>) -> Result<(), ContainerError>;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct TypedBuffer<T: Element> {
    items: Vec<T>,
}

impl<T: Element> PendingBuffer for TypedBuffer<T> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn write_to(&mut self, writer: &mut ArrowWriter<ParquetTempFile>) -> Result<(), ContainerError> {
        if self.items.is_empty() {
            return Ok(());
        }
        let batch = T::to_batch(&self.items)?;
        writer.write(&batch)?;
        self.items.clear();
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// Staged dataset
// =============================================================================

/// A dataset being appended to
pub(super) struct StagedDataset {
    kind: DatasetKind,
    element_type: ElementType,
    writer: ArrowWriter<ParquetTempFile>,
    pending: Box<dyn PendingBuffer>,
    buffer_size: usize,
    count: u64,
    flushes: usize,
}

/// A sealed dataset ready to be copied into the archive
pub(super) struct SealedDataset {
    pub(super) count: u64,
    pub(super) size: u64,
    pub(super) reader: BufReader<File>,
}

impl StagedDataset {
    pub(super) fn new<T: Element>(
        kind: DatasetKind,
        properties: WriterProperties,
        buffer_size: usize,
    ) -> Result<Self, ContainerError> {
        let file = ParquetTempFile::new()?;
        let writer = ArrowWriter::try_new(file, T::schema(), Some(properties))?;
        Ok(Self {
            kind,
            element_type: T::ELEMENT_TYPE,
            writer,
            pending: Box::new(TypedBuffer::<T> { items: Vec::new() }),
            buffer_size,
            count: 0,
            flushes: 0,
        })
    }

    /// Append elements; flushes once the buffer holds `buffer_size`
    /// elements, or immediately when the buffer size is zero.
    pub(super) fn extend<T: Element>(&mut self, items: &[T]) -> Result<(), ContainerError> {
        let buffered = {
            let buffer = self
                .pending
                .as_any_mut()
                .downcast_mut::<TypedBuffer<T>>()
                .ok_or(ConfigurationError::TypeMismatch {
                    kind: self.kind,
                    expected: self.element_type,
                    requested: T::ELEMENT_TYPE,
                })?;
            buffer.items.extend_from_slice(items);
            buffer.items.len()
        };
        self.count += items.len() as u64;

        if buffered > 0 && buffered >= self.buffer_size {
            self.pending.write_to(&mut self.writer)?;
            self.flushes += 1;
        }
        Ok(())
    }

    /// Elements appended so far
    pub(super) fn count(&self) -> u64 {
        self.count
    }

    /// Elements waiting in the buffer
    pub(super) fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Number of buffer flushes so far
    pub(super) fn flushes(&self) -> usize {
        self.flushes
    }

    /// Flush the buffer and write the Parquet footer.
    pub(super) fn seal(mut self) -> Result<SealedDataset, ContainerError> {
        self.pending.write_to(&mut self.writer)?;
        let file = self.writer.into_inner()?;
        let (size, reader) = file.into_reader()?;
        Ok(SealedDataset {
            count: self.count,
            size,
            reader,
        })
    }
}
