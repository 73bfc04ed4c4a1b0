//! Seekable reader for stored ZIP entries
//!
//! [`EntryChunkReader`] implements parquet's [`ChunkReader`] over one stored
//! (uncompressed) archive entry. All entries of a container share a single
//! file handle; the mutex around it is held only for the seek and the byte
//! transfer, never while pages are decoded.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use parquet::errors::ParquetError;
use parquet::file::reader::{ChunkReader, Length};

/// Shared, mutex-guarded archive file handle
pub(crate) type SharedFile = Arc<Mutex<File>>;

/// Read `length` bytes at absolute `position` of the shared file.
fn read_at(file: &SharedFile, position: u64, length: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; length];
    let mut guard = file
        .lock()
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "archive handle poisoned"))?;
    guard.seek(SeekFrom::Start(position))?;
    guard.read_exact(&mut buf)?;
    Ok(buf)
}

/// Chunk reader over one stored archive entry
#[derive(Clone)]
pub struct EntryChunkReader {
    file: SharedFile,
    /// Byte offset of entry data within the archive
    entry_offset: u64,
    /// Size of the entry
    entry_size: u64,
}

impl EntryChunkReader {
    /// Reader over `entry_size` bytes starting at `entry_offset`
    pub(crate) fn new(file: SharedFile, entry_offset: u64, entry_size: u64) -> Self {
        Self {
            file,
            entry_offset,
            entry_size,
        }
    }

    /// Returns the size of the entry in bytes
    pub fn entry_size(&self) -> u64 {
        self.entry_size
    }

    /// Returns the byte offset of the entry within the archive
    pub fn entry_offset(&self) -> u64 {
        self.entry_offset
    }
}

impl std::fmt::Debug for EntryChunkReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryChunkReader")
            .field("entry_offset", &self.entry_offset)
            .field("entry_size", &self.entry_size)
            .finish()
    }
}

impl Length for EntryChunkReader {
    fn len(&self) -> u64 {
        self.entry_size
    }
}

/// Sequential reader over the tail of an entry, starting at some offset
pub struct EntrySliceReader {
    file: SharedFile,
    /// Absolute position of the next byte
    position: u64,
    /// Absolute end of the entry
    end: u64,
}

impl Read for EntrySliceReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = self.end.saturating_sub(self.position);
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let to_read = std::cmp::min(buf.len() as u64, remaining) as usize;
        let bytes = read_at(&self.file, self.position, to_read)?;
        buf[..to_read].copy_from_slice(&bytes);
        self.position += to_read as u64;
        Ok(to_read)
    }
}

impl ChunkReader for EntryChunkReader {
    type T = EntrySliceReader;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        if start > self.entry_size {
            return Err(ParquetError::EOF(format!(
                "read at {} past entry of {} bytes",
                start, self.entry_size
            )));
        }
        Ok(EntrySliceReader {
            file: Arc::clone(&self.file),
            position: self.entry_offset + start,
            end: self.entry_offset + self.entry_size,
        })
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        // Clamp length to not exceed entry boundary
        let remaining = self.entry_size.saturating_sub(start) as usize;
        let actual_length = std::cmp::min(length, remaining);

        let buf = read_at(&self.file, self.entry_offset + start, actual_length).map_err(|e| {
            ParquetError::General(format!("Failed to read from archive: {}", e))
        })?;
        Ok(Bytes::from(buf))
    }
}
