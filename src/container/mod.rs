//! # triMS5 Container
//!
//! A container is a single ZIP archive holding a hierarchy of groups and
//! typed datasets:
//!
//! ```text
//! sample.trims5
//! ├── mimetype                                   # "application/vnd.trims5" (stored, first)
//! ├── .attributes.json                           # root attributes ("triMS5": true, ...)
//! ├── FileInformation.parquet                    # written last
//! ├── MetaData/                                  # shared tables and parameter arenas
//! │   ├── CVParam.parquet
//! │   └── ...
//! └── RawData/
//!     ├── SpectrumListIndices.parquet            # GlobalIndex
//!     └── Cluster_1/
//!         ├── Spectrum/
//!         │   ├── SpectrumMassAxis.parquet
//!         │   ├── SpectrumMassIndices.parquet
//!         │   └── ...
//!         └── Chromatogram/
//! ```
//!
//! Every dataset is a Parquet file stored uncompressed in the archive, so a
//! reader seeks straight into it; chunks are Parquet row groups. Writes are
//! staged in temporary files and copied into the archive when a dataset is
//! sealed. Group attributes are kept in memory and written at close.
//!
//! Reads go through `&self` and may run from several threads at once: each
//! dataset read opens its own Parquet reader over the shared file handle.

mod attributes;
mod chunk_reader;
mod element;
mod error;
mod staging;


use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info, warn};
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder, RowSelection,
    RowSelector,
};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub use attributes::{AttributeValue, ATTRIBUTES_ENTRY};
pub use chunk_reader::{EntryChunkReader, EntrySliceReader};
pub use element::{column, downcast, ColumnValue, Element, VALUE_COLUMN};
pub use error::ContainerError;

use crate::config::{
    Configuration, ConfigurationError, DatasetKind, FormatVersion, GroupKind, NO_BUFFER_SIZE,
    NO_CLUSTER,
};
use crate::schema::FileInformation;
use chunk_reader::SharedFile;
use staging::{stream_copy_to_zip, SealedDataset, StagedDataset};

/// MIME type stored in the leading `mimetype` entry
pub const MIMETYPE: &str = "application/vnd.trims5";

/// Name of the leading entry identifying the archive
pub const MIMETYPE_ENTRY: &str = "mimetype";

/// Root attribute marking an archive as a triMS5 container
pub const MARKER_ATTRIBUTE: &str = "triMS5";

/// Rows decoded per record batch when reading
const READ_BATCH_SIZE: usize = 64 * 1024;

/// How [`Container::open`] treats the path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenPolicy {
    /// Create a new file; fail if it already exists
    FailIfExists,
    /// Create a new file, replacing any existing one
    RemoveAndCreate,
    /// Open an existing container for reading and appending
    ReadWrite,
    /// Open an existing container for reading
    ReadOnly,
}

impl OpenPolicy {
    /// Whether the policy allows writes
    pub fn is_writable(&self) -> bool {
        !matches!(self, OpenPolicy::ReadOnly)
    }

    fn creates(&self) -> bool {
        matches!(self, OpenPolicy::FailIfExists | OpenPolicy::RemoveAndCreate)
    }
}

/// Identity of a dataset: its kind and the cluster it belongs to
/// ([`NO_CLUSTER`] for file-wide datasets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetKey {
    /// Dataset kind
    pub kind: DatasetKind,
    /// Cluster id
    pub cluster_id: i32,
}

impl DatasetKey {
    /// Create a key
    pub fn new(kind: DatasetKind, cluster_id: i32) -> Self {
        Self { kind, cluster_id }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cluster_id == NO_CLUSTER {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} of cluster {}", self.kind, self.cluster_id)
        }
    }
}

/// An opened group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Group kind
    pub kind: GroupKind,
    /// Cluster id, [`NO_CLUSTER`] outside the cluster hierarchy
    pub cluster_id: i32,
    /// Archive path without trailing slash; `""` for the root
    pub path: String,
}

// =============================================================================
// Archive state
// =============================================================================

/// A dataset present in the archive at open
struct StoredDataset {
    offset: u64,
    size: u64,
    metadata: ArrowReaderMetadata,
}

struct ArchiveReader {
    file: SharedFile,
    datasets: HashMap<DatasetKey, StoredDataset>,
}

struct ArchiveWriter {
    zip: ZipWriter<BufWriter<File>>,
    /// Set when an existing container is being rewritten
    replace: Option<NamedTempFile>,
}

impl ArchiveWriter {
    /// Start a rewrite of an existing container: entries are copied raw into
    /// a sibling temp file, except attributes which are rewritten at close.
    fn rewrite(path: &Path) -> Result<Self, ContainerError> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let temp = NamedTempFile::new_in(dir)?;
        let mut zip = ZipWriter::new(BufWriter::new(temp.reopen()?));

        let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
        let mut copied = 0usize;
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            if entry.name().ends_with(ATTRIBUTES_ENTRY) {
                continue;
            }
            zip.raw_copy_file(entry)?;
            copied += 1;
        }
        debug!(
            "Rewriting {} ({} entries carried over)",
            path.display(),
            copied
        );
        Ok(Self {
            zip,
            replace: Some(temp),
        })
    }

    fn write_dataset(&mut self, entry: String, sealed: SealedDataset) -> Result<u64, ContainerError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .unix_permissions(0o644)
            .large_file(sealed.size >= u64::from(u32::MAX));
        debug!("Writing {} ({} bytes, {} elements)", entry, sealed.size, sealed.count);
        self.zip.start_file(entry, options)?;
        stream_copy_to_zip(sealed.reader, &mut self.zip)?;
        Ok(sealed.count)
    }

    fn write_attributes(
        &mut self,
        group_path: &str,
        values: &BTreeMap<String, AttributeValue>,
    ) -> Result<(), ContainerError> {
        let entry = if group_path.is_empty() {
            ATTRIBUTES_ENTRY.to_string()
        } else {
            format!("{}/{}", group_path, ATTRIBUTES_ENTRY)
        };
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        self.zip.start_file(entry, options)?;
        self.zip.write_all(&serde_json::to_vec_pretty(values)?)?;
        Ok(())
    }

    fn finish(self, path: &Path) -> Result<(), ContainerError> {
        let buffered = self.zip.finish()?;
        buffered.into_inner().map_err(|e| {
            std::io::Error::new(
                e.error().kind(),
                format!("Failed to flush archive: {}", e.error()),
            )
        })?;
        if let Some(temp) = self.replace {
            temp.persist(path).map_err(|e| e.error)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct WriteState {
    archive: Option<ArchiveWriter>,
    staged: BTreeMap<DatasetKey, StagedDataset>,
}

// =============================================================================
// Container
// =============================================================================

/// A triMS5 container file
pub struct Container {
    path: PathBuf,
    policy: OpenPolicy,
    config: Configuration,
    version: Option<FormatVersion>,
    reader: Option<ArchiveReader>,
    write: Mutex<WriteState>,
    catalog: BTreeMap<DatasetKey, u64>,
    groups: BTreeSet<String>,
    attributes: BTreeMap<String, BTreeMap<String, AttributeValue>>,
    closed: bool,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .field("datasets", &self.catalog.len())
            .field("groups", &self.groups.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl Container {
    /// Open or create a container.
    ///
    /// Existing containers are validated: the archive must carry the triMS5
    /// mimetype and marker attribute, and a compatible `FileInformation`
    /// record. A container without `FileInformation` was never finalized and
    /// fails with [`ContainerError::IncompleteWrite`].
    pub fn open<P: AsRef<Path>>(
        path: P,
        policy: OpenPolicy,
        config: Configuration,
    ) -> Result<Self, ContainerError> {
        let path = path.as_ref().to_path_buf();
        if policy.creates() {
            Self::create(path, policy, config)
        } else {
            Self::open_existing(path, policy, config)
        }
    }

    fn empty(path: PathBuf, policy: OpenPolicy, config: Configuration) -> Self {
        let mut groups = BTreeSet::new();
        groups.insert(String::new());
        Self {
            path,
            policy,
            config,
            version: None,
            reader: None,
            write: Mutex::new(WriteState::default()),
            catalog: BTreeMap::new(),
            groups,
            attributes: BTreeMap::new(),
            closed: false,
        }
    }

    fn create(path: PathBuf, policy: OpenPolicy, config: Configuration) -> Result<Self, ContainerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = match policy {
            OpenPolicy::FailIfExists => OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .map_err(|e| match e.kind() {
                    std::io::ErrorKind::AlreadyExists => {
                        ContainerError::AlreadyExists(path.display().to_string())
                    }
                    _ => ContainerError::IoError(e),
                })?,
            _ => File::create(&path)?,
        };

        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .unix_permissions(0o644);
        zip.start_file(MIMETYPE_ENTRY, options)?;
        zip.write_all(MIMETYPE.as_bytes())?;

        let mut container = Self::empty(path, policy, config);
        container.write_state().archive = Some(ArchiveWriter { zip, replace: None });
        container
            .attributes
            .entry(String::new())
            .or_default()
            .insert(MARKER_ATTRIBUTE.to_string(), AttributeValue::Bool(true));

        info!("Created container {}", container.path.display());
        Ok(container)
    }

    fn open_existing(
        path: PathBuf,
        policy: OpenPolicy,
        config: Configuration,
    ) -> Result<Self, ContainerError> {
        if !path.exists() {
            return Err(ContainerError::NotFound(path.display().to_string()));
        }

        let file = File::open(&path)?;
        let mut archive = ZipArchive::new(BufReader::new(file.try_clone()?)).map_err(|e| match e {
            zip::result::ZipError::Io(e) => ContainerError::IoError(e),
            other => ContainerError::FormatMismatch(format!(
                "{} is not a ZIP archive: {}",
                path.display(),
                other
            )),
        })?;
        check_mimetype(&mut archive, &path)?;

        let mut container = Self::empty(path, policy, config);
        let mut entries = Vec::new();
        let mut attribute_entries = Vec::new();

        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            let name = entry.name().to_string();
            if entry.is_dir() {
                container.groups.insert(name.trim_end_matches('/').to_string());
                continue;
            }
            if name == MIMETYPE_ENTRY {
                continue;
            }
            if let Some(group) = name.strip_suffix(ATTRIBUTES_ENTRY) {
                attribute_entries.push((i, group.trim_end_matches('/').to_string()));
                continue;
            }
            match container.config.parse_dataset_entry(&name) {
                Ok((kind, cluster_id)) => {
                    if entry.compression() != CompressionMethod::Stored {
                        return Err(ContainerError::FormatMismatch(format!(
                            "dataset entry {} is compressed ({:?}); datasets must be stored",
                            name,
                            entry.compression()
                        )));
                    }
                    entries.push((DatasetKey::new(kind, cluster_id), entry.data_start(), entry.size()));
                }
                Err(e) => warn!("Skipping unrecognised entry {}: {}", name, e),
            }
        }

        for (index, group) in attribute_entries {
            let mut json = String::new();
            archive.by_index(index)?.read_to_string(&mut json)?;
            let values: BTreeMap<String, AttributeValue> = serde_json::from_str(&json)?;
            container.attributes.insert(group, values);
        }
        drop(archive);

        let is_marked = container
            .attribute(GroupKind::Root, NO_CLUSTER, MARKER_ATTRIBUTE)
            .and_then(AttributeValue::as_bool)
            .unwrap_or(false);
        if !is_marked {
            return Err(ContainerError::FormatMismatch(format!(
                "{} carries no {} marker",
                container.path.display(),
                MARKER_ATTRIBUTE
            )));
        }

        let shared: SharedFile = Arc::new(Mutex::new(file));
        let mut datasets = HashMap::with_capacity(entries.len());
        for (key, offset, size) in entries {
            let reader = EntryChunkReader::new(Arc::clone(&shared), offset, size);
            let metadata = ArrowReaderMetadata::load(&reader, ArrowReaderOptions::new())?;
            let rows = metadata.metadata().file_metadata().num_rows();
            container.catalog.insert(key, u64::try_from(rows).unwrap_or(0));
            datasets.insert(key, StoredDataset { offset, size, metadata });

            let chain = container.group_chain(container.config.group_for(key.kind)?, key.cluster_id)?;
            container.groups.extend(chain);
        }
        container.reader = Some(ArchiveReader { file: shared, datasets });

        container.validate_file_information()?;
        info!(
            "Opened container {} ({} datasets, {} groups)",
            container.path.display(),
            container.catalog.len(),
            container.groups.len()
        );
        Ok(container)
    }

    fn validate_file_information(&mut self) -> Result<(), ContainerError> {
        if !self.contains(DatasetKind::FileInformation, NO_CLUSTER) {
            return Err(ContainerError::IncompleteWrite(self.path.clone()));
        }
        let records: Vec<FileInformation> =
            self.read_dataset(DatasetKind::FileInformation, NO_CLUSTER)?;
        let stored = records
            .first()
            .ok_or_else(|| ContainerError::InvalidFormat("FileInformation is empty".to_string()))?
            .version();

        let expected = self.config.version();
        if !expected.is_compatible_with(&stored) {
            return Err(ContainerError::FormatMismatch(format!(
                "{} has version {}, expected {}",
                self.path.display(),
                stored,
                expected
            )));
        }
        if stored != expected {
            debug!("Container version {} differs from {} in minor version", stored, expected);
        }
        self.version = Some(stored);
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Path of the container file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Policy the container was opened with
    pub fn policy(&self) -> OpenPolicy {
        self.policy
    }

    /// Layout configuration
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Version recorded in `FileInformation`; `None` for containers created
    /// in this session
    pub fn file_version(&self) -> Option<FormatVersion> {
        self.version
    }

    /// Element counts of all sealed datasets
    pub fn catalog(&self) -> &BTreeMap<DatasetKey, u64> {
        &self.catalog
    }

    /// Whether a sealed dataset exists
    pub fn contains(&self, kind: DatasetKind, cluster_id: i32) -> bool {
        self.count(kind, cluster_id).is_some()
    }

    /// Element count of a sealed dataset
    pub fn count(&self, kind: DatasetKind, cluster_id: i32) -> Option<u64> {
        let key = self.key(kind, cluster_id).ok()?;
        self.catalog.get(&key).copied()
    }

    /// Ids of all clusters holding at least one dataset, ascending
    pub fn cluster_ids(&self) -> BTreeSet<i32> {
        self.catalog
            .keys()
            .map(|key| key.cluster_id)
            .filter(|id| *id != NO_CLUSTER)
            .collect()
    }

    /// Archive paths of all known groups; the root is `""`
    pub fn groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    /// Whether a group exists
    pub fn has_group(&self, kind: GroupKind, cluster_id: i32) -> bool {
        self.config
            .group_path(kind, normalize_cluster(kind, cluster_id))
            .map(|path| self.groups.contains(&path))
            .unwrap_or(false)
    }

    // =========================================================================
    // Groups and attributes
    // =========================================================================

    /// Open a group, creating it and its parents in writable containers.
    pub fn open_group(&mut self, kind: GroupKind, cluster_id: i32) -> Result<Group, ContainerError> {
        let cluster_id = normalize_cluster(kind, cluster_id);
        let path = self.config.group_path(kind, cluster_id)?;
        if !self.groups.contains(&path) {
            if !self.policy.is_writable() {
                return Err(ContainerError::NotFound(format!("group {}", path)));
            }
            if let Some(parent) = self.config.parent_group(kind)? {
                self.open_group(parent, cluster_id)?;
            }
            let options = SimpleFileOptions::default().unix_permissions(0o755);
            self.archive_writer()?
                .zip
                .add_directory(format!("{}/", path), options)?;
            debug!("Created group {}", path);
            self.groups.insert(path.clone());
        }
        Ok(Group {
            kind,
            cluster_id,
            path,
        })
    }

    /// Set an attribute on a group. Attributes are written at close.
    pub fn write_attribute(
        &mut self,
        group: GroupKind,
        cluster_id: i32,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<(), ContainerError> {
        self.ensure_writable()?;
        let group = self.open_group(group, cluster_id)?;
        self.archive_writer()?;
        self.attributes
            .entry(group.path)
            .or_default()
            .insert(name.to_string(), value.into());
        Ok(())
    }

    /// An attribute of a group
    pub fn attribute(&self, group: GroupKind, cluster_id: i32, name: &str) -> Option<&AttributeValue> {
        self.attributes(group, cluster_id)?.get(name)
    }

    /// All attributes of a group
    pub fn attributes(
        &self,
        group: GroupKind,
        cluster_id: i32,
    ) -> Option<&BTreeMap<String, AttributeValue>> {
        let path = self
            .config
            .group_path(group, normalize_cluster(group, cluster_id))
            .ok()?;
        self.attributes.get(&path)
    }

    // =========================================================================
    // Writing
    // =========================================================================

    /// Create a dataset and write all of its elements at once.
    pub fn create_and_write<T: Element>(
        &mut self,
        kind: DatasetKind,
        cluster_id: i32,
        items: &[T],
    ) -> Result<(), ContainerError> {
        self.ensure_writable()?;
        self.check_write_type::<T>(kind)?;
        let key = self.key(kind, cluster_id)?;
        self.ensure_absent(key)?;

        let mut staged = self.stage::<T>(key, NO_BUFFER_SIZE)?;
        staged.extend(items)?;
        self.commit(key, staged)
    }

    /// Append elements to a dataset, creating it on first use.
    ///
    /// Elements are buffered up to the configured buffer size of the dataset
    /// kind and flushed as row groups of the configured chunk size.
    pub fn extend<T: Element>(
        &mut self,
        kind: DatasetKind,
        cluster_id: i32,
        items: &[T],
    ) -> Result<(), ContainerError> {
        self.ensure_writable()?;
        self.check_write_type::<T>(kind)?;
        let key = self.key(kind, cluster_id)?;
        if self.catalog.contains_key(&key) {
            return Err(ContainerError::AlreadyExists(key.to_string()));
        }

        if !self.write_state().staged.contains_key(&key) {
            let buffer_size = self.config.buffer_size_for(kind)?;
            let staged = self.stage::<T>(key, buffer_size)?;
            self.write_state().staged.insert(key, staged);
        }
        match self.write_state().staged.get_mut(&key) {
            Some(staged) => staged.extend(items),
            None => Err(ContainerError::Closed),
        }
    }

    /// Seal an appended dataset and copy it into the archive. A dataset that
    /// was never extended is created empty.
    pub fn finish_dataset<T: Element>(
        &mut self,
        kind: DatasetKind,
        cluster_id: i32,
    ) -> Result<(), ContainerError> {
        self.ensure_writable()?;
        let key = self.key(kind, cluster_id)?;
        if self.catalog.contains_key(&key) {
            return Ok(());
        }
        let staged = match self.write_state().staged.remove(&key) {
            Some(staged) => staged,
            None => {
                self.check_write_type::<T>(kind)?;
                self.stage::<T>(key, NO_BUFFER_SIZE)?
            }
        };
        self.commit(key, staged)
    }

    /// Elements appended to a dataset that is not sealed yet: total count,
    /// elements waiting in the buffer and number of flushes.
    pub fn staged_progress(&mut self, kind: DatasetKind, cluster_id: i32) -> Option<(u64, usize, usize)> {
        let key = self.key(kind, cluster_id).ok()?;
        self.write_state()
            .staged
            .get(&key)
            .map(|staged| (staged.count(), staged.buffered(), staged.flushes()))
    }

    fn stage<T: Element>(&mut self, key: DatasetKey, buffer_size: usize) -> Result<StagedDataset, ContainerError> {
        let group = self.config.group_for(key.kind)?;
        self.open_group(group, key.cluster_id)?;
        let properties = self.config.writer_properties(key.kind, T::float_columns())?;
        StagedDataset::new::<T>(key.kind, properties, buffer_size)
    }

    fn commit(&mut self, key: DatasetKey, staged: StagedDataset) -> Result<(), ContainerError> {
        let entry = self.config.dataset_entry(key.kind, key.cluster_id)?;
        let sealed = staged.seal()?;
        let count = self.archive_writer()?.write_dataset(entry, sealed)?;
        self.catalog.insert(key, count);
        Ok(())
    }

    fn ensure_writable(&self) -> Result<(), ContainerError> {
        if self.closed {
            return Err(ContainerError::Closed);
        }
        if !self.policy.is_writable() {
            return Err(ContainerError::ReadOnly);
        }
        Ok(())
    }

    fn ensure_absent(&mut self, key: DatasetKey) -> Result<(), ContainerError> {
        if self.catalog.contains_key(&key) || self.write_state().staged.contains_key(&key) {
            return Err(ContainerError::AlreadyExists(key.to_string()));
        }
        Ok(())
    }

    fn write_state(&mut self) -> &mut WriteState {
        self.write.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// The archive writer, starting a rewrite of an existing container on
    /// first use.
    fn archive_writer(&mut self) -> Result<&mut ArchiveWriter, ContainerError> {
        self.ensure_writable()?;
        let state = self.write.get_mut().unwrap_or_else(PoisonError::into_inner);
        if state.archive.is_none() {
            state.archive = Some(ArchiveWriter::rewrite(&self.path)?);
        }
        state.archive.as_mut().ok_or(ContainerError::Closed)
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// Read a whole dataset.
    pub fn read_dataset<T: Element>(
        &self,
        kind: DatasetKind,
        cluster_id: i32,
    ) -> Result<Vec<T>, ContainerError> {
        let (key, stored, reader) = self.stored::<T>(kind, cluster_id)?;
        let count = self.catalog.get(&key).copied().unwrap_or(0);

        let batches = ParquetRecordBatchReaderBuilder::new_with_metadata(reader, stored.metadata.clone())
            .with_batch_size(READ_BATCH_SIZE)
            .build()?;
        let mut items = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
        for batch in batches {
            items.extend(T::from_batch(&batch?)?);
        }
        Ok(items)
    }

    /// Read elements `[start, end)` of a dataset.
    ///
    /// Only the row groups overlapping the range are decoded.
    pub fn get_range<T: Element>(
        &self,
        kind: DatasetKind,
        cluster_id: i32,
        start: u64,
        end: u64,
    ) -> Result<Vec<T>, ContainerError> {
        let (key, stored, reader) = self.stored::<T>(kind, cluster_id)?;
        let count = self.catalog.get(&key).copied().unwrap_or(0);
        if start > end || end > count {
            return Err(ContainerError::OutOfRange {
                kind: key.kind,
                cluster_id: key.cluster_id,
                start,
                end,
                count,
            });
        }
        if start == end {
            return Ok(Vec::new());
        }

        let mut row_groups = Vec::new();
        let mut first_row = None;
        let mut last_row = 0u64;
        let mut group_start = 0u64;
        for (i, row_group) in stored.metadata.metadata().row_groups().iter().enumerate() {
            let group_end = group_start + u64::try_from(row_group.num_rows()).unwrap_or(0);
            if group_end > start && group_start < end {
                row_groups.push(i);
                first_row.get_or_insert(group_start);
                last_row = group_end;
            }
            group_start = group_end;
        }
        let first_row = first_row.unwrap_or(start);

        let mut selectors = Vec::with_capacity(3);
        if start > first_row {
            selectors.push(RowSelector::skip(to_usize(start - first_row)?));
        }
        selectors.push(RowSelector::select(to_usize(end - start)?));
        if last_row > end {
            selectors.push(RowSelector::skip(to_usize(last_row - end)?));
        }

        let batches = ParquetRecordBatchReaderBuilder::new_with_metadata(reader, stored.metadata.clone())
            .with_row_groups(row_groups)
            .with_row_selection(RowSelection::from(selectors))
            .with_batch_size(READ_BATCH_SIZE)
            .build()?;
        let mut items = Vec::with_capacity(to_usize(end - start)?);
        for batch in batches {
            items.extend(T::from_batch(&batch?)?);
        }
        Ok(items)
    }

    /// Number of row groups of a sealed dataset read from the archive
    pub fn chunk_count(&self, kind: DatasetKind, cluster_id: i32) -> Option<usize> {
        let key = self.key(kind, cluster_id).ok()?;
        let stored = self.reader.as_ref()?.datasets.get(&key)?;
        Some(stored.metadata.metadata().num_row_groups())
    }

    fn stored<T: Element>(
        &self,
        kind: DatasetKind,
        cluster_id: i32,
    ) -> Result<(DatasetKey, &StoredDataset, EntryChunkReader), ContainerError> {
        if self.closed {
            return Err(ContainerError::Closed);
        }
        self.check_read_type::<T>(kind)?;
        let key = self.key(kind, cluster_id)?;
        let not_found = || ContainerError::NotFound(format!("dataset {}", key));
        let archive = self.reader.as_ref().ok_or_else(not_found)?;
        let stored = archive.datasets.get(&key).ok_or_else(not_found)?;
        let reader = EntryChunkReader::new(Arc::clone(&archive.file), stored.offset, stored.size);
        Ok((key, stored, reader))
    }

    // =========================================================================
    // Typing
    // =========================================================================

    fn key(&self, kind: DatasetKind, cluster_id: i32) -> Result<DatasetKey, ConfigurationError> {
        let group = self.config.group_for(kind)?;
        let cluster_id = normalize_cluster(group, cluster_id);
        self.config.group_path(group, cluster_id)?;
        Ok(DatasetKey::new(kind, cluster_id))
    }

    fn check_write_type<T: Element>(&self, kind: DatasetKind) -> Result<(), ConfigurationError> {
        let expected = self.config.type_for(kind)?;
        if T::ELEMENT_TYPE != expected {
            return Err(ConfigurationError::TypeMismatch {
                kind,
                expected,
                requested: T::ELEMENT_TYPE,
            });
        }
        Ok(())
    }

    fn check_read_type<T: Element>(&self, kind: DatasetKind) -> Result<(), ConfigurationError> {
        let expected = self.config.type_for(kind)?;
        if !T::accepts(expected) {
            return Err(ConfigurationError::TypeMismatch {
                kind,
                expected,
                requested: T::ELEMENT_TYPE,
            });
        }
        Ok(())
    }

    fn group_chain(&self, kind: GroupKind, cluster_id: i32) -> Result<Vec<String>, ConfigurationError> {
        let mut chain = Vec::new();
        let mut current = Some(kind);
        while let Some(group) = current {
            chain.push(self.config.group_path(group, normalize_cluster(group, cluster_id))?);
            current = self.config.parent_group(group)?;
        }
        Ok(chain)
    }

    // =========================================================================
    // Closing
    // =========================================================================

    /// Seal all pending datasets, write the group attributes and finish the
    /// archive.
    pub fn close(mut self) -> Result<(), ContainerError> {
        self.finalize()
    }

    fn finalize(&mut self) -> Result<(), ContainerError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if !self.policy.is_writable() {
            return Ok(());
        }

        let state = self.write.get_mut().unwrap_or_else(PoisonError::into_inner);
        let Some(mut archive) = state.archive.take() else {
            return Ok(());
        };
        let staged = std::mem::take(&mut state.staged);

        for (key, dataset) in staged {
            let entry = self.config.dataset_entry(key.kind, key.cluster_id)?;
            let count = archive.write_dataset(entry, dataset.seal()?)?;
            self.catalog.insert(key, count);
        }
        for (group, values) in &self.attributes {
            archive.write_attributes(group, values)?;
        }
        archive.finish(&self.path)?;

        info!(
            "Closed container {} ({} datasets)",
            self.path.display(),
            self.catalog.len()
        );
        Ok(())
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.finalize() {
                warn!("Failed to finalize container {}: {}", self.path.display(), e);
            }
        }
    }
}

fn normalize_cluster(group: GroupKind, cluster_id: i32) -> i32 {
    if group.is_per_cluster() {
        cluster_id
    } else {
        NO_CLUSTER
    }
}

fn to_usize(value: u64) -> Result<usize, ContainerError> {
    usize::try_from(value)
        .map_err(|_| ContainerError::InvalidFormat(format!("row count {} exceeds usize", value)))
}

fn check_mimetype<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
) -> Result<(), ContainerError> {
    let mismatch = |reason: &str| {
        ContainerError::FormatMismatch(format!("{}: {}", path.display(), reason))
    };
    if archive.len() == 0 {
        return Err(mismatch("empty archive"));
    }
    let mut entry = archive.by_index(0)?;
    if entry.name() != MIMETYPE_ENTRY {
        return Err(mismatch("first entry is not mimetype"));
    }
    let mut mimetype = String::new();
    entry
        .read_to_string(&mut mimetype)
        .map_err(|_| mismatch("unreadable mimetype"))?;
    if mimetype.trim() != MIMETYPE {
        return Err(mismatch(&format!("unexpected mimetype {}", mimetype.trim())));
    }
    Ok(())
}
