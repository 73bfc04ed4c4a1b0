use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{FormatVersion, GroupKind};
use crate::container::{AttributeValue, Container};
use crate::model::MsRunMetadata;

use super::TriMs5Reader;

impl TriMs5Reader {
    /// File-wide metadata, loaded at open
    pub fn metadata(&self) -> &MsRunMetadata {
        &self.metadata
    }

    /// Format version recorded in the file
    pub fn file_version(&self) -> Option<FormatVersion> {
        self.container.file_version()
    }

    /// Attributes of a group, e.g. the root's `created` timestamp
    pub fn attributes(&self, group: GroupKind, cluster_id: i32) -> Option<&BTreeMap<String, AttributeValue>> {
        self.container.attributes(group, cluster_id)
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        self.container.path()
    }

    /// Underlying container
    pub fn container(&self) -> &Container {
        &self.container
    }
}
