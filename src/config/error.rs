use std::path::PathBuf;

use super::kinds::{DatasetKind, ElementType, GroupKind};

/// Errors raised while translating semantic identifiers into physical layout
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// No layout is registered for the dataset kind
    #[error("Unknown dataset kind: {0}")]
    UnknownDataset(DatasetKind),

    /// No layout is registered for the group kind
    #[error("Unknown group kind: {0}")]
    UnknownGroup(GroupKind),

    /// A physical name does not map back to any dataset or group
    #[error("Unknown physical name: {0}")]
    UnknownName(String),

    /// A dataset was accessed with an element type different from its layout
    #[error("Dataset {kind} holds {expected} elements, not {requested}")]
    TypeMismatch {
        /// Dataset being accessed
        kind: DatasetKind,
        /// Element type registered for the dataset
        expected: ElementType,
        /// Element type of the access
        requested: ElementType,
    },

    /// A cluster id was required but not given, or given where none applies
    #[error("Group {group} {reason}")]
    ClusterId {
        /// Group being resolved
        group: GroupKind,
        /// What was wrong with the cluster id
        reason: &'static str,
    },

    /// A configuration value could not be interpreted
    #[error("Invalid value for '{key}': {value}")]
    InvalidValue {
        /// Configuration key
        key: &'static str,
        /// Offending value
        value: String,
    },

    /// Reading a configuration file failed
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
}
