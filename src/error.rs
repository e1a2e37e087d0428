//! Error types for configuration composition and loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by configuration providers, roots, and sections.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// `set` was called on a root with no registered providers.
    #[error("no configuration providers are available")]
    ProviderRegistryEmpty,

    /// `required_section` found a section that does not exist.
    #[error("no configuration section found with the key \"{0}\"")]
    SectionNotFound(String),

    /// A non-optional file source failed to read or parse its file.
    #[error("failed to load configuration file {path}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Flattening ran into nesting deep enough to indicate a cyclic or
    /// pathological structure.
    #[error("circular reference detected at \"{path}\"")]
    CircularReference { path: String },

    /// A configuration subtree could not be deserialized into the
    /// requested type.
    #[error("configuration parse error at \"{path}\": {message}")]
    Parse { path: String, message: String },

    /// The file-system watcher for a reload-on-change source failed.
    #[error("configuration file watcher error")]
    Watch(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;
