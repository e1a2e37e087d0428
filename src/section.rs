//! A lightweight view over one path prefix of a root.

use crate::configuration::Configuration;
use crate::error::Result;
use crate::path;
use crate::root::ConfigurationRoot;
use crate::token::ReloadToken;

/// A tree view bound to a root and a path prefix. Owns no data: every
/// read and write delegates to the root with the prefix prepended.
///
/// Sections are created on demand and never cached, so equality is
/// structural (same root, same path), never identity-based.
#[derive(Clone)]
pub struct ConfigurationSection {
    root: ConfigurationRoot,
    path: String,
}

impl ConfigurationSection {
    pub(crate) fn new(root: ConfigurationRoot, path: String) -> Self {
        Self { root, path }
    }

    /// The full path of this section within the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The key this section occupies in its parent.
    pub fn key(&self) -> &str {
        path::section_key(&self.path)
    }

    /// This section's own scalar value, if any.
    pub fn value(&self) -> Option<String> {
        self.root.get(&self.path)
    }

    pub fn set_value(&self, value: Option<String>) -> Result<()> {
        self.root.set(&self.path, value)
    }

    /// Whether this section holds a value or has at least one child.
    pub fn exists(&self) -> bool {
        self.value().is_some() || !self.children().is_empty()
    }
}

impl Configuration for ConfigurationSection {
    fn get(&self, key: &str) -> Option<String> {
        self.root.get(&path::combine([self.path.as_str(), key]))
    }

    fn set(&self, key: &str, value: Option<String>) -> Result<()> {
        self.root.set(&path::combine([self.path.as_str(), key]), value)
    }

    fn section(&self, key: &str) -> ConfigurationSection {
        Configuration::section(&self.root, &path::combine([self.path.as_str(), key]))
    }

    fn children(&self) -> Vec<ConfigurationSection> {
        self.root.children_of(Some(&self.path))
    }

    fn reload_token(&self) -> ReloadToken {
        self.root.reload_token()
    }

    fn node_path(&self) -> Option<&str> {
        Some(&self.path)
    }
}

impl PartialEq for ConfigurationSection {
    fn eq(&self, other: &Self) -> bool {
        self.root.ptr_eq(&other.root) && self.path == other.path
    }
}

impl Eq for ConfigurationSection {}

impl std::fmt::Debug for ConfigurationSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationSection")
            .field("path", &self.path)
            .finish()
    }
}
