//! The common read/write surface shared by roots and sections.

use crate::error::{ConfigurationError, Result};
use crate::section::ConfigurationSection;
use crate::token::ReloadToken;

/// A queryable configuration tree node: either a whole
/// [`ConfigurationRoot`](crate::root::ConfigurationRoot) or a
/// [`ConfigurationSection`] view into one.
pub trait Configuration {
    /// Point lookup. `None` means the key has no scalar value anywhere,
    /// whether it is absent or a pure branch node.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes the value through to every provider.
    fn set(&self, key: &str, value: Option<String>) -> Result<()>;

    /// A section view for `key`. Never fails; a missing key yields an
    /// empty section.
    fn section(&self, key: &str) -> ConfigurationSection;

    /// Like [`section`](Configuration::section), but fails with
    /// [`ConfigurationError::SectionNotFound`] when the section does not
    /// exist.
    fn required_section(&self, key: &str) -> Result<ConfigurationSection> {
        let section = self.section(key);
        if section.exists() {
            Ok(section)
        } else {
            Err(ConfigurationError::SectionNotFound(
                section.path().to_owned(),
            ))
        }
    }

    /// The immediate child sections of this node.
    fn children(&self) -> Vec<ConfigurationSection>;

    /// The change token for the underlying root's current generation.
    fn reload_token(&self) -> ReloadToken;

    /// This node's full path; `None` for a root.
    fn node_path(&self) -> Option<&str>;
}
