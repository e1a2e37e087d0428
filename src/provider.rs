//! The provider contract and the shared key-store base concrete providers
//! embed.

use crate::data::ConfigurationData;
use crate::error::Result;
use crate::path::{self, KEY_DELIMITER};
use crate::token::{ReloadToken, TokenSource};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;

/// A single source's loaded key/value data.
///
/// Providers are never merged into one store; layering happens at the
/// root. `get` distinguishes "absent, defer to another provider" (outer
/// `None`) from "present with a null value" (`Some(None)`).
#[async_trait]
pub trait ConfigurationProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<Option<String>>;

    fn set(&self, key: &str, value: Option<String>);

    /// Returns the union of `earlier_keys` (child keys already discovered
    /// by lower-precedence providers) with this provider's own immediate
    /// child keys under `parent_path`, case-insensitively deduplicated and
    /// sorted with [`path::compare`].
    fn child_keys(&self, earlier_keys: Vec<String>, parent_path: Option<&str>) -> Vec<String>;

    /// (Re)populates the provider's data from its backing source.
    async fn load(&self) -> Result<()> {
        Ok(())
    }

    /// The provider's current change token, or `None` if the provider
    /// never changes.
    fn reload_token(&self) -> Option<ReloadToken> {
        None
    }

    /// Short name used in log lines.
    fn name(&self) -> &str {
        "provider"
    }
}

impl std::fmt::Debug for dyn ConfigurationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationProvider")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Key store plus reload-token slot shared by the built-in providers.
#[derive(Default)]
pub struct ProviderData {
    data: RwLock<ConfigurationData>,
    token: TokenSource,
}

impl ProviderData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Option<String>> {
        self.data
            .read()
            .unwrap()
            .get(key)
            .map(|value| value.map(str::to_owned))
    }

    pub fn set(&self, key: &str, value: Option<String>) {
        self.data.write().unwrap().set(key, value);
    }

    /// Replaces the entire store with freshly loaded data.
    pub fn replace(&self, data: ConfigurationData) {
        *self.data.write().unwrap() = data;
    }

    pub fn clear(&self) {
        self.data.write().unwrap().clear();
    }

    pub fn token(&self) -> ReloadToken {
        self.token.token()
    }

    /// Rotates the reload token, firing the previous generation.
    pub fn on_reload(&self) {
        self.token.replace();
    }

    pub fn child_keys(&self, earlier_keys: Vec<String>, parent_path: Option<&str>) -> Vec<String> {
        let data = self.data.read().unwrap();
        let mut keys = earlier_keys;

        match parent_path {
            None => {
                for key in data.keys() {
                    keys.push(first_segment(key).to_owned());
                }
            }
            Some(parent) => {
                for key in data.keys() {
                    if let Some(segment) = child_segment(key, parent) {
                        keys.push(segment.to_owned());
                    }
                }
            }
        }

        sort_deduplicated(keys)
    }
}

/// Case-insensitively dedups (first casing wins) and sorts child keys.
pub(crate) fn sort_deduplicated(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result: Vec<String> = keys
        .into_iter()
        .filter(|key| seen.insert(key.to_lowercase()))
        .collect();
    result.sort_by(|a, b| path::compare(Some(a), Some(b)));
    result
}

fn first_segment(key: &str) -> &str {
    key.split(KEY_DELIMITER).next().unwrap_or(key)
}

/// Extracts the immediate child segment of `key` under `parent`, or `None`
/// if `key` is not a strict descendant.
///
/// A key qualifies only if it is strictly longer than the parent,
/// case-insensitively prefixed by it, and the character right after the
/// prefix is the delimiter. The boundary check is what keeps a sibling
/// like `ParentExtra:Child` from matching the parent `Parent`.
fn child_segment<'a>(key: &'a str, parent: &str) -> Option<&'a str> {
    let mut key_chars = key.char_indices();
    for parent_char in parent.chars() {
        let (_, key_char) = key_chars.next()?;
        if !key_char.to_lowercase().eq(parent_char.to_lowercase()) {
            return None;
        }
    }

    let (boundary, delimiter) = key_chars.next()?;
    if delimiter != KEY_DELIMITER {
        return None;
    }

    Some(first_segment(&key[boundary + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_with(entries: &[(&str, &str)]) -> ProviderData {
        let provider = ProviderData::new();
        for (key, value) in entries {
            provider.set(key, Some((*value).to_owned()));
        }
        provider
    }

    #[test]
    fn test_child_keys_top_level() {
        let provider = provider_with(&[
            ("App:Name", "x"),
            ("App:Port", "1"),
            ("Logging", "info"),
        ]);
        let keys = provider.child_keys(Vec::new(), None);
        assert_eq!(keys, vec!["App", "Logging"]);
    }

    #[test]
    fn test_child_keys_under_parent() {
        let provider = provider_with(&[
            ("App:Name", "x"),
            ("App:Db:Host", "h"),
            ("Other:Key", "y"),
        ]);
        let keys = provider.child_keys(Vec::new(), Some("app"));
        assert_eq!(keys, vec!["Db", "Name"]);
    }

    #[test]
    fn test_child_keys_merges_earlier_keys() {
        let provider = provider_with(&[("App:Zeta", "1")]);
        let keys = provider.child_keys(vec!["Alpha".to_owned()], Some("App"));
        assert_eq!(keys, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_child_keys_dedups_case_insensitively() {
        let provider = provider_with(&[("App:name", "1")]);
        let keys = provider.child_keys(vec!["Name".to_owned()], Some("App"));
        assert_eq!(keys, vec!["Name"]);
    }

    #[test]
    fn test_boundary_rejects_prefix_siblings() {
        let provider = provider_with(&[
            ("Parent:Child", "1"),
            ("ParentExtra:Child", "2"),
            ("Parent", "scalar"),
        ]);
        let keys = provider.child_keys(Vec::new(), Some("Parent"));
        assert_eq!(keys, vec!["Child"]);
    }

    #[test]
    fn test_empty_segment_children() {
        let provider = provider_with(&[("Key1::Key3", "v")]);
        assert_eq!(provider.child_keys(Vec::new(), None), vec!["Key1"]);
        assert_eq!(provider.child_keys(Vec::new(), Some("Key1")), vec![""]);
        assert_eq!(provider.child_keys(Vec::new(), Some("Key1:")), vec!["Key3"]);
    }

    #[test]
    fn test_child_keys_numeric_sort() {
        let provider = provider_with(&[
            ("List:10", "a"),
            ("List:2", "b"),
            ("List:alpha", "c"),
        ]);
        let keys = provider.child_keys(Vec::new(), Some("List"));
        assert_eq!(keys, vec!["2", "10", "alpha"]);
    }
}
