//! Case-insensitive ordered key/value store backing a single provider.

use indexmap::IndexMap;

/// One stored key/value pair. The canonical casing is whatever casing the
/// most recent `set` used; `value: None` means "key exists, has no scalar
/// value" (a branch node), which is distinct from the key being absent.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: String,
    value: Option<String>,
}

/// An insertion-ordered map from configuration key to nullable value with
/// case-insensitive lookup and overwrite.
///
/// Overwriting through a differently-cased key updates the stored value and
/// the canonical casing in place, so there is only ever one entry per key
/// and iteration order stays the order of first insertion.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationData {
    entries: IndexMap<String, Entry>,
}

impl ConfigurationData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a key case-insensitively.
    ///
    /// Returns `None` when the key is absent, `Some(None)` when the key is
    /// present with a null value.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .get(&key.to_lowercase())
            .map(|entry| entry.value.as_deref())
    }

    /// Inserts or overwrites a key, making `key`'s casing canonical.
    pub fn set(&mut self, key: &str, value: Option<String>) {
        let entry = Entry {
            key: key.to_owned(),
            value,
        };
        self.entries.insert(key.to_lowercase(), entry);
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_lowercase())
    }

    /// Removes a key case-insensitively. Returns `true` if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.shift_remove(&key.to_lowercase()).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order, yielding canonical-cased keys.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .values()
            .map(|entry| (entry.key.as_str(), entry.value.as_deref()))
    }

    /// Iterates canonical-cased keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|entry| entry.key.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigurationData
where
    K: AsRef<str>,
    V: Into<Option<String>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (key, value) in iter {
            data.set(key.as_ref(), value.into());
        }
        data
    }
}
