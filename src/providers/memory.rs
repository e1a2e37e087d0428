//! In-memory configuration source.

use crate::builder::ConfigurationBuilder;
use crate::error::Result;
use crate::provider::{ConfigurationProvider, ProviderData};
use crate::source::ConfigurationSource;
use async_trait::async_trait;
use std::sync::Arc;

/// Wraps a fixed list of key/value pairs; `load` copies them verbatim.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: Vec<(String, Option<String>)>,
}

impl MemorySource {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }

    /// Adds an entry, allowing an explicit null value.
    pub fn entry(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.entries.push((key.into(), value));
        self
    }
}

#[async_trait]
impl ConfigurationSource for MemorySource {
    async fn build(&self, _builder: &ConfigurationBuilder) -> Result<Arc<dyn ConfigurationProvider>> {
        let provider = Arc::new(MemoryProvider {
            entries: self.entries.clone(),
            base: ProviderData::new(),
        });
        provider.load().await?;
        Ok(provider)
    }
}

/// Provider backed by a [`MemorySource`].
pub struct MemoryProvider {
    entries: Vec<(String, Option<String>)>,
    base: ProviderData,
}

#[async_trait]
impl ConfigurationProvider for MemoryProvider {
    fn get(&self, key: &str) -> Option<Option<String>> {
        self.base.get(key)
    }

    fn set(&self, key: &str, value: Option<String>) {
        self.base.set(key, value);
    }

    fn child_keys(&self, earlier_keys: Vec<String>, parent_path: Option<&str>) -> Vec<String> {
        self.base.child_keys(earlier_keys, parent_path)
    }

    async fn load(&self) -> Result<()> {
        for (key, value) in &self.entries {
            self.base.set(key, value.clone());
        }
        Ok(())
    }

    fn reload_token(&self) -> Option<crate::token::ReloadToken> {
        Some(self.base.token())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
