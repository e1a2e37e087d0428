//! Builds a configuration root from an ordered list of sources.

use crate::error::Result;
use crate::providers::{ChainedSource, EnvSource, JsonFileSource, MemorySource};
use crate::root::ConfigurationRoot;
use crate::source::ConfigurationSource;
use futures::future;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Collects [`ConfigurationSource`]s and builds them into a
/// [`ConfigurationRoot`]. Source order is precedence order: later sources
/// override earlier ones on read.
#[derive(Default)]
pub struct ConfigurationBuilder {
    sources: Vec<Arc<dyn ConfigurationSource>>,
    properties: HashMap<String, serde_json::Value>,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sources registered so far, in precedence order.
    pub fn sources(&self) -> &[Arc<dyn ConfigurationSource>] {
        &self.sources
    }

    /// Shared ad-hoc data between the builder and its sources.
    pub fn properties(&self) -> &HashMap<String, serde_json::Value> {
        &self.properties
    }

    pub fn set_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Adds a configuration source.
    pub fn add(mut self, source: impl ConfigurationSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Adds a fixed in-memory map.
    pub fn add_in_memory<I, K, V>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.add(MemorySource::new(entries))
    }

    /// Adds an environment-variable snapshot with the default `__`
    /// delimiter.
    pub fn add_env_snapshot<I, K, V>(self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.add(EnvSource::new(variables))
    }

    /// Adds a required JSON file.
    pub fn add_json_file(self, path: impl Into<PathBuf>) -> Self {
        self.add(JsonFileSource::new(path))
    }

    /// Adds an already-built configuration tree as a source.
    pub fn add_chained(self, configuration: ConfigurationRoot) -> Self {
        self.add(ChainedSource::new(configuration))
    }

    /// Builds every source concurrently and composes the resulting
    /// providers into a root. Provider order matches source insertion
    /// order, not completion order.
    pub async fn build(&self) -> Result<ConfigurationRoot> {
        let builds = self.sources.iter().map(|source| source.build(self));
        let providers = future::try_join_all(builds).await?;
        Ok(ConfigurationRoot::new(providers))
    }
}
