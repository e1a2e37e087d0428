//! Environment-variable configuration source.
//!
//! The source holds an injected snapshot of name/value pairs rather than
//! reading the process environment inside core logic; use
//! [`EnvSource::from_process_env`] to capture the real environment at
//! construction time.

use crate::builder::ConfigurationBuilder;
use crate::error::Result;
use crate::path::KEY_DELIMITER;
use crate::provider::{ConfigurationProvider, ProviderData};
use crate::source::ConfigurationSource;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::trace;

const DEFAULT_DELIMITER: &str = "__";

/// Maps environment-style variable names onto configuration keys.
///
/// A name must contain the delimiter to qualify (it needs a top-level
/// section); the first occurrence of the delimiter becomes the path
/// delimiter, so `APP__DB__HOST` with the default `__` maps to
/// `APP:DB__HOST`.
#[derive(Debug, Clone)]
pub struct EnvSource {
    variables: Vec<(String, String)>,
    delimiter: String,
}

impl EnvSource {
    pub fn new<I, K, V>(variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            variables: variables
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            delimiter: DEFAULT_DELIMITER.to_owned(),
        }
    }

    /// Captures a snapshot of the current process environment.
    pub fn from_process_env() -> Self {
        Self::new(std::env::vars())
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }
}

#[async_trait]
impl ConfigurationSource for EnvSource {
    async fn build(&self, _builder: &ConfigurationBuilder) -> Result<Arc<dyn ConfigurationProvider>> {
        let provider = Arc::new(EnvProvider {
            source: self.clone(),
            base: ProviderData::new(),
        });
        provider.load().await?;
        Ok(provider)
    }
}

/// Provider backed by an [`EnvSource`] snapshot.
pub struct EnvProvider {
    source: EnvSource,
    base: ProviderData,
}

#[async_trait]
impl ConfigurationProvider for EnvProvider {
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
        for (name, value) in &self.source.variables {
            if !name.contains(&self.source.delimiter) {
                trace!(variable = %name, "skipping environment variable without delimiter");
                continue;
            }
            let key = name.replacen(&self.source.delimiter, &KEY_DELIMITER.to_string(), 1);
            self.base.set(&key, Some(value.clone()));
        }
        Ok(())
    }

    fn reload_token(&self) -> Option<crate::token::ReloadToken> {
        Some(self.base.token())
    }

    fn name(&self) -> &str {
        "environment"
    }
}
