//! Chained configuration source: exposes an already-built tree as a
//! provider inside another root.

use crate::builder::ConfigurationBuilder;
use crate::configuration::Configuration;
use crate::error::Result;
use crate::provider::{self, ConfigurationProvider};
use crate::root::ConfigurationRoot;
use crate::source::ConfigurationSource;
use crate::token::ReloadToken;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Wraps an existing [`ConfigurationRoot`]; the built provider proxies
/// every call to it instead of owning a key store.
#[derive(Clone)]
pub struct ChainedSource {
    configuration: ConfigurationRoot,
}

impl ChainedSource {
    pub fn new(configuration: ConfigurationRoot) -> Self {
        Self { configuration }
    }
}

#[async_trait]
impl ConfigurationSource for ChainedSource {
    async fn build(&self, _builder: &ConfigurationBuilder) -> Result<Arc<dyn ConfigurationProvider>> {
        Ok(Arc::new(ChainedProvider {
            configuration: self.configuration.clone(),
        }))
    }
}

/// Provider proxying an existing configuration tree.
pub struct ChainedProvider {
    configuration: ConfigurationRoot,
}

#[async_trait]
impl ConfigurationProvider for ChainedProvider {
    /// A key the wrapped tree resolves to nothing defers to other
    /// providers; the wrapped tree cannot distinguish its own stored
    /// nulls from absence.
    fn get(&self, key: &str) -> Option<Option<String>> {
        self.configuration.get(key).map(Some)
    }

    fn set(&self, key: &str, value: Option<String>) {
        if let Err(error) = self.configuration.set(key, value) {
            warn!(%key, %error, "write through chained configuration failed");
        }
    }

    fn child_keys(&self, earlier_keys: Vec<String>, parent_path: Option<&str>) -> Vec<String> {
        let children = match parent_path {
            Some(parent) => self.configuration.section(parent).children(),
            None => self.configuration.children(),
        };

        let mut keys = earlier_keys;
        keys.extend(children.into_iter().map(|child| child.key().to_owned()));
        provider::sort_deduplicated(keys)
    }

    fn reload_token(&self) -> Option<ReloadToken> {
        Some(self.configuration.reload_token())
    }

    fn name(&self) -> &str {
        "chained"
    }
}
