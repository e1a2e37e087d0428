//! The source contract: a descriptor that builds exactly one provider.

use crate::builder::ConfigurationBuilder;
use crate::error::Result;
use crate::provider::ConfigurationProvider;
use async_trait::async_trait;
use std::sync::Arc;

/// A stateless descriptor of one configuration source (a map, an
/// environment snapshot, a file path). Building produces the stateful
/// [`ConfigurationProvider`] that holds the loaded data.
#[async_trait]
pub trait ConfigurationSource: Send + Sync {
    /// Builds and loads the provider for this source.
    async fn build(&self, builder: &ConfigurationBuilder) -> Result<Arc<dyn ConfigurationProvider>>;
}
