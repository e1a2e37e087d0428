//! The configuration root: an ordered stack of providers composed into
//! one tree.

use crate::configuration::Configuration;
use crate::error::{ConfigurationError, Result};
use crate::path;
use crate::provider::ConfigurationProvider;
use crate::section::ConfigurationSection;
use crate::token::{ChangeTokenRegistration, ReloadToken, TokenSource};
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

struct RootState {
    providers: Vec<Arc<dyn ConfigurationProvider>>,
    token: TokenSource,
    /// Kept alive so provider-token subscriptions last as long as the
    /// root; dropping the last root handle unregisters them all.
    registrations: Mutex<Vec<ChangeTokenRegistration>>,
}

/// Owns the ordered provider list. Later providers take precedence on
/// reads; writes fan out to every provider.
///
/// Cheap to clone; clones share the same providers and reload token.
#[derive(Clone)]
pub struct ConfigurationRoot {
    state: Arc<RootState>,
}

impl ConfigurationRoot {
    /// Composes a root over `providers` (insertion order = precedence
    /// order, last wins) and subscribes to every provider's reload token
    /// so provider-level changes republish the root token.
    pub fn new(providers: Vec<Arc<dyn ConfigurationProvider>>) -> Self {
        let state = Arc::new(RootState {
            providers,
            token: TokenSource::new(),
            registrations: Mutex::new(Vec::new()),
        });

        let registrations = state
            .providers
            .iter()
            .map(|provider| {
                let provider = provider.clone();
                let weak: Weak<RootState> = Arc::downgrade(&state);
                ChangeTokenRegistration::new(
                    move || provider.reload_token(),
                    move || {
                        if let Some(state) = weak.upgrade() {
                            state.token.replace();
                        }
                    },
                )
            })
            .collect();
        *state.registrations.lock().unwrap() = registrations;

        Self { state }
    }

    /// The providers composing this root, in precedence order.
    pub fn providers(&self) -> &[Arc<dyn ConfigurationProvider>] {
        &self.state.providers
    }

    /// Reloads every provider in order, then fires the root token exactly
    /// once.
    pub async fn reload(&self) -> Result<()> {
        for provider in &self.state.providers {
            provider.load().await?;
        }
        debug!(
            providers = self.state.providers.len(),
            "configuration providers reloaded"
        );
        self.state.token.replace();
        Ok(())
    }

    /// The immediate child sections under `parent_path` (or the top
    /// level). Each provider sees the keys discovered by the providers
    /// before it, so the result is a deduplicated union.
    pub fn children_of(&self, parent_path: Option<&str>) -> Vec<ConfigurationSection> {
        self.state
            .providers
            .iter()
            .fold(Vec::new(), |keys, provider| {
                provider.child_keys(keys, parent_path)
            })
            .into_iter()
            .map(|key| {
                let path = match parent_path {
                    Some(parent) => path::combine([parent, key.as_str()]),
                    None => key,
                };
                ConfigurationSection::new(self.clone(), path)
            })
            .collect()
    }

    /// Two handles are the same root iff they share state.
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Configuration for ConfigurationRoot {
    /// Scans providers from highest precedence to lowest and returns the
    /// first provider's answer, mapping a stored null to `None`.
    fn get(&self, key: &str) -> Option<String> {
        for provider in self.state.providers.iter().rev() {
            if let Some(value) = provider.get(key) {
                return value;
            }
        }
        None
    }

    fn set(&self, key: &str, value: Option<String>) -> Result<()> {
        if self.state.providers.is_empty() {
            return Err(ConfigurationError::ProviderRegistryEmpty);
        }
        for provider in &self.state.providers {
            provider.set(key, value.clone());
        }
        Ok(())
    }

    fn section(&self, key: &str) -> ConfigurationSection {
        ConfigurationSection::new(self.clone(), key.to_owned())
    }

    fn children(&self) -> Vec<ConfigurationSection> {
        self.children_of(None)
    }

    fn reload_token(&self) -> ReloadToken {
        self.state.token.token()
    }

    fn node_path(&self) -> Option<&str> {
        None
    }
}

impl std::fmt::Debug for ConfigurationRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationRoot")
            .field("providers", &self.state.providers.len())
            .finish()
    }
}
