//! JSON file configuration source with optional reload-on-change.
//!
//! The file's nested JSON is flattened onto the provider's key store with
//! the `:` path delimiter. With `reload_on_change`, a debounced watcher on
//! the file's directory re-reads the file and fires the provider's reload
//! token after every add/change/remove, which in turn republishes the
//! root token of any composing root.

use crate::builder::ConfigurationBuilder;
use crate::data::ConfigurationData;
use crate::error::{ConfigurationError, Result};
use crate::flatten::{FlattenOptions, flatten};
use crate::path::KEY_DELIMITER;
use crate::provider::{ConfigurationProvider, ProviderData};
use crate::source::ConfigurationSource;
use crate::token::ReloadToken;
use async_trait::async_trait;
use notify::RecommendedWatcher;
use notify_debouncer_mini::{Debouncer, new_debouncer};
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Describes a JSON configuration file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    optional: bool,
    reload_on_change: bool,
    debounce: Duration,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            optional: false,
            reload_on_change: false,
            debounce: Duration::from_millis(500),
        }
    }

    /// When set, a read or parse failure clears the provider's data
    /// instead of failing the load.
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// When set, the built provider watches the file and reloads itself
    /// on changes.
    pub fn reload_on_change(mut self, reload: bool) -> Self {
        self.reload_on_change = reload;
        self
    }

    /// Debounce window coalescing rapid file changes.
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

#[async_trait]
impl ConfigurationSource for JsonFileSource {
    async fn build(&self, _builder: &ConfigurationBuilder) -> Result<Arc<dyn ConfigurationProvider>> {
        let provider = Arc::new(JsonFileProvider {
            path: self.path.clone(),
            optional: self.optional,
            base: ProviderData::new(),
            watcher: Mutex::new(None),
        });
        provider.read_file().await?;

        if self.reload_on_change {
            start_watch(&provider, self.debounce)?;
        }

        Ok(provider)
    }
}

/// Provider backed by a [`JsonFileSource`]. Owns the file watcher when
/// reload-on-change is enabled; dropping the provider stops the watch.
pub struct JsonFileProvider {
    path: PathBuf,
    optional: bool,
    base: ProviderData,
    watcher: Mutex<Option<Debouncer<RecommendedWatcher>>>,
}

impl JsonFileProvider {
    /// Reads and parses the file, replacing the store wholesale. Optional
    /// sources swallow read/parse failures by clearing their data.
    async fn read_file(&self) -> Result<()> {
        let parsed: std::result::Result<Value, Box<dyn std::error::Error + Send + Sync>> =
            match tokio::fs::read_to_string(&self.path).await {
                Ok(content) => serde_json::from_str(&content).map_err(Into::into),
                Err(err) => Err(err.into()),
            };

        match parsed {
            Ok(value) => {
                let options = FlattenOptions::with_delimiter(KEY_DELIMITER.to_string());
                let flat = flatten(&value, &options)?;

                let mut data = ConfigurationData::new();
                for (key, leaf) in flat {
                    data.set(&key, scalar_to_string(leaf));
                }
                self.base.replace(data);
                Ok(())
            }
            Err(source) => {
                if self.optional {
                    debug!(
                        path = %self.path.display(),
                        "optional configuration file unavailable, clearing data"
                    );
                    self.base.clear();
                    Ok(())
                } else {
                    Err(ConfigurationError::File {
                        path: self.path.clone(),
                        source,
                    })
                }
            }
        }
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        // flatten only emits scalar leaves
        other => Some(other.to_string()),
    }
}

/// Wires the debounced directory watch. Events flow from the notify
/// thread into a tokio channel; a single async consumer serializes the
/// re-read + token rotation per provider.
fn start_watch(provider: &Arc<JsonFileProvider>, debounce: Duration) -> Result<()> {
    let (notify_tx, notify_rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(debounce, notify_tx)?;

    let watch_dir = provider
        .path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    debouncer
        .watcher()
        .watch(&watch_dir, notify::RecursiveMode::NonRecursive)?;

    // The provider owns the debouncer: dropping the provider closes the
    // notify channel and unwinds both tasks.
    *provider.watcher.lock().unwrap() = Some(debouncer);
    debug!(path = %provider.path.display(), "watching configuration file");

    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel::<()>(8);
    let file_name: Option<OsString> = provider.path.file_name().map(OsString::from);
    let watched_path = provider.path.clone();

    tokio::task::spawn_blocking(move || {
        while let Ok(result) = notify_rx.recv() {
            let relevant = match result {
                Ok(events) => events
                    .iter()
                    .any(|event| event.path.file_name().map(OsString::from) == file_name),
                Err(err) => {
                    error!(
                        path = %watched_path.display(),
                        error = %err,
                        "configuration file watcher error"
                    );
                    true
                }
            };
            if relevant && event_tx.blocking_send(()).is_err() {
                return;
            }
        }
    });

    let weak = Arc::downgrade(provider);
    tokio::spawn(async move {
        while event_rx.recv().await.is_some() {
            let Some(provider) = weak.upgrade() else {
                return;
            };
            match provider.read_file().await {
                Ok(()) => {
                    debug!(path = %provider.path.display(), "configuration file reloaded");
                    provider.base.on_reload();
                }
                Err(err) => {
                    warn!(
                        path = %provider.path.display(),
                        error = %err,
                        "failed to reload configuration file"
                    );
                }
            }
        }
    });

    Ok(())
}

#[async_trait]
impl ConfigurationProvider for JsonFileProvider {
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
        self.read_file().await
    }

    fn reload_token(&self) -> Option<ReloadToken> {
        Some(self.base.token())
    }

    fn name(&self) -> &str {
        "json file"
    }
}
