//! Layered key/value configuration.
//!
//! Merges key/value data from ordered sources (in-memory maps,
//! environment snapshots, JSON files, other configuration trees) into one
//! queryable tree with case-insensitive `a:b:c` paths. Later sources
//! override earlier ones on read, writes fan out to every source, and
//! fire-once reload tokens signal data changes all the way up to the
//! root.
//!
//! ```no_run
//! use cfgtree::{Configuration, ConfigurationBuilder};
//!
//! # async fn demo() -> cfgtree::Result<()> {
//! let config = ConfigurationBuilder::new()
//!     .add_json_file("app.json")
//!     .add_env_snapshot(std::env::vars())
//!     .build()
//!     .await?;
//!
//! println!("host = {:?}", config.get("Server:Host"));
//! for section in config.section("Server").children() {
//!     println!("{} = {:?}", section.path(), section.value());
//! }
//! # Ok(())
//! # }
//! ```

pub mod bind;
pub mod builder;
pub mod configuration;
pub mod data;
pub mod error;
pub mod flatten;
pub mod iter;
pub mod path;
pub mod provider;
pub mod providers;
pub mod root;
pub mod section;
pub mod source;
pub mod token;

pub use bind::bind;
pub use builder::ConfigurationBuilder;
pub use configuration::Configuration;
pub use data::ConfigurationData;
pub use error::{ConfigurationError, Result};
pub use flatten::{FlattenOptions, flatten, unflatten};
pub use iter::{entries, entries_relative};
pub use provider::{ConfigurationProvider, ProviderData};
pub use providers::{ChainedSource, EnvSource, JsonFileSource, MemorySource};
pub use root::ConfigurationRoot;
pub use section::ConfigurationSection;
pub use source::ConfigurationSource;
pub use token::{ChangeTokenRegistration, ReloadToken};
