//! Built-in source/provider pairs.

mod chained;
mod env;
mod json_file;
mod memory;

pub use chained::{ChainedProvider, ChainedSource};
pub use env::{EnvProvider, EnvSource};
pub use json_file::{JsonFileProvider, JsonFileSource};
pub use memory::{MemoryProvider, MemorySource};
