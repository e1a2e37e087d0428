//! Typed binding of a configuration subtree onto a deserializable type.
//!
//! The target type's derived `Deserialize` shape drives the traversal:
//! the node's flat entries are rebuilt into a JSON tree and handed to
//! serde, so nested structs, vectors, numbers, and booleans all come out
//! of plain string leaves.

use crate::configuration::Configuration;
use crate::error::{ConfigurationError, Result};
use crate::flatten::{FlattenOptions, unflatten};
use crate::iter::entries_relative;
use crate::path::KEY_DELIMITER;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserializes the subtree rooted at `configuration` into `T`.
///
/// Leaf strings that parse as JSON booleans or numbers are coerced so
/// typed fields deserialize; everything else stays a string. Null-valued
/// branch entries carry no data and are skipped.
pub fn bind<T: DeserializeOwned>(configuration: &(impl Configuration + ?Sized)) -> Result<T> {
    let mut flat: IndexMap<String, Value> = IndexMap::new();
    for (key, value) in entries_relative(configuration) {
        if let Some(value) = value {
            flat.insert(key, coerce(value));
        }
    }

    let options = FlattenOptions::with_delimiter(KEY_DELIMITER.to_string());
    let tree = unflatten(&flat, &options);

    serde_json::from_value(tree).map_err(|err| ConfigurationError::Parse {
        path: configuration.node_path().unwrap_or("").to_owned(),
        message: err.to_string(),
    })
}

/// Reinterprets a scalar leaf: JSON booleans and numbers are promoted,
/// anything else remains a string.
fn coerce(value: String) -> Value {
    match serde_json::from_str::<Value>(&value) {
        Ok(parsed @ (Value::Bool(_) | Value::Number(_))) => parsed,
        _ => Value::String(value),
    }
}
