//! Conversion between nested JSON trees and flat delimited key/value maps.
//!
//! `flatten` turns `{"a": {"b": 1}}` into `{"a.b": 1}`; `unflatten` is the
//! inverse. Empty objects and arrays produce no keys and therefore cannot
//! round-trip.

use crate::error::{ConfigurationError, Result};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Nesting deeper than this fails flattening. Owned JSON trees cannot
/// alias, so runaway depth is the observable form of a circular structure.
const MAX_DEPTH: usize = 128;

/// Options shared by [`flatten`] and [`unflatten`].
pub struct FlattenOptions {
    /// Delimiter joining path segments. Defaults to `"."`.
    pub delimiter: String,
    /// Applied to each segment before joining (flatten) or after splitting
    /// (unflatten).
    pub transform_key: Option<Box<dyn Fn(&str) -> String + Send + Sync>>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            delimiter: ".".to_owned(),
            transform_key: None,
        }
    }
}

impl FlattenOptions {
    pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            ..Self::default()
        }
    }

    pub fn transform_key(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.transform_key = Some(Box::new(f));
        self
    }

    fn apply(&self, segment: &str) -> String {
        match &self.transform_key {
            Some(f) => f(segment),
            None => segment.to_owned(),
        }
    }
}

/// Flattens a nested JSON value into a map from delimited path to scalar
/// leaf value.
///
/// Scalars and nulls become leaves; empty objects and arrays are skipped
/// entirely; non-empty containers recurse.
pub fn flatten(target: &Value, options: &FlattenOptions) -> Result<IndexMap<String, Value>> {
    let mut result = IndexMap::new();
    walk(target, "", 0, options, &mut result)?;
    Ok(result)
}

fn walk(
    container: &Value,
    prefix: &str,
    depth: usize,
    options: &FlattenOptions,
    result: &mut IndexMap<String, Value>,
) -> Result<()> {
    let children: Vec<(String, &Value)> = match container {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => return Ok(()),
    };

    for (key, value) in children {
        let path = if prefix.is_empty() {
            options.apply(&key)
        } else {
            format!("{}{}{}", prefix, options.delimiter, options.apply(&key))
        };

        match value {
            Value::Object(map) if map.is_empty() => continue,
            Value::Array(items) if items.is_empty() => continue,
            Value::Object(_) | Value::Array(_) => {
                if depth + 1 >= MAX_DEPTH {
                    return Err(ConfigurationError::CircularReference { path });
                }
                walk(value, &path, depth + 1, options, result)?;
            }
            scalar => {
                result.insert(path, scalar.clone());
            }
        }
    }

    Ok(())
}

/// Rebuilds a nested JSON value from a flat delimited map.
///
/// A segment made of digits (and no `.`) indexes an array, any other
/// segment names an object field. An empty object/array placeholder seen
/// mid-path is replaced by the richer container the longer key implies; a
/// scalar-vs-container conflict mid-path abandons the rest of that key.
pub fn unflatten(target: &IndexMap<String, Value>, options: &FlattenOptions) -> Value {
    let mut root = Value::Object(Map::new());

    'keys: for (key, value) in target {
        let segments: Vec<String> = key
            .split(options.delimiter.as_str())
            .map(|s| options.apply(s))
            .collect();

        let mut current = &mut root;
        for (i, segment) in segments.iter().enumerate() {
            if i == segments.len() - 1 {
                if !insert_leaf(current, segment, value.clone()) {
                    continue 'keys;
                }
            } else {
                let next_is_index = array_index(&segments[i + 1]).is_some();
                current = match descend(current, segment, next_is_index) {
                    Some(child) => child,
                    None => continue 'keys,
                };
            }
        }
    }

    root
}

/// A segment is an array index when it is all digits and contains no `.`.
fn array_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn empty_container(next_is_index: bool) -> Value {
    if next_is_index {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Writes a leaf value into `container`. Returns `false` on a type
/// conflict, which abandons the key.
fn insert_leaf(container: &mut Value, segment: &str, value: Value) -> bool {
    match container {
        Value::Object(map) => {
            map.insert(segment.to_owned(), value);
            true
        }
        Value::Array(items) => match array_index(segment) {
            Some(index) => {
                if items.len() <= index {
                    items.resize(index + 1, Value::Null);
                }
                items[index] = value;
                true
            }
            None => false,
        },
        _ => false,
    }
}

/// Steps into (creating if needed) the child container for `segment`.
/// Returns `None` on a type conflict, which abandons the key.
fn descend<'v>(container: &'v mut Value, segment: &str, next_is_index: bool) -> Option<&'v mut Value> {
    match container {
        Value::Object(map) => {
            let slot = map
                .entry(segment.to_owned())
                .or_insert_with(|| empty_container(next_is_index));
            if slot.is_null() || is_empty_container(slot) {
                *slot = empty_container(next_is_index);
            }
            match slot {
                Value::Object(_) | Value::Array(_) => Some(slot),
                _ => None,
            }
        }
        Value::Array(items) => {
            let index = array_index(segment)?;
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            let slot = &mut items[index];
            if slot.is_null() || is_empty_container(slot) {
                *slot = empty_container(next_is_index);
            }
            match slot {
                Value::Object(_) | Value::Array(_) => Some(slot),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(value: Value) -> IndexMap<String, Value> {
        flatten(&value, &FlattenOptions::default()).unwrap()
    }

    #[test]
    fn test_flatten_simple_object() {
        let result = flat(json!({"a": 1, "b": {"c": 2}, "d": [3, 4]}));
        assert_eq!(result.get("a"), Some(&json!(1)));
        assert_eq!(result.get("b.c"), Some(&json!(2)));
        assert_eq!(result.get("d.0"), Some(&json!(3)));
        assert_eq!(result.get("d.1"), Some(&json!(4)));
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_flatten_deeply_nested() {
        let result = flat(json!({"a": {"b": {"c": {"d": 1}}}}));
        assert_eq!(result.get("a.b.c.d"), Some(&json!(1)));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_flatten_empty_nested_keys() {
        // An empty prefix never re-joins, so fully empty segments collapse
        // onto the single empty key.
        let result = flat(json!({"": {"": {"": 1}}}));
        assert_eq!(result.get(""), Some(&json!(1)));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_flatten_custom_delimiter() {
        let options = FlattenOptions::with_delimiter("/");
        let result = flatten(&json!({"a": {"b": 1}}), &options).unwrap();
        assert_eq!(result.get("a/b"), Some(&json!(1)));
    }

    #[test]
    fn test_flatten_nested_arrays() {
        let result = flat(json!({"a": [1, 2, [3, 4]]}));
        assert_eq!(result.get("a.2.0"), Some(&json!(3)));
        assert_eq!(result.get("a.2.1"), Some(&json!(4)));
    }

    #[test]
    fn test_flatten_keeps_null_leaves() {
        let result = flat(json!({"a": null, "c": {"d": null}}));
        assert_eq!(result.get("a"), Some(&Value::Null));
        assert_eq!(result.get("c.d"), Some(&Value::Null));
    }

    #[test]
    fn test_flatten_skips_empty_containers() {
        let result = flat(json!({"a": {}, "b": [], "c": 1}));
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("c"), Some(&json!(1)));
    }

    #[test]
    fn test_flatten_key_transformer() {
        let options = FlattenOptions::with_delimiter("_").transform_key(|k| k.to_lowercase());
        let result = flatten(&json!({"FOO": {"BAR": 1}}), &options).unwrap();
        assert_eq!(result.get("foo_bar"), Some(&json!(1)));
    }

    #[test]
    fn test_flatten_depth_guard() {
        let mut value = json!(1);
        for _ in 0..200 {
            value = json!({"n": value});
        }
        let err = flatten(&value, &FlattenOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::CircularReference { .. }
        ));
    }

    fn unflat(entries: Vec<(&str, Value)>) -> Value {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect();
        unflatten(&map, &FlattenOptions::default())
    }

    #[test]
    fn test_unflatten_simple_map() {
        let result = unflat(vec![("a.b.c", json!(1)), ("a.b.d", json!(2))]);
        assert_eq!(result, json!({"a": {"b": {"c": 1, "d": 2}}}));
    }

    #[test]
    fn test_unflatten_numeric_keys_as_indices() {
        let result = unflat(vec![("a.0", json!("foo")), ("a.1", json!("bar"))]);
        assert_eq!(result, json!({"a": ["foo", "bar"]}));
    }

    #[test]
    fn test_unflatten_custom_delimiter() {
        let map = [("a|b".to_owned(), json!(1))].into_iter().collect();
        let result = unflatten(&map, &FlattenOptions::with_delimiter("|"));
        assert_eq!(result, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_unflatten_key_transformer() {
        let map = [("a.b".to_owned(), json!(1))].into_iter().collect();
        let options = FlattenOptions::default().transform_key(|k| k.to_uppercase());
        let result = unflatten(&map, &options);
        assert_eq!(result, json!({"A": {"B": 1}}));
    }

    #[test]
    fn test_unflatten_upgrades_empty_placeholder() {
        let result = unflat(vec![("a", json!({})), ("a.b.c", json!(1))]);
        assert_eq!(result, json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_unflatten_scalar_conflict_abandons_key() {
        let result = unflat(vec![("a", json!(1)), ("a.b.c", json!(2))]);
        assert_eq!(result, json!({"a": 1}));
    }

    #[test]
    fn test_unflatten_sparse_array_fills_nulls() {
        let result = unflat(vec![("a.2", json!("x"))]);
        assert_eq!(result, json!({"a": [null, null, "x"]}));
    }

    #[test]
    fn test_round_trip() {
        let value = json!({
            "server": {"host": "localhost", "ports": [8080, 9090]},
            "debug": true,
            "note": null
        });
        let options = FlattenOptions::default();
        let flat_map = flatten(&value, &options).unwrap();
        assert_eq!(unflatten(&flat_map, &options), value);
    }
}
