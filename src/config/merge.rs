//! Override-document merge
//!
//! Implements the file override layer:
//! - Objects: recurse into the matching sub-table
//! - Leaves: whole-leaf replacement (last wins)
//! - Keys must already exist and kinds must match, except that any
//!   rectangular numeric nesting may replace an `ndarray` leaf

use serde_json::Value;
use tracing::{debug, error};

use super::error::ConfigError;
use super::value::{ConfigTable, ConfigValue, NumArray, Number, ValueKind};

/// Merge an override document into `base`, clobbering every leaf it names.
///
/// A document that is not an object is ignored. On error, keys processed
/// before the failing one may already be applied; use
/// [`ConfigTree::merge_document`](super::ConfigTree::merge_document) for an
/// all-or-nothing merge.
pub fn merge_override_into(overlay: &Value, base: &mut ConfigTable) -> Result<(), ConfigError> {
    merge_at("", overlay, base)
}

fn merge_at(prefix: &str, overlay: &Value, base: &mut ConfigTable) -> Result<(), ConfigError> {
    let Value::Object(entries) = overlay else {
        return Ok(());
    };

    for (key, value) in entries {
        let path = join_key(prefix, key);
        let slot = base
            .get_mut(key)
            .ok_or_else(|| ConfigError::unknown_key(&path))?;

        match slot {
            ConfigValue::Table(sub) => {
                if !value.is_object() {
                    return Err(ConfigError::type_mismatch(
                        path,
                        ValueKind::Table,
                        ValueKind::of_document(value),
                    ));
                }
                if let Err(e) = merge_at(&path, value, sub) {
                    error!(key = %path, "Error under config key");
                    return Err(e);
                }
            }
            leaf => {
                let replacement = replacement_leaf(&path, leaf, value)?;
                *leaf = replacement;
                debug!(key = %path, value = %leaf, "Applied override");
            }
        }
    }

    Ok(())
}

/// Build the value that replaces `current`, checking kinds.
fn replacement_leaf(key: &str, current: &ConfigValue, value: &Value) -> Result<ConfigValue, ConfigError> {
    let mismatch = || {
        ConfigError::type_mismatch(key, current.kind(), ValueKind::of_document(value))
    };

    let replacement = match (current, value) {
        (ConfigValue::Float(_), Value::Number(n)) if n.is_f64() => n.as_f64().map(ConfigValue::Float),
        (ConfigValue::Int(_), Value::Number(n)) if !n.is_f64() => {
            return n
                .as_i64()
                .map(ConfigValue::Int)
                .ok_or_else(|| mismatch().with_detail(format!("integer {} is out of range", n)));
        }
        (ConfigValue::Bool(_), Value::Bool(b)) => Some(ConfigValue::Bool(*b)),
        (ConfigValue::Text(_), Value::String(s)) => Some(ConfigValue::Text(s.clone())),
        // Documents have no tuple syntax, so a sequence matches both kinds
        (ConfigValue::Tuple(_), Value::Array(items)) => {
            return numbers(key, current.kind(), items).map(ConfigValue::Tuple);
        }
        (ConfigValue::List(_), Value::Array(items)) => {
            return numbers(key, current.kind(), items).map(ConfigValue::List);
        }
        (ConfigValue::Array(array), _) => {
            return NumArray::from_document(value, array.dtype())
                .map(ConfigValue::Array)
                .ok_or_else(|| {
                    mismatch().with_detail(format!(
                        "cannot convert to a {} array",
                        array.dtype()
                    ))
                });
        }
        _ => None,
    };

    replacement.ok_or_else(mismatch)
}

fn numbers(key: &str, expected: ValueKind, items: &[Value]) -> Result<Vec<Number>, ConfigError> {
    items
        .iter()
        .map(|item| {
            Number::from_document(item).ok_or_else(|| {
                ConfigError::type_mismatch(key, expected, ValueKind::List)
                    .with_detail(format!("sequence element {} is not a number", item))
            })
        })
        .collect()
}

pub(crate) fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}
