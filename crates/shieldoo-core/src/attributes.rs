//! Mapping of host attribute trees into plain structs.
//!
//! The host runtime passes plans and state as generic JSON-like trees. Top
//! level shapes are decoded with serde; nested lists (rules, listeners, group
//! references) are decoded element by element so that one malformed element
//! can be skipped or rejected according to the configured [`MappingPolicy`].

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// How malformed nested list elements are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingPolicy {
    /// Log the element and skip it
    #[default]
    Lenient,
    /// Fail the whole operation
    Strict,
}

/// Decode a whole attribute tree into `T`.
///
/// # Errors
///
/// Returns [`Error::ValidationError`] naming `kind` when the tree does not
/// match the expected shape.
pub fn decode<T: DeserializeOwned>(kind: &str, tree: &Value) -> Result<T> {
    T::deserialize(tree).map_err(|err| Error::ValidationError(format!("invalid {kind}: {err}")))
}

/// Decode an optional nested list element by element.
///
/// A missing or null list yields an empty vector.
///
/// # Errors
///
/// Returns [`Error::ValidationError`] when `value` is not a list, or when an
/// element is malformed and `policy` is [`MappingPolicy::Strict`].
pub fn decode_list<T: DeserializeOwned>(
    list: &str,
    value: Option<&Value>,
    policy: MappingPolicy,
) -> Result<Vec<T>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(Error::ValidationError(format!(
                "{list} must be a list, got {other}"
            )))
        }
    };

    let mut decoded = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match T::deserialize(item) {
            Ok(element) => decoded.push(element),
            Err(err) => match policy {
                MappingPolicy::Lenient => {
                    warn!(list, index, error = %err, "skipping malformed element");
                }
                MappingPolicy::Strict => {
                    return Err(Error::ValidationError(format!("{list}[{index}]: {err}")));
                }
            },
        }
    }
    Ok(decoded)
}
