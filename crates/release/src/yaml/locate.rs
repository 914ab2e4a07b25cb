//! Read-only navigation of a parsed YAML document.

use super::path::{PathStep, ResolvedPath};
use crate::error::{Error, Result};
use serde_yaml::{Mapping, Value};

/// The scalar found at the end of a [`ResolvedPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedValue {
    /// Literal text of the scalar.
    pub value: String,
    /// The terminal key name, used to scope the textual rewrite.
    pub key: String,
    /// The scalar is a YAML number, so `value` is its canonical rendering
    /// rather than the spelling in the source.
    pub numeric: bool,
}

/// Walk `document` along `path` and return the scalar at its end.
///
/// # Errors
///
/// Returns [`Error::KeyNotFound`], [`Error::IndexOutOfBounds`] or
/// [`Error::WrongNodeKind`] depending on where navigation stops.
pub fn locate(document: &Value, path: &ResolvedPath) -> Result<LocatedValue> {
    let address = path.to_string();
    let mut node = untag(document);
    let mut last_key = "";

    for PathStep { key, index } in path.steps() {
        if !key.is_empty() {
            let Value::Mapping(map) = node else {
                return Err(Error::WrongNodeKind {
                    key: key.clone(),
                    expected: "mapping",
                    found: kind(node),
                    path: address,
                });
            };
            node = lookup(map, key)
                .map(untag)
                .ok_or_else(|| Error::KeyNotFound {
                    key: key.clone(),
                    path: address.clone(),
                    file: None,
                })?;
            last_key = key.as_str();
        }

        if let Some(index) = *index {
            let Value::Sequence(seq) = node else {
                return Err(Error::IndexOutOfBounds {
                    key: last_key.to_string(),
                    index,
                    len: 0,
                    path: address,
                });
            };
            node = seq
                .get(index)
                .map(untag)
                .ok_or_else(|| Error::IndexOutOfBounds {
                    key: last_key.to_string(),
                    index,
                    len: seq.len(),
                    path: address.clone(),
                })?;
        }
    }

    let value = scalar_text(node).ok_or_else(|| Error::WrongNodeKind {
        key: last_key.to_string(),
        expected: "scalar",
        found: kind(node),
        path: address.clone(),
    })?;

    Ok(LocatedValue {
        value,
        key: path.terminal_key().to_string(),
        numeric: matches!(node, Value::Number(_)),
    })
}

/// Look up a key by its textual form, so `8080:` matches the step `8080`.
fn lookup<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| scalar_text(k).as_deref() == Some(key))
            .map(|(_, v)| v)
    })
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) | Value::Number(_) | Value::String(_) => "scalar",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
