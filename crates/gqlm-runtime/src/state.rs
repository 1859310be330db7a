//! Per-client mutable request state and its patch semantics.
//!
//! Options are a JSON-shaped map (headers, CORS mode, credentials) so
//! patches can address nested keys the way callers wrote them. A patch is
//! one of three things:
//!
//! - the empty patch: full reset of the client's options;
//! - a patch whose every leaf is falsy/empty: a targeted deletion of
//!   exactly the named keys/sub-keys;
//! - anything else: a recursive merge, where a falsy leaf removes its key
//!   and unnamed existing keys are preserved.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Effective request options for one client.
///
/// # Examples
///
/// ```
/// use gqlm_runtime::RequestOptions;
/// use serde_json::json;
///
/// let mut options = RequestOptions::new();
/// options.patch(&json!({"headers": {"X-Trace": "1"}}));
/// assert_eq!(options.headers().get("X-Trace").map(String::as_str), Some("1"));
///
/// options.patch(&json!({}));
/// assert!(options.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions(Map<String, Value>);

impl RequestOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options with an initial header map.
    #[must_use]
    pub fn with_headers(headers: BTreeMap<String, String>) -> Self {
        let mut options = Self::new();
        if !headers.is_empty() {
            options.0.insert(
                "headers".to_string(),
                Value::Object(
                    headers
                        .into_iter()
                        .map(|(name, value)| (name, Value::String(value)))
                        .collect(),
                ),
            );
        }
        options
    }

    /// Returns `true` when no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Effective headers, flattened to strings.
    #[must_use]
    pub fn headers(&self) -> BTreeMap<String, String> {
        self.0
            .get("headers")
            .and_then(Value::as_object)
            .map(|headers| {
                headers
                    .iter()
                    .filter_map(|(name, value)| {
                        value.as_str().map(|v| (name.clone(), v.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// CORS request mode, when set.
    #[must_use]
    pub fn mode(&self) -> Option<&str> {
        self.0.get("mode").and_then(Value::as_str)
    }

    /// CORS credentials mode, when set.
    #[must_use]
    pub fn credentials(&self) -> Option<&str> {
        self.0.get("credentials").and_then(Value::as_str)
    }

    /// Raw options value.
    #[must_use]
    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Applies a patch with reset / targeted-deletion / merge semantics.
    ///
    /// # Panics
    ///
    /// Never panics; a non-object patch value is treated as the empty
    /// patch.
    pub fn patch(&mut self, patch: &Value) {
        let Some(patch) = patch.as_object() else {
            self.0.clear();
            return;
        };
        if patch.is_empty() {
            // Full reset.
            self.0.clear();
            return;
        }
        if all_leaves_falsy(patch) {
            delete_named(&mut self.0, patch);
        } else {
            merge(&mut self.0, patch);
        }
    }
}

/// Falsy leaves: null, false, 0, empty string. Objects are not leaves
/// unless empty (an empty object names a key with nothing to keep).
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(_) => false,
    }
}

fn all_leaves_falsy(patch: &Map<String, Value>) -> bool {
    patch.values().all(|value| match value {
        Value::Object(nested) => nested.is_empty() || all_leaves_falsy(nested),
        leaf => is_falsy(leaf),
    })
}

/// Removes exactly the keys/sub-keys the patch names.
fn delete_named(options: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        match value {
            Value::Object(nested) if !nested.is_empty() => {
                if let Some(Value::Object(current)) = options.get_mut(key) {
                    delete_named(current, nested);
                }
            }
            _ => {
                options.remove(key);
            }
        }
    }
}

/// Recursive merge: objects recurse, truthy leaves overwrite, falsy
/// leaves delete their key. Existing keys the patch does not name are
/// preserved.
fn merge(options: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        match value {
            Value::Object(nested) => {
                let entry = options
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                if let Value::Object(current) = entry {
                    merge(current, nested);
                }
            }
            leaf if is_falsy(leaf) => {
                options.remove(key);
            }
            leaf => {
                options.insert(key.clone(), leaf.clone());
            }
        }
    }
}
