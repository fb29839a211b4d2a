//! Open metadata map attached to ledger transactions.
//!
//! Callers may tag transactions with free-form context (order numbers,
//! channel identifiers, transfer cross-links). The map is validated at the
//! boundary: keys map to scalars or nested maps, never to arrays of mixed
//! structure the engine would have to interpret.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String-keyed map of scalars and nested maps.
///
/// Stored as `jsonb`; the engine writes cross-link keys into it but never
/// branches on caller-supplied content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(pub Map<String, Value>);

impl Metadata {
    /// Creates an empty metadata map.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Returns true if the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inserts a value, replacing any previous entry for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Looks up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Validates that every leaf is a scalar or a nested map of scalars.
    ///
    /// # Errors
    ///
    /// Returns the offending key path if an array or other unsupported
    /// structure is found.
    pub fn validate(&self) -> Result<(), String> {
        fn check(path: &str, value: &Value) -> Result<(), String> {
            match value {
                Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(()),
                Value::Object(map) => {
                    for (k, v) in map {
                        check(&format!("{path}.{k}"), v)?;
                    }
                    Ok(())
                }
                Value::Array(_) => Err(format!("metadata key {path} holds an array")),
            }
        }

        for (k, v) in &self.0 {
            check(k, v)?;
        }
        Ok(())
    }

    /// Returns the map as a plain JSON value for persistence.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Metadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
