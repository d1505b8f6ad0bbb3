//! Canonical JSON and YAML helpers used for config parsing, hashing and export.

use std::collections::BTreeMap;
use std::iter::FromIterator;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ErrorInfo, IecError};

fn serde_error(code: &str, err: impl ToString) -> IecError {
    IecError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic key order.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, IecError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json-encode", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical).map_err(|err| serde_error("json-write", err))?;
    Ok(bytes)
}

/// Serializes a value into pretty-printed JSON.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, IecError> {
    serde_json::to_string_pretty(value).map_err(|err| serde_error("json-encode", err))
}

/// Restores a value from JSON text.
pub fn from_json_str<T: DeserializeOwned>(text: &str) -> Result<T, IecError> {
    serde_json::from_str(text).map_err(|err| serde_error("json-decode", err))
}

/// Restores a value from YAML text.
pub fn from_yaml_str<T: DeserializeOwned>(text: &str) -> Result<T, IecError> {
    serde_yaml::from_str(text).map_err(|err| serde_error("yaml-decode", err))
}

/// Serializes a value into YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, IecError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml-encode", err))
}
