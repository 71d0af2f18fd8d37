//! Metadata value coder
//!
//! Converts between the flattened `{field, feed | value}` entry and the
//! tagged [`MetaValue`], and decodes the loosely typed JSON the record API
//! returns (feeds, strings, booleans, numbers, arrays).
//!
//! List values are canonicalized by sorting. On the read path they are
//! flattened into one comma-joined scalar, so the original list order is
//! lost permanently.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::MetaConfig;
use crate::error::{Error, Result};
use crate::hash::{Identity, StableHasher};
use crate::record::MetaValue;

/// Separator between list elements in a flattened value
pub const LIST_SEPARATOR: &str = ",";

/// Decode a raw metadata value received from the record API
///
/// - `{"feed": id}` becomes [`MetaValue::Feed`]
/// - arrays are sorted and joined with `,` into a scalar
/// - booleans become `"1"` / `"0"`
/// - numbers are truncated toward zero
/// - strings pass through unchanged
pub fn decode(field: &str, raw: &Value) -> Result<MetaValue> {
    match raw {
        Value::Object(map) => match map.get("feed") {
            Some(Value::String(id)) if !id.is_empty() => Ok(MetaValue::Feed(id.clone())),
            Some(_) => Err(Error::type_coercion(field, "feed reference must be a non-empty string")),
            None => Err(Error::type_coercion(field, "object value without a feed reference")),
        },
        Value::Array(items) => {
            let mut elements = items
                .iter()
                .map(|item| scalar_string(field, item))
                .collect::<Result<Vec<_>>>()?;
            elements.sort();
            Ok(MetaValue::Scalar(elements.join(LIST_SEPARATOR)))
        }
        Value::Null => Err(Error::type_coercion(field, "null value")),
        other => scalar_string(field, other).map(MetaValue::Scalar),
    }
}

/// String form of a non-container JSON value
fn scalar_string(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Ok(u.to_string())
            } else {
                let f = n
                    .as_f64()
                    .ok_or_else(|| Error::type_coercion(field, format!("unrepresentable number {}", n)))?;
                Ok((f.trunc() as i64).to_string())
            }
        }
        other => Err(Error::type_coercion(
            field,
            format!("expected a string, boolean or number, got {}", other),
        )),
    }
}

/// Encode a flattened metadata entry into its tagged value
///
/// A non-empty `feed` wins over `value`. A comma separated `value` with more
/// than one element becomes a sorted [`MetaValue::List`].
pub fn encode(entry: &MetaConfig) -> Result<MetaValue> {
    if entry.field.is_empty() {
        return Err(Error::type_coercion("", "meta entry has no field name"));
    }

    if let Some(feed) = entry.feed.as_deref().filter(|f| !f.is_empty()) {
        return Ok(MetaValue::Feed(feed.to_string()));
    }

    match entry.value.as_deref().filter(|v| !v.is_empty()) {
        Some(value) => {
            let mut parts: Vec<String> = value.split(LIST_SEPARATOR).map(str::to_string).collect();
            if parts.len() > 1 {
                parts.sort();
                Ok(MetaValue::List(parts))
            } else {
                Ok(MetaValue::Scalar(value.to_string()))
            }
        }
        None => Err(Error::type_coercion(&entry.field, "neither feed nor value is set")),
    }
}

/// Flatten a tagged value back into a configuration entry
pub fn to_config(field: &str, value: &MetaValue) -> MetaConfig {
    match value {
        MetaValue::Feed(id) => MetaConfig::feed(field, id.clone()),
        MetaValue::Scalar(s) => MetaConfig::value(field, s.clone()),
        MetaValue::List(items) => {
            let mut sorted = items.clone();
            sorted.sort();
            MetaConfig::value(field, sorted.join(LIST_SEPARATOR))
        }
    }
}

/// True when the entry sets both a feed and a value (the value is ignored)
pub fn feed_shadows_value(entry: &MetaConfig) -> bool {
    entry.feed.as_deref().is_some_and(|f| !f.is_empty())
        && entry.value.as_deref().is_some_and(|v| !v.is_empty())
}

/// `serde(deserialize_with)` adapter for an answer's metadata map
pub(crate) fn deserialize_meta_map<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, MetaValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    raw.iter()
        .map(|(field, value)| {
            decode(field, value)
                .map(|decoded| (field.clone(), decoded))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

// Hash fields: field, then "feed<id>" and/or "value<v>" when non-empty.
impl Identity for MetaConfig {
    fn identity(&self) -> u64 {
        let mut h = StableHasher::new().field(&self.field);
        if let Some(feed) = self.feed.as_deref().filter(|f| !f.is_empty()) {
            h = h.field(format!("feed{}", feed));
        }
        if let Some(value) = self.value.as_deref().filter(|v| !v.is_empty()) {
            h = h.field(format!("value{}", value));
        }
        h.finish()
    }
}
