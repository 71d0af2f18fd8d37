//! Filter codec
//!
//! Flattened filter config maps can only hold strings, while the record API
//! expects typed values. Each value is inferred: exactly `"true"`/`"false"`
//! become booleans, anything parsing as an integer becomes an integer, and
//! everything else stays a string. Inference never fails.

use std::collections::BTreeMap;

use crate::config::FilterConfig;
use crate::record::{Filter, FilterValue};

/// Infer the typed value of one config entry
pub fn infer_value(raw: &str) -> FilterValue {
    match raw {
        "true" => FilterValue::Bool(true),
        "false" => FilterValue::Bool(false),
        _ => match raw.parse::<i64>() {
            Ok(i) => FilterValue::Int(i),
            Err(_) => FilterValue::Text(raw.to_string()),
        },
    }
}

/// String form of a typed config value
pub fn render_value(value: &FilterValue) -> String {
    match value {
        FilterValue::Bool(b) => b.to_string(),
        FilterValue::Int(i) => i.to_string(),
        FilterValue::Text(s) => s.clone(),
        FilterValue::Other(v) => v.to_string(),
    }
}

/// Build the structured filter chain, preserving order
pub fn to_structured(entries: &[FilterConfig]) -> Vec<Filter> {
    entries
        .iter()
        .map(|entry| Filter {
            filter: entry.filter.clone(),
            disabled: entry.disabled,
            config: entry
                .config
                .iter()
                .map(|(k, v)| (k.clone(), infer_value(v)))
                .collect::<BTreeMap<_, _>>(),
        })
        .collect()
}

/// Flatten the structured filter chain, preserving order
pub fn to_config(filters: &[Filter]) -> Vec<FilterConfig> {
    filters
        .iter()
        .map(|filter| FilterConfig {
            filter: filter.filter.clone(),
            disabled: filter.disabled,
            config: filter
                .config
                .iter()
                .map(|(k, v)| (k.clone(), render_value(v)))
                .collect(),
        })
        .collect()
}
