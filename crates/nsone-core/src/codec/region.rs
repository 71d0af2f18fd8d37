//! Region codec
//!
//! Structured regions keep each geo attribute as a one-element list; the
//! flattened form exposes it as a scalar. An empty list and an absent scalar
//! mean the same thing.
//!
//! Latitude and longitude of exactly zero are treated as unset in both
//! directions, so a real coordinate of 0.0 cannot be expressed.

use crate::config::RegionConfig;
use crate::error::{Error, Result};
use crate::hash::{Identity, StableHasher};
use crate::record::{GeoRegion, Region, RegionMeta};

/// Flatten a named structured region
pub fn to_config(name: &str, region: &Region) -> RegionConfig {
    let meta = &region.meta;
    RegionConfig {
        name: name.to_string(),
        georegion: meta.georegion.first().map(|g| g.as_str().to_string()),
        country: meta.country.first().cloned(),
        us_state: meta.us_state.first().cloned(),
        latitude: non_zero(meta.latitude),
        longitude: non_zero(meta.longitude),
        up: meta.up,
    }
}

/// Build a named structured region, validating the georegion code
pub fn to_structured(entry: &RegionConfig) -> Result<(String, Region)> {
    if entry.name.is_empty() {
        return Err(Error::validation("region name cannot be empty"));
    }

    let georegion = match non_empty(&entry.georegion) {
        Some(code) => vec![code.parse::<GeoRegion>()?],
        None => Vec::new(),
    };

    let meta = RegionMeta {
        georegion,
        country: non_empty(&entry.country).map(str::to_string).into_iter().collect(),
        us_state: non_empty(&entry.us_state).map(str::to_string).into_iter().collect(),
        latitude: non_zero(entry.latitude),
        longitude: non_zero(entry.longitude),
        up: entry.up,
    };

    Ok((entry.name.clone(), Region { meta }))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Fixed-precision coordinate text used for hashing
fn coordinate(value: Option<f64>) -> String {
    format!("{:.6}", non_zero(value).unwrap_or(0.0))
}

// Hash fields: name, georegion, country, us_state, latitude, longitude, up.
impl Identity for RegionConfig {
    fn identity(&self) -> u64 {
        StableHasher::new()
            .field(&self.name)
            .field(non_empty(&self.georegion).unwrap_or_default())
            .field(non_empty(&self.country).unwrap_or_default())
            .field(non_empty(&self.us_state).unwrap_or_default())
            .field(coordinate(self.latitude))
            .field(coordinate(self.longitude))
            .field(self.up.to_string())
            .finish()
    }
}
