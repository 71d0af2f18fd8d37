//! Configuration types
//!
//! The flattened, order-independent record configuration a user authors
//! (and the observed configuration a read produces), plus the record store
//! selection. Field names are an external contract and must not change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::hash::IdentitySet;
use crate::record::RecordType;
use crate::traits::RecordKey;

/// Flattened configuration of one DNS record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Identifier assigned by the store (observed only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Zone the record lives in (e.g., "example.com")
    pub zone: String,

    /// Fully qualified record name (e.g., "www.example.com")
    pub domain: String,

    /// Record type, checked against the supported set when building
    #[serde(rename = "type")]
    pub record_type: String,

    /// Time-to-live; the store picks a default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// Alias to another record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default)]
    pub use_client_subnet: bool,

    #[serde(default)]
    pub answers: IdentitySet<AnswerConfig>,

    #[serde(default)]
    pub regions: IdentitySet<RegionConfig>,

    /// Filter chain, order is significant
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

impl RecordConfig {
    /// Create a record configuration with no answers
    pub fn new(zone: impl Into<String>, domain: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self {
            id: None,
            zone: zone.into(),
            domain: domain.into(),
            record_type: record_type.into(),
            ttl: None,
            link: None,
            use_client_subnet: false,
            answers: IdentitySet::new(),
            regions: IdentitySet::new(),
            filters: Vec::new(),
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_use_client_subnet(mut self, enabled: bool) -> Self {
        self.use_client_subnet = enabled;
        self
    }

    pub fn with_answer(mut self, answer: AnswerConfig) -> Self {
        self.answers.insert(answer);
        self
    }

    pub fn with_region(mut self, region: RegionConfig) -> Self {
        self.regions.insert(region);
        self
    }

    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filters.push(filter);
        self
    }

    /// Store key of this record, validating the record type
    pub fn key(&self) -> Result<RecordKey, crate::Error> {
        let record_type: RecordType = self.record_type.parse()?;
        Ok(RecordKey::new(&self.zone, &self.domain, record_type))
    }
}

/// Flattened answer: one space-joined string plus metadata entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerConfig {
    pub answer: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default)]
    pub meta: IdentitySet<MetaConfig>,
}

impl AnswerConfig {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            region: None,
            meta: IdentitySet::new(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_meta(mut self, meta: MetaConfig) -> Self {
        self.meta.insert(meta);
        self
    }
}

/// Flattened metadata entry: a field carrying either a feed or a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaConfig {
    pub field: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed: Option<String>,

    /// Comma separated when list-valued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl MetaConfig {
    /// Metadata entry with a static value
    pub fn value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            feed: None,
            value: Some(value.into()),
        }
    }

    /// Metadata entry bound to a data feed
    pub fn feed(field: impl Into<String>, feed_id: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            feed: Some(feed_id.into()),
            value: None,
        }
    }
}

/// Flattened region with scalar geo attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub georegion: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub us_state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub up: bool,
}

impl RegionConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            georegion: None,
            country: None,
            us_state: None,
            latitude: None,
            longitude: None,
            up: false,
        }
    }

    pub fn with_georegion(mut self, georegion: impl Into<String>) -> Self {
        self.georegion = Some(georegion.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_us_state(mut self, us_state: impl Into<String>) -> Self {
        self.us_state = Some(us_state.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_up(mut self, up: bool) -> Self {
        self.up = up;
        self
    }
}

/// Flattened filter; config values are always strings here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub filter: String,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl FilterConfig {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            disabled: false,
            config: BTreeMap::new(),
        }
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

/// Record store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory store (not persistent)
    #[default]
    Memory,

    /// JSON file store
    File {
        /// Path to the store file
        path: String,
    },
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("File store path cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Store type name
    pub fn type_name(&self) -> &'static str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::File { .. } => "file",
        }
    }
}
