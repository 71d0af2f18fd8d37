// # Structured Record Model
//
// The nested representation the remote record API speaks. Everything here
// serializes to the API's JSON shape:
//
// ```json
// {
//   "zone": "example.com",
//   "domain": "www.example.com",
//   "type": "A",
//   "answers": [
//     { "answer": ["1.2.3.4"], "region": "east", "meta": { "up": { "feed": "f1" } } }
//   ],
//   "regions": { "east": { "meta": { "georegion": ["US-EAST"], "up": true } } },
//   "filters": [ { "filter": "up", "config": {} } ]
// }
// ```

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::traits::RecordKey;

/// Supported DNS record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Alias,
    Afsdb,
    Cname,
    Dname,
    Hinfo,
    Mx,
    Naptr,
    Ns,
    Ptr,
    Rp,
    Spf,
    Srv,
    Txt,
}

impl RecordType {
    /// Every supported type, in canonical order
    pub const ALL: [RecordType; 15] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Alias,
        RecordType::Afsdb,
        RecordType::Cname,
        RecordType::Dname,
        RecordType::Hinfo,
        RecordType::Mx,
        RecordType::Naptr,
        RecordType::Ns,
        RecordType::Ptr,
        RecordType::Rp,
        RecordType::Spf,
        RecordType::Srv,
        RecordType::Txt,
    ];

    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Alias => "ALIAS",
            RecordType::Afsdb => "AFSDB",
            RecordType::Cname => "CNAME",
            RecordType::Dname => "DNAME",
            RecordType::Hinfo => "HINFO",
            RecordType::Mx => "MX",
            RecordType::Naptr => "NAPTR",
            RecordType::Ns => "NS",
            RecordType::Ptr => "PTR",
            RecordType::Rp => "RP",
            RecordType::Spf => "SPF",
            RecordType::Srv => "SRV",
            RecordType::Txt => "TXT",
        }
    }

    /// TXT payloads keep embedded spaces as a single answer token
    pub fn is_single_token(&self) -> bool {
        matches!(self, RecordType::Txt)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                crate::Error::validation(format!(
                    "record type '{}' is not one of {}",
                    s,
                    RecordType::ALL.map(|t| t.as_str()).join(", ")
                ))
            })
    }
}

/// Fixed geographic region codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum GeoRegion {
    UsWest,
    UsEast,
    UsCentral,
    Europe,
    Africa,
    Asiapac,
    SouthAmerica,
}

impl GeoRegion {
    pub const ALL: [GeoRegion; 7] = [
        GeoRegion::UsWest,
        GeoRegion::UsEast,
        GeoRegion::UsCentral,
        GeoRegion::Europe,
        GeoRegion::Africa,
        GeoRegion::Asiapac,
        GeoRegion::SouthAmerica,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeoRegion::UsWest => "US-WEST",
            GeoRegion::UsEast => "US-EAST",
            GeoRegion::UsCentral => "US-CENTRAL",
            GeoRegion::Europe => "EUROPE",
            GeoRegion::Africa => "AFRICA",
            GeoRegion::Asiapac => "ASIAPAC",
            GeoRegion::SouthAmerica => "SOUTH-AMERICA",
        }
    }
}

impl fmt::Display for GeoRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeoRegion {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeoRegion::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| {
                crate::Error::validation(format!(
                    "georegion '{}' is not one of {}",
                    s,
                    GeoRegion::ALL.map(|g| g.as_str()).join(", ")
                ))
            })
    }
}

/// A single metadata value attached to an answer
///
/// Decoded once at the boundary; downstream code matches on the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    /// Deferred to a data feed by id
    Feed(String),
    /// Single normalized string
    Scalar(String),
    /// Sorted list of strings
    List(Vec<String>),
}

impl Serialize for MetaValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetaValue::Feed(id) => {
                let mut feed = BTreeMap::new();
                feed.insert("feed", id);
                feed.serialize(serializer)
            }
            MetaValue::Scalar(s) => serializer.serialize_str(s),
            MetaValue::List(items) => serializer.collect_seq(items),
        }
    }
}

/// One candidate response of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer tokens (rdata fields)
    pub answer: Vec<String>,

    /// Region group this answer belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Routing metadata keyed by field name
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "crate::codec::meta::deserialize_meta_map"
    )]
    pub meta: BTreeMap<String, MetaValue>,
}

impl Answer {
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            answer: tokens,
            region: None,
            meta: BTreeMap::new(),
        }
    }
}

/// Geographic and health attributes of a region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionMeta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub georegion: Vec<GeoRegion>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub country: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub us_state: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub up: bool,
}

/// Named region of a record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub meta: RegionMeta,
}

/// Typed value of a filter config entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Text(String),
    /// Anything else the API sends back (floats, nested objects)
    Other(serde_json::Value),
}

/// One step of the answer filter chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub filter: String,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub config: BTreeMap<String, FilterValue>,
}

/// Full structured record as sent to and received from the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier assigned by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub zone: String,

    pub domain: String,

    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Unset means "use the store's default"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// Alias to another record; exclusive with answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default)]
    pub use_client_subnet: bool,

    #[serde(default)]
    pub answers: Vec<Answer>,

    #[serde(default)]
    pub regions: BTreeMap<String, Region>,

    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl Record {
    /// Create an empty record
    pub fn new(zone: impl Into<String>, domain: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            id: None,
            zone: zone.into(),
            domain: domain.into(),
            record_type,
            ttl: None,
            link: None,
            use_client_subnet: false,
            answers: Vec::new(),
            regions: BTreeMap::new(),
            filters: Vec::new(),
        }
    }

    /// Store key of this record
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.zone, &self.domain, self.record_type)
    }
}
