//! Stable identity hashing and hash-keyed sets
//!
//! Answers, regions and answer metadata are unordered collections in the
//! flattened configuration. Their identity is a content hash computed over a
//! canonical textual encoding: each field's string form followed by `-`, in
//! a fixed field order, hashed with FNV-1a. The hash is stable across runs,
//! processes and Rust versions (it never touches `DefaultHasher`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::collections::btree_map;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Field delimiter appended after every hashed field
const DELIMITER: u8 = b'-';

/// Incremental builder for an identity hash
///
/// # Example
///
/// ```rust
/// use nsone_core::hash::StableHasher;
///
/// let a = StableHasher::new().field("1.2.3.4").field("us-east").finish();
/// let b = StableHasher::new().field("1.2.3.4").field("us-east").finish();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StableHasher {
    state: u64,
}

impl StableHasher {
    /// Start a new hash
    pub fn new() -> Self {
        Self { state: FNV_OFFSET }
    }

    /// Append one field followed by the delimiter
    pub fn field(mut self, value: impl AsRef<str>) -> Self {
        self.write(value.as_ref().as_bytes());
        self.write(&[DELIMITER]);
        self
    }

    /// Append a field only when it is present and non-empty
    pub fn optional_field(self, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.field(v),
            _ => self,
        }
    }

    /// Finish and return the identity
    pub fn finish(self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = (self.state ^ u64::from(byte)).wrapping_mul(FNV_PRIME);
        }
    }
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash an ordered sequence of already-stringified fields
pub fn stable_hash<I, S>(fields: I) -> u64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .fold(StableHasher::new(), |h, f| h.field(f))
        .finish()
}

/// A value with a content-derived identity
pub trait Identity {
    /// Deterministic identity hash of this value
    fn identity(&self) -> u64;
}

/// Set of values keyed by their identity hash
///
/// Iteration follows ascending identity, so two sets built from the same
/// members in a different order iterate identically. Equality compares the
/// key sets only.
///
/// Serialized as a plain JSON array; duplicates in the input collapse.
#[derive(Debug, Clone)]
pub struct IdentitySet<T> {
    entries: BTreeMap<u64, T>,
}

impl<T> IdentitySet<T> {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Number of distinct members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the set has no members
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Members in identity order
    pub fn iter(&self) -> btree_map::Values<'_, u64, T> {
        self.entries.values()
    }

    /// Identity hashes in ascending order
    pub fn hashes(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().copied()
    }

    /// Look a member up by identity
    pub fn get(&self, identity: u64) -> Option<&T> {
        self.entries.get(&identity)
    }
}

impl<T: Identity> IdentitySet<T> {
    /// Insert a member, returning `false` if an equal-identity member existed
    ///
    /// An existing member is kept; the new one is dropped.
    pub fn insert(&mut self, value: T) -> bool {
        match self.entries.entry(value.identity()) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// True if a member with the same identity is present
    pub fn contains(&self, value: &T) -> bool {
        self.entries.contains_key(&value.identity())
    }
}

impl<T> Default for IdentitySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PartialEq for IdentitySet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.keys().eq(other.entries.keys())
    }
}

impl<T> Eq for IdentitySet<T> {}

impl<T: Identity> FromIterator<T> for IdentitySet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Identity> Extend<T> for IdentitySet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T> IntoIterator for IdentitySet<T> {
    type Item = T;
    type IntoIter = btree_map::IntoValues<u64, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

impl<'a, T> IntoIterator for &'a IdentitySet<T> {
    type Item = &'a T;
    type IntoIter = btree_map::Values<'a, u64, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

impl<T: Serialize> Serialize for IdentitySet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}

impl<'de, T> Deserialize<'de> for IdentitySet<T>
where
    T: Deserialize<'de> + Identity,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let members = Vec::<T>::deserialize(deserializer)?;
        Ok(members.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Tag(String);

    impl Identity for Tag {
        fn identity(&self) -> u64 {
            stable_hash([&self.0])
        }
    }

    #[test]
    fn test_fnv1a_reference_value() {
        // FNV-1a 64 of "a-"
        let mut h = FNV_OFFSET;
        for b in b"a-" {
            h = (h ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
        }
        assert_eq!(stable_hash(["a"]), h);
    }

    #[test]
    fn test_field_order_matters() {
        assert_ne!(stable_hash(["a", "b"]), stable_hash(["b", "a"]));
    }

    #[test]
    fn test_delimiter_separates_fields() {
        assert_ne!(stable_hash(["ab", "c"]), stable_hash(["a", "bc"]));
    }

    #[test]
    fn test_optional_field_skips_empty() {
        let with_empty = StableHasher::new()
            .field("x")
            .optional_field(Some(""))
            .finish();
        let with_none = StableHasher::new().field("x").optional_field(None).finish();
        assert_eq!(with_empty, with_none);
        assert_eq!(with_none, stable_hash(["x"]));
    }

    #[test]
    fn test_set_ignores_insertion_order() {
        let a: IdentitySet<Tag> = ["x", "y", "z"].iter().map(|s| Tag(s.to_string())).collect();
        let b: IdentitySet<Tag> = ["z", "x", "y"].iter().map(|s| Tag(s.to_string())).collect();
        assert_eq!(a, b);

        let order_a: Vec<_> = a.iter().map(|t| t.0.clone()).collect();
        let order_b: Vec<_> = b.iter().map(|t| t.0.clone()).collect();
        assert_eq!(order_a, order_b);
    }

    #[test]
    fn test_set_collapses_duplicates() {
        let mut set = IdentitySet::new();
        assert!(set.insert(Tag("x".into())));
        assert!(!set.insert(Tag("x".into())));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_set_lookup_and_hash_order() {
        let set: IdentitySet<Tag> = ["q", "w", "e", "r"].iter().map(|s| Tag(s.to_string())).collect();

        let hashes: Vec<u64> = set.hashes().collect();
        assert!(hashes.windows(2).all(|w| w[0] < w[1]));

        let w = Tag("w".into());
        assert!(set.contains(&w));
        assert!(!set.contains(&Tag("t".into())));
        assert_eq!(set.get(w.identity()).map(|t| t.0.as_str()), Some("w"));
        assert!(set.get(Tag("t".into()).identity()).is_none());
    }

    #[test]
    fn test_set_serde_as_array() {
        let set: IdentitySet<Tag> = serde_json::from_str(r#"["b","a","b"]"#).unwrap();
        assert_eq!(set.len(), 2);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
    }
}
