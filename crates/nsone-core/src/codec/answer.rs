//! Answer codec
//!
//! A flattened answer carries its rdata as a single space-joined string.
//! TXT payloads may contain spaces, so for that type the whole string is
//! one token and joining/splitting stays idempotent.

use std::collections::BTreeMap;

use super::meta;
use crate::config::AnswerConfig;
use crate::error::{Error, Result};
use crate::hash::{Identity, IdentitySet, StableHasher};
use crate::record::{Answer, RecordType};

/// Separator between answer tokens in the flattened form
pub const TOKEN_SEPARATOR: &str = " ";

/// Flatten a structured answer
pub fn to_config(answer: &Answer) -> AnswerConfig {
    let meta: IdentitySet<_> = answer
        .meta
        .iter()
        .map(|(field, value)| meta::to_config(field, value))
        .collect();

    AnswerConfig {
        answer: answer.answer.join(TOKEN_SEPARATOR),
        region: answer.region.clone().filter(|r| !r.is_empty()),
        meta,
    }
}

/// Build a structured answer for a record of the given type
///
/// The region label is copied as-is; checking it against the record's
/// regions is left to the reconciler.
pub fn to_structured(entry: &AnswerConfig, record_type: RecordType) -> Result<Answer> {
    let tokens = if record_type.is_single_token() {
        vec![entry.answer.clone()]
    } else {
        entry.answer.split(TOKEN_SEPARATOR).map(str::to_string).collect()
    };

    let mut encoded = BTreeMap::new();
    for item in &entry.meta {
        let value = meta::encode(item)?;
        if encoded.insert(item.field.clone(), value).is_some() {
            return Err(Error::validation(format!(
                "answer '{}' sets meta field '{}' more than once",
                entry.answer, item.field
            )));
        }
    }

    Ok(Answer {
        answer: tokens,
        region: entry.region.clone().filter(|r| !r.is_empty()),
        meta: encoded,
    })
}

// Hash fields: answer, region (when set), then each meta identity in
// ascending numeric order, which is the order `hashes()` yields.
impl Identity for AnswerConfig {
    fn identity(&self) -> u64 {
        self.meta
            .hashes()
            .fold(
                StableHasher::new()
                    .field(&self.answer)
                    .optional_field(self.region.as_deref()),
                |h, m| h.field(m.to_string()),
            )
            .finish()
    }
}
