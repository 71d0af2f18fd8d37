//! Contract Test: Codec Round-Trips and Stable Identity
//!
//! Constraints verified:
//! - Set member identity does not depend on construction order
//! - TXT answers are a single token, other types split on spaces
//! - List-valued metadata comes back sorted, and stays sorted
//! - Filter config values are inferred as bool, integer or string
//! - Zero coordinates and missing geo attributes are omitted on read
//!
//! If this test fails, reads would report spurious changes.

mod common;

use common::*;
use nsone_core::codec::{answer, filter, meta, region};
use nsone_core::{
    AnswerConfig, FilterValue, Identity, MetaConfig, MetaValue, RecordConfig, RecordType, Region,
    RegionConfig, RegionMeta, build_for_write, snapshot_for_read,
};
use serde_json::json;

#[test]
fn answer_hash_ignores_meta_insertion_order() {
    let first = AnswerConfig::new("1.2.3.4")
        .with_region("east")
        .with_meta(MetaConfig::value("priority", "1"))
        .with_meta(MetaConfig::feed("up", "feed-east"));
    let second = AnswerConfig::new("1.2.3.4")
        .with_region("east")
        .with_meta(MetaConfig::feed("up", "feed-east"))
        .with_meta(MetaConfig::value("priority", "1"));

    assert_eq!(first.identity(), second.identity());
    assert_eq!(first.identity(), first.clone().identity());

    let other_region = first.clone().with_region("west");
    assert_ne!(first.identity(), other_region.identity());
}

#[test]
fn region_and_meta_hashes_are_deterministic() {
    let region = RegionConfig::new("east")
        .with_georegion("US-EAST")
        .with_coordinates(40.7, -74.0)
        .with_up(true);
    assert_eq!(region.identity(), region.clone().identity());
    assert_ne!(region.identity(), region.clone().with_up(false).identity());

    // Feed and value never collide for the same text
    assert_ne!(
        MetaConfig::feed("up", "x").identity(),
        MetaConfig::value("up", "x").identity()
    );
}

#[test]
fn txt_answer_is_single_token() {
    let decoded = answer::to_structured(&AnswerConfig::new("a b c"), RecordType::Txt).unwrap();
    assert_eq!(decoded.answer, vec!["a b c".to_string()]);
    assert_eq!(answer::to_config(&decoded).answer, "a b c");

    let record = build_for_write(&txt_record("v=spf1 include:example.net ~all")).unwrap();
    assert_eq!(record.answers[0].answer.len(), 1);
}

#[test]
fn other_types_split_on_spaces() {
    let decoded = answer::to_structured(&AnswerConfig::new("a b c"), RecordType::Mx).unwrap();
    assert_eq!(decoded.answer, vec!["a", "b", "c"]);
    assert_eq!(answer::to_config(&decoded).answer, "a b c");
}

#[test]
fn meta_list_is_sorted_and_idempotent() {
    let encoded = meta::encode(&MetaConfig::value("country", "b,a")).unwrap();
    assert_eq!(encoded, MetaValue::List(vec!["a".into(), "b".into()]));

    let flattened = meta::to_config("country", &encoded);
    assert_eq!(flattened.value.as_deref(), Some("a,b"));

    // What the record API returns for the list above
    let decoded = meta::decode("country", &json!(["b", "a"])).unwrap();
    assert_eq!(meta::to_config("country", &decoded).value.as_deref(), Some("a,b"));

    let again = meta::encode(&flattened).unwrap();
    assert_eq!(meta::to_config("country", &again), flattened);
}

#[test]
fn meta_decode_tags_feeds_and_values() {
    assert_eq!(
        meta::decode("up", &json!({ "feed": "abc" })).unwrap(),
        MetaValue::Feed("abc".into())
    );
    assert_eq!(meta::decode("up", &json!(true)).unwrap(), MetaValue::Scalar("1".into()));
    assert_eq!(meta::decode("priority", &json!(10)).unwrap(), MetaValue::Scalar("10".into()));

    let err = meta::decode("up", &json!({ "other": 1 })).unwrap_err();
    assert!(err.is_codec_error());
}

#[test]
fn meta_without_feed_or_value_is_rejected() {
    let entry = MetaConfig {
        field: "up".into(),
        feed: None,
        value: None,
    };
    assert!(meta::encode(&entry).unwrap_err().is_codec_error());
}

#[test]
fn filter_values_are_inferred() {
    assert_eq!(filter::infer_value("true"), FilterValue::Bool(true));
    assert_eq!(filter::infer_value("10"), FilterValue::Int(10));
    assert_eq!(filter::infer_value("hello"), FilterValue::Text("hello".into()));
    // Only the exact lowercase spellings are booleans
    assert_eq!(filter::infer_value("True"), FilterValue::Text("True".into()));
    assert_eq!(filter::infer_value("-3"), FilterValue::Int(-3));
}

#[test]
fn region_zero_attributes_are_omitted() {
    let structured = Region {
        meta: RegionMeta {
            latitude: Some(0.0),
            longitude: Some(0.0),
            up: true,
            ..Default::default()
        },
    };

    let flattened = region::to_config("east", &structured);
    assert_eq!(flattened.georegion, None);
    assert_eq!(flattened.latitude, None);
    assert_eq!(flattened.longitude, None);
    assert!(flattened.up);

    let (_, rebuilt) = region::to_structured(&RegionConfig::new("east").with_coordinates(0.0, 0.0)).unwrap();
    assert_eq!(rebuilt.meta.latitude, None);
    assert_eq!(rebuilt.meta.longitude, None);
}

#[test]
fn unknown_georegion_is_rejected() {
    let err = region::to_structured(&RegionConfig::new("mars").with_georegion("MARS")).unwrap_err();
    assert!(matches!(err, nsone_core::Error::Validation(_)));
}

#[test]
fn snapshot_of_built_record_is_unchanged() {
    let config = geo_record();
    let observed = snapshot_for_read(&build_for_write(&config).unwrap());
    assert_eq!(observed, config);
}

#[test]
fn json_array_order_does_not_matter() {
    let forward: RecordConfig = serde_json::from_value(json!({
        "zone": "example.com", "domain": "www.example.com", "type": "A",
        "answers": [ { "answer": "1.1.1.1" }, { "answer": "2.2.2.2" } ],
        "regions": [ { "name": "a", "up": true }, { "name": "b" } ]
    }))
    .unwrap();
    let backward: RecordConfig = serde_json::from_value(json!({
        "zone": "example.com", "domain": "www.example.com", "type": "A",
        "answers": [ { "answer": "2.2.2.2" }, { "answer": "1.1.1.1" } ],
        "regions": [ { "name": "b" }, { "name": "a", "up": true } ]
    }))
    .unwrap();

    assert_eq!(forward, backward);
    assert_eq!(
        build_for_write(&forward).unwrap(),
        build_for_write(&backward).unwrap()
    );
    assert_eq!(
        build_for_write(&geo_record()).unwrap(),
        build_for_write(&geo_record_reordered()).unwrap()
    );
}
