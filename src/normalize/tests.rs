//! Tests for record normalization

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn export_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "messageId": {"type": ["string", "null"]},
            "email": {"type": ["string", "null"]},
            "createdAt": {"type": ["string", "null"], "format": "date-time"},
            "transactionalData": {"type": ["object", "null"]}
        }
    })
}

fn users_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "userId": {"type": ["string", "null"]},
            "email": {"type": ["string", "null"]},
            "signupDate": {"type": ["string", "null"], "format": "date-time"},
            "profileUpdatedAt": {"type": ["string", "null"], "format": "date-time"},
            "dataFields": {"type": ["object", "null"]}
        }
    })
}

fn object(value: JsonValue) -> JsonObject {
    value.as_object().cloned().expect("object")
}

// ============================================================================
// Date-time decoding
// ============================================================================

#[test]
fn test_epoch_millis_to_rfc3339() {
    let normalizer = RecordNormalizer::from_schema(&export_schema(), RecordShape::Standard);
    let mut record = object(json!({"messageId": "a", "createdAt": 1_700_000_000_000_i64}));

    normalizer.normalize(&mut record).unwrap();

    assert_eq!(record["createdAt"], json!("2023-11-14T22:13:20+00:00"));
}

#[test]
fn test_epoch_millis_with_fraction() {
    let normalizer = RecordNormalizer::from_schema(&export_schema(), RecordShape::Standard);
    let mut record = object(json!({"createdAt": 1_700_000_000_123_i64}));

    normalizer.normalize(&mut record).unwrap();

    assert_eq!(record["createdAt"], json!("2023-11-14T22:13:20.123+00:00"));
}

#[test]
fn test_iso_string_passes_through_unchanged() {
    let normalizer = RecordNormalizer::from_schema(&export_schema(), RecordShape::Standard);
    let mut record = object(json!({"createdAt": "2023-11-14T22:13:20+00:00"}));

    normalizer.normalize(&mut record).unwrap();

    assert_eq!(record["createdAt"], json!("2023-11-14T22:13:20+00:00"));
}

#[test]
fn test_normalization_is_idempotent() {
    let normalizer = RecordNormalizer::from_schema(&export_schema(), RecordShape::Standard);
    let mut record = object(json!({"createdAt": 1_700_000_000_000_i64}));

    normalizer.normalize(&mut record).unwrap();
    let once = record.clone();
    normalizer.normalize(&mut record).unwrap();

    assert_eq!(record, once);
}

#[test]
fn test_falsy_values_pass_through() {
    let normalizer = RecordNormalizer::from_schema(&export_schema(), RecordShape::Standard);

    let mut record = object(json!({"createdAt": null}));
    normalizer.normalize(&mut record).unwrap();
    assert_eq!(record["createdAt"], json!(null));

    let mut record = object(json!({"createdAt": 0}));
    normalizer.normalize(&mut record).unwrap();
    assert_eq!(record["createdAt"], json!(0));

    let mut record = object(json!({"messageId": "a"}));
    normalizer.normalize(&mut record).unwrap();
    assert!(!record.contains_key("createdAt"));
}

#[test]
fn test_only_declared_datetime_fields_are_decoded() {
    let normalizer = RecordNormalizer::from_schema(&export_schema(), RecordShape::Standard);
    // messageId is declared as a plain string, so an integer stays an integer.
    let mut record = object(json!({"messageId": 1_700_000_000_000_i64}));

    normalizer.normalize(&mut record).unwrap();

    assert_eq!(record["messageId"], json!(1_700_000_000_000_i64));
}

// ============================================================================
// transactionalData unpacking
// ============================================================================

#[test]
fn test_transactional_data_unpacked() {
    let normalizer = RecordNormalizer::from_schema(&export_schema(), RecordShape::Export);
    let mut record = object(json!({
        "messageId": "a",
        "transactionalData": "{\"orderId\": 9, \"total\": \"12.50\"}"
    }));

    normalizer.normalize(&mut record).unwrap();

    assert_eq!(
        record["transactionalData"],
        json!({"orderId": 9, "total": "12.50"})
    );
}

#[test]
fn test_transactional_data_absent_is_fine() {
    let normalizer = RecordNormalizer::from_schema(&export_schema(), RecordShape::Export);
    let mut record = object(json!({"messageId": "a"}));

    normalizer.normalize(&mut record).unwrap();

    assert!(!record.contains_key("transactionalData"));
}

#[test]
fn test_transactional_data_already_decoded_passes_through() {
    let normalizer = RecordNormalizer::from_schema(&export_schema(), RecordShape::Export);
    let mut record = object(json!({"transactionalData": {"orderId": 9}}));

    normalizer.normalize(&mut record).unwrap();

    assert_eq!(record["transactionalData"], json!({"orderId": 9}));
}

#[test]
fn test_malformed_transactional_data_is_fatal() {
    let normalizer = RecordNormalizer::from_schema(&export_schema(), RecordShape::Export);
    let mut record = object(json!({"transactionalData": "{broken"}));

    let err = normalizer.normalize(&mut record).unwrap_err();
    assert!(err.to_string().contains("transactionalData"));
}

#[test]
fn test_standard_shape_leaves_transactional_data_encoded() {
    let normalizer = RecordNormalizer::from_schema(&export_schema(), RecordShape::Standard);
    let mut record = object(json!({"transactionalData": "{\"orderId\": 9}"}));

    normalizer.normalize(&mut record).unwrap();

    assert_eq!(record["transactionalData"], json!("{\"orderId\": 9}"));
}

// ============================================================================
// dataFields bucketing
// ============================================================================

#[test]
fn test_undeclared_fields_move_into_data_fields() {
    let normalizer = RecordNormalizer::from_schema(&users_schema(), RecordShape::UserExport);
    let mut record = object(json!({
        "userId": "u1",
        "email": "a@x.com",
        "favoriteColor": "green",
        "loyaltyTier": 3
    }));

    normalizer.normalize(&mut record).unwrap();

    let keys: Vec<&str> = record.keys().map(String::as_str).collect();
    assert!(keys.contains(&"userId"));
    assert!(keys.contains(&"dataFields"));
    assert!(!keys.contains(&"favoriteColor"));
    assert!(!keys.contains(&"loyaltyTier"));

    assert_eq!(
        record["dataFields"],
        json!({"favoriteColor": "green", "loyaltyTier": 3})
    );
}

#[test]
fn test_top_level_keys_are_exactly_schema_plus_data_fields() {
    let normalizer = RecordNormalizer::from_schema(&users_schema(), RecordShape::UserExport);
    let mut record = object(json!({
        "userId": "u1",
        "email": "a@x.com",
        "signupDate": 1_700_000_000_000_i64,
        "custom1": true,
        "custom2": [1, 2]
    }));

    normalizer.normalize(&mut record).unwrap();

    let declared = ["userId", "email", "signupDate", "profileUpdatedAt", "dataFields"];
    for key in record.keys() {
        assert!(declared.contains(&key.as_str()), "unexpected key {key}");
    }
    assert_eq!(record["dataFields"], json!({"custom1": true, "custom2": [1, 2]}));
}

#[test]
fn test_bucketing_merges_existing_data_fields() {
    let normalizer = RecordNormalizer::from_schema(&users_schema(), RecordShape::UserExport);
    let mut record = object(json!({
        "userId": "u1",
        "dataFields": {"existing": 1},
        "extra": "x"
    }));

    normalizer.normalize(&mut record).unwrap();

    assert_eq!(record["dataFields"], json!({"existing": 1, "extra": "x"}));
}

#[test]
fn test_bucketing_noop_when_all_fields_declared() {
    let normalizer = RecordNormalizer::from_schema(&users_schema(), RecordShape::UserExport);
    let mut record = object(json!({"userId": "u1", "email": "a@x.com"}));

    normalizer.normalize(&mut record).unwrap();

    assert!(!record.contains_key("dataFields"));
}

// ============================================================================
// Schema wiring
// ============================================================================

#[test]
fn test_datetime_fields_computed_from_schema() {
    let normalizer = RecordNormalizer::from_schema(&users_schema(), RecordShape::Standard);
    let mut fields: Vec<&str> = normalizer
        .datetime_fields()
        .iter()
        .map(String::as_str)
        .collect();
    fields.sort_unstable();

    assert_eq!(fields, vec!["profileUpdatedAt", "signupDate"]);
}

#[test]
fn test_schema_without_properties() {
    let normalizer = RecordNormalizer::from_schema(&json!({"type": "object"}), RecordShape::Standard);
    let mut record = object(json!({"anything": 1}));

    normalizer.normalize(&mut record).unwrap();

    assert_eq!(record["anything"], json!(1));
}
