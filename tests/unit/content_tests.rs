/*!
 * Tests for content trees and their storage form
 */

use serde_json::json;

use cms_translate::content::{ContentFields, ContentValue};
use cms_translate::entities::EntityKind;
use cms_translate::translation::{parse_stored_field, serialize_fields, serialize_value};

fn itinerary() -> ContentValue {
    ContentValue::from(json!([
        {"day": 1, "title": "Tiba di Malang", "activities": ["Penjemputan", "Makan malam"]},
        {"day": 2, "title": "Sunrise Bromo", "optional": false, "note": null}
    ]))
}

/// Structured fields come back with the same shape after storage
#[test]
fn test_storageRoundTrip_withNestedItinerary_shouldKeepShape() {
    let spec = EntityKind::Package.field("itinerary").unwrap();
    let original = itinerary();

    let stored = serialize_value(&original).unwrap();
    let parsed = parse_stored_field(spec, stored);

    assert_eq!(parsed, original);
    assert_eq!(parsed.depth(), 3);
    assert_eq!(parsed.text_leaf_count(), 4);
}

/// Integral numbers are stored without a fraction
#[test]
fn test_serializeValue_withIntegralNumber_shouldNotAddFraction() {
    let stored = serialize_value(&itinerary()).unwrap().unwrap();
    assert!(stored.contains("\"day\":1"));
    assert!(!stored.contains("1.0"));
}

/// Plain text columns are stored verbatim and read back as text
#[test]
fn test_storageRoundTrip_withPlainText_shouldStayVerbatim() {
    let spec = EntityKind::Blog.field("title").unwrap();
    let stored = serialize_value(&ContentValue::text("Wisata \"Bromo\"")).unwrap();

    assert_eq!(stored.as_deref(), Some("Wisata \"Bromo\""));
    assert_eq!(parse_stored_field(spec, stored), ContentValue::text("Wisata \"Bromo\""));
}

/// NULL columns stay NULL
#[test]
fn test_parseStoredField_withNull_shouldBeNull() {
    let spec = EntityKind::Blog.field("tags").unwrap();
    assert_eq!(parse_stored_field(spec, None), ContentValue::Null);
    assert_eq!(serialize_value(&ContentValue::Null).unwrap(), None);
}

/// A non-finite number skips only its own field
#[test]
fn test_serializeFields_withNonFiniteNumber_shouldSkipOnlyThatField() {
    let mut fields = ContentFields::new();
    fields.insert("title".to_string(), ContentValue::text("Bromo"));
    fields.insert(
        "faqs".to_string(),
        ContentValue::Sequence(vec![ContentValue::Number(f64::INFINITY)]),
    );

    let serialized = serialize_fields(&fields);

    assert_eq!(serialized.fields.get("title"), Some(&Some("Bromo".to_string())));
    assert!(!serialized.fields.contains_key("faqs"));
    assert_eq!(serialized.skipped.len(), 1);
    assert_eq!(serialized.skipped[0].field, "faqs");
}
