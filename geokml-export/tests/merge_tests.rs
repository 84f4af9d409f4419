//! Bilingual merge tests driven from raw feed payloads
//!
//! Records go through the same parsing boundary as the POI pipeline before
//! they reach the merge engine.

use serde_json::{json, Value};

use geokml_export::merge::BilingualMerger;
use geokml_export::models::poi::parse_poi_batch;
use geokml_export::models::PoiRecord;

fn parse(payload: Value) -> Vec<PoiRecord> {
    parse_poi_batch(&payload).unwrap().records
}

fn english_feed() -> Value {
    json!([
        {
            "id": 1, "slug": "kingdom-centre", "name": "Kingdom Centre",
            "slugCategoryPOI": "landmarks", "slugRegion": "riyadh", "slugCity": "RUH",
            "latitude": 24.7114, "longitude": 46.6744, "poiType": "city",
            "images": ["kc-1.jpg", "kc-2.jpg"], "createdAt": "2024-01-05T10:00:00Z",
            "isFeatured": true
        },
        {
            "id": 2, "slug": "boulevard", "name": "Boulevard City",
            "slugCategoryPOI": "entertainment", "slugCity": "RUH",
            "latitude": "24.77", "longitude": "46.60"
        }
    ])
}

#[test]
fn test_empty_secondary_round_trip() {
    let primary = parse(english_feed());

    let outcome = BilingualMerger::new().merge(primary.clone(), Vec::new());

    assert_eq!(outcome.report.matched, 0);
    assert_eq!(outcome.records.len(), primary.len());
    for (merged, original) in outcome.records.iter().zip(&primary) {
        assert_eq!(&merged.record, original);
        assert!(merged.shadow.is_empty());
    }
}

#[test]
fn test_identical_feeds_in_different_key_order_agree() {
    let reordered = json!([
        {
            "isFeatured": true, "createdAt": "2024-01-05T10:00:00Z", "images": ["kc-1.jpg", "kc-2.jpg"],
            "poiType": "city", "longitude": 46.6744, "latitude": 24.7114, "slugCity": "RUH",
            "slugRegion": "riyadh", "slugCategoryPOI": "landmarks", "name": "Kingdom Centre",
            "slug": "kingdom-centre", "id": 1
        },
        {
            "longitude": "46.60", "latitude": "24.77", "slugCity": "RUH",
            "slugCategoryPOI": "entertainment", "name": "Boulevard City", "slug": "boulevard", "id": 2
        }
    ]);

    let outcome = BilingualMerger::new().merge(parse(english_feed()), parse(reordered));

    assert_eq!(outcome.report.matched, 2);
    assert!(outcome.report.discrepancies.is_empty());
    assert!(outcome.records.iter().all(|merged| merged.shadow.latitude_ar.is_none()));
}

#[test]
fn test_arabic_feed_merge() {
    let arabic = json!([
        {
            "id": 101, "slug": "kingdom-centre", "name": "برج المملكة",
            "description": "ناطحة سحاب", "address": "طريق الملك فهد",
            "slugCategoryPOI": "landmarks", "slugRegion": "riyadh", "slugCity": "RUH",
            "latitude": 24.7115, "longitude": 46.6744, "poiType": "city",
            "images": ["kc-2.jpg", "kc-3.jpg"], "createdAt": "2024-01-01T08:00:00Z",
            "isFeatured": false
        },
        {"slug": "arabic-only", "name": "فقط"},
        {"name": "بدون معرف"},
        "not an object"
    ]);
    let secondary = parse_poi_batch(&arabic).unwrap();
    assert_eq!(secondary.malformed, 1);

    let outcome = BilingualMerger::new().merge(parse(english_feed()), secondary.records);
    let kingdom = &outcome.records[0];

    assert_eq!(kingdom.record.name.as_deref(), Some("Kingdom Centre"));
    assert_eq!(kingdom.shadow.name_ar.as_deref(), Some("برج المملكة"));
    assert_eq!(kingdom.shadow.description_ar.as_deref(), Some("ناطحة سحاب"));
    assert_eq!(kingdom.shadow.address_ar.as_deref(), Some("طريق الملك فهد"));
    assert_eq!(kingdom.shadow.id_ar, Some(json!(101)));
    assert_eq!(kingdom.shadow.latitude_ar, Some(24.7115));
    assert_eq!(kingdom.shadow.longitude_ar, None);
    assert_eq!(
        kingdom.record.images.as_deref(),
        Some(&["kc-1.jpg".to_string(), "kc-2.jpg".to_string(), "kc-3.jpg".to_string()][..])
    );
    assert_eq!(kingdom.record.created_at.as_deref(), Some("2024-01-01T08:00:00Z"));

    let report = &outcome.report;
    assert_eq!(report.matched, 1);
    assert_eq!(report.unmatched_slugs, vec!["boulevard".to_string()]);
    assert_eq!(report.secondary_missing_slug, 1);
    assert_eq!(report.secondary_only, 1);
    assert_eq!(report.discrepancy_fields(), vec![("isFeatured".to_string(), 1)]);
}
