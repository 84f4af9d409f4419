//! Bilingual POI merge
//!
//! Reconciles the English (primary) and Arabic (secondary) fetches of the same
//! POI set, keyed by slug.
//!
//! **Algorithm:**
//! 1. Index the secondary records by slug (records without a slug are counted
//!    and left out; on duplicate slugs the first record wins)
//! 2. Walk the primary records in order; unmatched ones pass through unchanged
//! 3. For a match, copy the Arabic text into shadow fields, keep Arabic
//!    coordinates/website only where they differ, union the image lists, keep
//!    the earlier `createdAt`, and record every other differing field as a
//!    discrepancy without changing the record
//! 4. Secondary-only records are counted, never emitted
//!
//! English is authoritative: the merge reports differences, it does not pick
//! winners.

pub mod report;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::models::PoiRecord;
use geokml_common::time::earliest;

pub use report::{FieldDiscrepancy, MergeReport};

/// Feed fields that the merge reconciles explicitly (never reported as discrepancies)
pub const RECONCILED_FIELDS: &[&str] = &[
    "id",
    "slug",
    "name",
    "description",
    "address",
    "latitude",
    "longitude",
    "website",
    "images",
    "createdAt",
];

/// Alternate-locale values attached to a merged record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocaleShadow {
    pub name_ar: Option<String>,
    pub description_ar: Option<String>,
    pub address_ar: Option<String>,
    pub latitude_ar: Option<f64>,
    pub longitude_ar: Option<f64>,
    pub website_ar: Option<String>,
    pub id_ar: Option<Value>,
}

impl LocaleShadow {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Present shadow fields as `(field name, text)` pairs, in declaration order
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        let mut push = |name: &'static str, value: Option<String>| {
            if let Some(value) = value {
                entries.push((name, value));
            }
        };
        push("name_ar", self.name_ar.clone());
        push("description_ar", self.description_ar.clone());
        push("address_ar", self.address_ar.clone());
        push("latitude_ar", self.latitude_ar.map(|v| v.to_string()));
        push("longitude_ar", self.longitude_ar.map(|v| v.to_string()));
        push("website_ar", self.website_ar.clone());
        push(
            "id_ar",
            self.id_ar
                .as_ref()
                .and_then(crate::models::lenient::value_as_text),
        );
        entries
    }
}

/// Primary record plus its alternate-locale shadow fields
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPoi {
    pub record: PoiRecord,
    pub shadow: LocaleShadow,
}

impl MergedPoi {
    /// Record that had no counterpart in the other locale
    pub fn unmerged(record: PoiRecord) -> Self {
        Self {
            record,
            shadow: LocaleShadow::default(),
        }
    }
}

/// Merged records in primary order plus diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub records: Vec<MergedPoi>,
    pub report: MergeReport,
}

/// Bilingual merge engine
#[derive(Debug, Clone, Copy, Default)]
pub struct BilingualMerger;

impl BilingualMerger {
    pub fn new() -> Self {
        Self
    }

    pub fn merge(&self, primary: Vec<PoiRecord>, secondary: Vec<PoiRecord>) -> MergeOutcome {
        let mut report = MergeReport {
            primary_total: primary.len(),
            secondary_total: secondary.len(),
            ..MergeReport::default()
        };

        // Step 1: secondary lookup by slug
        let mut lookup: HashMap<String, PoiRecord> = HashMap::with_capacity(secondary.len());
        for record in secondary {
            let Some(slug) = record.merge_key().map(str::to_owned) else {
                report.secondary_missing_slug += 1;
                continue;
            };
            if lookup.contains_key(&slug) {
                tracing::debug!(slug = %slug, "Duplicate slug in secondary locale, keeping first");
                report.secondary_duplicate_slug += 1;
                continue;
            }
            lookup.insert(slug, record);
        }

        // Step 2: walk primary order
        let mut used: HashSet<String> = HashSet::new();
        let mut records = Vec::with_capacity(report.primary_total);
        for record in primary {
            let Some(slug) = record.merge_key().map(str::to_owned) else {
                tracing::debug!("Primary record without slug passes through unmerged");
                report.unmatched_slugs.push(String::new());
                records.push(MergedPoi::unmerged(record));
                continue;
            };

            match lookup.get(&slug) {
                Some(counterpart) => {
                    report.matched += 1;
                    report
                        .discrepancies
                        .extend(compare_unreconciled(&slug, &record, counterpart));
                    records.push(merge_pair(record, counterpart));
                    used.insert(slug);
                }
                None => {
                    tracing::debug!(slug = %slug, "No secondary-locale counterpart");
                    report.unmatched_slugs.push(slug);
                    records.push(MergedPoi::unmerged(record));
                }
            }
        }

        // Step 3: one-sided merge, secondary-only records are dropped
        report.secondary_only = lookup.len() - used.len();

        for discrepancy in &report.discrepancies {
            tracing::debug!(
                slug = %discrepancy.slug,
                field = %discrepancy.field,
                primary = %discrepancy.primary_value,
                secondary = %discrepancy.secondary_value,
                "Locale discrepancy"
            );
        }
        tracing::info!("Bilingual merge: {}", report.display_string());

        MergeOutcome { records, report }
    }
}

fn merge_pair(primary: PoiRecord, secondary: &PoiRecord) -> MergedPoi {
    let mut shadow = LocaleShadow {
        name_ar: secondary.name.clone(),
        description_ar: secondary.description.clone(),
        address_ar: secondary.address.clone(),
        id_ar: secondary.id.clone(),
        ..LocaleShadow::default()
    };

    if secondary.latitude.is_some() && secondary.latitude != primary.latitude {
        shadow.latitude_ar = secondary.latitude;
    }
    if secondary.longitude.is_some() && secondary.longitude != primary.longitude {
        shadow.longitude_ar = secondary.longitude;
    }
    if let Some(website) = &secondary.website {
        if primary.website.as_ref() != Some(website) {
            shadow.website_ar = Some(website.clone());
        }
    }

    let mut record = primary;

    record.images = match (record.images.take(), &secondary.images) {
        (Some(ours), Some(theirs)) if ours != *theirs => Some(union_images(ours, theirs)),
        (Some(ours), _) => Some(ours),
        (None, Some(theirs)) => Some(theirs.clone()),
        (None, None) => None,
    };

    record.created_at = match (record.created_at.take(), &secondary.created_at) {
        (Some(ours), Some(theirs)) => Some(earliest(&ours, theirs).to_string()),
        (ours, theirs) => ours.or_else(|| theirs.clone()),
    };

    MergedPoi { record, shadow }
}

/// Union without duplicates: primary order first, then new secondary entries
pub fn union_images(primary: Vec<String>, secondary: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(primary.len() + secondary.len());
    primary
        .into_iter()
        .chain(secondary.iter().cloned())
        .filter(|image| seen.insert(image.clone()))
        .collect()
}

/// Discrepancies for every field the merge does not reconcile
fn compare_unreconciled(
    slug: &str,
    primary: &PoiRecord,
    secondary: &PoiRecord,
) -> Vec<FieldDiscrepancy> {
    let (ours, theirs) = match (primary.to_field_map(), secondary.to_field_map()) {
        (Ok(ours), Ok(theirs)) => (ours, theirs),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(slug = %slug, error = %e, "Could not compare locale records");
            return Vec::new();
        }
    };

    let field_names = ours
        .keys()
        .chain(theirs.keys().filter(|key| !ours.contains_key(*key)))
        .filter(|key| !RECONCILED_FIELDS.contains(&key.as_str()));

    let mut discrepancies = Vec::new();
    for field in field_names {
        let primary_value = field_value(&ours, field);
        let secondary_value = field_value(&theirs, field);
        if !values_equal(&primary_value, &secondary_value) {
            discrepancies.push(FieldDiscrepancy {
                slug: slug.to_string(),
                field: field.clone(),
                primary_value,
                secondary_value,
            });
        }
    }
    discrepancies
}

fn field_value(map: &Map<String, Value>, field: &str) -> Value {
    map.get(field).cloned().unwrap_or(Value::Null)
}

/// JSON equality that treats `4` and `4.0` as the same number
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}
