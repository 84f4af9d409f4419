//! Points-of-interest feed records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::lenient;
use super::ParsedBatch;
use crate::error::{ExportError, ExportResult};

/// One POI as delivered by the feed for a single locale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiRecord {
    #[serde(default, deserialize_with = "lenient::opt_value", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Locale-independent merge key
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Grouping key
    #[serde(
        rename = "slugCategoryPOI",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,

    #[serde(
        rename = "slugRegion",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub region: Option<String>,

    #[serde(
        rename = "slugCity",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Free text, list of lines, or a structured schedule
    #[serde(default, deserialize_with = "lenient::opt_value", skip_serializing_if = "Option::is_none")]
    pub business_hours: Option<Value>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_value", skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub poi_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string_list", skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,

    /// Every other field of the feed record
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PoiRecord {
    /// `(longitude, latitude)` when both are present
    pub fn lon_lat(&self) -> Option<(f64, f64)> {
        Some((self.longitude?, self.latitude?))
    }

    /// Slug usable as a merge key (non-blank)
    pub fn merge_key(&self) -> Option<&str> {
        self.slug
            .as_deref()
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
    }

    /// Field-name → value view of the record, using feed field names
    pub fn to_field_map(&self) -> ExportResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(ExportError::Shape(format!(
                "POI record serialized to {}",
                other
            ))),
        }
    }

    /// Business hours as display text
    pub fn business_hours_text(&self) -> Option<String> {
        match self.business_hours.as_ref()? {
            Value::Array(lines) => {
                let lines: Vec<String> = lines.iter().filter_map(lenient::value_as_text).collect();
                Some(lines.join("\n"))
            }
            other => lenient::value_as_text(other),
        }
    }
}

/// Parse a feed payload (JSON array of POI objects)
pub fn parse_poi_batch(payload: &Value) -> ExportResult<ParsedBatch<PoiRecord>> {
    let items = payload.as_array().ok_or_else(|| {
        ExportError::Shape("POI payload is not a JSON array".to_string())
    })?;

    let mut batch = ParsedBatch::empty();
    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            tracing::warn!(index, "Skipping POI entry that is not an object");
            batch.malformed += 1;
            continue;
        }
        match serde_json::from_value::<PoiRecord>(item.clone()) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping unreadable POI entry");
                batch.malformed += 1;
            }
        }
    }
    Ok(batch)
}
