//! Administrative district boundary records
//!
//! Two payload shapes are accepted:
//! - a JSON array of district objects with a `boundaries` ring array
//! - a GeoJSON `FeatureCollection` whose features carry `Polygon` or
//!   `MultiPolygon` geometry and the district fields in `properties`

use serde_json::{Map, Value};

use super::lenient::{rings_from_value, value_as_i64};
use super::ParsedBatch;
use crate::error::{ExportError, ExportResult};

/// Polygon as raw rings (first ring outer, others holes)
pub type RawPolygon = Vec<Vec<Vec<f64>>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistrictRecord {
    pub district_id: Option<i64>,
    pub region_id: Option<i64>,
    pub city_id: Option<i64>,
    pub name_en: Option<String>,
    pub name_ar: Option<String>,
    /// Empty when the source had no usable boundary
    pub polygons: Vec<RawPolygon>,
}

impl DistrictRecord {
    fn from_properties(properties: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            properties
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let int = |key: &str| properties.get(key).and_then(value_as_i64);

        Self {
            district_id: int("district_id"),
            region_id: int("region_id"),
            city_id: int("city_id"),
            name_en: text("name_en"),
            name_ar: text("name_ar"),
            polygons: Vec::new(),
        }
    }

    /// Whether the record belongs to the given region and city
    pub fn is_in(&self, region_id: i64, city_id: i64) -> bool {
        self.region_id == Some(region_id) && self.city_id == Some(city_id)
    }
}

/// Parse either supported district payload shape
pub fn parse_district_batch(payload: &Value) -> ExportResult<ParsedBatch<DistrictRecord>> {
    match payload {
        Value::Array(items) => Ok(parse_plain(items)),
        Value::Object(object)
            if object.get("type").and_then(Value::as_str) == Some("FeatureCollection") =>
        {
            let features = object
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    ExportError::Shape("FeatureCollection without features array".to_string())
                })?;
            Ok(parse_feature_collection(features))
        }
        _ => Err(ExportError::Shape(
            "district payload is neither an array nor a FeatureCollection".to_string(),
        )),
    }
}

fn parse_plain(items: &[Value]) -> ParsedBatch<DistrictRecord> {
    let mut batch = ParsedBatch::empty();
    for item in items {
        let Some(object) = item.as_object() else {
            batch.malformed += 1;
            continue;
        };
        let mut record = DistrictRecord::from_properties(object);
        if let Some(rings) = object.get("boundaries").and_then(rings_from_value) {
            record.polygons.push(rings);
        }
        batch.records.push(record);
    }
    batch
}

fn parse_feature_collection(features: &[Value]) -> ParsedBatch<DistrictRecord> {
    let mut batch = ParsedBatch::empty();
    for feature in features {
        let Some(object) = feature.as_object() else {
            batch.malformed += 1;
            continue;
        };
        let empty = Map::new();
        let properties = object
            .get("properties")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let mut record = DistrictRecord::from_properties(properties);

        if let Some(geometry) = object.get("geometry").and_then(Value::as_object) {
            let coordinates = geometry.get("coordinates");
            match geometry.get("type").and_then(Value::as_str) {
                Some("Polygon") => {
                    if let Some(rings) = coordinates.and_then(rings_from_value) {
                        record.polygons.push(rings);
                    }
                }
                Some("MultiPolygon") => {
                    if let Some(polygons) = coordinates.and_then(Value::as_array) {
                        record
                            .polygons
                            .extend(polygons.iter().filter_map(rings_from_value));
                    }
                }
                other => {
                    tracing::debug!(geometry_type = ?other, "Ignoring non-polygon district geometry");
                }
            }
        }
        batch.records.push(record);
    }
    batch
}
