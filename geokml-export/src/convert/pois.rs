//! Merged POIs → one folder per category, one point per record

use serde_json::Value;
use tracing::warn;

use geokml_common::config::PoiConfig;

use super::{Conversion, ConversionStats};
use crate::geometry::{AxisOrder, GeometryNormalizer};
use crate::grouping::group_by_category;
use crate::kml::{join_description, Geometry, KmlDocument, Placemark};
use crate::merge::MergedPoi;
use crate::models::lenient::value_as_text;

const UNNAMED: &str = "Unnamed POI";
const DOCUMENT_NAME: &str = "Points of Interest";

pub struct PoiConverter {
    /// Keep only records of this city (records without a city are kept)
    city_filter: Option<String>,
    normalizer: GeometryNormalizer,
}

impl PoiConverter {
    pub fn new(config: &PoiConfig) -> Self {
        Self {
            city_filter: config.filter_by_city.then(|| config.city.clone()),
            normalizer: GeometryNormalizer::unprojected(AxisOrder::LonLat),
        }
    }

    pub fn convert(&self, records: Vec<MergedPoi>) -> Conversion {
        let mut stats = ConversionStats {
            input_records: records.len(),
            ..ConversionStats::default()
        };

        let mut placeable = Vec::with_capacity(records.len());
        for merged in records {
            if let (Some(wanted), Some(city)) = (&self.city_filter, &merged.record.city) {
                if !city.trim().eq_ignore_ascii_case(wanted) {
                    stats.filtered += 1;
                    continue;
                }
            }

            let point = merged
                .record
                .lon_lat()
                .and_then(|(lon, lat)| self.normalizer.normalize_point(lon, lat).ok());
            match point {
                Some(coord) => placeable.push((merged, coord)),
                None => {
                    warn!(
                        slug = ?merged.record.slug,
                        "POI without usable coordinates skipped"
                    );
                    stats.skipped += 1;
                }
            }
        }

        let buckets = group_by_category(placeable, |(merged, _)| merged.record.category.as_deref());

        let mut document = KmlDocument::new(DOCUMENT_NAME);
        for (category, items) in buckets {
            let folder = document.folder_mut(&category);
            for (merged, coord) in items {
                folder.push(poi_placemark(&merged, Geometry::Point(coord)));
                stats.features += 1;
            }
        }

        tracing::info!("POIs: {}", stats.display_string());
        Conversion { document, stats }
    }
}

/// Description text in fixed order; absent or empty parts are left out
pub fn poi_description(merged: &MergedPoi) -> Option<String> {
    let record = &merged.record;
    let labelled = |label: &str, value: Option<String>| {
        value
            .filter(|v| !v.trim().is_empty())
            .map(|v| format!("{}: {}", label, v))
    };

    join_description([
        record.description.clone(),
        merged.shadow.description_ar.clone(),
        labelled("Address", record.address.clone()),
        labelled("Hours", record.business_hours_text()),
        labelled("Website", record.website.clone()),
    ])
}

fn poi_placemark(merged: &MergedPoi, geometry: Geometry) -> Placemark {
    let record = &merged.record;
    let name = record
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(UNNAMED);

    let mut placemark = Placemark::new(name, geometry).with_description(poi_description(merged));

    placemark.data("id", record.id.as_ref().and_then(value_as_text));
    placemark.data("slug", record.slug.clone());
    placemark.data("name", record.name.clone());
    placemark.data("slugCategoryPOI", record.category.clone());
    placemark.data("slugRegion", record.region.clone());
    placemark.data("slugCity", record.city.clone());
    placemark.data("poiType", record.poi_type.clone());
    placemark.data("latitude", record.latitude.map(|v| v.to_string()));
    placemark.data("longitude", record.longitude.map(|v| v.to_string()));
    placemark.data("address", record.address.clone());
    placemark.data("website", record.website.clone());
    placemark.data("businessHours", record.business_hours_text());
    placemark.data("rating", record.rating.as_ref().and_then(value_as_text));
    placemark.data("createdAt", record.created_at.clone());
    placemark.data("updatedAt", record.updated_at.clone());
    placemark.data(
        "images",
        record
            .images
            .as_ref()
            .map(|images| Value::from(images.clone()).to_string()),
    );

    for (key, value) in merged.shadow.entries() {
        placemark.data(key, Some(value));
    }
    placemark
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::LocaleShadow;
    use crate::models::PoiRecord;

    fn poi(slug: &str, category: Option<&str>, lat: Option<f64>) -> MergedPoi {
        MergedPoi::unmerged(PoiRecord {
            slug: Some(slug.to_string()),
            name: Some(slug.to_uppercase()),
            category: category.map(str::to_string),
            city: Some("RUH".to_string()),
            latitude: lat,
            longitude: Some(46.7),
            ..PoiRecord::default()
        })
    }

    #[test]
    fn test_grouped_in_first_seen_order() {
        let converter = PoiConverter::new(&PoiConfig::default());
        let conversion = converter.convert(vec![
            poi("a", Some("museums"), Some(24.6)),
            poi("b", Some("cafes"), Some(24.6)),
            poi("c", Some("museums"), Some(24.6)),
            poi("d", None, Some(24.6)),
        ]);

        let names: Vec<&str> = conversion
            .document
            .folders()
            .iter()
            .map(|folder| folder.name.as_str())
            .collect();
        assert_eq!(names, vec!["museums", "cafes", "Uncategorized"]);
        assert_eq!(conversion.document.folder("museums").unwrap().placemarks.len(), 2);
        assert_eq!(conversion.stats.features, 4);
    }

    #[test]
    fn test_missing_coordinates_skipped() {
        let converter = PoiConverter::new(&PoiConfig::default());
        let conversion = converter.convert(vec![
            poi("a", Some("parks"), None),
            poi("b", Some("parks"), Some(24.6)),
        ]);

        assert_eq!(conversion.stats.skipped, 1);
        let folder = conversion.document.folder("parks").unwrap();
        assert_eq!(folder.placemarks.len(), 1);
        assert_eq!(folder.placemarks[0].name, "B");
    }

    #[test]
    fn test_city_filter() {
        let mut other_city = poi("jed", Some("parks"), Some(21.5));
        other_city.record.city = Some("JED".to_string());
        let mut no_city = poi("x", Some("parks"), Some(24.6));
        no_city.record.city = None;

        let conversion = PoiConverter::new(&PoiConfig::default()).convert(vec![
            other_city.clone(),
            no_city.clone(),
        ]);
        assert_eq!(conversion.stats.filtered, 1);
        assert_eq!(conversion.stats.features, 1);

        let unfiltered = PoiConverter::new(&PoiConfig {
            filter_by_city: false,
            ..PoiConfig::default()
        })
        .convert(vec![other_city, no_city]);
        assert_eq!(unfiltered.stats.features, 2);
    }

    #[test]
    fn test_description_order() {
        let mut merged = poi("a", None, Some(24.6));
        merged.record.description = Some("A museum".to_string());
        merged.record.address = Some("King Saud Rd".to_string());
        merged.record.website = Some(String::new());
        merged.record.business_hours = Some(serde_json::json!(["Sun 9-5", "Mon 9-5"]));
        merged.shadow = LocaleShadow {
            description_ar: Some("متحف".to_string()),
            ..LocaleShadow::default()
        };

        assert_eq!(
            poi_description(&merged).unwrap(),
            "A museum\n\nمتحف\n\nAddress: King Saud Rd\n\nHours: Sun 9-5\nMon 9-5"
        );
    }

    #[test]
    fn test_extended_data() {
        let mut merged = poi("a", Some("museums"), Some(24.6));
        merged.record.id = Some(serde_json::json!(42));
        merged.record.website = Some(String::new());
        merged.record.images = Some(vec!["one.jpg".to_string(), "two.jpg".to_string()]);
        merged.shadow.name_ar = Some("أ".to_string());

        let conversion = PoiConverter::new(&PoiConfig::default()).convert(vec![merged]);
        let placemark = &conversion.document.folders()[0].placemarks[0];

        assert_eq!(placemark.data_value("id"), Some("42"));
        assert_eq!(placemark.data_value("website"), Some(""));
        assert_eq!(placemark.data_value("images"), Some(r#"["one.jpg","two.jpg"]"#));
        assert_eq!(placemark.data_value("name_ar"), Some("أ"));
        assert_eq!(placemark.data_value("rating"), None);
    }

    #[test]
    fn test_unnamed_fallback() {
        let mut merged = poi("a", None, Some(24.6));
        merged.record.name = None;
        let conversion = PoiConverter::new(&PoiConfig::default()).convert(vec![merged]);
        assert_eq!(conversion.document.folders()[0].placemarks[0].name, "Unnamed POI");
    }
}
