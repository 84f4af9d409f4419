//! District boundaries → polygon placemarks in one folder

use tracing::warn;

use geokml_common::config::DistrictConfig;

use super::{Conversion, ConversionStats};
use crate::geometry::GeometryNormalizer;
use crate::kml::{join_parts, Geometry, KmlDocument, Placemark, Style};
use crate::models::district::RawPolygon;
use crate::models::{DistrictRecord, ParsedBatch};

pub const FILL_COLOR: &str = "CC0000FF";
pub const OUTLINE_COLOR: &str = "FF0000FF";
pub const OUTLINE_WIDTH: f64 = 2.0;

const UNNAMED: &str = "Unknown District";

pub struct DistrictConverter {
    config: DistrictConfig,
    normalizer: GeometryNormalizer,
}

impl DistrictConverter {
    pub fn new(config: &DistrictConfig) -> Self {
        Self {
            config: config.clone(),
            normalizer: GeometryNormalizer::unprojected(config.axis_order),
        }
    }

    pub fn convert(&self, batch: ParsedBatch<DistrictRecord>) -> Conversion {
        let mut stats = ConversionStats {
            input_records: batch.records.len(),
            malformed: batch.malformed,
            ..ConversionStats::default()
        };
        let mut document = KmlDocument::new(&self.config.folder_name);

        for record in batch.records {
            if !record.is_in(self.config.region_id, self.config.city_id) {
                stats.filtered += 1;
                continue;
            }
            if record.polygons.is_empty() {
                warn!(district_id = ?record.district_id, "District without boundaries skipped");
                stats.skipped += 1;
                continue;
            }

            for polygon in &record.polygons {
                match self.polygon_geometry(polygon) {
                    Some(geometry) => {
                        document
                            .folder_mut(&self.config.folder_name)
                            .push(district_placemark(&record, geometry));
                        stats.features += 1;
                    }
                    None => {
                        warn!(
                            district_id = ?record.district_id,
                            name = ?record.name_en,
                            "District polygon with unusable boundary skipped"
                        );
                        stats.skipped += 1;
                    }
                }
            }
        }

        tracing::info!("Districts: {}", stats.display_string());
        Conversion { document, stats }
    }

    /// First ring outer, the rest inner; `None` when any position is malformed
    fn polygon_geometry(&self, polygon: &RawPolygon) -> Option<Geometry> {
        let mut rings = self.normalizer.normalize_rings(polygon).ok()?.into_iter();
        let outer = rings.next().filter(|ring| !ring.is_empty())?;
        Some(Geometry::Polygon {
            outer,
            inner: rings.collect(),
        })
    }
}

fn district_placemark(record: &DistrictRecord, geometry: Geometry) -> Placemark {
    let name = record
        .name_en
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(UNNAMED);
    let labelled = |label: &str, value: Option<String>| {
        value
            .filter(|v| !v.trim().is_empty())
            .map(|v| format!("{}: {}", label, v))
    };

    let description = join_parts(
        [
            labelled("Arabic Name", record.name_ar.clone()),
            labelled("City ID", record.city_id.map(|id| id.to_string())),
            labelled("Region ID", record.region_id.map(|id| id.to_string())),
        ],
        " | ",
    );

    let mut placemark = Placemark::new(name, geometry)
        .with_description(description)
        .with_style(Style::polygon(FILL_COLOR, OUTLINE_COLOR, OUTLINE_WIDTH));
    placemark.data("district_id", record.district_id.map(|id| id.to_string()));
    placemark.data("name_en", record.name_en.clone());
    placemark.data("name_ar", record.name_ar.clone());
    placemark.data("city_id", record.city_id.map(|id| id.to_string()));
    placemark.data("region_id", record.region_id.map(|id| id.to_string()));
    placemark
}
