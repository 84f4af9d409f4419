//! GIS viewer web map → metro lines and stations documents
//!
//! Polylines sharing a `Name` become one multi-linestring placemark whose
//! parts are the individual paths, never concatenated.

use tracing::warn;

use geokml_common::config::{CoordinateSystemConfig, MetroConfig};

use super::{attributes_to_data, Conversion, ConversionStats};
use crate::geometry::{AxisOrder, GeometryError, GeometryNormalizer, Reprojector};
use crate::grouping::group_by_category;
use crate::kml::{Geometry, KmlDocument, Placemark, Style};
use crate::models::transit::{EsriGeometry, OperationalLayer};
use crate::models::{EsriFeature, GeometryKind, WebMap};

pub const LINE_COLOR: &str = "FF0000FF";
pub const LINE_WIDTH: f64 = 2.5;

/// A KML LineString needs two coordinates
const MIN_PATH_POINTS: usize = 2;

const UNKNOWN_LINE: &str = "Unknown Line";
const UNKNOWN_STATION: &str = "Unknown Station";

pub struct MetroConverter {
    normalizer: GeometryNormalizer,
    lines_layer_id: Option<String>,
    stations_layer_id: Option<String>,
}

impl MetroConverter {
    pub fn new(
        metro: &MetroConfig,
        coordinate_system: &CoordinateSystemConfig,
    ) -> Result<Self, GeometryError> {
        let projection =
            Reprojector::from_codes(&coordinate_system.source, &coordinate_system.target)?;
        Ok(Self {
            normalizer: GeometryNormalizer::new(projection, AxisOrder::LonLat),
            lines_layer_id: metro.lines_layer_id.clone(),
            stations_layer_id: metro.stations_layer_id.clone(),
        })
    }

    pub fn convert_lines(&self, map: &WebMap) -> Conversion {
        let mut stats = ConversionStats::default();
        let mut document = KmlDocument::new("Metro Lines");

        for layer in selected_layers(map, self.lines_layer_id.as_deref()) {
            let features = read_features(layer, GeometryKind::Polyline, &mut stats);
            if features.is_empty() {
                continue;
            }

            let named = features.into_iter().map(|feature| {
                let name = feature.name().unwrap_or_else(|| UNKNOWN_LINE.to_string());
                (name, feature)
            });
            let lines = group_by_category(named, |(name, _)| Some(name.as_str()));

            let folder_name = format!("{} - Lines", layer.label());
            for (line_name, members) in lines {
                let mut parts = Vec::new();
                for (_, feature) in &members {
                    let EsriGeometry::Polyline { paths } = &feature.geometry else {
                        continue;
                    };
                    match self.normalizer.normalize_paths(paths) {
                        Ok(normalized) => {
                            for path in normalized {
                                if path.len() < MIN_PATH_POINTS {
                                    warn!(line = %line_name, points = path.len(), "Line part too short skipped");
                                    stats.skipped += 1;
                                } else {
                                    parts.push(path);
                                }
                            }
                        }
                        Err(e) => {
                            warn!(line = %line_name, error = %e, "Line feature with bad path skipped");
                            stats.skipped += 1;
                        }
                    }
                }
                if parts.is_empty() {
                    continue;
                }

                let mut placemark = Placemark::new(&line_name, Geometry::MultiLineString(parts))
                    .with_description(Some(format!("Metro Line: {}", line_name)))
                    .with_style(Style::line(LINE_COLOR, LINE_WIDTH));
                if let Some((_, first)) = members.first() {
                    attributes_to_data(&mut placemark, &first.attributes);
                }
                document.folder_mut(&folder_name).push(placemark);
                stats.features += 1;
            }
        }

        tracing::info!("Metro lines: {}", stats.display_string());
        Conversion { document, stats }
    }

    pub fn convert_stations(&self, map: &WebMap) -> Conversion {
        let mut stats = ConversionStats::default();
        let mut document = KmlDocument::new("Metro Stations");

        for layer in selected_layers(map, self.stations_layer_id.as_deref()) {
            let folder_name = format!("{} - Points", layer.label());

            for feature in read_features(layer, GeometryKind::Point, &mut stats) {
                let EsriGeometry::Point { x, y } = feature.geometry else {
                    continue;
                };
                let coord = match self.normalizer.normalize_point(x, y) {
                    Ok(coord) => coord,
                    Err(e) => {
                        warn!(error = %e, "Station with bad coordinates skipped");
                        stats.skipped += 1;
                        continue;
                    }
                };

                let name = feature.name().unwrap_or_else(|| UNKNOWN_STATION.to_string());
                let description = feature
                    .attribute("Description")
                    .filter(|text| !text.trim().is_empty())
                    .unwrap_or_else(|| format!("Station Name: {}", name));

                let mut placemark = Placemark::new(name, Geometry::Point(coord))
                    .with_description(Some(description));
                attributes_to_data(&mut placemark, &feature.attributes);
                document.folder_mut(&folder_name).push(placemark);
                stats.features += 1;
            }
        }

        tracing::info!("Metro stations: {}", stats.display_string());
        Conversion { document, stats }
    }
}

/// Layers matching the id filter; an absent or empty filter selects all
fn selected_layers<'a>(
    map: &'a WebMap,
    layer_id: Option<&'a str>,
) -> impl Iterator<Item = &'a OperationalLayer> {
    let filter = layer_id.map(str::trim).filter(|id| !id.is_empty());
    map.operational_layers
        .iter()
        .filter(move |layer| filter.map_or(true, |id| layer.id.as_deref() == Some(id)))
}

fn read_features(
    layer: &OperationalLayer,
    kind: GeometryKind,
    stats: &mut ConversionStats,
) -> Vec<EsriFeature> {
    let mut features = Vec::new();
    for set in layer.feature_sets(kind) {
        for raw in &set.features {
            stats.input_records += 1;
            match EsriFeature::from_value(raw, kind) {
                Some(feature) => features.push(feature),
                None => stats.malformed += 1,
            }
        }
    }
    features
}
