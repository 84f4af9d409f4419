//! GIS viewer (ArcGIS web map) payload
//!
//! Only the parts the metro export reads are modelled. Individual features are
//! kept as raw JSON until [`EsriFeature::from_value`] so one bad feature does
//! not make the whole layer unreadable.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::lenient::{rings_from_value, value_as_f64, value_as_text};

pub const POINT_GEOMETRY: &str = "esriGeometryPoint";
pub const POLYLINE_GEOMETRY: &str = "esriGeometryPolyline";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebMap {
    #[serde(default, rename = "operationalLayers")]
    pub operational_layers: Vec<OperationalLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationalLayer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "featureCollection")]
    pub feature_collection: Option<FeatureCollection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub layers: Vec<FeatureLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureLayer {
    #[serde(default, rename = "featureSet")]
    pub feature_set: Option<FeatureSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureSet {
    #[serde(default, rename = "geometryType")]
    pub geometry_type: Option<String>,
    #[serde(default)]
    pub features: Vec<Value>,
}

/// Geometry family of a feature set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    Polyline,
}

impl GeometryKind {
    fn from_esri(name: &str) -> Option<Self> {
        match name {
            POINT_GEOMETRY => Some(Self::Point),
            POLYLINE_GEOMETRY => Some(Self::Polyline),
            _ => None,
        }
    }
}

impl FeatureSet {
    pub fn kind(&self) -> Option<GeometryKind> {
        self.geometry_type.as_deref().and_then(GeometryKind::from_esri)
    }
}

impl OperationalLayer {
    /// Folder label for this layer: title, else id, else a generic name
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("Layer")
    }

    /// Feature sets of the requested geometry family
    pub fn feature_sets(&self, kind: GeometryKind) -> impl Iterator<Item = &FeatureSet> {
        self.feature_collection
            .iter()
            .flat_map(|collection| collection.layers.iter())
            .filter_map(|layer| layer.feature_set.as_ref())
            .filter(move |set| set.kind() == Some(kind))
    }
}

/// Raw feature geometry
#[derive(Debug, Clone, PartialEq)]
pub enum EsriGeometry {
    Point { x: f64, y: f64 },
    Polyline { paths: Vec<Vec<Vec<f64>>> },
}

/// A single feature with its attribute block
#[derive(Debug, Clone, PartialEq)]
pub struct EsriFeature {
    pub geometry: EsriGeometry,
    pub attributes: Map<String, Value>,
}

impl EsriFeature {
    /// Read a feature of the given kind; `None` when its geometry is unusable
    pub fn from_value(value: &Value, kind: GeometryKind) -> Option<Self> {
        let object = value.as_object()?;
        let geometry = object.get("geometry")?.as_object()?;
        let geometry = match kind {
            GeometryKind::Point => EsriGeometry::Point {
                x: geometry.get("x").and_then(value_as_f64)?,
                y: geometry.get("y").and_then(value_as_f64)?,
            },
            GeometryKind::Polyline => EsriGeometry::Polyline {
                paths: geometry.get("paths").and_then(rings_from_value)?,
            },
        };
        let attributes = object
            .get("attributes")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Some(Self {
            geometry,
            attributes,
        })
    }

    /// Attribute rendered as text; `None` when absent or null
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.attributes.get(key).and_then(value_as_text)
    }

    /// Non-blank `Name` attribute
    pub fn name(&self) -> Option<String> {
        self.attribute("Name").filter(|name| !name.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "operationalLayers": [{
                "id": "metrolines_110",
                "title": "Metro Lines",
                "featureCollection": {"layers": [
                    {"featureSet": {"geometryType": "esriGeometryPolyline", "features": [
                        {"geometry": {"paths": [[[0, 0], [10, 10]]]}, "attributes": {"Name": "Blue Line"}}
                    ]}},
                    {"featureSet": {"geometryType": "esriGeometryPoint", "features": [
                        {"geometry": {"x": 1, "y": 2}, "attributes": {"Name": "Olaya"}}
                    ]}}
                ]}
            }, {
                "id": "basemap"
            }]
        })
    }

    #[test]
    fn test_feature_sets_filtered_by_kind() {
        let map: WebMap = serde_json::from_value(sample()).unwrap();
        let layer = &map.operational_layers[0];

        assert_eq!(layer.label(), "Metro Lines");
        assert_eq!(layer.feature_sets(GeometryKind::Polyline).count(), 1);
        assert_eq!(layer.feature_sets(GeometryKind::Point).count(), 1);
        assert_eq!(map.operational_layers[1].feature_sets(GeometryKind::Point).count(), 0);
        assert_eq!(map.operational_layers[1].label(), "basemap");
    }

    #[test]
    fn test_point_feature() {
        let feature = EsriFeature::from_value(
            &json!({"geometry": {"x": 5123.5, "y": "2821.25"}, "attributes": {"Name": "KAFD", "Code": 7}}),
            GeometryKind::Point,
        )
        .unwrap();

        assert_eq!(feature.geometry, EsriGeometry::Point { x: 5123.5, y: 2821.25 });
        assert_eq!(feature.name().as_deref(), Some("KAFD"));
        assert_eq!(feature.attribute("Code").as_deref(), Some("7"));
    }

    #[test]
    fn test_feature_without_geometry_rejected() {
        assert!(EsriFeature::from_value(&json!({"attributes": {}}), GeometryKind::Point).is_none());
        assert!(EsriFeature::from_value(&json!({"geometry": {"x": 1}}), GeometryKind::Point).is_none());
        assert!(EsriFeature::from_value(&json!("feature"), GeometryKind::Polyline).is_none());
    }
}
