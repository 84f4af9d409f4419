//! Geometry normalization
//!
//! Turns raw coordinate structures (point x/y pairs, nested ring arrays, path
//! arrays) into `(longitude, latitude[, altitude])` coordinates in one target
//! frame. Nesting, counts and order are preserved exactly: nothing is dropped,
//! reordered or deduplicated, and an empty ring stays an empty ring.
//!
//! Axis order is never guessed. Each caller declares the [`AxisOrder`] of its
//! source; the normalizer swaps axes (if needed) before reprojecting.

use std::f64::consts::PI;
use thiserror::Error;

pub use geokml_common::config::AxisOrder;

/// WGS84 semi-major axis used by spherical (Web) Mercator
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Geometry errors
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Unsupported coordinate system: {0}")]
    UnsupportedCrs(String),

    #[error("Position has {0} values, need at least 2")]
    ShortPosition(usize),

    #[error("Non-finite coordinate value")]
    NonFinite,
}

/// A normalized position in the target frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
    pub alt: Option<f64>,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat, alt: None }
    }
}

/// Supported reference frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// WGS84 longitude/latitude in degrees
    Wgs84,
    /// Spherical Web Mercator in meters
    WebMercator,
}

impl CoordinateSystem {
    /// Parse an `EPSG:nnnn` code
    pub fn from_code(code: &str) -> Result<Self, GeometryError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "EPSG:4326" | "WGS84" | "CRS:84" => Ok(Self::Wgs84),
            "EPSG:3857" | "EPSG:900913" | "EPSG:102100" => Ok(Self::WebMercator),
            _ => Err(GeometryError::UnsupportedCrs(code.to_string())),
        }
    }
}

/// Projection between two reference frames
pub trait Projection: Send + Sync {
    /// Map one `(x, y)` pair from the source frame into the target frame
    fn project(&self, x: f64, y: f64) -> (f64, f64);
}

/// Reprojector for a fixed `(source, target)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reprojector {
    source: CoordinateSystem,
    target: CoordinateSystem,
}

impl Reprojector {
    pub fn new(source: CoordinateSystem, target: CoordinateSystem) -> Self {
        Self { source, target }
    }

    /// Build from configuration codes such as `"EPSG:3857"`
    pub fn from_codes(source: &str, target: &str) -> Result<Self, GeometryError> {
        Ok(Self::new(
            CoordinateSystem::from_code(source)?,
            CoordinateSystem::from_code(target)?,
        ))
    }

    /// No-op projection for inputs already in WGS84
    pub fn identity() -> Self {
        Self::new(CoordinateSystem::Wgs84, CoordinateSystem::Wgs84)
    }
}

impl Projection for Reprojector {
    fn project(&self, x: f64, y: f64) -> (f64, f64) {
        match (self.source, self.target) {
            (CoordinateSystem::WebMercator, CoordinateSystem::Wgs84) => {
                (mercator_x_to_lon(x), mercator_y_to_lat(y))
            }
            (CoordinateSystem::Wgs84, CoordinateSystem::WebMercator) => {
                (lon_to_mercator_x(x), lat_to_mercator_y(y))
            }
            _ => (x, y),
        }
    }
}

fn mercator_x_to_lon(x: f64) -> f64 {
    (x / EARTH_RADIUS_M).to_degrees()
}

fn mercator_y_to_lat(y: f64) -> f64 {
    (2.0 * (y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees()
}

fn lon_to_mercator_x(lon: f64) -> f64 {
    lon.to_radians() * EARTH_RADIUS_M
}

fn lat_to_mercator_y(lat: f64) -> f64 {
    (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS_M
}

/// Structural coordinate normalizer
pub struct GeometryNormalizer {
    projection: Box<dyn Projection>,
    axis_order: AxisOrder,
}

impl GeometryNormalizer {
    pub fn new(projection: impl Projection + 'static, axis_order: AxisOrder) -> Self {
        Self {
            projection: Box::new(projection),
            axis_order,
        }
    }

    /// Normalizer for WGS84 input in the given axis order
    pub fn unprojected(axis_order: AxisOrder) -> Self {
        Self::new(Reprojector::identity(), axis_order)
    }

    /// Normalize one `(first, second)` pair given in the declared axis order
    pub fn normalize_point(&self, first: f64, second: f64) -> Result<Coordinate, GeometryError> {
        if !first.is_finite() || !second.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        let (x, y) = match self.axis_order {
            AxisOrder::LonLat => (first, second),
            AxisOrder::LatLon => (second, first),
        };
        let (lon, lat) = self.projection.project(x, y);
        Ok(Coordinate::new(lon, lat))
    }

    /// Normalize a raw position array; a third value is kept as altitude
    pub fn normalize_position(&self, position: &[f64]) -> Result<Coordinate, GeometryError> {
        if position.len() < 2 {
            return Err(GeometryError::ShortPosition(position.len()));
        }
        let mut coord = self.normalize_point(position[0], position[1])?;
        coord.alt = position.get(2).copied().filter(|alt| alt.is_finite());
        Ok(coord)
    }

    pub fn normalize_ring(&self, ring: &[Vec<f64>]) -> Result<Vec<Coordinate>, GeometryError> {
        ring.iter()
            .map(|position| self.normalize_position(position))
            .collect()
    }

    pub fn normalize_rings(
        &self,
        rings: &[Vec<Vec<f64>>],
    ) -> Result<Vec<Vec<Coordinate>>, GeometryError> {
        rings.iter().map(|ring| self.normalize_ring(ring)).collect()
    }

    /// Paths have the same shape as rings; kept separate for readability at call sites
    pub fn normalize_paths(
        &self,
        paths: &[Vec<Vec<f64>>],
    ) -> Result<Vec<Vec<Coordinate>>, GeometryError> {
        self.normalize_rings(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_mercator_origin_maps_to_null_island() {
        let projector = Reprojector::from_codes("EPSG:3857", "EPSG:4326").unwrap();
        let (lon, lat) = projector.project(0.0, 0.0);
        assert!(close(lon, 0.0));
        assert!(close(lat, 0.0));
    }

    #[test]
    fn test_mercator_inverse_riyadh() {
        let forward = Reprojector::from_codes("EPSG:4326", "EPSG:3857").unwrap();
        let inverse = Reprojector::from_codes("EPSG:3857", "EPSG:4326").unwrap();

        let (x, y) = forward.project(46.6753, 24.7136);
        let (lon, lat) = inverse.project(x, y);

        assert!(close(lon, 46.6753));
        assert!(close(lat, 24.7136));
    }

    #[test]
    fn test_unsupported_crs() {
        let result = Reprojector::from_codes("EPSG:32638", "EPSG:4326");
        assert_eq!(
            result,
            Err(GeometryError::UnsupportedCrs("EPSG:32638".to_string()))
        );
    }

    #[test]
    fn test_axis_order_lat_lon_swaps() {
        let normalizer = GeometryNormalizer::unprojected(AxisOrder::LatLon);
        let coord = normalizer.normalize_point(24.7, 46.6).unwrap();
        assert_eq!(coord, Coordinate::new(46.6, 24.7));
    }

    #[test]
    fn test_position_keeps_altitude() {
        let normalizer = GeometryNormalizer::unprojected(AxisOrder::LonLat);
        let coord = normalizer.normalize_position(&[46.6, 24.7, 612.0]).unwrap();
        assert_eq!(coord.alt, Some(612.0));
    }

    #[test]
    fn test_short_position_is_error() {
        let normalizer = GeometryNormalizer::unprojected(AxisOrder::LonLat);
        assert_eq!(
            normalizer.normalize_position(&[46.6]),
            Err(GeometryError::ShortPosition(1))
        );
    }

    #[test]
    fn test_nan_is_error() {
        let normalizer = GeometryNormalizer::unprojected(AxisOrder::LonLat);
        assert_eq!(
            normalizer.normalize_point(f64::NAN, 1.0),
            Err(GeometryError::NonFinite)
        );
    }

    #[test]
    fn test_ring_counts_and_order_preserved() {
        let normalizer = GeometryNormalizer::unprojected(AxisOrder::LonLat);
        let rings = vec![
            vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![1.0, 2.0]],
            vec![],
            vec![vec![5.0, 6.0]],
        ];

        let normalized = normalizer.normalize_rings(&rings).unwrap();

        assert_eq!(normalized.len(), rings.len());
        for (out, input) in normalized.iter().zip(&rings) {
            assert_eq!(out.len(), input.len());
        }
        // Duplicate closing point survives
        assert_eq!(normalized[0][0], normalized[0][2]);
        assert!(normalized[1].is_empty());
        assert_eq!(normalized[2][0], Coordinate::new(5.0, 6.0));
    }

    #[test]
    fn test_paths_projected_pointwise() {
        let normalizer = GeometryNormalizer::new(
            Reprojector::from_codes("EPSG:3857", "EPSG:4326").unwrap(),
            AxisOrder::LonLat,
        );
        let paths = vec![vec![vec![0.0, 0.0], vec![111_319.490_793, 0.0]]];

        let normalized = normalizer.normalize_paths(&paths).unwrap();

        assert_eq!(normalized[0].len(), 2);
        assert!(close(normalized[0][1].lon, 1.0));
        assert!(close(normalized[0][1].lat, 0.0));
    }
}
