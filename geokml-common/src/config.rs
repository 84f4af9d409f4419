//! Configuration loading and output folder resolution
//!
//! All settings live in one explicit [`ExportConfig`] value that is built once
//! in `main` and passed into every component constructor.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (`--output-dir`, `--city`, ...)
//! 2. Environment variables (`GEOKML_OUTPUT_DIR`, `GEOKML_CONFIG`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the output directory
pub const OUTPUT_DIR_ENV: &str = "GEOKML_OUTPUT_DIR";

/// Environment variable pointing at a TOML config file
pub const CONFIG_PATH_ENV: &str = "GEOKML_CONFIG";

const DEFAULT_OUTPUT_DIR: &str = "output";

/// Complete configuration for one export run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Base directory for written KML files (category folders live below it)
    pub output_dir: PathBuf,
    pub logging: LoggingConfig,
    pub endpoints: EndpointConfig,
    pub coordinate_system: CoordinateSystemConfig,
    pub districts: DistrictConfig,
    pub pois: PoiConfig,
    pub metro: MetroConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            logging: LoggingConfig::default(),
            endpoints: EndpointConfig::default(),
            coordinate_system: CoordinateSystemConfig::default(),
            districts: DistrictConfig::default(),
            pois: PoiConfig::default(),
            metro: MetroConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Remote endpoints and HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Points-of-interest feed
    pub visit_saudi_api: String,
    /// Base URL for ArcGIS content items (`{base}/{item_id}/data`)
    pub arcgis_api_base: String,
    /// District boundaries JSON document
    pub districts_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            visit_saudi_api: "https://map.visitsaudi.com/api/pointsOfInterest".to_string(),
            arcgis_api_base: "https://www.arcgis.com/sharing/rest/content/items".to_string(),
            districts_url: "https://raw.githubusercontent.com/homaily/Saudi-Arabia-Regions-Cities-and-Districts/refs/heads/master/json/districts.json".to_string(),
            user_agent: concat!("geokml/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Source and target reference frames for projected inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateSystemConfig {
    pub source: String,
    pub target: String,
}

impl Default for CoordinateSystemConfig {
    fn default() -> Self {
        Self {
            source: "EPSG:3857".to_string(),
            target: "EPSG:4326".to_string(),
        }
    }
}

/// Order of the two horizontal axes in a raw coordinate pair
///
/// Sources disagree on this and nothing in the data tells them apart, so every
/// source declares it explicitly. Getting it wrong mirrors the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrder {
    /// `[longitude, latitude]` / `[x, y]`
    #[default]
    LonLat,
    /// `[latitude, longitude]` / `[y, x]`
    LatLon,
}

/// District boundary export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistrictConfig {
    pub region_id: i64,
    pub city_id: i64,
    pub folder_name: String,
    pub base_name: String,
    /// Axis order of the positions in `boundaries`
    pub axis_order: AxisOrder,
}

impl Default for DistrictConfig {
    fn default() -> Self {
        Self {
            region_id: 1,
            city_id: 3,
            folder_name: "Riyadh City Districts".to_string(),
            base_name: "riyadh_city_districts".to_string(),
            axis_order: AxisOrder::LonLat,
        }
    }
}

/// Points-of-interest export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiConfig {
    /// City code sent as the `cities` query parameter
    pub city: String,
    /// Value of the `type` query parameter
    pub poi_types: String,
    pub primary_locale: String,
    pub secondary_locale: String,
    /// Drop records whose `slugCity` names a different city
    pub filter_by_city: bool,
    pub base_name: String,
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self {
            city: "RUH".to_string(),
            poi_types: "city,experiences".to_string(),
            primary_locale: "en".to_string(),
            secondary_locale: "ar".to_string(),
            filter_by_city: true,
            base_name: "filtered_pois".to_string(),
        }
    }
}

/// Metro (GIS viewer) export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetroConfig {
    /// Viewer URL carrying an `appid` query parameter
    pub viewer_url: Option<String>,
    /// Web map item id; skips the app id lookup when set
    pub webmap_id: Option<String>,
    /// Only convert polylines from this operational layer (empty: all layers)
    pub lines_layer_id: Option<String>,
    /// Only convert points from this operational layer (empty: all layers)
    pub stations_layer_id: Option<String>,
    pub lines_base_name: String,
    pub stations_base_name: String,
}

impl Default for MetroConfig {
    fn default() -> Self {
        Self {
            viewer_url: None,
            webmap_id: None,
            lines_layer_id: Some("metrolines_110".to_string()),
            stations_layer_id: Some("stations_4748".to_string()),
            lines_base_name: "riyadh_metro_lines".to_string(),
            stations_base_name: "riyadh_metro_stations".to_string(),
        }
    }
}

impl MetroConfig {
    /// Whether a web map source (viewer URL or web map id) is set
    pub fn is_configured(&self) -> bool {
        let set = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
        set(&self.viewer_url) || set(&self.webmap_id)
    }
}

impl ExportConfig {
    /// Parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration, falling back to defaults when no file exists
    ///
    /// An explicitly requested file must exist. Files found through
    /// `GEOKML_CONFIG` or the platform config directory are optional; a missing
    /// file logs a warning and yields defaults. A file that exists but does
    /// not parse is always an error.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::ConfigNotFound(path.to_path_buf()));
            }
            info!("Loading configuration from {}", path.display());
            return Self::load(path);
        }

        let candidate = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(default_config_path);

        match candidate {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                warn!("No config directory available, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Platform config file location: `<config_dir>/geokml/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("geokml").join("config.toml"))
}

/// Output directory resolution:
/// 1. Command-line argument (highest priority)
/// 2. `GEOKML_OUTPUT_DIR` environment variable
/// 3. `output_dir` from the loaded configuration (TOML or compiled default)
pub fn resolve_output_dir(cli_arg: Option<&Path>, config: &ExportConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(OUTPUT_DIR_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    config.output_dir.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_riyadh_export() {
        let config = ExportConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.districts.region_id, 1);
        assert_eq!(config.districts.city_id, 3);
        assert_eq!(config.pois.city, "RUH");
        assert_eq!(config.coordinate_system.source, "EPSG:3857");
        assert_eq!(config.coordinate_system.target, "EPSG:4326");
        assert!(config.metro.viewer_url.is_none());
        assert_eq!(config.metro.stations_layer_id.as_deref(), Some("stations_4748"));
        assert!(!config.metro.is_configured());
    }

    #[test]
    fn test_metro_configured_by_webmap_id() {
        let metro = MetroConfig {
            webmap_id: Some("9f2c".to_string()),
            ..MetroConfig::default()
        };
        assert!(metro.is_configured());

        let blank = MetroConfig {
            viewer_url: Some("  ".to_string()),
            ..MetroConfig::default()
        };
        assert!(!blank.is_configured());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ExportConfig = toml::from_str(
            r#"
            output_dir = "/tmp/kml"

            [districts]
            city_id = 7
            axis_order = "lat_lon"
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("/tmp/kml"));
        assert_eq!(config.districts.city_id, 7);
        assert_eq!(config.districts.region_id, 1);
        assert_eq!(config.districts.axis_order, AxisOrder::LatLon);
        assert_eq!(config.pois, PoiConfig::default());
    }

    #[test]
    fn test_unknown_axis_order_rejected() {
        let result: std::result::Result<ExportConfig, _> = toml::from_str(
            r#"
            [districts]
            axis_order = "north_east"
            "#,
        );
        assert!(result.is_err());
    }
}
