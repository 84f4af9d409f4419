//! Error types for geokml-export
//!
//! Data-shape problems inside a batch (missing slug, missing coordinates,
//! non-object records) are not errors: they are counted and reported. The
//! types here cover failures that abort a whole pipeline.

use thiserror::Error;

use crate::geometry::GeometryError;
use crate::sources::arcgis::ResolveError;
use crate::sources::FetchError;

/// Export error type
#[derive(Debug, Error)]
pub enum ExportError {
    /// Remote source could not be fetched
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// GIS viewer resolution chain failed
    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    /// Coordinate handling failed
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Payload does not have the expected top-level shape
    #[error("Unexpected payload shape: {0}")]
    Shape(String),

    /// KML serialization error
    #[error("KML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
