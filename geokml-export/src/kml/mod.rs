//! In-memory KML document
//!
//! Tree of document → folders → placemarks. Folder names are unique within a
//! document: [`KmlDocument::folder_mut`] returns the existing folder when the
//! name is already taken. Placemark names may repeat.

pub mod writer;

use crate::geometry::Coordinate;

pub use writer::to_kml_string;

/// Root-level metadata key stamped at save time
pub const UPDATED_AT_KEY: &str = "updated_at";

/// Ordered `(name, value)` side table rendered as `<ExtendedData>`
pub type ExtendedData = Vec<(String, String)>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KmlDocument {
    pub name: Option<String>,
    /// Document-level extended data
    pub metadata: ExtendedData,
    folders: Vec<Folder>,
}

impl KmlDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Get or create the folder called `name`
    pub fn folder_mut(&mut self, name: &str) -> &mut Folder {
        let index = match self.folders.iter().position(|folder| folder.name == name) {
            Some(index) => index,
            None => {
                self.folders.push(Folder::new(name));
                self.folders.len() - 1
            }
        };
        &mut self.folders[index]
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn folder(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|folder| folder.name == name)
    }

    /// Total placemarks across all folders
    pub fn placemark_count(&self) -> usize {
        self.folders.iter().map(|folder| folder.placemarks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.placemark_count() == 0
    }

    /// Insert or replace a document-level metadata entry
    pub fn set_metadata(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.metadata.iter_mut().find(|(name, _)| name == key) {
            Some(entry) => entry.1 = value,
            None => self.metadata.push((key.to_string(), value)),
        }
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub name: String,
    pub placemarks: Vec<Placemark>,
}

impl Folder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            placemarks: Vec::new(),
        }
    }

    pub fn push(&mut self, placemark: Placemark) {
        self.placemarks.push(placemark);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coordinate),
    Polygon {
        outer: Vec<Coordinate>,
        inner: Vec<Vec<Coordinate>>,
    },
    /// Independent line parts under one placemark
    MultiLineString(Vec<Vec<Coordinate>>),
}

/// Inline placemark style; colors are KML `aabbggrr` hex strings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub line_color: Option<String>,
    pub line_width: Option<f64>,
    pub poly_color: Option<String>,
    pub poly_outline: Option<bool>,
}

impl Style {
    pub fn polygon(fill: &str, outline: &str, width: f64) -> Self {
        Self {
            line_color: Some(outline.to_string()),
            line_width: Some(width),
            poly_color: Some(fill.to_string()),
            poly_outline: Some(true),
        }
    }

    pub fn line(color: &str, width: f64) -> Self {
        Self {
            line_color: Some(color.to_string()),
            line_width: Some(width),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    pub name: String,
    pub description: Option<String>,
    pub style: Option<Style>,
    pub geometry: Geometry,
    pub extended_data: ExtendedData,
}

impl Placemark {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            description: None,
            style: None,
            geometry,
            extended_data: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Add a side-table entry; `None` is skipped, an empty string is kept
    pub fn data(&mut self, key: &str, value: Option<String>) {
        if let Some(value) = value {
            self.extended_data.push((key.to_string(), value));
        }
    }

    pub fn data_value(&self, key: &str) -> Option<&str> {
        self.extended_data
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Join the non-empty parts with a blank line; `None` when nothing remains
pub fn join_description<I>(parts: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    join_parts(parts, "\n\n")
}

/// Join the non-empty parts with `separator`; `None` when nothing remains
pub fn join_parts<I>(parts: I, separator: &str) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let parts: Vec<String> = parts
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(separator))
    }
}
