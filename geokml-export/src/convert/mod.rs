//! Document assembly
//!
//! Converters turn typed records into [`KmlDocument`]s. They never fail for
//! data-shape problems: unusable records are skipped and counted in
//! [`ConversionStats`]. Empty input gives an empty document.

pub mod districts;
pub mod metro;
pub mod pois;

pub use districts::DistrictConverter;
pub use metro::MetroConverter;
pub use pois::PoiConverter;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::kml::{KmlDocument, Placemark};
use crate::models::lenient::value_as_text;

/// Per-document conversion counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Records offered to the converter
    pub input_records: usize,
    /// Placemarks written
    pub features: usize,
    /// Records without usable geometry
    pub skipped: usize,
    /// Records dropped by a configured filter
    pub filtered: usize,
    /// Payload elements that could not be read at all
    pub malformed: usize,
}

impl ConversionStats {
    pub fn display_string(&self) -> String {
        format!(
            "{} features from {} records ({} skipped, {} filtered, {} malformed)",
            self.features, self.input_records, self.skipped, self.filtered, self.malformed
        )
    }
}

/// One converted document and its counters
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub document: KmlDocument,
    pub stats: ConversionStats,
}

/// Copy an attribute block into a placemark's extended data (nulls are left out)
pub(crate) fn attributes_to_data(placemark: &mut Placemark, attributes: &Map<String, Value>) {
    for (key, value) in attributes {
        placemark.data(key, value_as_text(value));
    }
}
