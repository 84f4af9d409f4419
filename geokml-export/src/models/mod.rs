//! Typed input records
//!
//! Raw payloads are validated once here. Field-level problems are tolerated
//! (numbers given as strings, unknown keys, nulls); array elements that are
//! not objects are skipped and counted in [`ParsedBatch::malformed`].

pub mod district;
pub mod lenient;
pub mod poi;
pub mod transit;

pub use district::DistrictRecord;
pub use poi::PoiRecord;
pub use transit::{EsriFeature, GeometryKind, WebMap};

/// Records parsed from one payload plus the count of skipped elements
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBatch<T> {
    pub records: Vec<T>,
    /// Elements that were not objects or did not deserialize
    pub malformed: usize,
}

impl<T> ParsedBatch<T> {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            malformed: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
