//! # geokml-export
//!
//! Converts district boundaries, bilingual points-of-interest feeds and GIS
//! viewer metro layers into KML documents organized in folders.
//!
//! Data flow: raw payload → typed records ([`models`]) → coordinate
//! normalization ([`geometry`]) → bilingual merge ([`merge`], POIs only) →
//! grouping ([`grouping`]) → document assembly ([`convert`], [`kml`]) →
//! versioned persistence ([`output`]).

pub mod convert;
pub mod error;
pub mod geometry;
pub mod grouping;
pub mod kml;
pub mod merge;
pub mod models;
pub mod output;
pub mod pipelines;
pub mod sources;

pub use error::{ExportError, ExportResult};
pub use pipelines::{PipelineKind, PipelineOutcome, PipelineSummary};
