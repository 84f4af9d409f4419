//! # geokml Common Library
//!
//! Shared code for the geokml export tools:
//! - Error and result types
//! - Configuration loading (TOML file, environment, CLI overrides)
//! - Timestamp helpers used for output stamping and archive naming

pub mod config;
pub mod error;
pub mod time;

pub use config::ExportConfig;
pub use error::{Error, Result};
