//! Versioned output persistence
//!
//! Each artifact is identified by `(category, base_name)` and lives at
//! `{base_dir}/{category}/{base_name}.kml`. Saving over an existing file first
//! renames it to `{base_name}_{YYYYMMDD_HHMMSS}.kml`, stamped with that file's
//! own last-modified time (local). Two rotations within the same second share
//! an archive name and the later one wins.
//!
//! Assumes a single writer per artifact.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use geokml_common::time;

use crate::error::ExportResult;
use crate::kml::{to_kml_string, KmlDocument, UPDATED_AT_KEY};

pub const KML_EXTENSION: &str = "kml";

/// Category directories created up front
pub const STANDARD_CATEGORIES: &[&str] = &["pois", "districts", "metro"];

/// Writes documents under a base directory with archive-then-write rotation
#[derive(Debug, Clone)]
pub struct OutputManager {
    base_dir: PathBuf,
}

impl OutputManager {
    /// Create the manager and bootstrap the standard category directories
    pub fn new(base_dir: impl Into<PathBuf>) -> ExportResult<Self> {
        let base_dir = base_dir.into();
        for category in STANDARD_CATEGORIES {
            fs::create_dir_all(base_dir.join(category))?;
        }
        debug!(base_dir = %base_dir.display(), "Output directories ready");
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Stable path of the current version of an artifact
    pub fn current_path(&self, category: &str, base_name: &str) -> PathBuf {
        self.base_dir
            .join(category)
            .join(format!("{}.{}", base_name, KML_EXTENSION))
    }

    /// Archive any previous version, stamp `updated_at`, write the document
    pub fn save(
        &self,
        doc: &mut KmlDocument,
        category: &str,
        base_name: &str,
    ) -> ExportResult<PathBuf> {
        let dir = self.base_dir.join(category);
        fs::create_dir_all(&dir)?;

        let current = self.current_path(category, base_name);
        if current.exists() {
            let modified = fs::metadata(&current)?.modified()?;
            let archive = dir.join(format!(
                "{}_{}.{}",
                base_name,
                time::archive_stamp(modified),
                KML_EXTENSION
            ));
            if archive.exists() {
                fs::remove_file(&archive)?;
            }
            fs::rename(&current, &archive)?;
            info!(
                from = %current.display(),
                to = %archive.display(),
                "Archived previous version"
            );
        }

        doc.set_metadata(UPDATED_AT_KEY, time::updated_at_stamp(time::now()));
        let kml = to_kml_string(doc)?;
        fs::write(&current, kml)?;

        info!(
            path = %current.display(),
            placemarks = doc.placemark_count(),
            "Wrote KML document"
        );
        Ok(current)
    }

    /// Archived versions of an artifact, oldest stamp first
    pub fn archived_versions(&self, category: &str, base_name: &str) -> ExportResult<Vec<PathBuf>> {
        let dir = self.base_dir.join(category);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let prefix = format!("{}_", base_name);
        let mut archives = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(KML_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if stem.strip_prefix(&prefix).is_some_and(is_archive_stamp) {
                archives.push(path);
            }
        }
        archives.sort();
        Ok(archives)
    }
}

/// `YYYYMMDD_HHMMSS`
fn is_archive_stamp(stamp: &str) -> bool {
    let bytes = stamp.as_bytes();
    bytes.len() == 15
        && bytes[8] == b'_'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 8 || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_category_dirs() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("output");

        let manager = OutputManager::new(&base).unwrap();

        assert_eq!(manager.base_dir(), base.as_path());
        for category in STANDARD_CATEGORIES {
            assert!(base.join(category).is_dir());
        }
        // Idempotent
        assert!(OutputManager::new(&base).is_ok());
    }

    #[test]
    fn test_first_save_writes_without_archive() {
        let temp = TempDir::new().unwrap();
        let manager = OutputManager::new(temp.path()).unwrap();
        let mut doc = KmlDocument::new("first");

        let path = manager.save(&mut doc, "pois", "filtered_pois").unwrap();

        assert_eq!(path, temp.path().join("pois").join("filtered_pois.kml"));
        assert!(path.exists());
        assert!(doc.metadata_value(UPDATED_AT_KEY).is_some());
        assert!(manager
            .archived_versions("pois", "filtered_pois")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_save_into_new_category() {
        let temp = TempDir::new().unwrap();
        let manager = OutputManager::new(temp.path()).unwrap();

        let path = manager
            .save(&mut KmlDocument::default(), "streets", "riyadh_streets")
            .unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_archive_stamp_shape() {
        assert!(is_archive_stamp("20240105_093000"));
        assert!(!is_archive_stamp("20240105093000"));
        assert!(!is_archive_stamp("2024010_0930000"));
        assert!(!is_archive_stamp("backup"));
    }

    #[test]
    fn test_archived_versions_ignores_other_artifacts() {
        let temp = TempDir::new().unwrap();
        let manager = OutputManager::new(temp.path()).unwrap();
        let metro = temp.path().join("metro");
        fs::write(metro.join("riyadh_metro_lines_20240101_000000.kml"), "a").unwrap();
        fs::write(metro.join("riyadh_metro_lines_20230101_000000.kml"), "b").unwrap();
        fs::write(metro.join("riyadh_metro_stations_20240101_000000.kml"), "c").unwrap();
        fs::write(metro.join("riyadh_metro_lines_notes.txt"), "d").unwrap();

        let archives = manager
            .archived_versions("metro", "riyadh_metro_lines")
            .unwrap();

        assert_eq!(
            archives,
            vec![
                metro.join("riyadh_metro_lines_20230101_000000.kml"),
                metro.join("riyadh_metro_lines_20240101_000000.kml"),
            ]
        );
    }
}
