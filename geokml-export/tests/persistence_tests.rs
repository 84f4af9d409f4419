//! Versioned output persistence tests
//!
//! Archive names come from the superseded file's own modification time, so the
//! tests pin that time explicitly instead of relying on the clock.

use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use geokml_common::time::archive_stamp;
use geokml_export::geometry::Coordinate;
use geokml_export::kml::{Geometry, KmlDocument, Placemark, UPDATED_AT_KEY};
use geokml_export::output::OutputManager;

fn document(placemark_name: &str) -> KmlDocument {
    let mut doc = KmlDocument::new("Test");
    doc.folder_mut("Folder").push(Placemark::new(
        placemark_name,
        Geometry::Point(Coordinate::new(46.7, 24.7)),
    ));
    doc
}

fn set_mtime(path: &std::path::Path, at: SystemTime) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(at).unwrap();
}

#[test]
fn test_two_saves_one_archive_one_current() {
    let temp = TempDir::new().unwrap();
    let manager = OutputManager::new(temp.path()).unwrap();

    let first = manager.save(&mut document("first"), "pois", "filtered_pois").unwrap();
    let pinned = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    set_mtime(&first, pinned);

    let second = manager.save(&mut document("second"), "pois", "filtered_pois").unwrap();

    assert_eq!(first, second);
    let archives = manager.archived_versions("pois", "filtered_pois").unwrap();
    assert_eq!(archives.len(), 1);
    assert_eq!(
        archives[0],
        temp.path()
            .join("pois")
            .join(format!("filtered_pois_{}.kml", archive_stamp(pinned)))
    );

    let current = fs::read_to_string(&second).unwrap();
    assert!(current.contains("<name>second</name>"));
    assert!(!current.contains("<name>first</name>"));
    let archived = fs::read_to_string(&archives[0]).unwrap();
    assert!(archived.contains("<name>first</name>"));

    let entries = fs::read_dir(temp.path().join("pois")).unwrap().count();
    assert_eq!(entries, 2);
}

#[test]
fn test_same_second_rotation_overwrites_archive() {
    let temp = TempDir::new().unwrap();
    let manager = OutputManager::new(temp.path()).unwrap();
    let pinned = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

    let path = manager.save(&mut document("one"), "metro", "lines").unwrap();
    set_mtime(&path, pinned);
    manager.save(&mut document("two"), "metro", "lines").unwrap();
    set_mtime(&path, pinned);
    manager.save(&mut document("three"), "metro", "lines").unwrap();

    let archives = manager.archived_versions("metro", "lines").unwrap();
    assert_eq!(archives.len(), 1);
    let archived = fs::read_to_string(&archives[0]).unwrap();
    assert!(archived.contains("<name>two</name>"));
    assert!(fs::read_to_string(&path).unwrap().contains("<name>three</name>"));
}

#[test]
fn test_updated_at_stamped_in_file() {
    let temp = TempDir::new().unwrap();
    let manager = OutputManager::new(temp.path()).unwrap();
    let mut doc = document("stamped");

    let path = manager.save(&mut doc, "districts", "riyadh_city_districts").unwrap();

    let stamp = doc.metadata_value(UPDATED_AT_KEY).unwrap().to_string();
    assert_eq!(stamp.len(), "2024-01-01T00:00:00Z".len());
    assert!(stamp.ends_with('Z'));
    let kml = fs::read_to_string(path).unwrap();
    assert!(kml.contains(&format!("<value>{}</value>", stamp)));
}
