//! File-backed settings persistence.

use std::fs;

use vpad_core::{Orientation, Point};
use vpad_layout::{
    Cluster, ControlElement, ControlsPatch, ControlsSettings, JsonFileStore, KEY_PREFIX,
    KeyValueStore, SettingsStore, StoreError,
};

#[test]
fn settings_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut store = SettingsStore::load(JsonFileStore::open(&path).unwrap());
    store.apply(&ControlsPatch {
        button_size: Some(80.0),
        haptics: Some(false),
        turbo_on_frames: Some(4),
        ..ControlsPatch::default()
    });
    store.update(|s| {
        s.landscape.cluster_mut(Cluster::Face).offset = Point::new(-12.0, 6.5);
        if let Some(t) = s.portrait.element_mut(ControlElement::Rewind) {
            t.scale = 1.25;
        }
    });
    let saved = store.settings().clone();
    // Dropping the backend writes what was never flushed.
    drop(store);

    let reopened = SettingsStore::load(JsonFileStore::open(&path).unwrap());
    assert_eq!(reopened.settings(), &saved);
    assert_eq!(reopened.settings().button_size, 80.0);
}

#[test]
fn missing_file_and_parent_dirs_are_created_on_flush() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("vpad.json");

    let mut store = SettingsStore::load(JsonFileStore::open(&path).unwrap());
    assert_eq!(store.settings(), &ControlsSettings::default());
    assert!(!path.exists());

    store.apply(&ControlsPatch {
        opacity: Some(0.4),
        ..ControlsPatch::default()
    });
    // Mutations never touch the disk themselves.
    assert!(!path.exists());
    assert!(store.is_dirty());

    store.flush();
    assert!(!store.is_dirty());
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn corrupted_field_falls_back_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        format!(
            r#"{{
                "{KEY_PREFIX}button_size": "large",
                "{KEY_PREFIX}gap": 20.0,
                "{KEY_PREFIX}portrait.dpad.offset": [1.0, "x"],
                "{KEY_PREFIX}portrait.face.offset": [-30.0, 4.0]
            }}"#
        ),
    )
    .unwrap();

    let store = SettingsStore::load(JsonFileStore::open(&path).unwrap());
    let s = store.settings();
    assert_eq!(s.button_size, ControlsSettings::default().button_size);
    assert_eq!(s.gap, 20.0);
    assert_eq!(s.portrait.cluster(Cluster::Dpad).offset, Point::ZERO);
    assert_eq!(
        s.portrait.cluster(Cluster::Face).offset,
        Point::new(-30.0, 4.0)
    );
}

#[test]
fn unparsable_file_is_an_error_and_can_be_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        JsonFileStore::open(&path),
        Err(StoreError::Json(_))
    ));

    let mut store = SettingsStore::load(JsonFileStore::open_or_empty(&path));
    assert_eq!(store.settings(), &ControlsSettings::default());

    // The next flush replaces the broken file.
    store.apply(&ControlsPatch {
        reset_layout: Some(Orientation::Portrait),
        gap: Some(4.0),
        ..ControlsPatch::default()
    });
    store.flush();
    let backend = JsonFileStore::open(&path).unwrap();
    assert_eq!(
        backend.get(&format!("{KEY_PREFIX}gap")),
        Some(serde_json::json!(4.0))
    );
}

#[test]
fn non_object_root_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    assert!(matches!(
        JsonFileStore::open(&path),
        Err(StoreError::NotAnObject)
    ));
}
