//! Settings persistence.
//!
//! `SettingsStore` is the single update-and-persist entry point: every
//! mutation copies the current settings, applies the change, clamps, hands
//! the keys that changed to the backend and then swaps the new value in.
//! Nothing touches the disk on that path. The host calls `flush` once the
//! event has been handled (between frames, on suspend); a `JsonFileStore`
//! also flushes when dropped. Backend failures are logged and swallowed;
//! the in-memory value is always the truth.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::{Map, Value as JsonValue};

use crate::settings::{ControlsPatch, ControlsSettings};

/// Errors from a settings backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings file root is not a JSON object")]
    NotAnObject,
}

/// Flat string-keyed store of JSON primitives.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<JsonValue>;

    fn set(&mut self, key: &str, value: JsonValue) -> Result<(), StoreError>;

    /// Make previous `set` calls durable.
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, JsonValue>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, JsonValue> {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<JsonValue> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by one JSON object on disk.
///
/// Writes are buffered until `flush`, which replaces the file through a
/// temporary sibling so a crash never leaves half a file behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, JsonValue>,
    dirty: bool,
}

impl JsonFileStore {
    /// Open `path`, starting empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<JsonValue>(&text)? {
                JsonValue::Object(map) => map,
                _ => return Err(StoreError::NotAnObject),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("opened settings {} ({} keys)", path.display(), entries.len());
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    /// Open `path`, falling back to an empty store if the file is unreadable
    /// or corrupt. The next flush overwrites it.
    #[must_use]
    pub fn open_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(store) => store,
            Err(e) => {
                warn!("ignoring settings file {}: {e}", path.display());
                Self {
                    path,
                    entries: Map::new(),
                    dirty: false,
                }
            }
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for JsonFileStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("failed to write settings {}: {e}", self.path.display());
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<JsonValue> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)?,
            _ => {}
        }
        let text = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        self.dirty = false;
        Ok(())
    }
}

/// Current settings plus the backend they persist to.
#[derive(Debug)]
pub struct SettingsStore<S: KeyValueStore> {
    backend: S,
    settings: ControlsSettings,
    /// Keys were handed to the backend since the last flush.
    dirty: bool,
}

impl<S: KeyValueStore> SettingsStore<S> {
    /// Read settings from `backend`, falling back per field to defaults.
    pub fn load(backend: S) -> Self {
        let settings = ControlsSettings::from_lookup(|key| backend.get(key));
        Self {
            backend,
            settings,
            dirty: false,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ControlsSettings {
        &self.settings
    }

    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Whether a mutation is waiting for `flush`.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Make pending writes durable. Call it off the input path; failures
    /// are logged and the store stays dirty so a later flush retries.
    pub fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        match self.backend.flush() {
            Ok(()) => {
                self.dirty = false;
                debug!("settings flushed");
            }
            Err(e) => warn!("failed to flush settings: {e}"),
        }
    }

    /// Mutate a copy of the settings, clamp it, stage it for persistence
    /// and swap it in.
    pub fn update(&mut self, f: impl FnOnce(&mut ControlsSettings)) {
        let mut next = self.settings.clone();
        f(&mut next);
        self.replace(next);
    }

    /// Apply a partial update of the shared fields.
    pub fn apply(&mut self, patch: &ControlsPatch) {
        self.update(|s| patch.apply_to(s));
    }

    /// Replace the settings wholesale (e.g. committing an editor draft).
    pub fn replace(&mut self, next: ControlsSettings) {
        let next = next.sanitized();
        if next == self.settings {
            return;
        }
        self.persist(&next);
        self.settings = next;
    }

    fn persist(&mut self, next: &ControlsSettings) {
        let before = self.settings.to_entries();
        let after = next.to_entries();
        let mut written = 0usize;
        for (key, value) in after {
            if before.get(&key) == Some(&value) {
                continue;
            }
            if let Err(e) = self.backend.set(&key, value) {
                warn!("failed to persist {key}: {e}");
            }
            written += 1;
        }
        self.dirty |= written > 0;
        debug!("staged {written} settings keys");
    }
}
