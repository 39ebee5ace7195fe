use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::units::{UnitPreferences, UnitPreferencesPatch};

/// Key guest preferences are stored under.
pub const GUEST_PREFERENCES_KEY: &str = "divelog.unit-preferences";

/// Persistent key-value store local to one client.
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns an I/O error when the backing medium cannot be read.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an I/O error when the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Process-local store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryLocalStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileLocalStore {
    dir: PathBuf,
}

impl FileLocalStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl LocalStore for FileLocalStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(tmp, path)
    }
}

/// On-disk shape of guest preferences. Unknown or missing axes fall back to defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    depth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight: Option<String>,
}

pub(crate) fn decode_guest(raw: &str) -> serde_json::Result<UnitPreferences> {
    let stored: StoredPreferences = serde_json::from_str(raw)?;
    let partial = UnitPreferencesPatch {
        depth: stored.depth.and_then(|v| v.parse().ok()),
        temperature: stored.temperature.and_then(|v| v.parse().ok()),
        pressure: stored.pressure.and_then(|v| v.parse().ok()),
        weight: stored.weight.and_then(|v| v.parse().ok()),
    };
    Ok(UnitPreferences::from_partial(&partial))
}

pub(crate) fn encode_guest(prefs: &UnitPreferences) -> serde_json::Result<String> {
    serde_json::to_string(&StoredPreferences {
        depth: Some(prefs.depth.as_str().to_owned()),
        temperature: Some(prefs.temperature.as_str().to_owned()),
        pressure: Some(prefs.pressure.as_str().to_owned()),
        weight: Some(prefs.weight.as_str().to_owned()),
    })
}
