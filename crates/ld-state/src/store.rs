//! Key/value stores
//!
//! Values are JSON text. [`JsonFileStore`] keeps one `<key>.json` file per
//! key; [`MemoryStore`] is a shared in-process map for tests and embedding.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{StateError, StateResult};

/// Minimal persistence contract
pub trait KeyValueStore {
    /// Raw JSON text for `key`, if present
    fn get_raw(&self, key: &str) -> StateResult<Option<String>>;

    fn set_raw(&self, key: &str, value: &str) -> StateResult<()>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> StateResult<()>;

    fn get<T: DeserializeOwned>(&self, key: &str) -> StateResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set<T: Serialize>(&self, key: &str, value: &T) -> StateResult<()>
    where
        Self: Sized,
    {
        self.set_raw(key, &serde_json::to_string(value)?)
    }
}

impl<S: KeyValueStore> KeyValueStore for &S {
    fn get_raw(&self, key: &str) -> StateResult<Option<String>> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> StateResult<()> {
        (**self).set_raw(key, value)
    }

    fn remove(&self, key: &str) -> StateResult<()> {
        (**self).remove(key)
    }
}

/// Keys double as file names, so keep them to a safe alphabet
fn check_key(key: &str) -> StateResult<()> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(StateError::InvalidKey(key.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FILE STORE
// ═══════════════════════════════════════════════════════════════════════════

/// One JSON file per key under a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory
    pub fn open_default() -> StateResult<Self> {
        Self::default_dir().map(Self::new).ok_or(StateError::NoDataDir)
    }

    /// Platform data directory for the application
    pub fn default_dir() -> Option<PathBuf> {
        if cfg!(target_os = "macos") {
            dirs::home_dir().map(|h| h.join("Library/Application Support/Lucky Sphere"))
        } else if cfg!(target_os = "windows") {
            dirs::data_local_dir().map(|d| d.join("Lucky Sphere"))
        } else {
            dirs::data_dir().map(|d| d.join("lucky-sphere"))
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StateResult<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_raw(&self, key: &str) -> StateResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_raw(&self, key: &str, value: &str) -> StateResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write then rename, so a crash never leaves half a file behind
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        log::debug!("Stored {} ({} bytes)", path.display(), value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> StateResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MEMORY STORE
// ═══════════════════════════════════════════════════════════════════════════

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> StateResult<Option<String>> {
        check_key(key)?;
        Ok(self.values.read().get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> StateResult<()> {
        check_key(key)?;
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StateResult<()> {
        check_key(key)?;
        self.values.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get::<bool>("lottery_audio_muted").unwrap(), None);

        store.set("lottery_audio_muted", &true).unwrap();
        assert_eq!(store.get::<bool>("lottery_audio_muted").unwrap(), Some(true));
        assert_eq!(store.len(), 1);

        store.remove("lottery_audio_muted").unwrap();
        store.remove("lottery_audio_muted").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));

        assert_eq!(store.get_raw("LOTTERY_HISTORY_V2").unwrap(), None);
        store.set("LOTTERY_HISTORY_V2", &vec![1, 2, 3]).unwrap();
        assert!(dir.path().join("nested/LOTTERY_HISTORY_V2.json").exists());
        assert_eq!(
            store.get::<Vec<u32>>("LOTTERY_HISTORY_V2").unwrap(),
            Some(vec![1, 2, 3])
        );

        store.remove("LOTTERY_HISTORY_V2").unwrap();
        assert_eq!(store.get_raw("LOTTERY_HISTORY_V2").unwrap(), None);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        for key in ["", "../escape", "a/b", "dot.key"] {
            assert!(matches!(store.set_raw(key, "1"), Err(StateError::InvalidKey(_))));
        }
        assert!(MemoryStore::new().get_raw("a b").is_err());
    }

    #[test]
    fn test_corrupt_value_is_an_error() {
        let store = MemoryStore::new();
        store.set_raw("lottery_audio_volume", "not json").unwrap();
        assert!(matches!(
            store.get::<f64>("lottery_audio_volume"),
            Err(StateError::Serialize(_))
        ));
    }
}
