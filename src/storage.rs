// src/storage.rs
use crate::error::{StoreError, StoreResult};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// String key/value storage, the same surface a browser's local storage offers.
pub trait LocalStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

/// In-process storage for tests.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by one JSON object file: `{ "<key>": "<value>", ... }`.
///
/// The file is read on every access and rewritten whole on every write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_items(&self) -> BTreeMap<String, String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Storage file {:?} does not exist yet", self.path);
                return BTreeMap::new();
            }
            Err(e) => {
                log::warn!("Failed to read storage file {:?}: {}. Treating as empty.", self.path, e);
                return BTreeMap::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Storage file {:?} is not a JSON object of strings: {}. Treating as empty.", self.path, e);
                BTreeMap::new()
            }
        }
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.read_items().remove(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let mut items = self.read_items();
        items.insert(key.to_string(), value.to_string());

        let serialized = serde_json::to_string_pretty(&items).map_err(|e| {
            let msg = format!("Failed to serialize storage map: {}", e);
            log::error!("set_item: {}", msg);
            StoreError::Serialization(msg)
        })?;

        if let Some(parent_dir) = self.path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir).map_err(|e| {
                    log::error!("Failed to create storage directory {:?}: {}", parent_dir, e);
                    StoreError::Io(e)
                })?;
                log::info!("Created storage directory: {:?}", parent_dir);
            }
        }

        // Written beside the target and renamed over it, so a failed write
        // leaves the previous file intact.
        let tmp_path = self.tmp_path();
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)
            .map_err(|e| {
                log::error!("Failed to open {:?} for writing: {}", tmp_path, e);
                StoreError::Io(e)
            })?;
        if let Err(e) = file.write_all(serialized.as_bytes()).and_then(|()| file.sync_all()) {
            log::error!("Failed to write storage file {:?}: {}", tmp_path, e);
            drop(file);
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::Io(e));
        }
        drop(file);
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            log::error!("Failed to replace storage file {:?}: {}", self.path, e);
            let _ = fs::remove_file(&tmp_path);
            StoreError::Io(e)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_storage_get_set() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k"), None);
        storage.set_item("k", "v1").unwrap();
        storage.set_item("k", "v2").unwrap();
        assert_eq!(storage.get_item("k"), Some("v2".to_string()));
    }

    #[test]
    fn test_file_storage_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.get_item("passwords"), None);
    }

    #[test]
    fn test_file_storage_creates_parent_and_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("local_storage.json");
        let mut storage = FileStorage::new(&path);

        storage.set_item("theme", "dark").unwrap();
        storage.set_item("passwords", "[]").unwrap();
        assert!(path.exists());

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get_item("theme"), Some("dark".to_string()));
        assert_eq!(reopened.get_item("passwords"), Some("[]".to_string()));
    }

    #[test]
    fn test_file_storage_garbage_reads_empty_and_is_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        fs::write(&path, "not json at all").unwrap();

        let mut storage = FileStorage::new(&path);
        assert_eq!(storage.get_item("passwords"), None);

        storage.set_item("passwords", "[]").unwrap();
        assert_eq!(storage.get_item("passwords"), Some("[]".to_string()));
    }

    #[test]
    fn test_file_storage_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        let mut storage = FileStorage::new(&path);
        storage.set_item("passwords", "[]").unwrap();
        storage.set_item("passwords", "[1]").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("local_storage.json")]);
        assert_eq!(storage.get_item("passwords"), Some("[1]".to_string()));
    }

    #[test]
    fn test_file_storage_failed_write_keeps_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        let mut storage = FileStorage::new(&path);
        storage.set_item("passwords", "[1]").unwrap();

        // A directory in the temp file's place makes the write fail.
        fs::create_dir(dir.path().join("local_storage.json.tmp")).unwrap();
        assert!(matches!(storage.set_item("passwords", "[2]"), Err(StoreError::Io(_))));
        assert_eq!(storage.get_item("passwords"), Some("[1]".to_string()));
    }
}
