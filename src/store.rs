// src/store.rs
use crate::error::{StoreError, StoreResult};
use crate::models::Credential;
use crate::storage::LocalStorage;

pub const DEFAULT_STORAGE_KEY: &str = "passwords";

/// Owns the storage handle and is the only way credentials are read or written.
///
/// The whole list lives under a single key as a JSON array. Every save replaces
/// the previous value; there is no merging or partial update.
pub struct CredentialStore {
    storage: Box<dyn LocalStorage>,
    key: String,
}

impl CredentialStore {
    pub fn new(storage: Box<dyn LocalStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Loads the persisted list. An absent key or a payload that does not parse
    /// as a credential array yields an empty list, never an error.
    pub fn load(&self) -> Vec<Credential> {
        let Some(raw) = self.storage.get_item(&self.key) else {
            log::debug!("No value stored under '{}'", self.key);
            return Vec::new();
        };
        match serde_json::from_str::<Vec<Credential>>(&raw) {
            Ok(credentials) => {
                log::debug!("Loaded {} credentials from '{}'", credentials.len(), self.key);
                credentials
            }
            Err(e) => {
                log::warn!("Value under '{}' is not a credential list ({}). Treating as empty.", self.key, e);
                Vec::new()
            }
        }
    }

    pub fn save(&mut self, credentials: &[Credential]) -> StoreResult<()> {
        let serialized = serde_json::to_string(credentials).map_err(|e| {
            let msg = format!("Failed to serialize credentials: {}", e);
            log::error!("save: {}", msg);
            StoreError::Serialization(msg)
        })?;
        self.storage.set_item(&self.key, &serialized)?;
        log::info!("Saved {} credentials under '{}'", credentials.len(), self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use tempfile::tempdir;

    fn sample_credentials() -> Vec<Credential> {
        vec![
            Credential {
                id: 1,
                website: "github.com".to_string(),
                username: "octocat".to_string(),
                password: "Hunter2!".to_string(),
            },
            Credential {
                id: 2,
                website: "example.org".to_string(),
                username: "alice".to_string(),
                password: "correct horse".to_string(),
            },
        ]
    }

    fn memory_store_with(key: &str, raw: &str) -> CredentialStore {
        let mut storage = MemoryStorage::new();
        storage.set_item(key, raw).unwrap();
        CredentialStore::new(Box::new(storage), key)
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut store = CredentialStore::new(Box::new(MemoryStorage::new()), DEFAULT_STORAGE_KEY);
        let original = sample_credentials();
        store.save(&original).unwrap();
        assert_eq!(store.load(), original);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        let original = sample_credentials();

        let mut store = CredentialStore::new(Box::new(FileStorage::new(&path)), DEFAULT_STORAGE_KEY);
        store.save(&original).unwrap();

        let reopened = CredentialStore::new(Box::new(FileStorage::new(&path)), DEFAULT_STORAGE_KEY);
        assert_eq!(reopened.load(), original);
    }

    #[test]
    fn test_load_absent_key_is_empty() {
        let store = CredentialStore::new(Box::new(MemoryStorage::new()), DEFAULT_STORAGE_KEY);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_malformed_payload_is_empty() {
        assert!(memory_store_with(DEFAULT_STORAGE_KEY, "{oops").load().is_empty());
        assert!(memory_store_with(DEFAULT_STORAGE_KEY, "null").load().is_empty());
        // Structurally different payloads under the same key are not migrated.
        assert!(memory_store_with(DEFAULT_STORAGE_KEY, r#"{"entries":[]}"#).load().is_empty());
        assert!(memory_store_with(DEFAULT_STORAGE_KEY, r#"[{"id":1,"site":"x"}]"#).load().is_empty());
    }

    #[test]
    fn test_save_replaces_previous_list() {
        let mut store = CredentialStore::new(Box::new(MemoryStorage::new()), DEFAULT_STORAGE_KEY);
        store.save(&sample_credentials()).unwrap();
        let shorter = vec![sample_credentials().remove(1)];
        store.save(&shorter).unwrap();
        assert_eq!(store.load(), shorter);
    }

    #[test]
    fn test_key_is_respected() {
        let store = memory_store_with("other", r#"[{"id":7,"website":"w","username":"u","password":"p"}]"#);
        assert_eq!(store.load().len(), 1);
        let default_key = CredentialStore::new(Box::new(MemoryStorage::new()), DEFAULT_STORAGE_KEY);
        assert!(default_key.load().is_empty());
    }
}
