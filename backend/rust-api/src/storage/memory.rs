use std::collections::HashMap;
use std::sync::RwLock;

use super::{validate_key, KeyValueStorage, StorageError};

/// In-process storage, optionally bounded by a byte quota like a browser origin.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: RwLock::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Writes raw text, bypassing JSON. Handy to simulate foreign or corrupt data.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.write_guard().insert(key.to_string(), value.to_string());
    }

    pub fn used_bytes(&self) -> usize {
        self.read_guard()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, String>> {
        self.items.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, String>> {
        self.items
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.read_guard().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut items = self.write_guard();

        if let Some(quota) = self.quota_bytes {
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.write_guard().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("users").unwrap(), None);

        storage.set_item("users", "[]").unwrap();
        assert_eq!(storage.get_item("users").unwrap().as_deref(), Some("[]"));

        storage.remove_item("users").unwrap();
        assert_eq!(storage.get_item("users").unwrap(), None);
    }

    #[test]
    fn test_quota_counts_other_keys_but_not_the_replaced_value() {
        let storage = MemoryStorage::with_quota(20);
        storage.set_item("a", "0123456789").unwrap(); // 11 bytes
        storage.set_item("a", "012345678901234").unwrap(); // replaces, 16 bytes

        let err = storage.set_item("b", "0123").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 21, quota: 20, .. }));
        assert_eq!(storage.get_item("b").unwrap(), None);
    }

    #[test]
    fn test_invalid_key_rejected() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.set_item("a/b", "1"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
