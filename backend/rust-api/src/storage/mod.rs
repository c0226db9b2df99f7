//! String-keyed storage holding one JSON document per key, and the
//! [`PersistedCell`] that mirrors a typed value into one of those keys.

use std::fmt::Debug;
use std::sync::Arc;

pub mod cell;
pub mod file;
pub mod memory;

pub use cell::{LoadOutcome, PersistedCell, Update, WriteOutcome};
pub use file::FileStorage;
pub use memory::MemoryStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage key {0:?}: only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidKey(String),
    #[error("storage quota exceeded writing {key:?} ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("storage I/O error on {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// The browser storage API: every value is a string, every key is independent.
pub trait KeyValueStorage: Send + Sync + Debug {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

pub type SharedStorage = Arc<dyn KeyValueStorage>;

pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
