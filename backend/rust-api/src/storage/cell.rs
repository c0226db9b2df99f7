use std::fmt;
use std::time::Instant;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::watch;

use super::SharedStorage;
use crate::metrics::{STORAGE_LOADS_TOTAL, STORAGE_WRITES_TOTAL, STORAGE_WRITE_DURATION_SECONDS};

/// How a cell obtained its initial value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The stored JSON was parsed.
    Restored,
    /// Nothing (or an empty string) was stored; the default is in use.
    Missing,
    /// The stored text was unreadable or not valid JSON for this type; the default is in use.
    Fallback { reason: String },
}

impl LoadOutcome {
    fn label(&self) -> &'static str {
        match self {
            LoadOutcome::Restored => "restored",
            LoadOutcome::Missing => "missing",
            LoadOutcome::Fallback { .. } => "fallback",
        }
    }
}

/// Result of mirroring a change into storage. A dropped write leaves the
/// in-memory value changed; only the stored copy is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Persisted,
    Dropped { reason: String },
}

impl WriteOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, WriteOutcome::Persisted)
    }

    fn label(&self) -> &'static str {
        match self {
            WriteOutcome::Persisted => "persisted",
            WriteOutcome::Dropped { .. } => "dropped",
        }
    }
}

/// Returned by the closure given to [`PersistedCell::modify`].
pub enum Update<R> {
    Changed(R),
    Unchanged(R),
}

/// One storage key mirrored by one in-memory value.
///
/// The stored JSON is read once, at [`PersistedCell::open`]. Every change made
/// through the cell is written back to the same key before the call returns.
/// Two cells on the same key do not see each other's writes until reopened;
/// the last writer wins.
///
/// Closures passed to `read`, `update` and `modify` run under the cell's lock
/// and must not call back into the same cell.
pub struct PersistedCell<T> {
    key: String,
    storage: SharedStorage,
    value: watch::Sender<T>,
    load_outcome: LoadOutcome,
}

impl<T> PersistedCell<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn open(storage: SharedStorage, key: impl Into<String>, default: T) -> Self {
        let key = key.into();

        let (initial, load_outcome) = match storage.get_item(&key) {
            Ok(Some(text)) if !text.is_empty() => match serde_json::from_str::<T>(&text) {
                Ok(value) => (value, LoadOutcome::Restored),
                Err(e) => {
                    tracing::warn!("Failed to parse stored JSON for key {}: {}", key, e);
                    (
                        default,
                        LoadOutcome::Fallback {
                            reason: e.to_string(),
                        },
                    )
                }
            },
            Ok(_) => (default, LoadOutcome::Missing),
            Err(e) => {
                tracing::warn!("Failed to read key {} from storage: {}", key, e);
                (
                    default,
                    LoadOutcome::Fallback {
                        reason: e.to_string(),
                    },
                )
            }
        };

        STORAGE_LOADS_TOTAL
            .with_label_values(&[key.as_str(), load_outcome.label()])
            .inc();

        let (value, _) = watch::channel(initial);

        Self {
            key,
            storage,
            value,
            load_outcome,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Replaces the value.
    pub fn set(&self, new_value: T) -> WriteOutcome {
        let mut outcome = None;
        self.value.send_modify(|current| {
            *current = new_value;
            outcome = Some(self.persist(current));
        });
        outcome.unwrap_or(WriteOutcome::Persisted)
    }

    /// Functional update: the new value is computed from the previous one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> WriteOutcome {
        let mut outcome = None;
        self.value.send_modify(|current| {
            *current = f(current);
            outcome = Some(self.persist(current));
        });
        outcome.unwrap_or(WriteOutcome::Persisted)
    }

    /// In-place update. Storage is written and subscribers are woken only
    /// when the closure reports [`Update::Changed`].
    pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> Update<R>) -> R {
        let mut result = None;
        self.value.send_if_modified(|current| match f(current) {
            Update::Changed(r) => {
                self.persist(current);
                result = Some(r);
                true
            }
            Update::Unchanged(r) => {
                result = Some(r);
                false
            }
        });
        match result {
            Some(r) => r,
            None => unreachable!("send_if_modified always runs its closure"),
        }
    }

    /// Observe every later change made through this cell.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.value.subscribe()
    }

    fn persist(&self, value: &T) -> WriteOutcome {
        let start = Instant::now();
        let outcome = match serde_json::to_string(value) {
            Ok(json) => match self.storage.set_item(&self.key, &json) {
                Ok(()) => WriteOutcome::Persisted,
                Err(e) => WriteOutcome::Dropped {
                    reason: e.to_string(),
                },
            },
            Err(e) => WriteOutcome::Dropped {
                reason: format!("serialization failed: {}", e),
            },
        };

        if let WriteOutcome::Dropped { reason } = &outcome {
            tracing::error!("Failed to persist key {}: {}", self.key, reason);
        }

        STORAGE_WRITES_TOTAL
            .with_label_values(&[self.key.as_str(), outcome.label()])
            .inc();
        STORAGE_WRITE_DURATION_SECONDS
            .with_label_values(&[self.key.as_str()])
            .observe(start.elapsed().as_secs_f64());

        outcome
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedCell")
            .field("key", &self.key)
            .field("value", &*self.value.borrow())
            .field("load_outcome", &self.load_outcome)
            .finish()
    }
}
