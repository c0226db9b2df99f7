use std::sync::Arc;

use anyhow::Context;

use crate::config::{Config, StorageBackend};
use crate::storage::{FileStorage, MemoryStorage, SharedStorage};

pub mod contact_service;
pub mod error;
pub mod fixtures;
pub mod leaderboard_service;
pub mod notification_service;
pub mod portal_store;
pub mod project_service;
pub mod quiz_service;
pub mod task_service;
pub mod team_service;

pub use error::PortalError;
pub use portal_store::PortalStore;

pub struct AppState {
    pub config: Config,
    pub store: Arc<PortalStore>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let storage: SharedStorage = match config.storage_backend {
            StorageBackend::File => {
                let storage = FileStorage::open(&config.data_dir).with_context(|| {
                    format!("Failed to open data directory {}", config.data_dir.display())
                })?;
                tracing::info!("Using file storage in {}", config.data_dir.display());
                Arc::new(storage)
            }
            StorageBackend::Memory => {
                tracing::info!(
                    "Using in-memory storage (quota: {:?} bytes)",
                    config.storage_quota_bytes
                );
                match config.storage_quota_bytes {
                    Some(quota) => Arc::new(MemoryStorage::with_quota(quota)),
                    None => Arc::new(MemoryStorage::new()),
                }
            }
        };

        Ok(Self::with_storage(config, storage))
    }

    pub fn with_storage(config: Config, storage: SharedStorage) -> Self {
        let store = PortalStore::open(storage);
        if config.seed_fixtures {
            store.seed_fixtures();
        }

        Self {
            config,
            store: Arc::new(store),
        }
    }
}
