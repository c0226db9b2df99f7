use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = config::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(config::ConfigError::Message(format!(
                "unknown storage backend '{}', expected 'file' or 'memory'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data_dir: PathBuf,
    pub storage_backend: StorageBackend,
    /// Only honoured by the memory backend
    pub storage_quota_bytes: Option<usize>,
    pub seed_fixtures: bool,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            storage_backend: StorageBackend::File,
            storage_quota_bytes: None,
            seed_fixtures: true,
            bind_addr: "0.0.0.0:8081".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first, then the local one
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/<env>.toml, overridden by APP__SECTION__KEY variables
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let defaults = Config::default();

        let data_dir = settings
            .get_string("storage.data_dir")
            .or_else(|_| env::var("DATA_DIR"))
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let storage_backend = match settings
            .get_string("storage.backend")
            .or_else(|_| env::var("STORAGE_BACKEND"))
        {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.storage_backend,
        };

        let storage_quota_bytes = match settings
            .get_string("storage.quota_bytes")
            .or_else(|_| env::var("STORAGE_QUOTA_BYTES"))
        {
            Ok(raw) => Some(raw.trim().parse::<usize>().map_err(|e| {
                config::ConfigError::Message(format!("invalid storage quota '{}': {}", raw, e))
            })?),
            Err(_) => defaults.storage_quota_bytes,
        };

        let seed_fixtures = match settings
            .get_string("storage.seed_fixtures")
            .or_else(|_| env::var("SEED_FIXTURES"))
        {
            Ok(raw) => parse_flag(&raw)?,
            Err(_) => defaults.seed_fixtures,
        };

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or(defaults.bind_addr);

        Ok(Config {
            data_dir,
            storage_backend,
            storage_quota_bytes,
            seed_fixtures,
            bind_addr,
        })
    }

    /// In-memory storage without fixtures, for tests.
    pub fn in_memory() -> Self {
        Self {
            storage_backend: StorageBackend::Memory,
            seed_fixtures: false,
            ..Self::default()
        }
    }
}

fn parse_flag(raw: &str) -> Result<bool, config::ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(config::ConfigError::Message(format!(
            "invalid boolean '{}'",
            other
        ))),
    }
}
