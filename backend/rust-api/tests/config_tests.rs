use std::env;
use std::path::PathBuf;

use pole_digital_api::config::{Config, StorageBackend};

const VARS: [&str; 5] = [
    "DATA_DIR",
    "STORAGE_BACKEND",
    "STORAGE_QUOTA_BYTES",
    "SEED_FIXTURES",
    "BIND_ADDR",
];

fn clear_env() {
    env::set_var("APP_ENV", "config-tests");
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial_test::serial]
fn test_load_uses_defaults_without_env() {
    clear_env();

    let config = Config::load().unwrap();
    assert_eq!(config.storage_backend, StorageBackend::File);
    assert_eq!(config.data_dir, PathBuf::from("data"));
    assert!(config.storage_quota_bytes.is_none());
    assert!(config.seed_fixtures);
}

#[test]
#[serial_test::serial]
fn test_load_reads_plain_env_vars() {
    clear_env();
    env::set_var("DATA_DIR", "/tmp/pole-digital");
    env::set_var("STORAGE_BACKEND", "memory");
    env::set_var("STORAGE_QUOTA_BYTES", "4096");
    env::set_var("SEED_FIXTURES", "off");
    env::set_var("BIND_ADDR", "127.0.0.1:9000");

    let config = Config::load().unwrap();
    clear_env();

    assert_eq!(config.data_dir, PathBuf::from("/tmp/pole-digital"));
    assert_eq!(config.storage_backend, StorageBackend::Memory);
    assert_eq!(config.storage_quota_bytes, Some(4096));
    assert!(!config.seed_fixtures);
    assert_eq!(config.bind_addr, "127.0.0.1:9000");
}

#[test]
#[serial_test::serial]
fn test_load_rejects_bad_values() {
    clear_env();
    env::set_var("STORAGE_BACKEND", "sqlite");
    assert!(Config::load().is_err());

    clear_env();
    env::set_var("STORAGE_QUOTA_BYTES", "lots");
    assert!(Config::load().is_err());

    clear_env();
}
