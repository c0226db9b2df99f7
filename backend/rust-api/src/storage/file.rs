use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::{validate_key, KeyValueStorage, StorageError};

/// Directory-backed storage: `<dir>/<key>.json` per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        tracing::debug!("File storage opened at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Unique per write: several stores may share one directory
        let tmp = self
            .dir
            .join(format!(".{key}.{}.tmp", Uuid::new_v4().simple()));
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };

        if let Err(e) = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path)) {
            fs::remove_file(&tmp).ok();
            return Err(io_err(e));
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("pole-digital-fs-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = scratch_dir();
        {
            let storage = FileStorage::open(&dir).unwrap();
            storage.set_item("tasks", r#"[{"id":"task-1"}]"#).unwrap();
        }

        let reopened = FileStorage::open(&dir).unwrap();
        assert_eq!(
            reopened.get_item("tasks").unwrap().as_deref(),
            Some(r#"[{"id":"task-1"}]"#)
        );
        assert!(dir.join("tasks.json").exists());
        assert!(leftover_temp_files(&dir).is_empty());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_key_and_remove() {
        let dir = scratch_dir();
        let storage = FileStorage::open(&dir).unwrap();

        assert_eq!(storage.get_item("currentUser").unwrap(), None);
        storage.remove_item("currentUser").unwrap();

        storage.set_item("currentUser", "null").unwrap();
        storage.remove_item("currentUser").unwrap();
        assert_eq!(storage.get_item("currentUser").unwrap(), None);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = scratch_dir();
        let storage = FileStorage::open(&dir).unwrap();
        assert!(matches!(
            storage.get_item("../users"),
            Err(StorageError::InvalidKey(_))
        ));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_concurrent_writers_on_one_key() {
        let dir = scratch_dir();
        let storage = FileStorage::open(&dir).unwrap();
        let values = ["[1,2,3]", r#"["a","b"]"#];

        std::thread::scope(|scope| {
            for value in values {
                let storage = storage.clone();
                scope.spawn(move || {
                    for _ in 0..50 {
                        storage.set_item("quizzes", value).unwrap();
                    }
                });
            }
        });

        let stored = storage.get_item("quizzes").unwrap().unwrap();
        assert!(values.contains(&stored.as_str()));
        assert!(leftover_temp_files(&dir).is_empty());

        fs::remove_dir_all(dir).ok();
    }

    fn leftover_temp_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "tmp"))
            .collect()
    }
}
