//! Directory-backed record store. Key `a/b` lives at `{root}/a/b.json`.

use crate::domain::error::TraderError;
use crate::ports::storage_port::StoragePort;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, TraderError> {
        let relative = Path::new(key);
        let escapes = key.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(TraderError::Storage {
                reason: format!("invalid key: {:?}", key),
            });
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl StoragePort for FileStore {
    fn put(&self, key: &str, body: &str) -> Result<(), TraderError> {
        let path = self.key_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| TraderError::Storage {
                reason: format!("failed to create {}: {}", parent.display(), e),
            })?;
        }
        fs::write(&path, body).map_err(|e| TraderError::Storage {
            reason: format!("failed to write {}: {}", path.display(), e),
        })
    }

    fn get(&self, key: &str) -> Result<Option<String>, TraderError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TraderError::Storage {
                reason: format!("failed to read {}: {}", path.display(), e),
            }),
        }
    }
}
