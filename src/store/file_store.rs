use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::trace;

use super::{KeyValueStore, StoreError};

/// Stores each key as `<key>.json` inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => {
                trace!(target: "store", "Read {} bytes from {:?}", contents.len(), path);
                Ok(Some(contents))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.data_dir)?;
        fs::write(&path, value)?;
        trace!(target: "store", "Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_key_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("gameStatistics").unwrap(), None);
    }

    #[test]
    fn test_save_and_load_creates_directory() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("tilepanel"));

        store.set("gameAchievements", "{\"first-win\":true}").unwrap();

        let reopened = FileStore::new(dir.path().join("nested").join("tilepanel"));
        assert_eq!(
            reopened.get("gameAchievements").unwrap().as_deref(),
            Some("{\"first-win\":true}")
        );
        assert!(dir
            .path()
            .join("nested/tilepanel/gameAchievements.json")
            .exists());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.set("../escape", "{}"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
    }
}
