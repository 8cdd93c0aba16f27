//! Persisted client state: a file-per-key string store under the state
//! directory, standing in for the browser's local storage. Two fixed keys are
//! used: the bearer token and the display-mode preference. Plain entries, no
//! versioning or migration.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Storage key for the bearer credential.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the display-mode preference.
pub const THEME_KEY: &str = "themeMode";

#[derive(Debug, Clone)]
pub struct ClientStore {
    root: PathBuf,
}

impl ClientStore {
    pub fn open(root: impl AsRef<Path>) -> AppResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .map_err(|e| AppError::io("state_dir", format!("cannot create '{}': {}", root.display(), e)))?;
        Ok(Self { root })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub fn get(&self, key: &str) -> AppResult<Option<String>> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(&self, key: &str, value: &str) -> AppResult<()> {
        fs::write(self.entry_path(key), value)?;
        Ok(())
    }

    /// Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> AppResult<()> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn set_get_remove_roundtrip() {
        let tmp = tempdir().unwrap();
        let store = ClientStore::open(tmp.path()).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        store.set(TOKEN_KEY, "tok-123").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-123"));
        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        // removing again stays quiet
        store.remove(TOKEN_KEY).unwrap();
    }

    #[test]
    fn keys_are_independent() {
        let tmp = tempdir().unwrap();
        let store = ClientStore::open(tmp.path()).unwrap();
        store.set(TOKEN_KEY, "t").unwrap();
        store.set(THEME_KEY, "neon").unwrap();
        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("neon"));
    }
}
