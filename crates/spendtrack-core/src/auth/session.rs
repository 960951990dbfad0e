use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TokenStore;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub stored_at: DateTime<Utc>,
}

/// Token store persisted as JSON in the cache directory.
///
/// The file is re-read on every `get` so that separate invocations of the
/// client observe each other's logins and logouts.
pub struct FileTokenStore {
    cache_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Load the stored session record, if any
    pub fn load(&self) -> Result<Option<StoredSession>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let session: StoredSession =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(session))
    }

    pub fn path(&self) -> PathBuf {
        self.session_path()
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }

    fn write(path: &Path, session: &StoredSession) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(path, contents).context("Failed to write session file")?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|s| s.token))
    }

    fn set(&self, token: &str) -> Result<()> {
        let session = StoredSession {
            token: token.to_string(),
            stored_at: Utc::now(),
        };
        Self::write(&self.session_path(), &session)?;
        debug!(path = ?self.session_path(), "Session token saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to remove session file")?;
            debug!(?path, "Session token removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "spendtrack-session-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let dir = scratch_dir("roundtrip");
        let store = FileTokenStore::new(dir.clone());

        assert!(store.get().unwrap().is_none());

        store.set("abc.def.ghi").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("abc.def.ghi"));
        assert!(store.path().exists());

        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
        // Second clear on a missing file is fine
        store.clear().unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_corrupt_file_is_an_error() {
        let dir = scratch_dir("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SESSION_FILE), "not json").unwrap();

        let store = FileTokenStore::new(dir.clone());
        assert!(store.get().is_err());

        let _ = std::fs::remove_dir_all(dir);
    }
}
