//! User record store backed by a single JSON document
//!
//! The document maps the decimal Telegram user id to a [`UserRecord`]:
//!
//! ```json
//! {
//!   "6067594310": {
//!     "confirmed": true
//!   }
//! }
//! ```
//!
//! Nothing is cached between events: every read goes to disk and every
//! mutation rewrites the whole document.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

/// Gating state of one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Set once every required channel was verified; never cleared
    #[serde(default)]
    pub confirmed: bool,
}

/// The whole document: user id string → record
pub type Store = BTreeMap<String, UserRecord>;

/// Errors surfaced by [`RecordStore::save`]
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key under which a user is stored
pub fn user_key(user_id: u64) -> String {
    user_id.to_string()
}

/// File-backed record store
pub struct RecordStore {
    path: PathBuf,
    /// Serializes load → mutate → save; the document is rewritten as a whole,
    /// so two writers (same user or not) would otherwise drop each other's change
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document.
    ///
    /// Never fails: a missing document is an empty store, an unreadable or
    /// corrupt one is logged and also treated as empty (it is overwritten on
    /// the next save).
    pub async fn load(&self) -> Store {
        let raw = match fs_err::tokio::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Store {} does not exist yet, starting empty", self.path.display());
                return Store::new();
            }
            Err(e) => {
                log::error!("Failed to read store: {}", e);
                return Store::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(store) => store,
            Err(e) => {
                log::error!("Store {} is corrupt, treating as empty: {}", self.path.display(), e);
                Store::new()
            }
        }
    }

    /// Overwrite the document with `store`.
    ///
    /// Pretty-printed with 2-space indentation, non-ASCII kept verbatim.
    /// Written to a sibling temp file first and renamed into place.
    pub async fn save(&self, store: &Store) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(store)?;
        let tmp = self.tmp_path();
        fs_err::tokio::write(&tmp, json).await?;
        fs_err::tokio::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Current record of a user, if any
    pub async fn get(&self, user_id: u64) -> Option<UserRecord> {
        self.load().await.get(&user_key(user_id)).copied()
    }

    /// Load the document, apply `f` to one user's record (created with
    /// defaults if absent) and save the whole document back.
    ///
    /// Returns the value produced by `f` together with the save outcome so
    /// the caller decides what a failed save means for it.
    pub async fn update<F, R>(&self, user_id: u64, f: F) -> (R, Result<(), StoreError>)
    where
        F: FnOnce(&mut UserRecord) -> R,
    {
        let _guard = self.write_lock.lock().await;

        let mut store = self.load().await;
        let record = store.entry(user_key(user_id)).or_default();
        let out = f(record);
        let saved = self.save(&store).await;

        (out, saved)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "store".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> RecordStore {
        RecordStore::new(dir.path().join("pending.json"))
    }

    #[tokio::test]
    async fn test_missing_document_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.load().await.is_empty());
        assert_eq!(store.get(1).await, None);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_is_pretty_and_readable() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut doc = Store::new();
        doc.insert("42".to_string(), UserRecord { confirmed: true });
        store.save(&doc).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "{\n  \"42\": {\n    \"confirmed\": true\n  }\n}");
        assert_eq!(store.load().await, doc);
        assert!(!dir.path().join("pending.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_unknown_fields_are_ignored() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"7": {"confirmed": true, "joined": [-100]}, "8": {}}"#).unwrap();

        assert_eq!(store.get(7).await, Some(UserRecord { confirmed: true }));
        assert_eq!(store.get(8).await, Some(UserRecord { confirmed: false }));
    }

    #[tokio::test]
    async fn test_update_creates_and_keeps_others() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let (_, saved) = store.update(1, |r| r.confirmed = true).await;
        saved.unwrap();
        let (was, saved) = store.update(2, |r| r.confirmed).await;
        saved.unwrap();

        assert!(!was);
        let doc = store.load().await;
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["1"], UserRecord { confirmed: true });
        assert_eq!(doc["2"], UserRecord { confirmed: false });
    }

    #[tokio::test]
    async fn test_save_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::new(dir.path().join("missing-dir").join("pending.json"));

        let (_, saved) = store.update(1, |r| r.confirmed = true).await;
        assert!(saved.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_updates_do_not_lose_writes() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));

        let mut handles = Vec::new();
        for user in 0..16u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let (_, saved) = store.update(user, |r| r.confirmed = true).await;
                saved.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let doc = store.load().await;
        assert_eq!(doc.len(), 16);
        assert!(doc.values().all(|r| r.confirmed));
    }
}
