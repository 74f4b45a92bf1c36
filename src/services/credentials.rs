// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential persistence.
//!
//! The token refresher and the fetcher only ever see a `CredentialStore`;
//! nothing else touches the credential file.

use crate::error::StoreError;
use crate::models::Credential;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Single-slot credential storage.
pub trait CredentialStore: Send + Sync {
    /// Load the current credential.
    fn load(&self) -> Result<Credential, StoreError>;

    /// Replace the stored credential wholesale.
    fn save(&self, credential: &Credential) -> Result<(), StoreError>;
}

/// Shared handle used across services.
pub type SharedCredentialStore = Arc<dyn CredentialStore>;

/// Credential stored as a JSON file.
///
/// Writes go to a sibling temp file which is then renamed over the
/// original, so readers never observe a partially written file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Credential, StoreError> {
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(credential)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "Credential saved");
        Ok(())
    }
}

/// In-memory credential slot for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
    saves: AtomicUsize,
}

impl MemoryCredentialStore {
    pub fn new(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Credential, StoreError> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or(StoreError::Empty)
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(access: &str) -> Credential {
        Credential {
            access_token: access.to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Some(1_750_000_000),
        }
    }

    #[test]
    fn test_file_store_overwrites_wholesale() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = FileCredentialStore::new(dir.path().join("strava_token.json"));

        store.save(&credential("first")).unwrap();
        store.save(&credential("second")).unwrap();

        assert_eq!(store.load().unwrap(), credential("second"));
        assert!(!dir.path().join("strava_token.json.tmp").exists());
    }

    #[test]
    fn test_file_store_reads_provider_payload() {
        // The provider response carries extra fields; only the tokens matter.
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("strava_token.json");
        fs::write(
            &path,
            r#"{"token_type":"Bearer","access_token":"abc","refresh_token":"def","expires_at":1750000000,"expires_in":21600}"#,
        )
        .unwrap();

        let loaded = FileCredentialStore::new(&path).load().unwrap();

        assert_eq!(loaded.access_token, "abc");
        assert_eq!(loaded.refresh_token, "def");
        assert_eq!(loaded.expires_at, Some(1_750_000_000));
    }

    #[test]
    fn test_file_store_missing_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = FileCredentialStore::new(dir.path().join("absent.json"));

        assert!(matches!(store.load(), Err(StoreError::Io(_))));
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let store = MemoryCredentialStore::default();
        assert!(matches!(store.load(), Err(StoreError::Empty)));

        store.save(&credential("a")).unwrap();
        store.save(&credential("b")).unwrap();

        assert_eq!(store.save_count(), 2);
        assert_eq!(store.load().unwrap().access_token, "b");
    }
}
