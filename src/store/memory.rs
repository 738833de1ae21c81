//! In-memory stores (non-persistent, for testing and scripting).

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use zeroize::Zeroizing;

use super::{CredentialEntry, CredentialId, CredentialStatus, CredentialStore, FileStore};
use crate::errors::Result;

/// Credential records held in a vector, in insertion order.
///
/// Unlike the keyring, this store happily keeps several records for the
/// same path, which lets tests exercise the ambiguity checks.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    entries: Arc<RwLock<Vec<CredentialEntry>>>,
    next_id: Arc<AtomicUsize>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record with an explicit status, e.g. a broken one.
    pub async fn insert(&self, filepath: &str, password: &str, status: CredentialStatus) -> CredentialId {
        let id = CredentialId::new(format!(
            "mem-{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        ));
        self.entries.write().await.push(CredentialEntry {
            credentials_record_id: id.clone(),
            vault_filepath: filepath.to_string(),
            password: Zeroizing::new(password.to_string()),
            status,
        });
        id
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn list_credentials(&self) -> Result<Vec<CredentialEntry>> {
        Ok(self.entries.read().await.clone())
    }

    async fn add_credentials(&self, filepath: &str, password: &str) -> Result<()> {
        self.insert(filepath, password, CredentialStatus::Ok).await;
        Ok(())
    }

    async fn delete_credentials(&self, id: &CredentialId) -> Result<()> {
        self.entries
            .write()
            .await
            .retain(|entry| &entry.credentials_record_id != id);
        Ok(())
    }
}

/// Vault files held in a map, with a write counter and injectable read
/// failures.
#[derive(Clone, Default)]
pub struct MemoryFileStore {
    files: Arc<RwLock<HashMap<String, String>>>,
    unreadable: Arc<RwLock<HashSet<String>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a file in place without counting it as a write.
    pub async fn seed(&self, filepath: &str, content: &str) {
        self.files
            .write()
            .await
            .insert(filepath.to_string(), content.to_string());
    }

    /// Make reads of `filepath` fail while it still "exists".
    pub async fn mark_unreadable(&self, filepath: &str) {
        self.unreadable.write().await.insert(filepath.to_string());
    }

    pub async fn remove(&self, filepath: &str) {
        self.files.write().await.remove(filepath);
    }

    pub async fn content(&self, filepath: &str) -> Option<String> {
        self.files.read().await.get(filepath).cloned()
    }

    /// Number of `write_vault_file` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn check_file_exists(&self, filepath: &str) -> Result<bool> {
        Ok(self.files.read().await.contains_key(filepath)
            || self.unreadable.read().await.contains(filepath))
    }

    async fn read_vault_file(&self, filepath: &str) -> Result<String> {
        if self.unreadable.read().await.contains(filepath) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied").into());
        }
        self.files
            .read()
            .await
            .get(filepath)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file").into())
    }

    async fn write_vault_file(&self, filepath: &str, content: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.seed(filepath, content).await;
        Ok(())
    }
}
