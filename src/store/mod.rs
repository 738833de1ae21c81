//! Storage contracts consumed by the vault layer, with pluggable backends.
//!
//! Supports:
//! - `LocalFileStore`: vault files on the local filesystem
//! - `MemoryFileStore` / `MemoryCredentialStore`: in-memory (non-persistent, for testing)
//! - `KeyringCredentialStore` (in `crate::keyring`): the OS keyring

mod fs;
mod memory;

pub use fs::LocalFileStore;
pub use memory::{MemoryCredentialStore, MemoryFileStore};

use std::fmt;

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::errors::Result;

/// Opaque handle of a credential record, only meaningful to its store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialId(String);

impl CredentialId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a credential record could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokenCode {
    BrokenCredentials,
    UnknownVersion,
}

/// Health of a credential record as reported by its store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStatus {
    Ok,
    Broken { code: BrokenCode, message: String },
}

/// One registration: a vault path and the password that opens it.
///
/// Keyed by `credentials_record_id`, never by path. Several entries may
/// name the same path; mutating operations treat that as an error.
#[derive(Clone)]
pub struct CredentialEntry {
    pub credentials_record_id: CredentialId,
    pub vault_filepath: String,
    pub password: Zeroizing<String>,
    pub status: CredentialStatus,
}

impl fmt::Debug for CredentialEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialEntry")
            .field("credentials_record_id", &self.credentials_record_id)
            .field("vault_filepath", &self.vault_filepath)
            .field("password", &"<redacted>")
            .field("status", &self.status)
            .finish()
    }
}

/// The source of truth mapping vault paths to their passwords.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn list_credentials(&self) -> Result<Vec<CredentialEntry>>;

    async fn add_credentials(&self, filepath: &str, password: &str) -> Result<()>;

    async fn delete_credentials(&self, id: &CredentialId) -> Result<()>;
}

/// Byte-level access to vault files.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn check_file_exists(&self, filepath: &str) -> Result<bool>;

    async fn read_vault_file(&self, filepath: &str) -> Result<String>;

    async fn write_vault_file(&self, filepath: &str, content: &str) -> Result<()>;
}

/// A namespace-keyed secret source to import domains from.
#[async_trait]
pub trait EnvchainSource: Send + Sync {
    /// `(key, value)` pairs of one namespace; unknown namespaces are empty.
    async fn list_namespace_secrets(&self, namespace: &str) -> Result<Vec<(String, String)>>;
}
