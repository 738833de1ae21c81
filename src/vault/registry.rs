//! Resolving credential records into vault states.
//!
//! Nothing here is cached: every call re-reads the credential store and
//! the vault files, so callers always act on current truth.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::domain::DomainsBundle;
use super::reader::{read_vault, VaultFault, VaultRead, VaultStatus};
use super::secret::Secret;
use crate::crypto::Encryption;
use crate::errors::{Result, WellKeptError};
use crate::store::{CredentialEntry, CredentialId, CredentialStatus, CredentialStore, FileStore};

/// A credential record joined with the outcome of reading its vault.
#[derive(Clone)]
pub struct VaultState {
    pub credentials_record_id: CredentialId,
    pub vault_filepath: String,
    pub password: Zeroizing<String>,
    pub content: VaultRead,
}

impl VaultState {
    pub fn status(&self) -> VaultStatus {
        match &self.content {
            Ok(_) => VaultStatus::Ok,
            Err(fault) => fault.status(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.content.is_ok()
    }

    /// The decrypted content, only when the status is `ok`.
    pub fn bundle(&self) -> Option<&DomainsBundle> {
        self.content.as_ref().ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.content.as_ref().err().and_then(VaultFault::message)
    }

    /// `ok`, or the status followed by the captured error message.
    pub fn status_label(&self) -> String {
        match &self.content {
            Ok(_) => VaultStatus::Ok.to_string(),
            Err(fault) => fault.to_string(),
        }
    }
}

impl fmt::Debug for VaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultState")
            .field("credentials_record_id", &self.credentials_record_id)
            .field("vault_filepath", &self.vault_filepath)
            .field("password", &"<redacted>")
            .field("content", &self.content)
            .finish()
    }
}

/// Read-side entry point: the credential store, the file store and the
/// cipher, wired once at startup.
#[derive(Clone)]
pub struct Vaults {
    credentials: Arc<dyn CredentialStore>,
    files: Arc<dyn FileStore>,
    encryption: Arc<dyn Encryption>,
}

impl Vaults {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        files: Arc<dyn FileStore>,
        encryption: Arc<dyn Encryption>,
    ) -> Self {
        Self {
            credentials,
            files,
            encryption,
        }
    }

    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    pub fn files(&self) -> &dyn FileStore {
        self.files.as_ref()
    }

    /// Encrypt a bundle on the blocking pool.
    pub async fn encrypt_bundle(&self, bundle: &DomainsBundle, password: &str) -> Result<String> {
        let encryption = Arc::clone(&self.encryption);
        let content = bundle.to_json();
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || encryption.encrypt(&content, &password))
            .await
            .map_err(|e| WellKeptError::Encryption(format!("encryption task failed: {e}")))?
    }

    /// Read one vault with an explicit password.
    pub async fn read_vault(&self, filepath: &str, password: &str) -> VaultRead {
        read_vault(
            self.files.as_ref(),
            Arc::clone(&self.encryption),
            filepath,
            password,
        )
        .await
    }

    /// Credential records sorted by vault path.
    pub async fn entries(&self) -> Result<Vec<CredentialEntry>> {
        let mut entries = self.credentials.list_credentials().await?;
        entries.sort_by(|a, b| a.vault_filepath.cmp(&b.vault_filepath));
        debug!(count = entries.len(), "listed credentials");
        Ok(entries)
    }

    /// Credential records registered for exactly this path.
    pub async fn entries_for_path(&self, filepath: &str) -> Result<Vec<CredentialEntry>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .filter(|entry| entry.vault_filepath == filepath)
            .collect())
    }

    /// Resolve every registered vault. Reads run concurrently.
    pub async fn list_vaults(&self) -> Result<Vec<VaultState>> {
        let entries = self.entries().await?;
        Ok(self.resolve_all(entries).await)
    }

    /// Resolve only the vaults registered for `filepath`.
    pub async fn states_for_path(&self, filepath: &str) -> Result<Vec<VaultState>> {
        let entries = self.entries_for_path(filepath).await?;
        Ok(self.resolve_all(entries).await)
    }

    async fn resolve_all(&self, entries: Vec<CredentialEntry>) -> Vec<VaultState> {
        join_all(entries.into_iter().map(|entry| self.resolve(entry))).await
    }

    async fn resolve(&self, entry: CredentialEntry) -> VaultState {
        let content = match entry.status {
            CredentialStatus::Broken { message, .. } => Err(VaultFault::BrokenKey(message)),
            CredentialStatus::Ok => self.read_vault(&entry.vault_filepath, &entry.password).await,
        };

        match &content {
            Ok(bundle) => debug!(
                path = %entry.vault_filepath,
                domains = bundle.domains().len(),
                "vault resolved"
            ),
            Err(fault) => warn!(
                path = %entry.vault_filepath,
                status = %fault.status(),
                "vault unusable"
            ),
        }

        VaultState {
            credentials_record_id: entry.credentials_record_id,
            vault_filepath: entry.vault_filepath,
            password: entry.password,
            content,
        }
    }

    /// The secrets of `domain_name`, provided exactly one readable vault
    /// holds that domain. An existing domain with no secrets yields an
    /// empty list.
    pub async fn get_secrets(&self, domain_name: &str) -> Result<Vec<Secret>> {
        let vaults = self.list_vaults().await?;
        let holders: Vec<&DomainsBundle> = vaults
            .iter()
            .filter_map(VaultState::bundle)
            .filter(|bundle| bundle.contains_domain(domain_name))
            .collect();

        match holders.as_slice() {
            [] => Err(WellKeptError::user(format!(
                "No vaults found containing domain \"{domain_name}\""
            ))),
            [bundle] => bundle
                .domain(domain_name)
                .map(|domain| domain.secrets().to_vec())
                .ok_or_else(|| {
                    WellKeptError::user(format!(
                        "No vaults found containing domain \"{domain_name}\""
                    ))
                }),
            _ => Err(WellKeptError::user(format!(
                "More than one vault found containing domain \"{domain_name}\""
            ))),
        }
    }
}
