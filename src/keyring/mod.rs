//! Credential store backed by the OS keyring.
//!
//! Vault passwords live in the operating system's secure credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! One entry per vault. The entry's account is `{"v":1,"filepath":...}` and
//! its secret is the vault password. Keyrings cannot be enumerated
//! portably, so an index entry in the same service lists every account.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::errors::{Result, WellKeptError};
use crate::store::{BrokenCode, CredentialEntry, CredentialId, CredentialStatus, CredentialStore};

/// Account of the index entry.
const INDEX_ACCOUNT: &str = "__index__";

/// Version of the account record.
const RECORD_VERSION: u64 = 1;

/// Build the account string for a vault path.
fn account_for(filepath: &str) -> String {
    json!({ "v": RECORD_VERSION, "filepath": filepath }).to_string()
}

/// Decode an account string into a vault path and record status.
///
/// A broken record keeps the raw account as its path, so it still shows up
/// in listings and can be deregistered.
fn classify_account(account: &str) -> (String, CredentialStatus) {
    let broken = |code, message: &str| {
        (
            account.to_string(),
            CredentialStatus::Broken {
                code,
                message: message.to_string(),
            },
        )
    };

    let Ok(data) = serde_json::from_str::<Value>(account) else {
        return broken(BrokenCode::BrokenCredentials, "Cannot parse the credentials");
    };
    if data.get("v").and_then(Value::as_u64) != Some(RECORD_VERSION) {
        return broken(
            BrokenCode::UnknownVersion,
            "Unknown credentials version, try upgrading the app",
        );
    }
    match data.get("filepath").and_then(Value::as_str) {
        Some(filepath) if !filepath.is_empty() => (filepath.to_string(), CredentialStatus::Ok),
        _ => broken(BrokenCode::BrokenCredentials, "Missing data in credentials"),
    }
}

/// Join an indexed account with the result of looking up its password.
///
/// An account whose password can't be read is listed as broken rather than
/// dropped, so it stays visible and can be deregistered.
fn credential_entry(
    account: String,
    lookup: std::result::Result<String, keyring::Error>,
) -> CredentialEntry {
    let (vault_filepath, status) = classify_account(&account);
    let (password, status) = match (lookup, status) {
        (Ok(password), status) => (Zeroizing::new(password), status),
        (Err(_), broken @ CredentialStatus::Broken { .. }) => (Zeroizing::new(String::new()), broken),
        (Err(keyring::Error::NoEntry), CredentialStatus::Ok) => {
            debug!(%account, "indexed keyring entry has no password");
            (
                Zeroizing::new(String::new()),
                CredentialStatus::Broken {
                    code: BrokenCode::BrokenCredentials,
                    message: "Password missing from keyring".to_string(),
                },
            )
        }
        (Err(e), CredentialStatus::Ok) => {
            warn!(%account, error = %e, "cannot read keyring entry");
            (
                Zeroizing::new(String::new()),
                CredentialStatus::Broken {
                    code: BrokenCode::BrokenCredentials,
                    message: e.to_string(),
                },
            )
        }
    };
    CredentialEntry {
        credentials_record_id: CredentialId::new(account),
        vault_filepath,
        password,
        status,
    }
}

fn keyring_error(action: &str, e: keyring::Error) -> WellKeptError {
    WellKeptError::Keyring(format!("failed to {action}: {e}"))
}

/// Run a blocking keyring call off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WellKeptError::Keyring(format!("keyring task failed: {e}")))?
}

/// `CredentialStore` over the OS keyring.
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(service: &str, account: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(service, account).map_err(|e| keyring_error("create keyring entry", e))
    }

    fn read_index(service: &str) -> Result<Vec<String>> {
        match Self::entry(service, INDEX_ACCOUNT)?.get_password() {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| WellKeptError::Keyring(format!("keyring index is corrupted: {e}"))),
            Err(keyring::Error::NoEntry) => Ok(Vec::new()),
            Err(e) => Err(keyring_error("read keyring index", e)),
        }
    }

    fn write_index(service: &str, accounts: &[String]) -> Result<()> {
        let raw = serde_json::to_string(accounts)
            .map_err(|e| WellKeptError::Serialization(e.to_string()))?;
        Self::entry(service, INDEX_ACCOUNT)?
            .set_password(&raw)
            .map_err(|e| keyring_error("write keyring index", e))
    }

    fn list_blocking(service: &str) -> Result<Vec<CredentialEntry>> {
        let mut entries = Vec::new();
        for account in Self::read_index(service)? {
            let lookup = Self::entry(service, &account)?.get_password();
            entries.push(credential_entry(account, lookup));
        }
        entries.sort_by(|a, b| a.vault_filepath.cmp(&b.vault_filepath));
        Ok(entries)
    }

    fn add_blocking(service: &str, filepath: &str, password: &str) -> Result<()> {
        let account = account_for(filepath);
        Self::entry(service, &account)?
            .set_password(password)
            .map_err(|e| keyring_error("store password in keyring", e))?;

        let mut index = Self::read_index(service)?;
        if !index.contains(&account) {
            index.push(account);
            Self::write_index(service, &index)?;
        }
        Ok(())
    }

    fn delete_blocking(service: &str, account: &str) -> Result<()> {
        match Self::entry(service, account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(keyring_error("delete from keyring", e)),
        }

        let mut index = Self::read_index(service)?;
        let before = index.len();
        index.retain(|indexed| indexed != account);
        if index.len() != before {
            Self::write_index(service, &index)?;
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for KeyringCredentialStore {
    async fn list_credentials(&self) -> Result<Vec<CredentialEntry>> {
        let service = self.service.clone();
        blocking(move || Self::list_blocking(&service)).await
    }

    async fn add_credentials(&self, filepath: &str, password: &str) -> Result<()> {
        let service = self.service.clone();
        let filepath = filepath.to_string();
        let password = Zeroizing::new(password.to_string());
        blocking(move || Self::add_blocking(&service, &filepath, &password)).await
    }

    async fn delete_credentials(&self, id: &CredentialId) -> Result<()> {
        let service = self.service.clone();
        let account = id.as_str().to_string();
        blocking(move || Self::delete_blocking(&service, &account)).await
    }
}
