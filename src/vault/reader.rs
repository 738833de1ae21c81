//! Reading one vault file: exists, read, decrypt, parse.
//!
//! Each step short-circuits into a typed fault. Nothing is retried.

use std::fmt;
use std::sync::Arc;

use zeroize::Zeroizing;

use super::domain::DomainsBundle;
use crate::crypto::Encryption;
use crate::store::FileStore;

/// Resolved status of a registered vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaultStatus {
    Ok,
    Missing,
    BrokenKey,
    CannotRead,
    CannotDecrypt,
    CannotParse,
}

impl VaultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Missing => "missing",
            Self::BrokenKey => "broken_key",
            Self::CannotRead => "cannot_read",
            Self::CannotDecrypt => "cannot_decrypt",
            Self::CannotParse => "cannot_parse",
        }
    }
}

impl fmt::Display for VaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a vault could not be turned into a `DomainsBundle`.
///
/// The message of the underlying error is kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultFault {
    /// The file is gone.
    Missing,
    /// The credential record itself is unusable.
    BrokenKey(String),
    /// The file exists but could not be read.
    CannotRead(String),
    /// Wrong password, corrupted ciphertext or unknown cipher version.
    CannotDecrypt(String),
    /// Decrypted, but not a valid bundle of a known schema version.
    CannotParse(String),
}

impl VaultFault {
    pub fn status(&self) -> VaultStatus {
        match self {
            Self::Missing => VaultStatus::Missing,
            Self::BrokenKey(_) => VaultStatus::BrokenKey,
            Self::CannotRead(_) => VaultStatus::CannotRead,
            Self::CannotDecrypt(_) => VaultStatus::CannotDecrypt,
            Self::CannotParse(_) => VaultStatus::CannotParse,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Missing => None,
            Self::BrokenKey(m) | Self::CannotRead(m) | Self::CannotDecrypt(m) | Self::CannotParse(m) => {
                Some(m.as_str())
            }
        }
    }
}

impl fmt::Display for VaultFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) if !message.is_empty() => write!(f, "{} {message}", self.status()),
            _ => write!(f, "{}", self.status()),
        }
    }
}

/// Outcome of reading a vault.
pub type VaultRead = std::result::Result<DomainsBundle, VaultFault>;

/// Read, decrypt and parse the vault at `filepath`.
///
/// Decryption runs on the blocking pool: key derivation is deliberately
/// expensive and concurrent reads should not serialize behind it.
pub async fn read_vault(
    files: &dyn FileStore,
    encryption: Arc<dyn Encryption>,
    filepath: &str,
    password: &str,
) -> VaultRead {
    match files.check_file_exists(filepath).await {
        Ok(true) => {}
        Ok(false) => return Err(VaultFault::Missing),
        Err(e) => return Err(VaultFault::CannotRead(e.to_string())),
    }

    let encrypted = files
        .read_vault_file(filepath)
        .await
        .map_err(|e| VaultFault::CannotRead(e.to_string()))?;

    let password = Zeroizing::new(password.to_owned());
    let content = tokio::task::spawn_blocking(move || encryption.decrypt(&encrypted, &password))
        .await
        .map_err(|e| VaultFault::CannotDecrypt(format!("decryption task failed: {e}")))?
        .map_err(|e| VaultFault::CannotDecrypt(e.to_string()))?;

    DomainsBundle::parse_json(&content).map_err(|e| VaultFault::CannotParse(e.to_string()))
}
