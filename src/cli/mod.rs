//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod envchain;
pub mod output;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use crate::config::Settings;
use crate::crypto::PasswordCipher;
use crate::errors::{Result, WellKeptError};
use crate::interact::{ExternalEditor, TerminalPasswordInput};
use crate::store::{CredentialStore, LocalFileStore};
use crate::vault::{VaultOps, Vaults};

/// WellKept: encrypted vaults of environment secrets, unlocked by the OS keyring.
#[derive(Parser)]
#[command(
    name = "wellkept",
    about = "Encrypted vaults of environment secrets, unlocked by the OS keyring",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run a command with the secrets of a domain in its environment
    Run {
        /// Domain whose secrets are injected
        domain: String,
        /// Command to run (through the shell)
        command: String,
        /// Arguments passed to the command
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Create and register a new empty vault
    Create {
        /// Path of the vault file to create
        path: String,
    },

    /// Register an existing vault
    Register {
        /// Path of the vault file
        path: String,
    },

    /// Deregister a vault, leaving the file in place (use `register` to add it back)
    Deregister {
        /// Path of the vault file
        path: String,
    },

    /// Edit an entire vault
    EditVault {
        /// Path of the vault file
        path: String,
    },

    /// Edit a single domain, wherever it is stored
    Edit {
        /// Domain name
        domain: String,
    },

    /// List registered vaults, or the secret names (never values) of a domain
    List {
        /// Domain whose secret names are listed
        domain: Option<String>,
    },

    /// Create a vault from envchain namespaces, one domain per namespace
    ImportEnvchain {
        /// Path of the vault file to create
        path: String,
        /// Namespaces to import
        namespaces: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Make a vault path absolute, so the same file is always registered under
/// the same key regardless of where the command runs.
pub fn resolve_vault_path(path: &str) -> Result<String> {
    if path.trim().is_empty() {
        return Err(WellKeptError::user("Vault path cannot be empty"));
    }
    let path = Path::new(path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(absolute.to_string_lossy().into_owned())
}

/// The credential store used outside tests.
#[cfg(feature = "keyring-store")]
pub fn default_credential_store(settings: &Settings) -> Result<Arc<dyn CredentialStore>> {
    Ok(Arc::new(crate::keyring::KeyringCredentialStore::new(
        settings.keyring_service.clone(),
    )))
}

/// Without the keyring there is nowhere to keep passwords.
#[cfg(not(feature = "keyring-store"))]
pub fn default_credential_store(_settings: &Settings) -> Result<Arc<dyn CredentialStore>> {
    Err(WellKeptError::Config(
        "built without the `keyring-store` feature, no credential store available".into(),
    ))
}

/// Wire the registry from settings: keyring, local files, password cipher.
pub fn build_vaults(settings: &Settings) -> Result<Vaults> {
    let params = settings.argon2_params();
    params
        .validate()
        .map_err(|e| WellKeptError::Config(e.to_string()))?;
    Ok(Vaults::new(
        default_credential_store(settings)?,
        Arc::new(LocalFileStore::new()),
        Arc::new(PasswordCipher::new(params)),
    ))
}

/// Wire the operations with terminal password prompts.
pub fn build_ops(settings: &Settings) -> Result<VaultOps> {
    Ok(VaultOps::new(
        build_vaults(settings)?,
        Arc::new(TerminalPasswordInput::new(settings.min_password_len)),
    ))
}

/// The editor configured in settings, else `$VISUAL` / `$EDITOR` / `vi`.
pub fn build_editor(settings: &Settings) -> ExternalEditor {
    ExternalEditor::new(settings.editor.clone())
}
