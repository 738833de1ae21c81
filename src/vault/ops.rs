//! Mutation operations: create, register, deregister, edit, import.
//!
//! Every operation looks at the current registry, validates its
//! preconditions, then acts. There is no transaction across the file
//! store and the credential store; a new vault file is written before its
//! credentials are added so a failed write never leaves a dangling record.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};

use super::domain::{Domain, DomainsBundle};
use super::registry::{VaultState, Vaults};
use super::secret::Secret;
use crate::errors::{Result, WellKeptError};
use crate::interact::{PasswordInput, TextEditor};
use crate::store::EnvchainSource;

/// Outcome of editing a single domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEdit {
    Unchanged,
    Updated { vault_filepath: String },
}

/// Secret count of one domain, as shown by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainStats {
    pub name: String,
    pub num_secrets: usize,
}

/// Summary of one registered vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultStats {
    pub vault_filepath: String,
    pub ok: bool,
    /// Status label, e.g. `ok` or `cannot_decrypt Decryption failed: ...`.
    pub status: String,
    pub domains: Vec<DomainStats>,
}

/// The registry plus the password prompts: everything a CLI command needs.
#[derive(Clone)]
pub struct VaultOps {
    vaults: Vaults,
    input: Arc<dyn PasswordInput>,
}

impl VaultOps {
    pub fn new(vaults: Vaults, input: Arc<dyn PasswordInput>) -> Self {
        Self { vaults, input }
    }

    pub fn vaults(&self) -> &Vaults {
        &self.vaults
    }

    pub async fn create_vault(&self, filepath: &str) -> Result<()> {
        self.check_new_vault_path(filepath).await?;
        self.persist_new_vault(filepath, &DomainsBundle::empty()).await
    }

    /// Register an existing vault file. The password is verified by reading
    /// the vault; nothing is registered if that fails.
    pub async fn register_vault(&self, filepath: &str) -> Result<()> {
        self.check_unregistered(filepath).await?;
        if !self.vaults.files().check_file_exists(filepath).await? {
            return Err(WellKeptError::user(format!("File {filepath} does not exist")));
        }

        let password = self.input.enter_password()?;
        self.vaults
            .read_vault(filepath, &password)
            .await
            .map_err(WellKeptError::InvalidVault)?;

        self.vaults
            .credentials()
            .add_credentials(filepath, &password)
            .await?;
        info!(path = %filepath, "vault registered");
        Ok(())
    }

    /// Delete every credential record for `filepath`. The file stays.
    /// Returns how many records were removed.
    pub async fn deregister_vault(&self, filepath: &str) -> Result<usize> {
        let entries = self.vaults.entries_for_path(filepath).await?;
        if entries.is_empty() {
            return Err(WellKeptError::user(format!(
                "Vault not found with path {filepath}"
            )));
        }
        for entry in &entries {
            self.vaults
                .credentials()
                .delete_credentials(&entry.credentials_record_id)
                .await?;
        }
        info!(path = %filepath, records = entries.len(), "vault deregistered");
        Ok(entries.len())
    }

    /// Edit a whole vault as INI text. Returns `false` when the text came
    /// back unchanged, in which case nothing is encrypted or written.
    pub async fn edit_vault(&self, filepath: &str, editor: &dyn TextEditor) -> Result<bool> {
        let mut states = self.vaults.states_for_path(filepath).await?;
        let state = match states.len() {
            0 => {
                return Err(WellKeptError::user(format!(
                    "Vault not found with path {filepath}"
                )))
            }
            1 => states.remove(0),
            _ => {
                return Err(WellKeptError::user(format!(
                    "Multiple vaults found with path {filepath}"
                )))
            }
        };

        let VaultState {
            password, content, ..
        } = state;
        let bundle = content.map_err(WellKeptError::InvalidVault)?;

        let input_text = bundle.to_ini();
        let validator =
            |text: &str| DomainsBundle::parse_ini_text(text).err().map(|e| e.to_string());
        let output_text = editor.edit_text(&input_text, filepath, &validator).await?;
        if output_text == input_text {
            debug!(path = %filepath, "vault text unchanged");
            return Ok(false);
        }

        let updated = DomainsBundle::parse_ini_text(&output_text)?;
        self.write_bundle(filepath, &updated, &password).await?;
        Ok(true)
    }

    /// Edit the one domain called `domain_name` and splice it back into its
    /// vault. The domain may be renamed, but not onto another domain of the
    /// same vault.
    pub async fn edit_domain(&self, domain_name: &str, editor: &dyn TextEditor) -> Result<DomainEdit> {
        let mut holders: Vec<VaultState> = self
            .vaults
            .list_vaults()
            .await?
            .into_iter()
            .filter(|state| {
                state
                    .bundle()
                    .is_some_and(|bundle| bundle.contains_domain(domain_name))
            })
            .collect();
        let state = match holders.len() {
            0 => {
                return Err(WellKeptError::user(format!(
                    "No vault contains domain {domain_name}"
                )))
            }
            1 => holders.remove(0),
            _ => {
                return Err(WellKeptError::user(format!(
                    "Multiple vaults contain domain {domain_name}"
                )))
            }
        };

        let VaultState {
            vault_filepath,
            password,
            content,
            ..
        } = state;
        let bundle = content.map_err(WellKeptError::InvalidVault)?;
        let input_text = bundle
            .domain(domain_name)
            .map(Domain::to_ini)
            .ok_or_else(|| WellKeptError::user(format!("No domain {domain_name} found")))?;

        let validator = |text: &str| match Domain::parse_ini_text(text) {
            Err(e) => Some(e.to_string()),
            Ok(domain) if domain.name() != domain_name && bundle.contains_domain(domain.name()) => {
                Some(format!("Domain {} already exists in this vault", domain.name()))
            }
            Ok(_) => None,
        };
        let output_text = editor
            .edit_text(&input_text, &vault_filepath, &validator)
            .await?;
        if output_text == input_text {
            debug!(domain = %domain_name, "domain text unchanged");
            return Ok(DomainEdit::Unchanged);
        }

        let updated_domain = Domain::parse_ini_text(&output_text)?;
        let updated = bundle.replace_domain(domain_name, updated_domain)?;
        self.write_bundle(&vault_filepath, &updated, &password).await?;
        Ok(DomainEdit::Updated { vault_filepath })
    }

    /// Create a vault with one domain per envchain namespace.
    pub async fn import_from_envchain(
        &self,
        filepath: &str,
        namespaces: &[String],
        source: &dyn EnvchainSource,
    ) -> Result<()> {
        self.check_new_vault_path(filepath).await?;

        let domains = try_join_all(namespaces.iter().map(|namespace| async move {
            let secrets = source
                .list_namespace_secrets(namespace)
                .await?
                .into_iter()
                .map(|(key, value)| Secret::new(key, value))
                .collect();
            Domain::new(namespace.as_str(), secrets)
        }))
        .await?;
        let bundle = DomainsBundle::new(domains)?;
        debug!(domains = bundle.domains().len(), "envchain namespaces collected");

        self.persist_new_vault(filepath, &bundle).await
    }

    pub async fn get_secrets(&self, domain_name: &str) -> Result<Vec<Secret>> {
        self.vaults.get_secrets(domain_name).await
    }

    /// One summary per registered vault, sorted by path.
    pub async fn vault_stats(&self) -> Result<Vec<VaultStats>> {
        let states = self.vaults.list_vaults().await?;
        Ok(states
            .iter()
            .map(|state| VaultStats {
                vault_filepath: state.vault_filepath.clone(),
                ok: state.is_ok(),
                status: state.status_label(),
                domains: state
                    .bundle()
                    .map(|bundle| {
                        bundle
                            .domains()
                            .iter()
                            .map(|domain| DomainStats {
                                name: domain.name().to_string(),
                                num_secrets: domain.secrets().len(),
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn check_unregistered(&self, filepath: &str) -> Result<()> {
        if !self.vaults.entries_for_path(filepath).await?.is_empty() {
            return Err(WellKeptError::user(format!(
                "Vault with path {filepath} already registered"
            )));
        }
        Ok(())
    }

    async fn check_new_vault_path(&self, filepath: &str) -> Result<()> {
        self.check_unregistered(filepath).await?;
        if self.vaults.files().check_file_exists(filepath).await? {
            return Err(WellKeptError::user(format!("File {filepath} already exists")));
        }
        Ok(())
    }

    async fn persist_new_vault(&self, filepath: &str, bundle: &DomainsBundle) -> Result<()> {
        let password = self.input.choose_new_password()?;
        self.write_bundle(filepath, bundle, &password).await?;
        self.vaults
            .credentials()
            .add_credentials(filepath, &password)
            .await?;
        info!(path = %filepath, "vault created");
        Ok(())
    }

    async fn write_bundle(&self, filepath: &str, bundle: &DomainsBundle, password: &str) -> Result<()> {
        let encrypted = self.vaults.encrypt_bundle(bundle, password).await?;
        self.vaults.files().write_vault_file(filepath, &encrypted).await?;
        info!(path = %filepath, domains = bundle.domains().len(), "vault written");
        Ok(())
    }
}
