//! WellKept: encrypted local vaults of environment secrets.
//!
//! Each vault is a file holding named domains of `NAME=value` secrets,
//! encrypted with a password kept in the OS keyring. The library half
//! exposes the model, the vault operations and the storage contracts; the
//! `wellkept` binary is a thin CLI over them.

pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod interact;
pub mod store;
pub mod vault;

#[cfg(feature = "keyring-store")]
pub mod keyring;

pub use errors::{Result, WellKeptError};
pub use vault::Secret;

/// Secrets of `domain_name` from the one registered vault that holds it,
/// using the keyring, the local filesystem and the configured cipher.
#[cfg(feature = "keyring-store")]
pub async fn get_secrets_for_domain(domain_name: &str) -> Result<Vec<Secret>> {
    let settings = config::Settings::load_default()?;
    cli::build_vaults(&settings)?.get_secrets(domain_name).await
}
