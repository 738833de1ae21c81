//! `wellkept list`: show registered vaults, or the secret names of a domain.

use crate::cli::output;
use crate::errors::Result;
use crate::vault::VaultOps;

/// Execute the `list` command.
///
/// Secret values are never printed.
pub async fn execute(ops: &VaultOps, domain: Option<&str>) -> Result<()> {
    match domain {
        Some(domain) => {
            let secrets = ops.get_secrets(domain).await?;
            if secrets.is_empty() {
                println!("No secrets");
            }
            for secret in &secrets {
                println!("{}", secret.name);
            }
        }
        None => output::print_vaults_table(&ops.vault_stats().await?),
    }
    Ok(())
}
