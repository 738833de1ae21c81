//! `wellkept create`: create and register a new empty vault.

use crate::cli::{output, resolve_vault_path};
use crate::errors::Result;
use crate::vault::VaultOps;

/// Execute the `create` command.
pub async fn execute(ops: &VaultOps, path: &str) -> Result<()> {
    let path = resolve_vault_path(path)?;
    ops.create_vault(&path).await?;
    output::success("Vault created");
    output::tip(&format!("Run `wellkept edit-vault {path}` to add secrets."));
    Ok(())
}
