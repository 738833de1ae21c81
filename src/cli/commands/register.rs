//! `wellkept register`: register an existing vault file.

use crate::cli::{output, resolve_vault_path};
use crate::errors::Result;
use crate::vault::VaultOps;

/// Execute the `register` command.
pub async fn execute(ops: &VaultOps, path: &str) -> Result<()> {
    let path = resolve_vault_path(path)?;
    ops.register_vault(&path).await?;
    output::success("Vault registered");
    Ok(())
}
