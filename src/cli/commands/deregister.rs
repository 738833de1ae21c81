//! `wellkept deregister`: forget a vault, leaving its file in place.

use crate::cli::{output, resolve_vault_path};
use crate::errors::Result;
use crate::vault::VaultOps;

/// Execute the `deregister` command.
pub async fn execute(ops: &VaultOps, path: &str) -> Result<()> {
    let path = resolve_vault_path(path)?;
    let removed = ops.deregister_vault(&path).await?;
    if removed > 1 {
        output::warning(&format!("Removed {removed} credential records for {path}"));
    }
    output::success("Vault deregistered");
    Ok(())
}
