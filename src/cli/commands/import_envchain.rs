//! `wellkept import-envchain`: build a new vault out of envchain namespaces.

use crate::cli::{output, resolve_vault_path};
use crate::errors::Result;
use crate::store::EnvchainSource;
use crate::vault::VaultOps;

/// Execute the `import-envchain` command.
pub async fn execute(
    ops: &VaultOps,
    source: &dyn EnvchainSource,
    path: &str,
    namespaces: &[String],
) -> Result<()> {
    let path = resolve_vault_path(path)?;
    if namespaces.is_empty() {
        output::warning("No namespaces given, the vault will be empty");
    }
    ops.import_from_envchain(&path, namespaces, source).await?;
    output::success("Vault created");
    Ok(())
}
