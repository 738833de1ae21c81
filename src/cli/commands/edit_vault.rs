//! `wellkept edit-vault`: edit an entire vault in the user's editor.

use crate::cli::{output, resolve_vault_path};
use crate::errors::Result;
use crate::interact::TextEditor;
use crate::vault::VaultOps;

/// Execute the `edit-vault` command.
pub async fn execute(ops: &VaultOps, editor: &dyn TextEditor, path: &str) -> Result<()> {
    let path = resolve_vault_path(path)?;
    if ops.edit_vault(&path, editor).await? {
        output::success("Vault updated");
    } else {
        output::success("No changes applied");
    }
    Ok(())
}
