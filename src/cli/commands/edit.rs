//! `wellkept edit`: edit one domain inside whichever vault holds it.

use crate::cli::output;
use crate::errors::Result;
use crate::interact::TextEditor;
use crate::vault::{DomainEdit, VaultOps};

/// Execute the `edit` command.
pub async fn execute(ops: &VaultOps, editor: &dyn TextEditor, domain: &str) -> Result<()> {
    match ops.edit_domain(domain, editor).await? {
        DomainEdit::Updated { vault_filepath } => {
            output::success(&format!("Vault {vault_filepath} updated"))
        }
        DomainEdit::Unchanged => output::success("No changes applied"),
    }
    Ok(())
}
