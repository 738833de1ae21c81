//! Interactive collaborators: the text editor and password prompts.

pub mod editor;
pub mod password;

pub use editor::ExternalEditor;
pub use password::TerminalPasswordInput;

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::errors::Result;

/// Checks edited text; `Some(message)` rejects it. `'v` lets the check
/// borrow from its caller.
pub type Validator<'v> = dyn for<'a> Fn(&'a str) -> Option<String> + Send + Sync + 'v;

/// Lets a user edit text and hands back the final version.
///
/// `validator` returns an error message for text that would be rejected.
/// Implementations must run it before accepting the edit and give the user
/// a chance to fix the text instead of throwing their edits away.
#[async_trait]
pub trait TextEditor: Send + Sync {
    async fn edit_text(
        &self,
        input: &str,
        label: &str,
        validator: &Validator<'_>,
    ) -> Result<String>;
}

/// Asks the user for vault passwords.
pub trait PasswordInput: Send + Sync {
    /// A new password, entered twice. Mismatch fails with `PasswordMismatch`.
    fn choose_new_password(&self) -> Result<Zeroizing<String>>;

    fn enter_password(&self) -> Result<Zeroizing<String>>;
}
