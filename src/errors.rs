use thiserror::Error;

use crate::vault::VaultFault;

/// All errors that can occur in WellKept.
///
/// Variants fall into two classes. User errors come from precondition
/// violations, bad input or ambiguous state and are rendered as a short
/// message. Everything else is unexpected and rendered with full detail.
#[derive(Debug, Error)]
pub enum WellKeptError {
    // --- User errors ---
    #[error("{0}")]
    User(String),

    #[error("Duplicate name {0}")]
    DuplicateName(String),

    #[error("{0}")]
    Parse(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Unknown vault encryption version ({0}), try upgrading the app")]
    VersionMismatch(String),

    #[error("Invalid vault: {0}")]
    InvalidVault(VaultFault),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Config file error: {0}")]
    Config(String),

    // --- Unexpected errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Keyring error: {0}")]
    Keyring(String),

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Child process exited with code {0}")]
    ChildProcessFailed(i32),
}

impl WellKeptError {
    /// Shorthand for a user-facing error with a plain message.
    pub fn user(message: impl Into<String>) -> Self {
        Self::User(message.into())
    }

    /// Returns `true` for errors caused by the user or by vault state,
    /// as opposed to bugs and environment failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::User(_)
                | Self::DuplicateName(_)
                | Self::Parse(_)
                | Self::Decryption(_)
                | Self::VersionMismatch(_)
                | Self::InvalidVault(_)
                | Self::PasswordMismatch
                | Self::UserCancelled
                | Self::Config(_)
                | Self::ChildProcessFailed(_)
        )
    }
}

/// Convenience type alias for WellKept results.
pub type Result<T> = std::result::Result<T, WellKeptError>;
