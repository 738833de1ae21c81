//! Cryptographic primitives for WellKept.
//!
//! This module provides:
//! - The `Encryption` contract consumed by the vault layer
//! - Argon2id password-based key derivation (`kdf`)
//! - The versioned AES-256-GCM vault cipher (`encryption`)

pub mod encryption;
pub mod kdf;

use serde_json::Value;

use crate::errors::Result;

pub use encryption::{PasswordCipher, VERSION_TAG};
pub use kdf::{derive_key, generate_salt, Argon2Params};

/// Turns a JSON document into a versioned ciphertext string and back.
///
/// `decrypt` must reject blobs whose version tag it does not recognise
/// (`VersionMismatch`) separately from a wrong password (`Decryption`).
pub trait Encryption: Send + Sync {
    fn encrypt(&self, data: &Value, password: &str) -> Result<String>;

    fn decrypt(&self, data: &str, password: &str) -> Result<Value>;
}
