//! Versioned password encryption for vault files.
//!
//! A vault blob is one ASCII version tag followed by base64 data:
//!
//! ```text
//! "A" base64( m_cost u32 LE | t_cost u32 LE | p_cost u32 LE | salt[32] | nonce[12] | ciphertext+tag )
//! ```
//!
//! The key is derived per blob with Argon2id from the password and a fresh
//! salt, then used with AES-256-GCM and a fresh random nonce. Encrypting the
//! same plaintext twice therefore never produces the same blob.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use zeroize::Zeroizing;

use super::kdf::{derive_key, generate_salt, Argon2Params, SALT_LEN};
use super::Encryption;
use crate::errors::{Result, WellKeptError};

/// Tag of the current encryption scheme.
pub const VERSION_TAG: char = 'A';

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
const TAG_LEN: usize = 16;

/// Three little-endian u32 KDF parameters.
const PARAMS_LEN: usize = 12;

const HEADER_LEN: usize = PARAMS_LEN + SALT_LEN + NONCE_LEN;

/// Password cipher implementing scheme `A`.
///
/// `params` only affect encryption; decryption reads the parameters
/// stored in the blob.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordCipher {
    params: Argon2Params,
}

impl PasswordCipher {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Argon2Params {
        &self.params
    }

    /// Encrypt raw bytes into a versioned blob.
    pub fn seal(&self, plaintext: &[u8], password: &str) -> Result<String> {
        let salt = generate_salt();
        let key = derive_key(password.as_bytes(), &salt, &self.params)?;

        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| WellKeptError::Encryption(format!("invalid key length: {e}")))?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| WellKeptError::Encryption(format!("encryption error: {e}")))?;

        let mut payload = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        payload.extend_from_slice(&self.params.memory_kib.to_le_bytes());
        payload.extend_from_slice(&self.params.iterations.to_le_bytes());
        payload.extend_from_slice(&self.params.parallelism.to_le_bytes());
        payload.extend_from_slice(&salt);
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&ciphertext);

        let mut blob = String::with_capacity(1 + payload.len() * 4 / 3 + 4);
        blob.push(VERSION_TAG);
        blob.push_str(&BASE64.encode(&payload));
        Ok(blob)
    }

    /// Decrypt a versioned blob back into raw bytes.
    ///
    /// Fails with `VersionMismatch` before any key derivation when the tag
    /// is missing or unknown, and with `Decryption` on a wrong password or
    /// corrupted data.
    pub fn open(&self, blob: &str, password: &str) -> Result<Zeroizing<Vec<u8>>> {
        let body = strip_version_tag(blob)?;

        let payload = BASE64
            .decode(body.trim_end())
            .map_err(|e| WellKeptError::Decryption(format!("malformed payload: {e}")))?;
        if payload.len() < HEADER_LEN + TAG_LEN {
            return Err(WellKeptError::Decryption("payload too short".into()));
        }

        let (params_bytes, rest) = payload.split_at(PARAMS_LEN);
        let (salt, rest) = rest.split_at(SALT_LEN);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

        let params = Argon2Params {
            memory_kib: read_u32(&params_bytes[0..4]),
            iterations: read_u32(&params_bytes[4..8]),
            parallelism: read_u32(&params_bytes[8..12]),
        };
        params
            .validate()
            .map_err(|e| WellKeptError::Decryption(format!("corrupted header: {e}")))?;

        let key = derive_key(password.as_bytes(), salt, &params)
            .map_err(|e| WellKeptError::Decryption(format!("corrupted header: {e}")))?;
        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|_| WellKeptError::Decryption("invalid key".into()))?;

        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| WellKeptError::Decryption("wrong password or corrupted data".into()))
    }
}

impl Encryption for PasswordCipher {
    fn encrypt(&self, data: &Value, password: &str) -> Result<String> {
        let plaintext = Zeroizing::new(
            serde_json::to_vec(data).map_err(|e| WellKeptError::Serialization(e.to_string()))?,
        );
        self.seal(&plaintext, password)
    }

    fn decrypt(&self, data: &str, password: &str) -> Result<Value> {
        let plaintext = self.open(data, password)?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| WellKeptError::Decryption(format!("plaintext is not JSON: {e}")))
    }
}

fn strip_version_tag(blob: &str) -> Result<&str> {
    let mut chars = blob.chars();
    match chars.next() {
        Some(VERSION_TAG) => Ok(chars.as_str()),
        Some(other) => Err(WellKeptError::VersionMismatch(format!("{other:?}"))),
        None => Err(WellKeptError::VersionMismatch("missing".into())),
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}
