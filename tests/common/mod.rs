//! Fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use zeroize::Zeroizing;

use wellkept::crypto::{Argon2Params, Encryption, PasswordCipher};
use wellkept::errors::{Result, WellKeptError};
use wellkept::interact::{PasswordInput, TextEditor, Validator};
use wellkept::store::{
    CredentialId, CredentialStatus, EnvchainSource, MemoryCredentialStore, MemoryFileStore,
};
use wellkept::vault::{Domain, DomainsBundle, Secret, VaultOps, Vaults};

/// Cheap Argon2 parameters so tests stay fast.
pub fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn fast_cipher() -> PasswordCipher {
    PasswordCipher::new(fast_params())
}

/// A cipher that counts how often it is used.
#[derive(Default)]
pub struct CountingCipher {
    inner: PasswordCipher,
    encrypts: AtomicUsize,
    decrypts: AtomicUsize,
}

impl CountingCipher {
    pub fn new() -> Self {
        Self {
            inner: fast_cipher(),
            ..Self::default()
        }
    }

    pub fn encrypt_count(&self) -> usize {
        self.encrypts.load(Ordering::SeqCst)
    }

    pub fn decrypt_count(&self) -> usize {
        self.decrypts.load(Ordering::SeqCst)
    }
}

impl Encryption for CountingCipher {
    fn encrypt(&self, data: &Value, password: &str) -> Result<String> {
        self.encrypts.fetch_add(1, Ordering::SeqCst);
        self.inner.encrypt(data, password)
    }

    fn decrypt(&self, data: &str, password: &str) -> Result<Value> {
        self.decrypts.fetch_add(1, Ordering::SeqCst);
        self.inner.decrypt(data, password)
    }
}

/// Answers password prompts with a fixed password.
pub struct FixedPasswordInput {
    password: String,
    mismatch: bool,
    prompts: AtomicUsize,
}

impl FixedPasswordInput {
    pub fn new(password: &str) -> Self {
        Self {
            password: password.to_string(),
            mismatch: false,
            prompts: AtomicUsize::new(0),
        }
    }

    /// The user types two different passwords when choosing one.
    pub fn mismatching() -> Self {
        Self {
            mismatch: true,
            ..Self::new("unused")
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl PasswordInput for FixedPasswordInput {
    fn choose_new_password(&self) -> Result<Zeroizing<String>> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        if self.mismatch {
            return Err(WellKeptError::PasswordMismatch);
        }
        Ok(Zeroizing::new(self.password.clone()))
    }

    fn enter_password(&self) -> Result<Zeroizing<String>> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        Ok(Zeroizing::new(self.password.clone()))
    }
}

/// Plays back scripted editor sessions.
///
/// Each response is one save. A response the validator rejects counts as
/// a session the user re-opens, so the next response is tried. Running out
/// of responses means the user gave up. With no responses at all the text
/// comes back untouched.
#[derive(Default)]
pub struct ScriptedEditor {
    responses: Mutex<VecDeque<String>>,
    shown: Mutex<Vec<String>>,
    rejections: Mutex<Vec<String>>,
}

impl ScriptedEditor {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn saving(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            ..Self::default()
        }
    }

    /// Texts the editor was opened with.
    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }

    /// Validator messages the user saw.
    pub fn rejections(&self) -> Vec<String> {
        self.rejections.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextEditor for ScriptedEditor {
    async fn edit_text(
        &self,
        input: &str,
        _label: &str,
        validator: &Validator<'_>,
    ) -> Result<String> {
        self.shown.lock().unwrap().push(input.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(input.to_string());
        }
        while let Some(text) = responses.pop_front() {
            match validator(&text) {
                None => return Ok(text),
                Some(message) => self.rejections.lock().unwrap().push(message),
            }
        }
        Err(WellKeptError::UserCancelled)
    }
}

/// Envchain namespaces held in a map.
#[derive(Default)]
pub struct FakeEnvchain {
    namespaces: HashMap<String, Vec<(String, String)>>,
}

impl FakeEnvchain {
    pub fn with(mut self, namespace: &str, pairs: &[(&str, &str)]) -> Self {
        self.namespaces.insert(
            namespace.to_string(),
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }
}

#[async_trait]
impl EnvchainSource for FakeEnvchain {
    async fn list_namespace_secrets(&self, namespace: &str) -> Result<Vec<(String, String)>> {
        Ok(self.namespaces.get(namespace).cloned().unwrap_or_default())
    }
}

/// In-memory stores wired into `VaultOps`.
pub struct Harness {
    pub credentials: MemoryCredentialStore,
    pub files: MemoryFileStore,
    pub cipher: Arc<CountingCipher>,
    pub input: Arc<FixedPasswordInput>,
    pub ops: VaultOps,
}

impl Harness {
    pub fn new(password: &str) -> Self {
        Self::with_input(FixedPasswordInput::new(password))
    }

    pub fn with_input(input: FixedPasswordInput) -> Self {
        let credentials = MemoryCredentialStore::new();
        let files = MemoryFileStore::new();
        let cipher = Arc::new(CountingCipher::new());
        let input = Arc::new(input);
        let vaults = Vaults::new(
            Arc::new(credentials.clone()),
            Arc::new(files.clone()),
            cipher.clone(),
        );
        let ops = VaultOps::new(vaults, input.clone());
        Self {
            credentials,
            files,
            cipher,
            input,
            ops,
        }
    }

    /// Write an encrypted vault and register it, bypassing the counters.
    pub async fn seed_vault(&self, path: &str, password: &str, bundle: &DomainsBundle) -> CredentialId {
        self.seed_file(path, password, bundle).await;
        self.credentials
            .insert(path, password, CredentialStatus::Ok)
            .await
    }

    /// Write an encrypted vault file without registering it.
    pub async fn seed_file(&self, path: &str, password: &str, bundle: &DomainsBundle) {
        let blob = fast_cipher().encrypt(&bundle.to_json(), password).unwrap();
        self.files.seed(path, &blob).await;
    }

    /// Decrypt a vault file with the fast cipher.
    pub async fn open_file(&self, path: &str, password: &str) -> DomainsBundle {
        let blob = self.files.content(path).await.expect("vault file exists");
        let value = fast_cipher().decrypt(&blob, password).unwrap();
        DomainsBundle::parse_json(&value).unwrap()
    }
}

pub fn domain(name: &str, secrets: &[(&str, &str)]) -> Domain {
    Domain::new(
        name,
        secrets.iter().map(|(n, v)| Secret::new(*n, *v)).collect(),
    )
    .unwrap()
}

pub fn bundle(domains: Vec<Domain>) -> DomainsBundle {
    DomainsBundle::new(domains).unwrap()
}
