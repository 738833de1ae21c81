use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{Result, WellKeptError};

/// User configuration, loaded from `.wellkept.toml` in the home directory.
///
/// Every field has a default so WellKept works without any config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Keyring service under which vault passwords are registered.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Program used to read envchain namespaces during import.
    #[serde(default = "default_envchain_command")]
    pub envchain_command: String,

    /// Editor override. Falls back to `$VISUAL`, `$EDITOR`, then `vi`.
    #[serde(default)]
    pub editor: Option<String>,

    /// Argon2 memory cost in KiB used when encrypting (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Minimum length accepted for a new vault password.
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_keyring_service() -> String {
    "wellkept-secrets".to_string()
}

fn default_envchain_command() -> String {
    "envchain".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_min_password_len() -> usize {
    8
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            keyring_service: default_keyring_service(),
            envchain_command: default_envchain_command(),
            editor: None,
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            min_password_len: default_min_password_len(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the config directory.
    const FILE_NAME: &'static str = ".wellkept.toml";

    /// Environment variable that overrides the config directory.
    const DIR_ENV: &'static str = "WELLKEPT_CONFIG_DIR";

    /// Load settings from `<config_dir>/.wellkept.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            WellKeptError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        tracing::debug!(path = %config_path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load settings from the default config directory, or defaults when
    /// no home directory can be determined.
    pub fn load_default() -> Result<Self> {
        match Self::config_dir() {
            Some(dir) => Self::load(&dir),
            None => Ok(Self::default()),
        }
    }

    /// `$WELLKEPT_CONFIG_DIR`, else the user's home directory.
    pub fn config_dir() -> Option<PathBuf> {
        [Self::DIR_ENV, "HOME", "USERPROFILE"]
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .find(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
