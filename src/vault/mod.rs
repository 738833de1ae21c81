//! Vault module: the secret model and everything that reads or changes vaults.
//!
//! This module provides:
//! - `Secret`, `Domain` and `DomainsBundle` value types (`secret`, `domain`)
//! - JSON (persisted) and INI (editing) serialization (`format`)
//! - Reading a single vault file into a typed outcome (`reader`)
//! - Resolving all registered vaults (`registry`)
//! - Create / register / deregister / edit / import operations (`ops`)

pub mod domain;
pub mod format;
pub mod ops;
pub mod reader;
pub mod registry;
pub mod secret;

// Re-export the most commonly used items.
pub use domain::{Domain, DomainsBundle};
pub use format::{preprocess_ini_lines, BUNDLE_VERSION};
pub use ops::{DomainEdit, DomainStats, VaultOps, VaultStats};
pub use reader::{VaultFault, VaultRead, VaultStatus};
pub use registry::{VaultState, Vaults};
pub use secret::{Named, Secret};
