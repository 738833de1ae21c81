//! Domains and bundles: the decrypted content of a vault.
//!
//! Both types are immutable values. Construction rejects duplicate names
//! and sorts children by name, so two bundles built from the same elements
//! in any order serialize identically.

use std::collections::HashSet;

use super::secret::{Named, Secret};
use crate::errors::{Result, WellKeptError};

/// Check that names are unique (exact, case-sensitive) and sort by name.
pub(crate) fn unique_sorted<T: Named>(mut elements: Vec<T>) -> Result<Vec<T>> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(elements.len());
    for element in &elements {
        if !seen.insert(element.name()) {
            return Err(WellKeptError::DuplicateName(element.name().to_string()));
        }
    }
    elements.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(elements)
}

/// A named group of secrets, typically the environment of one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    name: String,
    secrets: Vec<Secret>,
}

impl Domain {
    pub fn new(name: impl Into<String>, secrets: Vec<Secret>) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            secrets: unique_sorted(secrets)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Secrets sorted by name.
    pub fn secrets(&self) -> &[Secret] {
        &self.secrets
    }

    pub fn into_secrets(self) -> Vec<Secret> {
        self.secrets
    }
}

impl Named for Domain {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Every domain stored in one vault file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainsBundle {
    domains: Vec<Domain>,
}

impl DomainsBundle {
    pub fn new(domains: Vec<Domain>) -> Result<Self> {
        Ok(Self {
            domains: unique_sorted(domains)?,
        })
    }

    /// A bundle with no domains, the content of a freshly created vault.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Domains sorted by name.
    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn contains_domain(&self, name: &str) -> bool {
        self.domain(name).is_some()
    }

    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|domain| domain.name == name)
    }

    /// Swap the domain called `name` for `updated`, keeping all others.
    ///
    /// `updated` may carry a new name; the result is re-checked for
    /// uniqueness and re-sorted.
    pub fn replace_domain(self, name: &str, updated: Domain) -> Result<Self> {
        if !self.contains_domain(name) {
            return Err(WellKeptError::user(format!("No domain {name} found")));
        }
        let mut domains: Vec<Domain> = self
            .domains
            .into_iter()
            .filter(|domain| domain.name != name)
            .collect();
        domains.push(updated);
        Self::new(domains)
    }
}
