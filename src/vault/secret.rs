//! A single name/value pair inside a domain.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret, usually exported to a child process as an environment variable.
///
/// The value may be empty. `Debug` never prints the value, and both
/// strings are wiped when the secret is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    pub name: String,
    pub value: String,
}

impl Secret {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Anything identified by a name that must be unique among its siblings.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Secret {
    fn name(&self) -> &str {
        &self.name
    }
}
