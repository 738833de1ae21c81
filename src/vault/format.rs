//! The two serializations of a `DomainsBundle`.
//!
//! **Canonical JSON** is what gets encrypted into a vault file:
//!
//! ```text
//! {"v": 1, "domains": [{"name": "...", "secrets": [{"name": "...", "value": "..."}]}]}
//! ```
//!
//! **INI** is only shown in the editor and never persisted:
//!
//! ```text
//! [some-domain]
//! VAR1=foo
//! VAR2=bar
//!
//! [another-domain]
//! VAR3=
//! ```
//!
//! Blank lines carry no meaning in INI: every line starting with `[` opens
//! a new domain. Lines are trimmed before parsing.

use serde_json::{json, Map, Value};

use super::domain::{Domain, DomainsBundle};
use super::secret::Secret;
use crate::errors::{Result, WellKeptError};

/// Schema version of the canonical JSON document.
pub const BUNDLE_VERSION: u64 = 1;

fn parse_error(message: impl Into<String>) -> WellKeptError {
    WellKeptError::Parse(message.into())
}

/// Present and non-null.
fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

/// A required, non-empty string field.
fn name_field(object: &Map<String, Value>, owner: &str) -> Result<String> {
    match field(object, "name") {
        None => Err(parse_error(format!("{owner}: missing \"name\""))),
        Some(Value::String(name)) if name.is_empty() => {
            Err(parse_error(format!("{owner}: missing \"name\"")))
        }
        Some(Value::String(name)) => Ok(name.clone()),
        Some(_) => Err(parse_error(format!("{owner}: \"name\" is not a string"))),
    }
}

// ---------------------------------------------------------------------------
// Canonical JSON
// ---------------------------------------------------------------------------

impl Secret {
    pub fn to_json(&self) -> Value {
        json!({ "name": self.name, "value": self.value })
    }

    pub fn parse_json(data: &Value) -> Result<Self> {
        let object = data
            .as_object()
            .ok_or_else(|| parse_error("Secret: expected object"))?;
        let name = name_field(object, "Secret")?;
        let value = match object.get("value") {
            Some(Value::String(value)) => value.clone(),
            _ => return Err(parse_error("Secret: \"value\" is not a string")),
        };
        Ok(Secret { name, value })
    }
}

impl Domain {
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name(),
            "secrets": self.secrets().iter().map(Secret::to_json).collect::<Vec<_>>(),
        })
    }

    pub fn parse_json(data: &Value) -> Result<Self> {
        let object = data
            .as_object()
            .ok_or_else(|| parse_error("Domain: expected object"))?;
        let name = name_field(object, "Domain")?;
        let secrets = field(object, "secrets")
            .ok_or_else(|| parse_error("Domain: missing \"secrets\""))?
            .as_array()
            .ok_or_else(|| parse_error("Domain: \"secrets\" is not an array"))?
            .iter()
            .map(Secret::parse_json)
            .collect::<Result<Vec<_>>>()?;
        Domain::new(name, secrets)
    }
}

impl DomainsBundle {
    pub fn to_json(&self) -> Value {
        json!({
            "v": BUNDLE_VERSION,
            "domains": self.domains().iter().map(Domain::to_json).collect::<Vec<_>>(),
        })
    }

    /// Parse the canonical document.
    ///
    /// The version check runs before the domains are looked at: a document
    /// from a newer schema is refused even when it happens to look valid.
    pub fn parse_json(data: &Value) -> Result<Self> {
        let object = data
            .as_object()
            .ok_or_else(|| parse_error("DomainsBundle: expected object"))?;
        let domains = field(object, "domains")
            .ok_or_else(|| parse_error("DomainsBundle: missing \"domains\""))?;
        // Integer only: this app never writes `1.0`, so a float is foreign.
        if object.get("v").and_then(Value::as_u64) != Some(BUNDLE_VERSION) {
            return Err(parse_error(
                "DomainsBundle: unknown version, try upgrading the app",
            ));
        }
        let domains = domains
            .as_array()
            .ok_or_else(|| parse_error("DomainsBundle: \"domains\" is not an array"))?
            .iter()
            .map(Domain::parse_json)
            .collect::<Result<Vec<_>>>()?;
        DomainsBundle::new(domains)
    }
}

// ---------------------------------------------------------------------------
// INI
// ---------------------------------------------------------------------------

/// Split into lines, drop blank ones and trim the rest.
pub fn preprocess_ini_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

impl Secret {
    pub fn to_ini(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Parse one `NAME=value` row. Only the first `=` separates.
    pub fn parse_ini(line: &str) -> Result<Self> {
        if line.starts_with('[') {
            return Err(parse_error(
                "Domain: invalid character \"[\" in variable name",
            ));
        }
        let (name, value) = line
            .split_once('=')
            .ok_or_else(|| parse_error("Domain: missing \"=\" sign in variable row"))?;
        if name.is_empty() {
            return Err(parse_error(format!(
                "Domain: missing variable name in row \"{line}\""
            )));
        }
        Ok(Secret::new(name, value))
    }
}

impl Domain {
    pub fn to_ini(&self) -> String {
        std::iter::once(format!("[{}]", self.name()))
            .chain(self.secrets().iter().map(Secret::to_ini))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse a `[name]` header line followed by variable rows.
    pub fn parse_ini(lines: &[&str]) -> Result<Self> {
        let (header, rows) = lines
            .split_first()
            .ok_or_else(|| parse_error("Domain: no lines"))?;
        let name = header
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| parse_error("Domain: first line should be \"[section]\""))?;
        if name.is_empty() {
            return Err(parse_error("Domain: empty section name \"[]\""));
        }
        let secrets = rows
            .iter()
            .map(|row| Secret::parse_ini(row))
            .collect::<Result<Vec<_>>>()?;
        Domain::new(name, secrets)
    }

    /// Convenience: preprocess then parse a single domain.
    pub fn parse_ini_text(text: &str) -> Result<Self> {
        Self::parse_ini(&preprocess_ini_lines(text))
    }
}

impl DomainsBundle {
    pub fn to_ini(&self) -> String {
        let mut text = self
            .domains()
            .iter()
            .map(Domain::to_ini)
            .collect::<Vec<_>>()
            .join("\n\n");
        text.push('\n');
        text
    }

    /// Parse preprocessed lines into a bundle.
    ///
    /// Lines before the first `[` header form a block of their own, which
    /// then fails the header check.
    pub fn parse_ini(lines: &[&str]) -> Result<Self> {
        let mut blocks: Vec<Vec<&str>> = Vec::new();
        for &line in lines {
            if line.starts_with('[') || blocks.is_empty() {
                blocks.push(Vec::new());
            }
            if let Some(block) = blocks.last_mut() {
                block.push(line);
            }
        }
        let domains = blocks
            .iter()
            .map(|block| Domain::parse_ini(block))
            .collect::<Result<Vec<_>>>()?;
        DomainsBundle::new(domains)
    }

    /// Convenience: preprocess then parse a whole bundle.
    pub fn parse_ini_text(text: &str) -> Result<Self> {
        Self::parse_ini(&preprocess_ini_lines(text))
    }
}
