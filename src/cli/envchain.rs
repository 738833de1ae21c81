//! Reading namespaces out of envchain by shelling out to it.
//!
//! `envchain --list <ns>` gives the names. Each value is then read whole
//! through `envchain <ns> printenv <NAME>`, so multi-line values such as
//! PEM keys survive intact.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{Result, WellKeptError};
use crate::store::EnvchainSource;

/// `EnvchainSource` backed by the `envchain` program.
#[derive(Debug, Clone)]
pub struct EnvchainCli {
    program: String,
    args: Vec<String>,
}

impl EnvchainCli {
    /// `command` may carry leading arguments, e.g. `"sh ./envchain.sh"`.
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        let mut parts = command.split_whitespace().map(str::to_owned);
        let program = parts.next().unwrap_or_else(|| "envchain".to_string());
        Self {
            program,
            args: parts.collect(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                WellKeptError::Command(format!("failed to launch '{}': {e}", self.program))
            })?;

        if !output.status.success() {
            return Err(WellKeptError::Command(format!(
                "'{} {}' failed: {}",
                self.program,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| WellKeptError::Command(format!("envchain output is not UTF-8: {e}")))
    }
}

/// Secret names from `envchain --list`, one per line. Anything that can't
/// be an environment variable name is an error rather than skipped.
pub fn parse_names(output: &str) -> Result<Vec<String>> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|name| {
            if name.contains('=') || name.contains(char::is_whitespace) {
                Err(WellKeptError::Command(format!(
                    "unexpected line in envchain listing: {name}"
                )))
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

/// `printenv` ends the value with one newline of its own.
fn printed_value(output: String) -> String {
    let mut value = output;
    if value.ends_with('\n') {
        value.pop();
    }
    value
}

#[async_trait]
impl EnvchainSource for EnvchainCli {
    async fn list_namespace_secrets(&self, namespace: &str) -> Result<Vec<(String, String)>> {
        let names = parse_names(&self.run(&["--list", namespace]).await?)?;

        let mut secrets = Vec::with_capacity(names.len());
        for name in names {
            let value = printed_value(self.run(&[namespace, "printenv", &name]).await?);
            secrets.push((name, value));
        }
        debug!(%namespace, count = secrets.len(), "read envchain namespace");
        Ok(secrets)
    }
}
