//! Password prompts on the terminal.

use zeroize::Zeroizing;

use super::PasswordInput;
use crate::cli::output;
use crate::errors::{Result, WellKeptError};

/// Environment variable that answers every password prompt (scripting).
pub const PASSWORD_ENV: &str = "WELLKEPT_PASSWORD";

/// Prompts with `dialoguer`, unless `WELLKEPT_PASSWORD` is set.
#[derive(Debug, Clone)]
pub struct TerminalPasswordInput {
    min_len: usize,
}

impl TerminalPasswordInput {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    fn prompt(prompt: &str) -> Result<Zeroizing<String>> {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map(Zeroizing::new)
            .map_err(|e| WellKeptError::Command(format!("password prompt: {e}")))
    }
}

impl Default for TerminalPasswordInput {
    fn default() -> Self {
        Self::new(8)
    }
}

/// Returns a non-empty password from the environment, if any.
fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Enforce the minimum password length.
pub fn check_new_password(password: &str, min_len: usize) -> Result<()> {
    if password.chars().count() < min_len {
        return Err(WellKeptError::user(format!(
            "Password must be at least {min_len} characters"
        )));
    }
    Ok(())
}

impl PasswordInput for TerminalPasswordInput {
    fn choose_new_password(&self) -> Result<Zeroizing<String>> {
        if let Some(pw) = password_from_env() {
            check_new_password(&pw, self.min_len)?;
            return Ok(pw);
        }

        loop {
            let first = Self::prompt("Choose a password")?;
            if let Err(e) = check_new_password(&first, self.min_len) {
                output::warning(&format!("{e}. Try again."));
                continue;
            }
            let second = Self::prompt("Repeat password")?;
            if *first != *second {
                return Err(WellKeptError::PasswordMismatch);
            }
            return Ok(first);
        }
    }

    fn enter_password(&self) -> Result<Zeroizing<String>> {
        match password_from_env() {
            Some(pw) => Ok(pw),
            None => Self::prompt("Password"),
        }
    }
}
