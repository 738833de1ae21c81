//! Editing text in the user's editor.
//!
//! The text goes to a private temp file, `$VISUAL` / `$EDITOR` / `vi` is
//! launched on it, and the file is wiped as soon as it has been read back.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use zeroize::Zeroizing;

use super::{TextEditor, Validator};
use crate::cli::output;
use crate::errors::{Result, WellKeptError};

/// Runs an external editor program.
#[derive(Debug, Clone, Default)]
pub struct ExternalEditor {
    command: Option<String>,
}

impl ExternalEditor {
    /// `command` overrides the environment, e.g. `Some("code --wait")`.
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }

    /// Program and arguments of the editor to launch.
    fn editor_command(&self) -> (String, Vec<String>) {
        let configured = self
            .command
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(find_editor);

        let mut parts = configured.split_whitespace().map(str::to_owned);
        let program = parts.next().unwrap_or_else(|| "vi".to_string());
        (program, parts.collect())
    }

    /// One editor session: returns the file content after the editor exits.
    async fn edit_once(&self, text: &str) -> Result<Zeroizing<String>> {
        let tmp_path = write_temp_file(text)?;
        let (program, args) = self.editor_command();
        debug!(editor = %program, "launching editor");

        let status = tokio::process::Command::new(&program)
            .args(&args)
            .arg(&tmp_path)
            .status()
            .await;

        let status = match status {
            Ok(status) => status,
            Err(e) => {
                secure_delete(&tmp_path);
                return Err(WellKeptError::Editor(format!(
                    "failed to launch '{program}': {e}"
                )));
            }
        };

        if !status.success() {
            secure_delete(&tmp_path);
            return Err(WellKeptError::Editor(format!(
                "editor exited with code {}",
                status.code().unwrap_or(-1)
            )));
        }

        let edited = fs::read_to_string(&tmp_path)
            .map(Zeroizing::new)
            .map_err(|e| WellKeptError::Editor(format!("failed to read edited file: {e}")));
        secure_delete(&tmp_path);
        edited
    }
}

#[async_trait]
impl TextEditor for ExternalEditor {
    async fn edit_text(
        &self,
        input: &str,
        label: &str,
        validator: &Validator<'_>,
    ) -> Result<String> {
        output::info(&format!("Editing {label}"));
        let mut text = Zeroizing::new(input.to_owned());

        loop {
            let edited = self.edit_once(&text).await?;
            let Some(message) = validator(&edited) else {
                return Ok(edited.to_string());
            };

            output::error(&message);
            if !confirm_reopen()? {
                return Err(WellKeptError::UserCancelled);
            }
            text = edited;
        }
    }
}

fn confirm_reopen() -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt("Re-open the editor to fix it?")
        .default(true)
        .interact()
        .map_err(|e| WellKeptError::Editor(format!("prompt failed: {e}")))
}

/// Find the user's preferred editor.
fn find_editor() -> String {
    for var in ["VISUAL", "EDITOR"] {
        if let Ok(editor) = std::env::var(var) {
            if !editor.trim().is_empty() {
                return editor;
            }
        }
    }
    "vi".to_string()
}

/// Write `text` to a fresh temp file only the current user can read.
fn write_temp_file(text: &str) -> Result<PathBuf> {
    let filename = format!(
        "wellkept-edit-{}-{:016x}.ini",
        std::process::id(),
        rand::random::<u64>()
    );
    let tmp_path = std::env::temp_dir().join(filename);

    // create_new + mode in one call: no window where the file is readable.
    #[cfg(unix)]
    let mut file = {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&tmp_path)
            .map_err(|e| WellKeptError::Editor(format!("failed to create temp file: {e}")))?
    };

    #[cfg(not(unix))]
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|e| WellKeptError::Editor(format!("failed to create temp file: {e}")))?;

    file.write_all(text.as_bytes())?;
    file.flush()?;
    Ok(tmp_path)
}

/// Overwrite a file's contents with zeros, then delete it. Best effort.
fn secure_delete(path: &Path) {
    if let Ok(metadata) = fs::metadata(path) {
        let len = metadata.len() as usize;
        if len > 0 {
            if let Ok(mut file) = fs::OpenOptions::new().write(true).open(path) {
                let _ = file.write_all(&vec![0u8; len]);
                let _ = file.flush();
            }
        }
    }
    let _ = fs::remove_file(path);
}
