//! Vault files on the local filesystem.

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::FileStore;
use crate::errors::Result;

/// Reads and writes vault files with `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn check_file_exists(&self, filepath: &str) -> Result<bool> {
        match fs::metadata(filepath).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_vault_file(&self, filepath: &str) -> Result<String> {
        Ok(fs::read_to_string(filepath).await?)
    }

    /// Write **atomically**: temp file in the same directory, then rename,
    /// so a reader never sees a half-written vault.
    async fn write_vault_file(&self, filepath: &str, content: &str) -> Result<()> {
        let path = Path::new(filepath);
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));

        // A leftover from a crashed write may carry looser permissions.
        match fs::remove_file(&tmp_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&tmp_path).await?;
        let written = async {
            file.write_all(content.as_bytes()).await?;
            file.sync_all().await
        }
        .await;
        drop(file);
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&tmp_path, path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        tracing::debug!(path = %filepath, bytes = content.len(), "wrote vault file");
        Ok(())
    }
}
