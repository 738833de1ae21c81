//! `wellkept run`: run a command with a domain's secrets in its environment.

use tokio::process::Command;
use tracing::debug;

use crate::errors::{Result, WellKeptError};
use crate::vault::{Secret, VaultOps};

/// Execute the `run` command.
pub async fn execute(ops: &VaultOps, domain: &str, command: &str, args: &[String]) -> Result<()> {
    let secrets = ops.get_secrets(domain).await?;
    debug!(%domain, count = secrets.len(), "injecting secrets");

    let status = shell_command(command, args, &secrets)
        .status()
        .await
        .map_err(|e| WellKeptError::Command(format!("failed to launch '{command}': {e}")))?;

    // Forward the child's exit code.
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(WellKeptError::ChildProcessFailed(code)),
        None => Err(WellKeptError::Command(
            "child process terminated by signal".into(),
        )),
    }
}

/// The command line joined with spaces and handed to the platform shell,
/// with the inherited environment plus the secrets. Stdio is inherited.
fn shell_command(command: &str, args: &[String], secrets: &[Secret]) -> Command {
    let line = std::iter::once(command)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");

    #[cfg(unix)]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&line);
        cmd
    };

    #[cfg(not(unix))]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(&line);
        cmd
    };

    cmd.envs(secrets.iter().map(|s| (s.name.as_str(), s.value.as_str())));
    cmd
}
