use clap::Parser;
use tracing_subscriber::EnvFilter;

use wellkept::cli::envchain::EnvchainCli;
use wellkept::cli::{build_editor, build_ops, commands, output, Cli, Commands};
use wellkept::config::Settings;
use wellkept::{Result, WellKeptError};

/// Environment variable holding the log filter, e.g. `WELLKEPT_LOG=debug`.
const LOG_ENV: &str = "WELLKEPT_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Logs go to stderr so `run` and `list` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        report(&e);
        let code = match e {
            WellKeptError::ChildProcessFailed(code) => code,
            _ => 1,
        };
        std::process::exit(code);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let settings = Settings::load_default()?;
    let ops = build_ops(&settings)?;

    match cli.command {
        Commands::Run {
            ref domain,
            ref command,
            ref args,
        } => commands::run::execute(&ops, domain, command, args).await,
        Commands::Create { ref path } => commands::create::execute(&ops, path).await,
        Commands::Register { ref path } => commands::register::execute(&ops, path).await,
        Commands::Deregister { ref path } => commands::deregister::execute(&ops, path).await,
        Commands::EditVault { ref path } => {
            commands::edit_vault::execute(&ops, &build_editor(&settings), path).await
        }
        Commands::Edit { ref domain } => {
            commands::edit::execute(&ops, &build_editor(&settings), domain).await
        }
        Commands::List { ref domain } => commands::list::execute(&ops, domain.as_deref()).await,
        Commands::ImportEnvchain {
            ref path,
            ref namespaces,
        } => {
            let source = EnvchainCli::new(settings.envchain_command.clone());
            commands::import_envchain::execute(&ops, &source, path, namespaces).await
        }
    }
}

/// User errors get one line; anything else is a bug or an environment
/// problem and gets the full detail.
fn report(e: &WellKeptError) {
    match e {
        // The child already spoke for itself.
        WellKeptError::ChildProcessFailed(_) => {}
        e if e.is_user_error() => output::error(&format!("Error: {e}")),
        e => {
            output::error("Unexpected error");
            eprintln!("{e:?}");
        }
    }
}
