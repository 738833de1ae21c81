//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::VaultStats;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), style(msg).red());
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    eprintln!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Rows of the domain column: `[name]: N secrets`, or `No secrets`.
pub fn domain_lines(stats: &VaultStats) -> String {
    if stats.domains.is_empty() {
        return "No secrets".to_string();
    }
    stats
        .domains
        .iter()
        .map(|d| format!("[{}]: {} secrets", d.name, d.num_secrets))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print a table of registered vaults (Vault, Status, Domains).
pub fn print_vaults_table(vaults: &[VaultStats]) {
    if vaults.is_empty() {
        println!("No vaults registered");
        tip("Run `wellkept create <path>` to create your first vault.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Vault", "Status", "Domains"]);

    for v in vaults {
        let status = if v.ok {
            style(&v.status).green().to_string()
        } else {
            style(&v.status).red().to_string()
        };
        table.add_row(vec![v.vault_filepath.clone(), status, domain_lines(v)]);
    }

    println!("{table}");
}
