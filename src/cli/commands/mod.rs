//! One module per subcommand. Each exposes an `execute` function.

pub mod create;
pub mod deregister;
pub mod edit;
pub mod edit_vault;
pub mod import_envchain;
pub mod list;
pub mod register;
pub mod run;
