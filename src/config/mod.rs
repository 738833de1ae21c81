//! User-level configuration loaded from `~/.wellkept.toml`.

pub mod settings;

pub use settings::Settings;
