//! Configuration module.
//!
//! Values resolve in order: defaults, then the TOML config file, then CLI
//! flags. See [`loader`] for the file lookup rules.

pub mod loader;

pub use loader::{
    apply_cli_overrides, default_config_path, default_log_path, load_config_file,
    load_config_with_precedence, merge_config, CliOverrides, ConfigError, ConfigFile, ListConfig,
};
