//! Configuration file loading with precedence handling.

use crate::layout::LayoutParams;
use crate::model::{ListType, Orientation};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "LISTKIT_CONFIG";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A value parsed but is outside its allowed range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending key.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/listkit/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// `single` or `waterfall`.
    #[serde(default)]
    pub list_type: Option<ListType>,

    /// Number of columns for waterfall lists.
    #[serde(default)]
    pub span_count: Option<usize>,

    /// `vertical` or `horizontal`.
    #[serde(default)]
    pub orientation: Option<Orientation>,

    /// Gap between items of one column.
    #[serde(default)]
    pub main_axis_gap: Option<f32>,

    /// Gap between columns.
    #[serde(default)]
    pub cross_axis_gap: Option<f32>,

    /// Items kept bound beyond each viewport edge.
    #[serde(default)]
    pub preload_buffer_count: Option<usize>,

    /// Coalesce binds into one factory dispatch per pass.
    #[serde(default)]
    pub enable_batch_render: Option<bool>,

    /// Main-axis size for items without measurement or estimate.
    #[serde(default)]
    pub default_item_size: Option<f32>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved list configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ListConfig {
    /// Layout algorithm.
    pub list_type: ListType,
    /// Number of columns; `single` lists always use 1.
    pub span_count: usize,
    /// Scroll direction.
    pub orientation: Orientation,
    /// Gap between items of one column.
    pub main_axis_gap: f32,
    /// Gap between columns.
    pub cross_axis_gap: f32,
    /// Items kept bound beyond each viewport edge.
    pub preload_buffer_count: usize,
    /// Coalesce binds into one factory dispatch per pass.
    pub enable_batch_render: bool,
    /// Main-axis size for items without measurement or estimate.
    pub default_item_size: f32,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            list_type: ListType::Single,
            span_count: 1,
            orientation: Orientation::Vertical,
            main_axis_gap: 0.0,
            cross_axis_gap: 0.0,
            preload_buffer_count: 0,
            enable_batch_render: false,
            default_item_size: 100.0,
            log_file_path: default_log_path(),
        }
    }
}

impl ListConfig {
    /// Check every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.span_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "span_count",
                reason: "must be at least 1".to_string(),
            });
        }
        let non_negative = [
            ("main_axis_gap", self.main_axis_gap),
            ("cross_axis_gap", self.cross_axis_gap),
            ("default_item_size", self.default_item_size),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be a finite non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Layout parameters implied by this configuration.
    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            orientation: self.orientation,
            span_count: match self.list_type {
                ListType::Single => 1,
                ListType::Waterfall => self.span_count.max(1),
            },
            main_axis_gap: self.main_axis_gap,
            cross_axis_gap: self.cross_axis_gap,
            default_item_size: self.default_item_size,
            preload_buffer_count: self.preload_buffer_count,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/listkit/listkit.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("listkit").join("listkit.log"),
        None => PathBuf::from("listkit.log"),
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/listkit/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("listkit").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (like CLI `--config`)
/// 2. `LISTKIT_CONFIG` environment variable
/// 3. Default path `~/.config/listkit/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    match std::env::var(CONFIG_ENV_VAR) {
        Ok(env_path) if env_path.is_empty() => {
            return Err(ConfigError::InvalidPath(format!("{CONFIG_ENV_VAR} is empty")));
        }
        Ok(env_path) => return load_config_file(PathBuf::from(env_path)),
        Err(std::env::VarError::NotUnicode(raw)) => {
            return Err(ConfigError::InvalidPath(raw.to_string_lossy().into_owned()));
        }
        Err(std::env::VarError::NotPresent) => {}
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the merged config is out of range.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ListConfig, ConfigError> {
    let defaults = ListConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    let resolved = ListConfig {
        list_type: config.list_type.unwrap_or(defaults.list_type),
        span_count: config.span_count.unwrap_or(defaults.span_count),
        orientation: config.orientation.unwrap_or(defaults.orientation),
        main_axis_gap: config.main_axis_gap.unwrap_or(defaults.main_axis_gap),
        cross_axis_gap: config.cross_axis_gap.unwrap_or(defaults.cross_axis_gap),
        preload_buffer_count: config
            .preload_buffer_count
            .unwrap_or(defaults.preload_buffer_count),
        enable_batch_render: config
            .enable_batch_render
            .unwrap_or(defaults.enable_batch_render),
        default_item_size: config.default_item_size.unwrap_or(defaults.default_item_size),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    };
    resolved.validate()?;
    Ok(resolved)
}

/// Command-line overrides; `None` leaves the file value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    /// From `--list-type`.
    pub list_type: Option<ListType>,
    /// From `--span-count`.
    pub span_count: Option<usize>,
    /// From `--batch`.
    pub enable_batch_render: Option<bool>,
    /// From `--preload`.
    pub preload_buffer_count: Option<usize>,
}

/// Apply CLI argument overrides to resolved config.
///
/// Precedence chain: Defaults → Config File → CLI Args (highest)
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if an override is out of range.
pub fn apply_cli_overrides(
    mut config: ListConfig,
    overrides: CliOverrides,
) -> Result<ListConfig, ConfigError> {
    if let Some(list_type) = overrides.list_type {
        config.list_type = list_type;
    }
    if let Some(span_count) = overrides.span_count {
        config.span_count = span_count;
    }
    if let Some(batch) = overrides.enable_batch_render {
        config.enable_batch_render = batch;
    }
    if let Some(preload) = overrides.preload_buffer_count {
        config.preload_buffer_count = preload;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
