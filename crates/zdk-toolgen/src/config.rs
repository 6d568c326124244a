//! Configuration management for zdk-toolgen
//!
//! Loads configuration with priority:
//! 1. The file passed with `--config`
//! 2. zdk-toolgen.toml in the current directory or a parent
//! 3. Defaults
//!
//! Command-line flags are applied on top by the caller.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use zdk_openapi::ExtractOptions;
use zdk_telemetry::LogFormat;

/// File name searched for when no config path is given.
pub const CONFIG_FILE_NAME: &str = "zdk-toolgen.toml";

/// zdk-toolgen configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolgenConfig {
    #[serde(default)]
    pub extract: ExtractOptions,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which serializer renders the extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    #[default]
    Typescript,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Output file (can reference env var with ${VAR_NAME}); stdout when unset
    pub path: Option<String>,

    /// Exit non-zero when any operation was skipped
    #[serde(default)]
    pub fail_on_skip: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,

    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ToolgenConfig {
    /// Load from `path` if given, else from the nearest zdk-toolgen.toml,
    /// else fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::find_config_file()?,
        };

        match config_path {
            Some(config_path) => Self::load_from(&config_path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: ToolgenConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.resolve_env_vars();
        Ok(config)
    }

    /// Find zdk-toolgen.toml by searching current directory and parents
    fn find_config_file() -> Result<Option<PathBuf>> {
        let mut current = env::current_dir()?;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }

    /// Resolve ${VAR_NAME} references to environment variables
    fn resolve_env_vars(&mut self) {
        if let Some(ref path) = self.output.path {
            self.output.path = Self::resolve_env_var(path);
        }
    }

    /// Resolve a single ${VAR_NAME} reference; unset variables resolve to None
    fn resolve_env_var(value: &str) -> Option<String> {
        if value.starts_with("${") && value.ends_with('}') {
            let var_name = &value[2..value.len() - 1];
            env::var(var_name).ok()
        } else {
            Some(value.to_string())
        }
    }
}
