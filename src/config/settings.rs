use crate::models::preset::Preset;
use crate::output::OutputFormat;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV_VAR: &str = "MADO_CONFIG";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Effective configuration for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub format: OutputFormat,
    pub timeout: Duration,
    pub ignore_apps: Vec<String>,
    pub presets: Vec<Preset>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            timeout: DEFAULT_TIMEOUT,
            ignore_apps: Vec::new(),
            presets: Vec::new(),
        }
    }
}

impl Config {
    /// Apply values given explicitly on the command line. Flags that were
    /// not passed leave the file value in place.
    pub fn with_overrides(mut self, format: Option<OutputFormat>, timeout: Option<Duration>) -> Self {
        if let Some(format) = format {
            self.format = format;
        }
        if let Some(timeout) = timeout {
            self.timeout = timeout;
        }
        self
    }
}

/// `~/.config/mado/config.toml`
pub fn default_config_path() -> PathBuf {
    let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home_dir.join(".config").join("mado").join("config.toml")
}

/// Config file location: explicit flag, then `MADO_CONFIG`, then the default
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => default_config_path(),
    }
}
