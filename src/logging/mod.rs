//! Structured logging configuration for mado.
//!
//! Logs never go to stdout: command output there must stay parseable, so the
//! subscriber writes to stderr or to `MADO_LOG_FILE`.

use crate::Result;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::{
    fmt::{self, time::UtcTime, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

pub const LEVEL_ENV_VAR: &str = "MADO_LOG_LEVEL";
pub const FORMAT_ENV_VAR: &str = "MADO_LOG_FORMAT";
pub const FILE_ENV_VAR: &str = "MADO_LOG_FILE";
pub const SOURCE_ENV_VAR: &str = "MADO_LOG_SOURCE";

/// Logging configuration for mado
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Append logs to this file instead of stderr
    pub file_path: Option<PathBuf>,
    /// Include source file and line numbers
    pub include_source: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            file_path: None,
            include_source: false,
        }
    }
}

impl LogConfig {
    /// Load configuration from the `MADO_LOG_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LogConfig::from_env`] with an explicit variable source.
    /// Unparseable values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup(LEVEL_ENV_VAR).and_then(|v| v.parse().ok()) {
            config.level = level;
        }
        if let Some(format) = lookup(FORMAT_ENV_VAR).and_then(|v| v.parse().ok()) {
            config.format = format;
        }
        if let Some(file_path) = lookup(FILE_ENV_VAR).filter(|v| !v.is_empty()) {
            config.file_path = Some(PathBuf::from(file_path));
        }
        if let Some(include_source) = lookup(SOURCE_ENV_VAR) {
            config.include_source = include_source.to_lowercase() == "true";
        }

        config
    }

    /// `--verbose` raises the level to at least debug
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        if verbose && !matches!(self.level, LogLevel::Trace | LogLevel::Debug) {
            self.level = LogLevel::Debug;
        }
        self
    }

    /// Default filter directive; `RUST_LOG` replaces it when set
    pub fn filter_directive(&self) -> String {
        format!("mado={}", self.level.as_str())
    }
}

/// Initialize the global tracing subscriber with the given configuration
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let writer = match &config.file_path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::registry()
        .with(create_layer(config, writer).with_filter(filter))
        .try_init()?;

    debug!(?config, "Logging initialized");
    Ok(())
}

fn create_layer(
    config: &LogConfig,
    writer: BoxMakeWriter,
) -> Box<dyn Layer<Registry> + Send + Sync> {
    let base = fmt::layer()
        .with_writer(writer)
        .with_timer(UtcTime::rfc_3339())
        .with_file(config.include_source)
        .with_line_number(config.include_source);

    match config.format {
        LogFormat::Pretty => Box::new(base.pretty()),
        LogFormat::Compact => Box::new(base.compact()),
        LogFormat::Json => Box::new(base.json()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("PRETTY").unwrap(), LogFormat::Pretty);
        assert!(LogFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = LogConfig::from_lookup(lookup(&[
            (LEVEL_ENV_VAR, "info"),
            (FORMAT_ENV_VAR, "json"),
            (FILE_ENV_VAR, "/tmp/mado.log"),
            (SOURCE_ENV_VAR, "TRUE"),
        ]));
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file_path, Some(PathBuf::from("/tmp/mado.log")));
        assert!(config.include_source);
    }

    #[test]
    fn test_invalid_env_values_keep_defaults() {
        let config = LogConfig::from_lookup(lookup(&[(LEVEL_ENV_VAR, "loud"), (FILE_ENV_VAR, "")]));
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_verbose_raises_to_debug_only() {
        assert_eq!(LogConfig::default().with_verbose(true).level, LogLevel::Debug);
        assert_eq!(LogConfig::default().with_verbose(false).level, LogLevel::Warn);

        let trace = LogConfig {
            level: LogLevel::Trace,
            ..LogConfig::default()
        };
        assert_eq!(trace.with_verbose(true).level, LogLevel::Trace);
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(LogConfig::default().filter_directive(), "mado=warn");
    }
}
