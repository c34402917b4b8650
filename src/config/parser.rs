use crate::config::duration::{parse_duration, DurationParseError};
use crate::config::settings::Config;
use crate::config::validator::{validate_config_file, ValidationIssue};
use crate::models::preset::{Position, Preset, Rule, Size};
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid timeout: {0}")]
    Timeout(#[from] DurationParseError),
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("invalid format \"{0}\" (expected text or json)")]
    Format(String),
    #[error("{} configuration problem(s):\n{}", .0.len(), render_issues(.0))]
    Invalid(Vec<ValidationIssue>),
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// On-disk layout of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_apps: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<PresetEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// A rule as written by the user; geometry is signed so negative values can
/// be reported instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    #[serde(default)]
    pub app: String,
    pub position: [i64; 2],
    pub size: [i64; 2],
}

impl RuleEntry {
    fn to_rule(&self) -> Rule {
        let [x, y] = self.position;
        let [width, height] = self.size;
        Rule::new(
            self.app.clone(),
            Position::new(clamp_i32(x), clamp_i32(y)),
            Size::new(clamp_u32(width), clamp_u32(height)),
        )
    }
}

impl From<&Preset> for PresetEntry {
    fn from(preset: &Preset) -> Self {
        Self {
            name: preset.name.clone(),
            description: preset.description.clone(),
            rules: preset
                .rules
                .iter()
                .map(|rule| RuleEntry {
                    app: rule.app.clone(),
                    position: [rule.position.x.into(), rule.position.y.into()],
                    size: [rule.size.width.into(), rule.size.height.into()],
                })
                .collect(),
        }
    }
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(0, i64::from(i32::MAX)) as i32
}

fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

/// Parse and validate configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(content)?;
    build_config(file)
}

/// Load configuration from `path`; a missing file yields the defaults
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    debug!(path = %path.display(), "Loading config file");
    parse_config(&content)
}

fn build_config(file: ConfigFile) -> Result<Config, ConfigError> {
    let issues = validate_config_file(&file);
    if !issues.is_empty() {
        return Err(ConfigError::Invalid(issues));
    }

    let mut config = Config::default();
    if let Some(format) = &file.format {
        config.format = format
            .parse::<OutputFormat>()
            .map_err(|_| ConfigError::Format(format.clone()))?;
    }
    if let Some(timeout) = &file.timeout {
        config.timeout = parse_duration(timeout)?;
        if config.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
    }
    config.ignore_apps = file.ignore_apps;
    config.presets = file
        .presets
        .iter()
        .map(|entry| Preset {
            name: entry.name.clone(),
            description: entry.description.clone(),
            rules: entry.rules.iter().map(RuleEntry::to_rule).collect(),
        })
        .collect();

    Ok(config)
}

/// Render presets as a `[[presets]]` TOML snippet
pub fn presets_to_toml(presets: &[Preset]) -> Result<String, ConfigError> {
    let file = ConfigFile {
        presets: presets.iter().map(PresetEntry::from).collect(),
        ..ConfigFile::default()
    };
    Ok(toml::to_string(&file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const SAMPLE: &str = r#"
format = "json"
timeout = "1m30s"
ignore_apps = ["Finder", "Dock"]

[[presets]]
name = "coding"
description = "Editor left, terminal right"

[[presets.rules]]
app = "Code"
position = [0, 0]
size = [960, 1080]

[[presets.rules]]
app = "Terminal"
position = [960, 0]
size = [960, 1080]
"#;

    #[test]
    fn parses_full_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.ignore_apps, ["Finder", "Dock"]);
        assert_eq!(config.presets.len(), 1);

        let preset = &config.presets[0];
        assert_eq!(preset.description.as_deref(), Some("Editor left, terminal right"));
        assert_eq!(preset.rules[1].app, "Terminal");
        assert_eq!(preset.rules[1].position, Position::new(960, 0));
        assert_eq!(preset.rules[1].size, Size::new(960, 1080));
    }

    #[test]
    fn empty_config_is_defaults() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(matches!(parse_config("colour = \"red\""), Err(ConfigError::Toml(_))));
        assert!(matches!(parse_config("format = \"yaml\""), Err(ConfigError::Format(_))));
        assert!(matches!(parse_config("timeout = \"soon\""), Err(ConfigError::Timeout(_))));
        assert!(matches!(parse_config("timeout = \"0s\""), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn reports_every_validation_problem() {
        let content = r#"
[[presets]]
name = "a"
[[presets.rules]]
app = ""
position = [-1, 0]
size = [10, 10]

[[presets]]
name = "a"
"#;
        match parse_config(content) {
            Err(ConfigError::Invalid(issues)) => assert_eq!(issues.len(), 4),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn snippet_parses_back() {
        let config = parse_config(SAMPLE).unwrap();
        let snippet = presets_to_toml(&config.presets).unwrap();
        assert!(snippet.contains("[[presets]]"));
        assert!(snippet.contains("[[presets.rules]]"));
        assert_eq!(parse_config(&snippet).unwrap().presets, config.presets);
    }
}
