//! Configuration loading for mado

pub mod duration;
pub mod parser;
pub mod settings;
pub mod validator;

pub use duration::{format_duration, parse_duration, DurationParseError};
pub use parser::{
    load_config, parse_config, presets_to_toml, ConfigError, ConfigFile, PresetEntry, RuleEntry,
};
pub use settings::{default_config_path, resolve_config_path, Config, CONFIG_ENV_VAR, DEFAULT_TIMEOUT};
pub use validator::{validate_config_file, validate_presets, ValidationIssue};
