use crate::config::parser::{ConfigFile, PresetEntry, RuleEntry};
use std::collections::HashSet;
use std::fmt;

/// One problem found in a configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Name of the offending preset (or its index when unnamed)
    pub location: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    fn preset(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            message: message.into(),
        }
    }

    fn global(message: impl Into<String>) -> Self {
        Self {
            location: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "preset {location}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Collect every problem in `file`; an empty list means it is valid
pub fn validate_config_file(file: &ConfigFile) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (index, app) in file.ignore_apps.iter().enumerate() {
        if app.trim().is_empty() {
            issues.push(ValidationIssue::global(format!(
                "ignore_apps[{index}] must not be empty"
            )));
        }
    }

    issues.extend(validate_presets(&file.presets));
    issues
}

pub fn validate_presets(presets: &[PresetEntry]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut names = HashSet::new();

    for (index, preset) in presets.iter().enumerate() {
        let location = if preset.name.is_empty() {
            format!("#{}", index + 1)
        } else {
            format!("\"{}\"", preset.name)
        };

        if preset.name.trim().is_empty() {
            issues.push(ValidationIssue::preset(&location, "name must not be empty"));
        } else if !names.insert(preset.name.as_str()) {
            issues.push(ValidationIssue::preset(&location, "duplicate preset name"));
        }

        if preset.rules.is_empty() {
            issues.push(ValidationIssue::preset(&location, "at least one rule is required"));
        }

        for (rule_index, rule) in preset.rules.iter().enumerate() {
            issues.extend(
                validate_rule(rule)
                    .into_iter()
                    .map(|message| {
                        ValidationIssue::preset(&location, format!("rule {}: {message}", rule_index + 1))
                    }),
            );
        }
    }

    issues
}

fn validate_rule(rule: &RuleEntry) -> Vec<String> {
    let mut problems = Vec::new();
    if rule.app.trim().is_empty() {
        problems.push("app must not be empty".to_string());
    }

    let [x, y] = rule.position;
    if x < 0 || y < 0 {
        problems.push(format!("position [{x}, {y}] must not be negative"));
    } else if x > i64::from(i32::MAX) || y > i64::from(i32::MAX) {
        problems.push(format!("position [{x}, {y}] is out of range"));
    }

    let [width, height] = rule.size;
    if width < 0 || height < 0 {
        problems.push(format!("size [{width}, {height}] must not be negative"));
    } else if width > i64::from(u32::MAX) || height > i64::from(u32::MAX) {
        problems.push(format!("size [{width}, {height}] is out of range"));
    }
    problems
}
