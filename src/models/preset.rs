use crate::models::window::{eq_fold, Window};
use serde::Serialize;
use std::fmt;

/// Target origin for a placed window, in global screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Target size for a placed window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One placement rule: every window of `app` goes to `position` with `size`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub app: String,
    pub position: Position,
    pub size: Size,
}

impl Rule {
    pub fn new(app: impl Into<String>, position: Position, size: Size) -> Self {
        Self {
            app: app.into(),
            position,
            size,
        }
    }

    /// Rules match on the application name only, case-insensitively and
    /// exactly. No globbing, no substrings.
    pub fn matches(&self, window: &Window) -> bool {
        eq_fold(&window.app_name, &self.app)
    }
}

/// A named, ordered list of placement rules.
///
/// Presets reach the rest of the crate only through the config loader, which
/// guarantees unique names, non-empty app matchers and non-negative geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rules: Vec<Rule>,
}

impl Preset {
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            description: None,
            rules,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Look a preset up by its exact (case-sensitive) name
pub fn find_preset<'a>(presets: &'a [Preset], name: &str) -> Option<&'a Preset> {
    presets.iter().find(|preset| preset.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coding() -> Preset {
        Preset::new(
            "coding",
            vec![
                Rule::new("Code", Position::new(0, 0), Size::new(960, 1080)),
                Rule::new("Terminal", Position::new(960, 0), Size::new(960, 1080)),
            ],
        )
    }

    #[test]
    fn rule_matches_app_name_case_insensitively() {
        let rule = Rule::new("terminal", Position::new(0, 0), Size::new(10, 10));
        assert!(rule.matches(&Window::new("Terminal", "zsh", 1, 1, "Main")));
        assert!(!rule.matches(&Window::new("iTerm2", "zsh", 2, 1, "Main")));
        assert!(!rule.matches(&Window::new("Terminal Helper", "x", 3, 1, "Main")));
    }

    #[test]
    fn find_preset_is_case_sensitive() {
        let presets = vec![coding()];
        assert!(find_preset(&presets, "coding").is_some());
        assert!(find_preset(&presets, "Coding").is_none());
    }

    #[test]
    fn geometry_display_formats() {
        assert_eq!(Position::new(960, 0).to_string(), "960,0");
        assert_eq!(Size::new(960, 1080).to_string(), "960x1080");
    }
}
