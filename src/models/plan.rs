use crate::models::preset::Rule;
use crate::models::window::WindowRef;
use serde::Serialize;

/// How one rule resolved against the live inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Exactly one window matched; it will be moved and resized
    Matched { window: WindowRef },
    /// No window of the rule's application is open
    NoMatch,
    /// Several windows matched; the rule is reported and skipped
    Ambiguous { candidates: Vec<WindowRef> },
}

/// A rule paired with its resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedRule {
    pub rule: Rule,
    pub resolution: Resolution,
}

/// Per-rule resolution of a preset, prior to execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyPlan {
    pub preset: String,
    pub rules: Vec<PlannedRule>,
}

impl ApplyPlan {
    /// Rules that will reach the provider
    pub fn executable(&self) -> impl Iterator<Item = &PlannedRule> {
        self.rules
            .iter()
            .filter(|planned| matches!(planned.resolution, Resolution::Matched { .. }))
    }
}
