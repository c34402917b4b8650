use crate::context::Interruption;
use crate::macos::provider::ProviderError;
use crate::models::preset::{Position, Size};
use crate::models::window::WindowRef;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Provider operation issued for a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Move,
    Resize,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Move => f.write_str("move"),
            Step::Resize => f.write_str("resize"),
        }
    }
}

/// A provider error attributed to the rule and step that caused it
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{app}: {source}")]
pub struct RuleFailure {
    pub app: String,
    pub step: Step,
    #[source]
    pub source: ProviderError,
}

impl Serialize for RuleFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RuleFailure", 3)?;
        state.serialize_field("app", &self.app)?;
        state.serialize_field("step", &self.step)?;
        state.serialize_field("message", &self.source.to_string())?;
        state.end()
    }
}

/// Terminal outcome of one preset rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RuleOutcome {
    Applied { window: WindowRef },
    NoMatch,
    AmbiguousMatch { candidates: Vec<WindowRef> },
    ProviderError { window: WindowRef, failures: Vec<RuleFailure> },
    /// `failures` holds the steps that had already failed when the rule was interrupted
    Cancelled {
        reason: Interruption,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        failures: Vec<RuleFailure>,
    },
}

impl RuleOutcome {
    pub fn cancelled(reason: Interruption) -> Self {
        RuleOutcome::Cancelled {
            reason,
            failures: Vec::new(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, RuleOutcome::Applied { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            RuleOutcome::Applied { .. } => "applied",
            RuleOutcome::NoMatch => "no-match",
            RuleOutcome::AmbiguousMatch { .. } => "ambiguous-match",
            RuleOutcome::ProviderError { .. } => "provider-error",
            RuleOutcome::Cancelled { .. } => "cancelled",
        }
    }
}

/// Outcome of one rule together with what the rule asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub app: String,
    pub position: Position,
    pub size: Size,
    #[serde(flatten)]
    pub outcome: RuleOutcome,
}

/// Aggregate result of applying a preset, one entry per rule in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub preset: String,
    pub rules: Vec<RuleReport>,
}

impl ApplyReport {
    pub fn applied_count(&self) -> usize {
        self.rules.iter().filter(|rule| rule.outcome.is_applied()).count()
    }

    /// Rules that did not end up applied, whatever the reason
    pub fn failed_count(&self) -> usize {
        self.rules.len() - self.applied_count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// The interruption that stopped execution, if any
    pub fn interruption(&self) -> Option<Interruption> {
        self.rules.iter().find_map(|rule| match rule.outcome {
            RuleOutcome::Cancelled { reason, .. } => Some(reason),
            _ => None,
        })
    }
}
