use crate::models::plan::{ApplyPlan, PlannedRule, Resolution};
use crate::models::preset::{Preset, Rule};
use crate::models::window::Window;
use tracing::debug;

/// Resolve every rule of `preset` against the live inventory.
///
/// Rules keep their declaration order. A rule matching several windows is
/// recorded as ambiguous with all candidates; the resolver never picks one.
pub fn resolve(preset: &Preset, inventory: &[Window]) -> ApplyPlan {
    let rules = preset
        .rules
        .iter()
        .map(|rule| PlannedRule {
            rule: rule.clone(),
            resolution: resolve_rule(rule, inventory),
        })
        .collect();

    ApplyPlan {
        preset: preset.name.clone(),
        rules,
    }
}

fn resolve_rule(rule: &Rule, inventory: &[Window]) -> Resolution {
    let matches: Vec<&Window> = inventory.iter().filter(|w| rule.matches(w)).collect();
    debug!(app = %rule.app, matches = matches.len(), "Resolved preset rule");

    match matches.as_slice() {
        [] => Resolution::NoMatch,
        [window] => Resolution::Matched {
            window: window.window_ref(),
        },
        _ => Resolution::Ambiguous {
            candidates: matches.iter().map(|w| w.window_ref()).collect(),
        },
    }
}
