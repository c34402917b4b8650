use crate::models::preset::{Position, Preset, Rule, Size};
use crate::models::window::{eq_fold, Window};
use tracing::debug;

/// Result of capturing the current layout as a preset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    pub preset: Preset,
    /// Applications left out because they own several windows, with the count
    pub skipped: Vec<(String, usize)>,
}

/// Turn every application that owns exactly one window in `windows` into a
/// rule pinned to that window's current frame.
///
/// Applications are grouped by case-insensitive name in first-seen order.
/// Negative coordinates are clamped to 0 so the preset stays valid.
pub fn record_preset(name: &str, windows: &[Window]) -> Recording {
    let mut groups: Vec<(&str, Vec<&Window>)> = Vec::new();
    for window in windows {
        match groups
            .iter_mut()
            .find(|(app, _)| eq_fold(app, &window.app_name))
        {
            Some((_, members)) => members.push(window),
            None => groups.push((window.app_name.as_str(), vec![window])),
        }
    }

    let mut rules = Vec::new();
    let mut skipped = Vec::new();
    for (app, members) in groups {
        match members.as_slice() {
            [window] => rules.push(Rule::new(
                app,
                Position::new(window.x.max(0), window.y.max(0)),
                Size::new(window.width, window.height),
            )),
            _ => skipped.push((app.to_string(), members.len())),
        }
    }

    debug!(preset = name, rules = rules.len(), skipped = skipped.len(), "Recorded preset");
    Recording {
        preset: Preset::new(name, rules),
        skipped,
    }
}
