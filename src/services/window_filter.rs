//! Pure filter pipeline over a window inventory.
//!
//! Each window goes through an ordered conjunction of predicates: app name,
//! ignore list, screen, desktop. Surviving windows keep their input order.

use crate::models::filter::FilterCriteria;
use crate::models::window::{eq_fold, Window};

/// Narrow `windows` down to the ones admitted by `criteria`
pub fn filter_windows(windows: &[Window], criteria: &FilterCriteria) -> Vec<Window> {
    let ignore_apps = criteria.effective_ignore_apps();
    let desktop = criteria.desktop_number();

    windows
        .iter()
        .filter(|window| match criteria.app_filter() {
            Some(app) => window.is_app(app),
            None => true,
        })
        .filter(|window| !is_ignored_app(&window.app_name, ignore_apps))
        .filter(|window| match criteria.screen_filter() {
            Some(screen) => matches_display(window, screen),
            None => true,
        })
        .filter(|window| matches_desktop(window, desktop))
        .cloned()
        .collect()
}

/// True when `app_name` equals any ignore-list entry, ignoring case
pub fn is_ignored_app(app_name: &str, ignore_apps: &[String]) -> bool {
    ignore_apps.iter().any(|ignored| eq_fold(app_name, ignored))
}

/// Match a window's screen by case-insensitive name or by decimal id
pub fn matches_display(window: &Window, filter: &str) -> bool {
    eq_fold(&window.screen_name, filter) || window.screen_id.to_string() == filter
}

/// Desktop filter 0 passes everything; windows on desktop 0 (all desktops)
/// pass every filter; otherwise the numbers must be equal.
pub fn matches_desktop(window: &Window, filter: u32) -> bool {
    filter == 0 || window.desktop == 0 || window.desktop == filter
}
