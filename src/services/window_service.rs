use crate::context::OperationContext;
use crate::macos::provider::{PermissionError, ProviderError, WindowProvider};
use crate::models::filter::FilterCriteria;
use crate::models::window::{Display, Window, WindowRef};
use crate::services::window_filter::filter_windows;
use std::sync::Arc;
use tracing::debug;

/// Why a single target window could not be picked
#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("no window of {app}{}", title_suffix(.title))]
    NotFound { app: String, title: Option<String> },

    #[error("{} windows of {app} match, narrow the selection with --title", .candidates.len())]
    Ambiguous {
        app: String,
        candidates: Vec<WindowRef>,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

fn title_suffix(title: &Option<String>) -> String {
    match title {
        Some(title) => format!(" titled \"{title}\""),
        None => String::new(),
    }
}

/// Query side of the provider: permission gate, filtered inventory, screens
pub struct WindowService {
    provider: Arc<dyn WindowProvider>,
}

impl WindowService {
    pub fn new(provider: Arc<dyn WindowProvider>) -> Self {
        Self { provider }
    }

    /// Ensure the service has permission to manage windows
    pub fn ensure_permissions(&self) -> Result<(), PermissionError> {
        self.provider.check_permission()
    }

    /// Live inventory narrowed by `criteria`
    pub fn list_windows(
        &self,
        ctx: &OperationContext,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Window>, ProviderError> {
        let windows = self.provider.list_windows(ctx)?;
        let total = windows.len();
        let filtered = filter_windows(&windows, criteria);
        debug!(total, kept = filtered.len(), "Filtered window inventory");
        Ok(filtered)
    }

    pub fn list_screens(&self, ctx: &OperationContext) -> Result<Vec<Display>, ProviderError> {
        self.provider.list_screens(ctx)
    }

    /// The one window owned by `app` (case-insensitive), optionally with an
    /// exact `title`. The ignore list is not consulted.
    pub fn find_window(
        &self,
        ctx: &OperationContext,
        app: &str,
        title: Option<&str>,
    ) -> Result<Window, LookupError> {
        let criteria = FilterCriteria::new().with_app(app);
        let mut matches: Vec<Window> = self
            .list_windows(ctx, &criteria)?
            .into_iter()
            .filter(|window| title.map_or(true, |title| window.title == title))
            .collect();

        match matches.len() {
            0 => Err(LookupError::NotFound {
                app: app.to_string(),
                title: title.map(str::to_string),
            }),
            1 => Ok(matches.remove(0)),
            _ => Err(LookupError::Ambiguous {
                app: app.to_string(),
                candidates: matches.iter().map(Window::window_ref).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macos::in_memory::InMemoryWindowProvider;

    fn service() -> WindowService {
        let provider = InMemoryWindowProvider::new_with(
            vec![
                Window::new("Code", "main.rs", 10, 1, "Built-in"),
                Window::new("Terminal", "zsh", 20, 1, "Built-in"),
                Window::new("Terminal", "vim", 20, 1, "Built-in"),
                Window::new("Finder", "Downloads", 30, 1, "Built-in"),
            ],
            vec![Display::primary(1, "Built-in", 1920, 1080)],
        );
        WindowService::new(Arc::new(provider))
    }

    #[test]
    fn list_windows_applies_criteria() {
        let service = service();
        let ctx = OperationContext::background();
        let criteria = FilterCriteria::new().with_ignore_apps(["finder"]);

        let windows = service.list_windows(&ctx, &criteria).unwrap();
        assert_eq!(windows.len(), 3);
        assert!(windows.iter().all(|w| w.app_name != "Finder"));
    }

    #[test]
    fn find_window_picks_unique_match() {
        let service = service();
        let ctx = OperationContext::background();
        let window = service.find_window(&ctx, "code", None).unwrap();
        assert_eq!(window.pid, 10);

        let window = service.find_window(&ctx, "Terminal", Some("vim")).unwrap();
        assert_eq!(window.title, "vim");
    }

    #[test]
    fn find_window_reports_ambiguity_and_absence() {
        let service = service();
        let ctx = OperationContext::background();

        match service.find_window(&ctx, "Terminal", None) {
            Err(LookupError::Ambiguous { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("unexpected result {other:?}"),
        }

        let err = service.find_window(&ctx, "Terminal", Some("VIM")).unwrap_err();
        assert!(matches!(err, LookupError::NotFound { .. }));
        assert_eq!(err.to_string(), "no window of Terminal titled \"VIM\"");
    }

    #[test]
    fn permission_comes_from_provider() {
        let provider = Arc::new(InMemoryWindowProvider::default());
        let service = WindowService::new(provider.clone());
        assert!(service.ensure_permissions().is_err());
        provider.set_permission_granted(true);
        assert!(service.ensure_permissions().is_ok());
    }
}
