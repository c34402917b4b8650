use std::num::NonZeroU32;

/// Value object describing how to narrow a window inventory.
///
/// An explicit application filter suppresses the ignore list: asking for one
/// app by name always shows it, even if the config says to hide it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive exact application name
    pub app: Option<String>,
    /// Screen id (decimal) or case-insensitive screen name
    pub screen: Option<String>,
    /// Application names hidden when no app filter is set
    pub ignore_apps: Vec<String>,
    /// Only windows on this desktop, plus windows shown on all desktops
    pub desktop: Option<NonZeroU32>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    pub fn with_screen(mut self, screen: impl Into<String>) -> Self {
        self.screen = Some(screen.into());
        self
    }

    pub fn with_ignore_apps<I, S>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_apps = apps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_desktop(mut self, desktop: NonZeroU32) -> Self {
        self.desktop = Some(desktop);
        self
    }

    /// App filter in effect; a blank value is no filter
    pub fn app_filter(&self) -> Option<&str> {
        non_blank(self.app.as_deref())
    }

    /// Screen filter in effect; a blank value is no filter
    pub fn screen_filter(&self) -> Option<&str> {
        non_blank(self.screen.as_deref())
    }

    /// The ignore list that actually applies: empty whenever an app filter is set
    pub fn effective_ignore_apps(&self) -> &[String] {
        match self.app_filter() {
            Some(_) => &[],
            None => &self.ignore_apps,
        }
    }

    /// Desktop filter as a raw number, 0 meaning "no filter"
    pub fn desktop_number(&self) -> u32 {
        self.desktop.map_or(0, NonZeroU32::get)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
