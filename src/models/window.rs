use serde::{Deserialize, Serialize};
use std::fmt;

/// Display state of a window as reported by the accessibility API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Fullscreen,
    Hidden,
}

impl fmt::Display for WindowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WindowState::Normal => "normal",
            WindowState::Minimized => "minimized",
            WindowState::Fullscreen => "fullscreen",
            WindowState::Hidden => "hidden",
        };
        f.write_str(label)
    }
}

/// One on-screen application window.
///
/// Windows are snapshots: the provider produces a fresh list on every query
/// and nothing in the crate mutates them afterwards. Within one invocation a
/// window is identified by its process id and title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub app_name: String,
    pub title: String,
    pub pid: u32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub state: WindowState,
    pub screen_id: u32,
    pub screen_name: String,
    /// Virtual desktop number, 0 when the window is shown on every desktop
    pub desktop: u32,
}

impl Window {
    /// Window on the given screen with a default frame; tweak the public
    /// fields or use the builder helpers for anything else.
    pub fn new(
        app_name: impl Into<String>,
        title: impl Into<String>,
        pid: u32,
        screen_id: u32,
        screen_name: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            title: title.into(),
            pid,
            x: 0,
            y: 0,
            width: 800,
            height: 600,
            state: WindowState::Normal,
            screen_id,
            screen_name: screen_name.into(),
            desktop: 0,
        }
    }

    pub fn with_frame(mut self, x: i32, y: i32, width: u32, height: u32) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_state(mut self, state: WindowState) -> Self {
        self.state = state;
        self
    }

    pub fn on_desktop(mut self, desktop: u32) -> Self {
        self.desktop = desktop;
        self
    }

    pub fn window_ref(&self) -> WindowRef {
        WindowRef {
            app_name: self.app_name.clone(),
            pid: self.pid,
            title: self.title.clone(),
        }
    }

    /// Case-insensitive exact comparison of the owning application name
    pub fn is_app(&self, app_name: &str) -> bool {
        eq_fold(&self.app_name, app_name)
    }
}

/// Case-insensitive string equality with a fast path for ASCII names
pub fn eq_fold(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Identifying information for a window captured at resolution time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowRef {
    pub app_name: String,
    pub pid: u32,
    pub title: String,
}

impl fmt::Display for WindowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\" (pid {})", self.app_name, self.title, self.pid)
    }
}

/// One connected monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Display {
    pub id: u32,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub is_primary: bool,
}

impl Display {
    pub fn primary(id: u32, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            name: name.into(),
            x: 0,
            y: 0,
            width,
            height,
            is_primary: true,
        }
    }
}

/// A running application and the windows it owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    pub name: String,
    pub pid: u32,
    pub windows: Vec<Window>,
}

impl Application {
    /// Group windows by owning process, keeping first-seen order for both the
    /// applications and the windows inside each one.
    pub fn group(windows: &[Window]) -> Vec<Application> {
        let mut apps: Vec<Application> = Vec::new();
        for window in windows {
            match apps.iter_mut().find(|app| app.pid == window.pid) {
                Some(app) => app.windows.push(window.clone()),
                None => apps.push(Application {
                    name: window.app_name.clone(),
                    pid: window.pid,
                    windows: vec![window.clone()],
                }),
            }
        }
        apps
    }
}
