use crate::context::{Interruption, OperationContext};
use crate::models::window::{Display, Window};

/// The accessibility permission is missing
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PermissionError {
    message: String,
    remediation: String,
}

impl PermissionError {
    pub fn new(message: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            remediation: remediation.into(),
        }
    }

    /// Standard error for a process that is not trusted for accessibility
    pub fn accessibility() -> Self {
        Self::new(
            "Accessibility permission is required to manage windows",
            "Open System Settings > Privacy & Security > Accessibility and enable \
             access for your terminal application, then run the command again.",
        )
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Human-readable steps that fix the problem
    pub fn remediation(&self) -> &str {
        &self.remediation
    }
}

/// Failure of a single provider call
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error(transparent)]
    PermissionDenied(#[from] PermissionError),

    #[error("window not found: pid {pid}, title \"{title}\"")]
    WindowNotFound { pid: u32, title: String },

    #[error("{operation}: {message}")]
    Platform { operation: String, message: String },

    #[error(transparent)]
    Interrupted(#[from] Interruption),
}

impl ProviderError {
    pub fn platform(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Platform {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// The governing context expired or was cancelled during the call
    pub fn interruption(&self) -> Option<Interruption> {
        match self {
            ProviderError::Interrupted(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Capability surface of the platform window service.
///
/// Every call receives the invocation's [`OperationContext`] and must return
/// [`ProviderError::Interrupted`] promptly once the context is done. Calls are
/// made one at a time from a single thread of control.
#[cfg_attr(test, mockall::automock)]
pub trait WindowProvider: Send + Sync {
    /// Every open window; apps with only a menu bar are left out
    fn list_windows(&self, ctx: &OperationContext) -> Result<Vec<Window>, ProviderError>;

    /// Every connected display
    fn list_screens(&self, ctx: &OperationContext) -> Result<Vec<Display>, ProviderError>;

    /// Move the window identified by process id and title
    fn move_window(
        &self,
        ctx: &OperationContext,
        pid: u32,
        title: &str,
        x: i32,
        y: i32,
    ) -> Result<(), ProviderError>;

    /// Resize the window identified by process id and title
    fn resize_window(
        &self,
        ctx: &OperationContext,
        pid: u32,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<(), ProviderError>;

    /// Verify accessibility access without prompting the user
    fn check_permission(&self) -> Result<(), PermissionError>;
}
