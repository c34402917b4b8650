//! mado - list, filter and arrange macOS windows from the command line
//!
//! The crate is split the same way the binary works: the `macos` layer talks to
//! the platform accessibility API behind the [`macos::WindowProvider`] trait,
//! `services` holds the filter pipeline, the preset resolver and the layout
//! orchestrator, and `cli` wires configuration, output and exit codes together.

pub mod cli;
pub mod config;
pub mod context;
pub mod logging;
pub mod macos;
pub mod models;
pub mod output;
pub mod services;

use config::ConfigError;
use macos::provider::{PermissionError, ProviderError};

pub use context::*;
pub use models::*;
pub use services::*;

/// Result type alias for mado operations
pub type Result<T> = anyhow::Result<T>;

/// Error types surfaced at the command boundary
#[derive(thiserror::Error, Debug)]
pub enum MadoError {
    #[error("{message}")]
    PermissionDenied { message: String, remediation: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Window not found: {0}")]
    WindowNotFound(String),

    #[error("{message}")]
    AmbiguousWindow {
        message: String,
        candidates: Vec<WindowRef>,
    },

    #[error("Operation timed out")]
    Timeout,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Preset '{preset}' finished with {failed} failed rule(s)")]
    PresetFailed { preset: String, failed: usize },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl MadoError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            MadoError::Provider(_) | MadoError::Cancelled | MadoError::Output(_) => 1,
            MadoError::PermissionDenied { .. } => 2,
            MadoError::InvalidArgument(_)
            | MadoError::Configuration(_)
            | MadoError::AmbiguousWindow { .. } => 3,
            MadoError::WindowNotFound(_) => 4,
            MadoError::PresetFailed { .. } => 5,
            MadoError::Timeout => 6,
        }
    }
}

impl From<Interruption> for MadoError {
    fn from(reason: Interruption) -> Self {
        match reason {
            Interruption::DeadlineExceeded => MadoError::Timeout,
            Interruption::Cancelled => MadoError::Cancelled,
        }
    }
}

impl From<PermissionError> for MadoError {
    fn from(err: PermissionError) -> Self {
        MadoError::PermissionDenied {
            message: err.message().to_string(),
            remediation: err.remediation().to_string(),
        }
    }
}

impl From<ProviderError> for MadoError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::PermissionDenied(err) => err.into(),
            ProviderError::Interrupted(reason) => reason.into(),
            ProviderError::WindowNotFound { .. } => MadoError::WindowNotFound(err.to_string()),
            ProviderError::Platform { .. } => MadoError::Provider(err.to_string()),
        }
    }
}

impl From<LookupError> for MadoError {
    fn from(err: LookupError) -> Self {
        let message = err.to_string();
        match err {
            LookupError::NotFound { .. } => MadoError::WindowNotFound(message),
            LookupError::Ambiguous { candidates, .. } => {
                MadoError::AmbiguousWindow { message, candidates }
            }
            LookupError::Provider(err) => err.into(),
        }
    }
}

impl From<ConfigError> for MadoError {
    fn from(err: ConfigError) -> Self {
        MadoError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_documented_table() {
        assert_eq!(MadoError::Provider("x".into()).exit_code(), 1);
        assert_eq!(MadoError::from(PermissionError::accessibility()).exit_code(), 2);
        assert_eq!(MadoError::InvalidArgument("x".into()).exit_code(), 3);
        assert_eq!(MadoError::Configuration("x".into()).exit_code(), 3);
        assert_eq!(MadoError::WindowNotFound("x".into()).exit_code(), 4);
        assert_eq!(
            MadoError::PresetFailed {
                preset: "coding".into(),
                failed: 1
            }
            .exit_code(),
            5
        );
        assert_eq!(MadoError::from(Interruption::DeadlineExceeded).exit_code(), 6);
    }

    #[test]
    fn provider_errors_map_by_kind() {
        let err = MadoError::from(ProviderError::from(Interruption::Cancelled));
        assert!(matches!(err, MadoError::Cancelled));

        let err = MadoError::from(ProviderError::WindowNotFound {
            pid: 1,
            title: "x".into(),
        });
        assert_eq!(err.exit_code(), 4);

        let err = MadoError::from(ProviderError::platform("list windows", "boom"));
        assert_eq!(err.to_string(), "Provider error: list windows: boom");
    }
}
