use tracing::{debug, warn};

#[cfg(target_os = "macos")]
mod platform {
    use crate::Result;

    #[link(name = "ApplicationServices", kind = "framework")]
    extern "C" {
        fn AXIsProcessTrusted() -> bool;
    }

    pub fn is_accessibility_permission_granted() -> Result<bool> {
        Ok(unsafe { AXIsProcessTrusted() })
    }
}

#[cfg(not(target_os = "macos"))]
mod platform {
    use crate::Result;

    fn env_flag(name: &str) -> bool {
        std::env::var(name)
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn is_accessibility_permission_granted() -> Result<bool> {
        Ok(env_flag("MADO_PERMISSION_ACCESSIBILITY"))
    }
}

pub use platform::is_accessibility_permission_granted;

/// Treat a failed check as "not granted" so callers only branch on a bool
pub fn accessibility_granted() -> bool {
    match is_accessibility_permission_granted() {
        Ok(granted) => {
            debug!(granted, "Checked accessibility permission");
            granted
        }
        Err(err) => {
            warn!("Accessibility permission check failed: {}", err);
            false
        }
    }
}
