//! Live provider backed by the macOS Accessibility and Core Graphics APIs.
//!
//! Windows are enumerated per process through `AXUIElementCreateApplication`,
//! with the owning processes taken from the on-screen CGWindowList. Screens come
//! from `CGDisplay`. On other platforms every call fails with a platform error
//! and the permission check reads `MADO_PERMISSION_ACCESSIBILITY`.

use crate::context::OperationContext;
use crate::macos::permissions::accessibility_granted;
use crate::macos::provider::{PermissionError, ProviderError, WindowProvider};
use crate::models::window::{Display, Window};
use tracing::{debug, instrument};

/// Provider that talks to the running window server
#[derive(Debug, Default)]
pub struct SystemWindowProvider;

impl SystemWindowProvider {
    pub fn new() -> Self {
        Self
    }
}

impl WindowProvider for SystemWindowProvider {
    #[instrument(skip_all)]
    fn list_windows(&self, ctx: &OperationContext) -> Result<Vec<Window>, ProviderError> {
        ctx.check()?;
        let screens = platform::list_screens()?;
        let mut windows = platform::list_windows(ctx)?;
        for window in &mut windows {
            if let Some(screen) = infer_screen(window, &screens) {
                window.screen_id = screen.id;
                window.screen_name = screen.name.clone();
            }
        }
        debug!(count = windows.len(), "Enumerated windows");
        Ok(windows)
    }

    fn list_screens(&self, ctx: &OperationContext) -> Result<Vec<Display>, ProviderError> {
        ctx.check()?;
        platform::list_screens()
    }

    #[instrument(skip(self, ctx))]
    fn move_window(
        &self,
        ctx: &OperationContext,
        pid: u32,
        title: &str,
        x: i32,
        y: i32,
    ) -> Result<(), ProviderError> {
        ctx.check()?;
        platform::set_position(pid, title, x, y)
    }

    #[instrument(skip(self, ctx))]
    fn resize_window(
        &self,
        ctx: &OperationContext,
        pid: u32,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<(), ProviderError> {
        ctx.check()?;
        platform::set_size(pid, title, width, height)
    }

    fn check_permission(&self) -> Result<(), PermissionError> {
        if accessibility_granted() {
            Ok(())
        } else {
            Err(PermissionError::accessibility())
        }
    }
}

/// Screen whose bounds contain the window origin, falling back to the primary
/// screen for windows parked off-screen
pub fn infer_screen<'a>(window: &Window, screens: &'a [Display]) -> Option<&'a Display> {
    let (x, y) = (i64::from(window.x), i64::from(window.y));
    screens
        .iter()
        .find(|screen| {
            let left = i64::from(screen.x);
            let top = i64::from(screen.y);
            let within_x = x >= left && x < left + i64::from(screen.width);
            let within_y = y >= top && y < top + i64::from(screen.height);
            within_x && within_y
        })
        .or_else(|| screens.iter().find(|screen| screen.is_primary))
}

#[cfg(target_os = "macos")]
mod platform {
    use crate::context::OperationContext;
    use crate::macos::provider::ProviderError;
    use crate::models::window::{Display, Window, WindowState};
    use core_foundation::array::{CFArray, CFArrayRef};
    use core_foundation::base::{CFType, CFTypeRef, TCFType};
    use core_foundation::boolean::CFBoolean;
    use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
    use core_foundation::number::CFNumber;
    use core_foundation::string::{CFString, CFStringRef};
    use core_graphics::display::CGDisplay;
    use core_graphics::geometry::{CGPoint, CGSize};
    use core_graphics::window::{
        copy_window_info, kCGNullWindowID, kCGWindowListExcludeDesktopElements,
        kCGWindowListOptionOnScreenOnly,
    };
    use std::collections::HashSet;
    use std::ffi::c_void;

    type AXError = i32;
    type AXValueType = u32;

    const AX_SUCCESS: AXError = 0;
    const AX_VALUE_CG_POINT: AXValueType = 1;
    const AX_VALUE_CG_SIZE: AXValueType = 2;

    #[link(name = "ApplicationServices", kind = "framework")]
    extern "C" {
        fn AXUIElementCreateApplication(pid: i32) -> CFTypeRef;
        fn AXUIElementCopyAttributeValue(
            element: CFTypeRef,
            attribute: CFStringRef,
            value: *mut CFTypeRef,
        ) -> AXError;
        fn AXUIElementSetAttributeValue(
            element: CFTypeRef,
            attribute: CFStringRef,
            value: CFTypeRef,
        ) -> AXError;
        fn AXValueCreate(value_type: AXValueType, value: *const c_void) -> CFTypeRef;
        fn AXValueGetValue(value: CFTypeRef, value_type: AXValueType, out: *mut c_void) -> bool;
    }

    pub fn list_screens() -> Result<Vec<Display>, ProviderError> {
        let ids = CGDisplay::active_displays()
            .map_err(|code| ProviderError::platform("list screens", format!("CGError {code}")))?;
        let main_id = CGDisplay::main().id;

        Ok(ids
            .into_iter()
            .enumerate()
            .map(|(index, id)| {
                let bounds = CGDisplay::new(id).bounds();
                Display {
                    id,
                    name: if id == main_id {
                        "Main Display".to_string()
                    } else {
                        format!("Display {}", index + 1)
                    },
                    x: bounds.origin.x as i32,
                    y: bounds.origin.y as i32,
                    width: bounds.size.width as u32,
                    height: bounds.size.height as u32,
                    is_primary: id == main_id,
                }
            })
            .collect())
    }

    pub fn list_windows(ctx: &OperationContext) -> Result<Vec<Window>, ProviderError> {
        let mut windows = Vec::new();
        for (pid, app_name) in window_owners()? {
            ctx.check()?;
            let app = application(pid)?;
            for element in ax_windows(&app) {
                windows.push(describe_window(&element, pid, &app_name));
            }
        }
        Ok(windows)
    }

    pub fn set_position(pid: u32, title: &str, x: i32, y: i32) -> Result<(), ProviderError> {
        let window = find_window(pid, title)?;
        let point = CGPoint::new(f64::from(x), f64::from(y));
        let value = ax_value(AX_VALUE_CG_POINT, &point as *const CGPoint as *const c_void)
            .ok_or_else(|| ProviderError::platform("move", "could not build AXValue"))?;
        set_attribute(&window, "AXPosition", &value, "move")
    }

    pub fn set_size(pid: u32, title: &str, width: u32, height: u32) -> Result<(), ProviderError> {
        let window = find_window(pid, title)?;
        let size = CGSize::new(f64::from(width), f64::from(height));
        let value = ax_value(AX_VALUE_CG_SIZE, &size as *const CGSize as *const c_void)
            .ok_or_else(|| ProviderError::platform("resize", "could not build AXValue"))?;
        set_attribute(&window, "AXSize", &value, "resize")
    }

    /// Processes owning at least one normal-layer on-screen window, in
    /// window-server order
    fn window_owners() -> Result<Vec<(u32, String)>, ProviderError> {
        let options = kCGWindowListOptionOnScreenOnly | kCGWindowListExcludeDesktopElements;
        let info = copy_window_info(options, kCGNullWindowID)
            .ok_or_else(|| ProviderError::platform("list windows", "CGWindowList unavailable"))?;

        let mut seen = HashSet::new();
        let mut owners = Vec::new();
        for raw in info.get_all_values() {
            let entry: CFDictionary<CFString, CFType> =
                unsafe { CFDictionary::wrap_under_get_rule(raw as CFDictionaryRef) };
            let layer = dict_number(&entry, "kCGWindowLayer").unwrap_or(-1);
            if layer != 0 {
                continue;
            }
            let Some(pid) = dict_number(&entry, "kCGWindowOwnerPID") else {
                continue;
            };
            let name = dict_string(&entry, "kCGWindowOwnerName").unwrap_or_default();
            let pid = pid as u32;
            if seen.insert(pid) {
                owners.push((pid, name));
            }
        }
        Ok(owners)
    }

    fn dict_number(dict: &CFDictionary<CFString, CFType>, key: &'static str) -> Option<i64> {
        dict.find(CFString::from_static_string(key))
            .and_then(|value| value.downcast::<CFNumber>())
            .and_then(|number| number.to_i64())
    }

    fn dict_string(dict: &CFDictionary<CFString, CFType>, key: &'static str) -> Option<String> {
        dict.find(CFString::from_static_string(key))
            .and_then(|value| value.downcast::<CFString>())
            .map(|value| value.to_string())
    }

    fn application(pid: u32) -> Result<CFType, ProviderError> {
        let raw = unsafe { AXUIElementCreateApplication(pid as i32) };
        if raw.is_null() {
            return Err(ProviderError::platform(
                "list windows",
                format!("no accessibility element for pid {pid}"),
            ));
        }
        Ok(unsafe { CFType::wrap_under_create_rule(raw) })
    }

    fn copy_attribute(element: &CFType, attribute: &'static str) -> Option<CFType> {
        let name = CFString::from_static_string(attribute);
        let mut value: CFTypeRef = std::ptr::null();
        let status = unsafe {
            AXUIElementCopyAttributeValue(
                element.as_CFTypeRef(),
                name.as_concrete_TypeRef(),
                &mut value,
            )
        };
        if status != AX_SUCCESS || value.is_null() {
            return None;
        }
        Some(unsafe { CFType::wrap_under_create_rule(value) })
    }

    fn ax_windows(app: &CFType) -> Vec<CFType> {
        let Some(value) = copy_attribute(app, "AXWindows") else {
            return Vec::new();
        };
        let array: CFArray<CFType> =
            unsafe { CFArray::wrap_under_get_rule(value.as_CFTypeRef() as CFArrayRef) };
        array.iter().map(|item| (*item).clone()).collect()
    }

    fn string_attribute(element: &CFType, attribute: &'static str) -> Option<String> {
        copy_attribute(element, attribute)
            .and_then(|value| value.downcast::<CFString>())
            .map(|value| value.to_string())
    }

    fn bool_attribute(element: &CFType, attribute: &'static str) -> bool {
        copy_attribute(element, attribute)
            .and_then(|value| value.downcast::<CFBoolean>())
            .map(bool::from)
            .unwrap_or(false)
    }

    fn point_attribute(element: &CFType) -> Option<CGPoint> {
        let value = copy_attribute(element, "AXPosition")?;
        let mut point = CGPoint::new(0.0, 0.0);
        let ok = unsafe {
            AXValueGetValue(
                value.as_CFTypeRef(),
                AX_VALUE_CG_POINT,
                &mut point as *mut CGPoint as *mut c_void,
            )
        };
        ok.then_some(point)
    }

    fn size_attribute(element: &CFType) -> Option<CGSize> {
        let value = copy_attribute(element, "AXSize")?;
        let mut size = CGSize::new(0.0, 0.0);
        let ok = unsafe {
            AXValueGetValue(
                value.as_CFTypeRef(),
                AX_VALUE_CG_SIZE,
                &mut size as *mut CGSize as *mut c_void,
            )
        };
        ok.then_some(size)
    }

    fn describe_window(element: &CFType, pid: u32, app_name: &str) -> Window {
        let title = string_attribute(element, "AXTitle").unwrap_or_default();
        let origin = point_attribute(element).unwrap_or(CGPoint::new(0.0, 0.0));
        let size = size_attribute(element).unwrap_or(CGSize::new(0.0, 0.0));
        let state = if bool_attribute(element, "AXMinimized") {
            WindowState::Minimized
        } else if bool_attribute(element, "AXFullScreen") {
            WindowState::Fullscreen
        } else {
            WindowState::Normal
        };

        Window {
            app_name: app_name.to_string(),
            title,
            pid,
            x: origin.x as i32,
            y: origin.y as i32,
            width: size.width.max(0.0) as u32,
            height: size.height.max(0.0) as u32,
            state,
            screen_id: 0,
            screen_name: String::new(),
            // Space membership is not exposed through public API
            desktop: 0,
        }
    }

    fn find_window(pid: u32, title: &str) -> Result<CFType, ProviderError> {
        let app = application(pid)?;
        ax_windows(&app)
            .into_iter()
            .find(|element| string_attribute(element, "AXTitle").as_deref() == Some(title))
            .ok_or_else(|| ProviderError::WindowNotFound {
                pid,
                title: title.to_string(),
            })
    }

    fn ax_value(value_type: AXValueType, value: *const c_void) -> Option<CFType> {
        let raw = unsafe { AXValueCreate(value_type, value) };
        if raw.is_null() {
            None
        } else {
            Some(unsafe { CFType::wrap_under_create_rule(raw) })
        }
    }

    fn set_attribute(
        element: &CFType,
        attribute: &'static str,
        value: &CFType,
        operation: &str,
    ) -> Result<(), ProviderError> {
        let name = CFString::from_static_string(attribute);
        let status = unsafe {
            AXUIElementSetAttributeValue(
                element.as_CFTypeRef(),
                name.as_concrete_TypeRef(),
                value.as_CFTypeRef(),
            )
        };
        if status == AX_SUCCESS {
            Ok(())
        } else {
            Err(ProviderError::platform(operation, format!("AXError {status}")))
        }
    }
}

#[cfg(not(target_os = "macos"))]
mod platform {
    use crate::context::OperationContext;
    use crate::macos::provider::ProviderError;
    use crate::models::window::{Display, Window};

    fn unsupported(operation: &str) -> ProviderError {
        ProviderError::platform(
            operation,
            "the accessibility API is only available on macOS",
        )
    }

    pub fn list_screens() -> Result<Vec<Display>, ProviderError> {
        Err(unsupported("list screens"))
    }

    pub fn list_windows(_ctx: &OperationContext) -> Result<Vec<Window>, ProviderError> {
        Err(unsupported("list windows"))
    }

    pub fn set_position(_pid: u32, _title: &str, _x: i32, _y: i32) -> Result<(), ProviderError> {
        Err(unsupported("move"))
    }

    pub fn set_size(
        _pid: u32,
        _title: &str,
        _width: u32,
        _height: u32,
    ) -> Result<(), ProviderError> {
        Err(unsupported("resize"))
    }
}
