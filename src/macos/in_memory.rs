use crate::context::{CancelHandle, OperationContext};
use crate::macos::provider::{PermissionError, ProviderError, WindowProvider};
use crate::models::window::{Display, Window};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A call received by [`InMemoryWindowProvider`], in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ListWindows,
    ListScreens,
    Move { pid: u32, title: String, x: i32, y: i32 },
    Resize { pid: u32, title: String, width: u32, height: u32 },
}

/// Which mutating call an injected failure applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Move,
    Resize,
}

#[derive(Debug, Default)]
struct State {
    windows: Vec<Window>,
    screens: Vec<Display>,
    permission_granted: bool,
    calls: Vec<ProviderCall>,
    list_failure: Option<ProviderError>,
    failures: HashMap<(Operation, u32), ProviderError>,
    cancel_after: Option<(usize, CancelHandle)>,
    mutations: usize,
}

/// Simple in-memory provider used for testing the higher level services.
///
/// Records every call, applies moves and resizes to its stored windows, and
/// can be told to fail specific operations or to cancel a context after a
/// number of successful mutations.
#[derive(Debug, Default)]
pub struct InMemoryWindowProvider {
    state: Mutex<State>,
}

impl InMemoryWindowProvider {
    /// Provider seeded with windows and screens, permission granted
    pub fn new_with(windows: Vec<Window>, screens: Vec<Display>) -> Self {
        Self {
            state: Mutex::new(State {
                windows,
                screens,
                permission_granted: true,
                ..State::default()
            }),
        }
    }

    pub fn set_permission_granted(&self, granted: bool) {
        self.state().permission_granted = granted;
    }

    /// Make `list_windows` and `list_screens` fail with `error`
    pub fn fail_listing(&self, error: ProviderError) {
        self.state().list_failure = Some(error);
    }

    /// Make every `operation` against windows of `pid` fail with `error`
    pub fn fail_operation(&self, operation: Operation, pid: u32, error: ProviderError) {
        self.state().failures.insert((operation, pid), error);
    }

    /// Cancel `handle` once `calls` moves/resizes have succeeded
    pub fn cancel_after(&self, calls: usize, handle: CancelHandle) {
        self.state().cancel_after = Some((calls, handle));
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state().calls.clone()
    }

    /// Only the move/resize calls, in order
    pub fn mutations(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, ProviderCall::Move { .. } | ProviderCall::Resize { .. }))
            .collect()
    }

    pub fn windows(&self) -> Vec<Window> {
        self.state().windows.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<F>(
        &self,
        ctx: &OperationContext,
        operation: Operation,
        call: ProviderCall,
        pid: u32,
        title: &str,
        apply: F,
    ) -> Result<(), ProviderError>
    where
        F: FnOnce(&mut Window),
    {
        ctx.check()?;
        let mut state = self.state();
        state.calls.push(call);

        if let Some(error) = state.failures.get(&(operation, pid)) {
            return Err(error.clone());
        }

        let window = state
            .windows
            .iter_mut()
            .find(|window| window.pid == pid && window.title == title)
            .ok_or_else(|| ProviderError::WindowNotFound {
                pid,
                title: title.to_string(),
            })?;
        apply(window);

        state.mutations += 1;
        if let Some((limit, handle)) = &state.cancel_after {
            if state.mutations >= *limit {
                handle.cancel();
            }
        }
        Ok(())
    }
}

impl WindowProvider for InMemoryWindowProvider {
    fn list_windows(&self, ctx: &OperationContext) -> Result<Vec<Window>, ProviderError> {
        ctx.check()?;
        let mut state = self.state();
        state.calls.push(ProviderCall::ListWindows);
        match &state.list_failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.windows.clone()),
        }
    }

    fn list_screens(&self, ctx: &OperationContext) -> Result<Vec<Display>, ProviderError> {
        ctx.check()?;
        let mut state = self.state();
        state.calls.push(ProviderCall::ListScreens);
        match &state.list_failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.screens.clone()),
        }
    }

    fn move_window(
        &self,
        ctx: &OperationContext,
        pid: u32,
        title: &str,
        x: i32,
        y: i32,
    ) -> Result<(), ProviderError> {
        let call = ProviderCall::Move {
            pid,
            title: title.to_string(),
            x,
            y,
        };
        self.mutate(ctx, Operation::Move, call, pid, title, |window| {
            window.x = x;
            window.y = y;
        })
    }

    fn resize_window(
        &self,
        ctx: &OperationContext,
        pid: u32,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<(), ProviderError> {
        let call = ProviderCall::Resize {
            pid,
            title: title.to_string(),
            width,
            height,
        };
        self.mutate(ctx, Operation::Resize, call, pid, title, |window| {
            window.width = width;
            window.height = height;
        })
    }

    fn check_permission(&self) -> Result<(), PermissionError> {
        if self.state().permission_granted {
            Ok(())
        } else {
            Err(PermissionError::accessibility())
        }
    }
}
