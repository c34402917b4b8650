//! macOS integration layer for mado
//!
//! The core never talks to the platform directly. It goes through the
//! [`WindowProvider`] trait, which has a live implementation backed by the
//! Accessibility and Core Graphics APIs and an in-memory one for tests.

pub mod in_memory;
pub mod permissions;
pub mod provider;
pub mod system;

pub use in_memory::*;
pub use permissions::*;
pub use provider::*;
pub use system::*;
