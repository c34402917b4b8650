//! Core services: filtering, preset resolution and layout execution

pub mod layout_orchestrator;
pub mod preset_recorder;
pub mod preset_resolver;
pub mod window_filter;
pub mod window_service;

pub use layout_orchestrator::*;
pub use preset_recorder::*;
pub use preset_resolver::*;
pub use window_filter::*;
pub use window_service::*;
