//! Data models for mado

pub mod filter;
pub mod plan;
pub mod preset;
pub mod report;
pub mod window;

pub use filter::*;
pub use plan::*;
pub use preset::*;
pub use report::*;
pub use window::*;
