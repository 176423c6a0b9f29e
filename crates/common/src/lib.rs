//! Clipmarks Common Utilities
//!
//! Shared infrastructure for all Clipmarks crates:
//! - Error types and result aliases
//! - Frame clock helpers for snapping times to a frame grid
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
