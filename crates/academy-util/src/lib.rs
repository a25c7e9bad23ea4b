//! Shared utilities for academy
//!
//! This crate provides:
//! - ID types (SessionId, LabId, LearnerId, RunId)
//! - Time utilities (mock-aware wall clock, minute formatting)
//! - Error types
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
