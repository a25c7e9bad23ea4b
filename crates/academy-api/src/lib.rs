//! Shared types for academy
//!
//! This crate defines the data shapes exchanged between the curriculum,
//! the lab engine, the progress tracker and the persistence layer:
//! - Curriculum definitions (sessions, labs, steps)
//! - Progress records (per session, per lab, aggregate)
//! - The persisted learner record

mod curriculum;
mod learner;
mod progress;

pub use curriculum::*;
pub use learner::*;
pub use progress::*;
