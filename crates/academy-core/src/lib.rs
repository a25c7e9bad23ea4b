//! Lab simulation and progress engine for academy
//!
//! This crate is the heart of academy, containing:
//! - The scripted command interpreter behind the lab terminal
//! - Step validation (substring rule, strictly ordered steps)
//! - The lab controller state machine (Idle -> Running -> Complete, or NotFound)
//! - Per-learner progress tracking with best-effort persistence
//! - The access gate (login/logout) and the session time-accrual timer

mod achievements;
mod events;
mod gate;
pub mod interpreter;
mod lab;
mod progress;
mod timer;
mod validator;

pub use achievements::*;
pub use events::*;
pub use gate::*;
pub use interpreter::{Command, Output, Verb, interpret};
pub use lab::*;
pub use progress::*;
pub use timer::*;
pub use validator::*;
