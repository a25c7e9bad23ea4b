//! Error types for academy

use thiserror::Error;

/// Errors surfaced to the learner at the access gate.
///
/// Everything past login degrades instead of failing: unknown labs become
/// a not-found state and store failures are logged and retried.
#[derive(Debug, Error)]
pub enum AcademyError {
    #[error("Invalid access code. Please check your code and try again.")]
    InvalidAccessCode,

    #[error("Access code has expired. Please contact support.")]
    AccessExpired,

    /// Stored progress could not be read; login is refused so nothing
    /// overwrites it
    #[error("Your progress could not be loaded right now. Please try again.")]
    ProgressUnavailable(String),
}

pub type Result<T> = std::result::Result<T, AcademyError>;
