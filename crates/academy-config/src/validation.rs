//! Configuration validation

use crate::schema::{RawConfig, RawLab, RawLearner, RawSession};
use academy_api::{AccessLevel, Difficulty};
use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Session '{session_id}': {message}")]
    SessionError { session_id: String, message: String },

    #[error("Lab '{session_id}/{lab_id}': {message}")]
    LabError {
        session_id: String,
        lab_id: String,
        message: String,
    },

    #[error("Learner '{learner_id}': {message}")]
    LearnerError { learner_id: String, message: String },

    #[error("Duplicate session ID: {0}")]
    DuplicateSessionId(String),

    #[error("Duplicate lab ID: {0}")]
    DuplicateLabId(String),

    #[error("Duplicate access code for learner '{0}'")]
    DuplicateAccessCode(String),

    #[error("Global config error: {0}")]
    GlobalError(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.sessions.is_empty() {
        errors.push(ValidationError::GlobalError(
            "curriculum must define at least one session".into(),
        ));
    }

    let mut seen_sessions = HashSet::new();
    for session in &config.sessions {
        if !seen_sessions.insert(session.id.as_str()) {
            errors.push(ValidationError::DuplicateSessionId(session.id.clone()));
        }
        errors.extend(validate_session(session));
    }

    let mut seen_labs = HashSet::new();
    for lab in &config.labs {
        if !seen_labs.insert((lab.session.as_str(), lab.id.as_str())) {
            errors.push(ValidationError::DuplicateLabId(format!(
                "{}/{}",
                lab.session, lab.id
            )));
        }
        errors.extend(validate_lab(lab, config));
    }

    let mut seen_codes = HashSet::new();
    for learner in &config.learners {
        if !seen_codes.insert(learner.access_code.to_uppercase()) {
            errors.push(ValidationError::DuplicateAccessCode(learner.id.clone()));
        }
        errors.extend(validate_learner(learner));
    }

    if let Some(0) = config.console.tick_interval_seconds {
        errors.push(ValidationError::GlobalError(
            "tick_interval_seconds must be greater than zero".into(),
        ));
    }

    if let Some(0) = config.console.output_cap {
        errors.push(ValidationError::GlobalError(
            "output_cap must be greater than zero".into(),
        ));
    }

    errors
}

fn validate_session(session: &RawSession) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if session.id.trim().is_empty() {
        errors.push(ValidationError::GlobalError("session id cannot be empty".into()));
    }

    if parse_difficulty(&session.difficulty).is_err() {
        errors.push(ValidationError::SessionError {
            session_id: session.id.clone(),
            message: format!(
                "unknown difficulty '{}' (expected beginner, intermediate or advanced)",
                session.difficulty
            ),
        });
    }

    let mut seen = HashSet::new();
    for lab in &session.labs {
        if !seen.insert(lab.as_str()) {
            errors.push(ValidationError::SessionError {
                session_id: session.id.clone(),
                message: format!("lab '{}' listed twice", lab),
            });
        }
    }

    errors
}

fn validate_lab(lab: &RawLab, config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let lab_error = |message: String| ValidationError::LabError {
        session_id: lab.session.clone(),
        lab_id: lab.id.clone(),
        message,
    };

    match config.sessions.iter().find(|s| s.id == lab.session) {
        None => errors.push(lab_error(format!("unknown session '{}'", lab.session))),
        Some(session) if !session.labs.iter().any(|id| id == &lab.id) => {
            errors.push(lab_error("lab is not listed by its session".into()));
        }
        Some(_) => {}
    }

    if lab.steps.is_empty() {
        errors.push(lab_error("lab must have at least one step".into()));
    }

    for (index, step) in lab.steps.iter().enumerate() {
        // An empty expectation would be satisfied by every line.
        if step.expected.as_deref() == Some("") {
            errors.push(lab_error(format!(
                "step {} ('{}') has an empty expected command",
                index + 1,
                step.title
            )));
        }
    }

    errors
}

fn validate_learner(learner: &RawLearner) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if learner.access_code.trim().is_empty() {
        errors.push(ValidationError::LearnerError {
            learner_id: learner.id.clone(),
            message: "access_code cannot be empty".into(),
        });
    }

    if let Some(level) = &learner.access_level
        && parse_access_level(level).is_err()
    {
        errors.push(ValidationError::LearnerError {
            learner_id: learner.id.clone(),
            message: format!("unknown access level '{}'", level),
        });
    }

    if let Some(date) = &learner.expires_on
        && let Err(message) = parse_date(date)
    {
        errors.push(ValidationError::LearnerError {
            learner_id: learner.id.clone(),
            message,
        });
    }

    errors
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {}", s, e))
}

/// Parse a difficulty label (case-insensitive)
pub fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    match s.to_lowercase().as_str() {
        "beginner" => Ok(Difficulty::Beginner),
        "intermediate" => Ok(Difficulty::Intermediate),
        "advanced" => Ok(Difficulty::Advanced),
        other => Err(format!("Unknown difficulty: {}", other)),
    }
}

/// Parse an access level label (case-insensitive)
pub fn parse_access_level(s: &str) -> Result<AccessLevel, String> {
    match s.to_lowercase().as_str() {
        "standard" => Ok(AccessLevel::Standard),
        "premium" => Ok(AccessLevel::Premium),
        other => Err(format!("Unknown access level: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawConsoleConfig, RawStep};

    fn session(id: &str, labs: &[&str]) -> RawSession {
        RawSession {
            id: id.into(),
            title: "Session".into(),
            subtitle: String::new(),
            week: 1,
            number: 1,
            duration: None,
            difficulty: "beginner".into(),
            topics: vec![],
            labs: labs.iter().map(|l| l.to_string()).collect(),
            content: None,
        }
    }

    fn lab(session: &str, id: &str, expected: Option<&str>) -> RawLab {
        RawLab {
            session: session.into(),
            id: id.into(),
            title: "Lab".into(),
            description: String::new(),
            objectives: vec![],
            steps: vec![RawStep {
                title: "Step".into(),
                instruction: "Do it".into(),
                expected: expected.map(String::from),
                hint: None,
            }],
        }
    }

    fn config(sessions: Vec<RawSession>, labs: Vec<RawLab>) -> RawConfig {
        RawConfig {
            config_version: 1,
            console: RawConsoleConfig::default(),
            sessions,
            labs,
            learners: vec![],
        }
    }

    #[test]
    fn test_parse_difficulty() {
        assert_eq!(parse_difficulty("Beginner").unwrap(), Difficulty::Beginner);
        assert_eq!(parse_difficulty("advanced").unwrap(), Difficulty::Advanced);
        assert!(parse_difficulty("expert").is_err());
    }

    #[test]
    fn test_duplicate_session_detection() {
        let cfg = config(vec![session("s1", &[]), session("s1", &[])], vec![]);
        let errors = validate_config(&cfg);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateSessionId(_))));
    }

    #[test]
    fn test_lab_with_unknown_session() {
        let cfg = config(vec![session("s1", &[])], vec![lab("s2", "l1", Some("pwd"))]);
        let errors = validate_config(&cfg);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("unknown session"));
    }

    #[test]
    fn test_empty_expected_rejected() {
        let cfg = config(vec![session("s1", &["l1"])], vec![lab("s1", "l1", Some(""))]);
        let errors = validate_config(&cfg);
        assert!(errors[0].to_string().contains("empty expected command"));
    }

    #[test]
    fn test_informational_step_allowed() {
        let cfg = config(vec![session("s1", &["l1"])], vec![lab("s1", "l1", None)]);
        assert!(validate_config(&cfg).is_empty());
    }

    #[test]
    fn test_learner_expiry_date_checked() {
        let mut cfg = config(vec![session("s1", &[])], vec![]);
        cfg.learners.push(RawLearner {
            access_code: "CODE".into(),
            id: "u1".into(),
            name: "Student".into(),
            email: "s@example.com".into(),
            access_level: None,
            expires_on: Some("2025-13-40".into()),
        });
        let errors = validate_config(&cfg);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("invalid date"));
    }

    #[test]
    fn test_lab_without_steps_rejected() {
        let mut empty = lab("s1", "l1", Some("pwd"));
        empty.steps.clear();
        let cfg = config(vec![session("s1", &["l1"])], vec![empty]);
        let errors = validate_config(&cfg);
        assert!(errors[0].to_string().contains("at least one step"));
    }
}
