//! Curriculum and console configuration for academy
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Session metadata and ordered lab lists
//! - Lab definitions with ordered steps
//! - Access codes for the login gate
//! - Validation with clear error messages
//!
//! A built-in curriculum is compiled in and used when no file is given.

mod curriculum;
mod schema;
mod validation;

pub use curriculum::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

const BUILTIN_CURRICULUM: &str = include_str!("builtin.toml");

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Curriculum> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Curriculum> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    let curriculum = Curriculum::from_raw(raw);
    tracing::debug!(
        sessions = curriculum.sessions.len(),
        labs = curriculum.labs.len(),
        learners = curriculum.learners.len(),
        "Curriculum parsed"
    );
    Ok(curriculum)
}

/// The compiled-in eight-session course
pub fn builtin_curriculum() -> ConfigResult<Curriculum> {
    parse_config(BUILTIN_CURRICULUM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_api::ContentRepository;
    use academy_util::{LabId, SessionId};
    use std::io::Write;

    #[test]
    fn parse_minimal_config() {
        let config = r#"
            config_version = 1

            [[sessions]]
            id = "intro"
            title = "Intro"
            week = 1
            number = 1
            difficulty = "beginner"
            labs = ["first"]

            [[labs]]
            session = "intro"
            id = "first"
            title = "First Lab"

            [[labs.steps]]
            title = "Where am I"
            instruction = "Run pwd"
            expected = "pwd"
        "#;

        let curriculum = parse_config(config).unwrap();
        assert_eq!(curriculum.sessions.len(), 1);
        let lab = curriculum
            .lab(&SessionId::new("intro"), &LabId::new("first"))
            .unwrap();
        assert_eq!(lab.steps[0].expected.as_deref(), Some("pwd"));
        assert_eq!(curriculum.console.output_cap, DEFAULT_OUTPUT_CAP);
    }

    #[test]
    fn reject_wrong_version() {
        let config = r#"
            config_version = 99
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn builtin_curriculum_has_eight_sessions() {
        let curriculum = builtin_curriculum().unwrap();
        assert_eq!(curriculum.session_count(), 8);
        assert_eq!(curriculum.learners.len(), 3);

        let lab = curriculum
            .lab(
                &SessionId::new("week1-session1"),
                &LabId::new("basic-navigation"),
            )
            .unwrap();
        let expected: Vec<_> = lab
            .steps
            .iter()
            .map(|s| s.expected.as_deref().unwrap())
            .collect();
        assert_eq!(expected, ["pwd", "ls", "ls -la", "whoami"]);
    }

    #[test]
    fn undefined_labs_are_reported_not_rejected() {
        let curriculum = builtin_curriculum().unwrap();
        let session = curriculum
            .session(&SessionId::new("week1-session2"))
            .unwrap();
        let missing = curriculum.missing_labs(session);
        assert_eq!(
            missing,
            vec![LabId::new("io-redirection"), LabId::new("environment-setup")]
        );
    }

    #[test]
    fn unknown_session_content_is_not_found_document() {
        let curriculum = builtin_curriculum().unwrap();
        let content = curriculum.session_content(&SessionId::new("week9-session9"));
        assert!(content.starts_with("# Session Not Found"));
    }

    #[test]
    fn load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BUILTIN_CURRICULUM.as_bytes()).unwrap();

        let curriculum = load_config(file.path()).unwrap();
        assert_eq!(curriculum.sessions.len(), 8);
    }
}
