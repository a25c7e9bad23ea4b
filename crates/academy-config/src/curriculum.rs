//! Validated curriculum structures

use crate::schema::{RawConfig, RawConsoleConfig, RawLab, RawLearner, RawSession};
use crate::validation::{parse_access_level, parse_date, parse_difficulty};
use academy_api::{
    AccessLevel, ContentRepository, Difficulty, LabDefinition, LabStep, SessionMeta,
};
use academy_util::{LabId, LearnerId, SessionId};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

/// Default seconds between time-accrual ticks
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 60;

/// Default minutes credited per tick
pub const DEFAULT_MINUTES_PER_TICK: u64 = 1;

/// Default number of lines a lab keeps in its output log
pub const DEFAULT_OUTPUT_CAP: usize = 1000;

/// Validated configuration ready for use by the engine
#[derive(Debug, Clone)]
pub struct Curriculum {
    /// Console configuration
    pub console: ConsoleConfig,

    /// Sessions in curriculum order
    pub sessions: Vec<SessionMeta>,

    /// Lab definitions
    pub labs: Vec<LabDefinition>,

    /// Access grants for the login gate
    pub learners: Vec<LearnerGrant>,
}

impl Curriculum {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            console: ConsoleConfig::from_raw(raw.console),
            sessions: raw.sessions.into_iter().map(convert_session).collect(),
            labs: raw.labs.into_iter().map(convert_lab).collect(),
            learners: raw.learners.into_iter().map(LearnerGrant::from_raw).collect(),
        }
    }

    /// Labs a session lists that have no definition
    pub fn missing_labs(&self, session: &SessionMeta) -> Vec<LabId> {
        session
            .labs
            .iter()
            .filter(|lab_id| self.lab(&session.id, lab_id).is_none())
            .cloned()
            .collect()
    }

    /// Session prose, falling back to a not-found document for unknown ids
    pub fn session_content(&self, session_id: &SessionId) -> String {
        match self.session(session_id) {
            Some(session) => session
                .content
                .clone()
                .unwrap_or_else(|| format!("# {}\n\n{}", session.title, session.subtitle)),
            None => "# Session Not Found\n\nThe requested session could not be loaded.".into(),
        }
    }
}

impl ContentRepository for Curriculum {
    fn sessions(&self) -> &[SessionMeta] {
        &self.sessions
    }

    fn session(&self, session_id: &SessionId) -> Option<&SessionMeta> {
        self.sessions.iter().find(|s| &s.id == session_id)
    }

    fn lab(&self, session_id: &SessionId, lab_id: &LabId) -> Option<&LabDefinition> {
        self.labs
            .iter()
            .find(|l| &l.session_id == session_id && &l.lab_id == lab_id)
    }
}

/// Console configuration
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub data_dir: PathBuf,
    pub tick_interval: Duration,
    pub minutes_per_tick: u64,
    pub output_cap: usize,
}

impl ConsoleConfig {
    fn from_raw(raw: RawConsoleConfig) -> Self {
        Self {
            data_dir: raw
                .data_dir
                .unwrap_or_else(academy_util::default_data_dir),
            tick_interval: Duration::from_secs(
                raw.tick_interval_seconds
                    .unwrap_or(DEFAULT_TICK_INTERVAL_SECS),
            ),
            minutes_per_tick: raw.minutes_per_tick.unwrap_or(DEFAULT_MINUTES_PER_TICK),
            output_cap: raw.output_cap.unwrap_or(DEFAULT_OUTPUT_CAP),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::from_raw(RawConsoleConfig::default())
    }
}

/// An access code and the profile it unlocks
#[derive(Debug, Clone)]
pub struct LearnerGrant {
    /// Upper-cased access code
    pub access_code: String,
    pub id: LearnerId,
    pub name: String,
    pub email: String,
    pub access_level: AccessLevel,

    /// Last day the code is accepted
    pub expires_on: Option<NaiveDate>,
}

impl LearnerGrant {
    fn from_raw(raw: RawLearner) -> Self {
        Self {
            access_code: raw.access_code.to_uppercase(),
            id: LearnerId::new(raw.id),
            name: raw.name,
            email: raw.email,
            access_level: raw
                .access_level
                .as_deref()
                .and_then(|l| parse_access_level(l).ok())
                .unwrap_or_default(),
            expires_on: raw.expires_on.as_deref().and_then(|d| parse_date(d).ok()),
        }
    }
}

fn convert_session(raw: RawSession) -> SessionMeta {
    SessionMeta {
        id: SessionId::new(raw.id),
        title: raw.title,
        subtitle: raw.subtitle,
        week: raw.week,
        number: raw.number,
        duration: raw.duration.unwrap_or_else(|| "2 hours".into()),
        difficulty: parse_difficulty(&raw.difficulty).unwrap_or(Difficulty::Beginner),
        topics: raw.topics,
        labs: raw.labs.into_iter().map(LabId::new).collect(),
        content: raw.content,
    }
}

fn convert_lab(raw: RawLab) -> LabDefinition {
    LabDefinition {
        session_id: SessionId::new(raw.session),
        lab_id: LabId::new(raw.id),
        title: raw.title,
        description: raw.description,
        objectives: raw.objectives,
        steps: raw
            .steps
            .into_iter()
            .map(|s| LabStep {
                title: s.title,
                instruction: s.instruction,
                expected: s.expected,
                hint: s.hint,
            })
            .collect(),
    }
}
