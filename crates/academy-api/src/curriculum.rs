//! Curriculum definitions consumed as read-only lookup tables

use academy_util::{LabId, SessionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty rating of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        };
        f.write_str(label)
    }
}

/// One checklist item of a lab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabStep {
    pub title: String,
    pub instruction: String,

    /// Literal, case-sensitive text the submitted command must contain.
    /// A step without one is informational and never auto-advances.
    #[serde(default)]
    pub expected: Option<String>,

    #[serde(default)]
    pub hint: Option<String>,
}

/// A hands-on lab: objectives plus an ordered, non-empty step list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabDefinition {
    pub session_id: SessionId,
    pub lab_id: LabId,
    pub title: String,
    pub description: String,
    pub objectives: Vec<String>,
    pub steps: Vec<LabStep>,
}

/// Session metadata shown on the dashboard and session page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    pub id: SessionId,
    pub title: String,
    pub subtitle: String,
    pub week: u32,
    pub number: u32,
    pub duration: String,
    pub difficulty: Difficulty,
    pub topics: Vec<String>,

    /// Labs in the order the learner is expected to take them
    pub labs: Vec<LabId>,

    /// Session prose (markdown), if any
    pub content: Option<String>,
}

/// Read-only lookup into the curriculum
pub trait ContentRepository {
    /// All sessions in curriculum order
    fn sessions(&self) -> &[SessionMeta];

    fn session(&self, session_id: &SessionId) -> Option<&SessionMeta>;

    fn lab(&self, session_id: &SessionId, lab_id: &LabId) -> Option<&LabDefinition>;

    /// Number of sessions counted by the overall progress percentage
    fn session_count(&self) -> usize {
        self.sessions().len()
    }
}
