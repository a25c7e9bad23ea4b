//! Audit event types

use academy_util::{LabId, LearnerId, SessionId};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Console started
    ConsoleStarted,

    /// Console stopped
    ConsoleStopped,

    /// Learner passed the access gate
    LearnerLoggedIn {
        learner_id: LearnerId,
        /// True when no usable stored progress existed
        fresh: bool,
    },

    /// Learner logged out
    LearnerLoggedOut { learner_id: LearnerId },

    /// Stored progress was unusable and has been replaced
    ProgressDiscarded { learner_id: LearnerId, reason: String },

    /// Session marked complete
    SessionCompleted {
        learner_id: LearnerId,
        session_id: SessionId,
    },

    /// Lab completed
    LabCompleted {
        learner_id: LearnerId,
        session_id: SessionId,
        lab_id: LabId,
    },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: academy_util::now(),
            event,
        }
    }
}
