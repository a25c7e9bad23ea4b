//! Store trait definitions

use academy_api::{LearnerRecord, SessionProgressRecord};
use academy_util::{LearnerId, SessionId};
use chrono::{DateTime, Local};

use crate::{AuditEvent, StoreResult};

/// Days a stored record survives after its last write
pub const RECORD_RETENTION_DAYS: i64 = 90;

/// Main store trait
pub trait Store: Send + Sync {
    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Learner records

    /// Load a learner's record with all session progress.
    ///
    /// Returns `None` when nothing is stored or the stored record's
    /// retention window has passed. A record that cannot be decoded is
    /// reported as `StoreError::Serialization`.
    fn load_learner(
        &self,
        learner_id: &LearnerId,
        now: DateTime<Local>,
    ) -> StoreResult<Option<LearnerRecord>>;

    /// Write a full learner record, replacing any stored progress
    fn save_learner(&self, record: &LearnerRecord, now: DateTime<Local>) -> StoreResult<()>;

    /// Write one session's complete progress record for a stored learner
    fn update_progress(
        &self,
        learner_id: &LearnerId,
        session_id: &SessionId,
        record: &SessionProgressRecord,
        now: DateTime<Local>,
    ) -> StoreResult<()>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
