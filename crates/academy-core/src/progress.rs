//! Per-learner progress tracking
//!
//! The tracker owns the learner's [`AggregateProgress`] for the lifetime of
//! a login. Every mutation is applied in memory first, then the whole
//! affected session record is written to the store. Store failures never
//! reach the caller: the session is remembered as unsaved and retried on
//! the next mutation (or at logout).

use academy_api::{
    Achievement, AggregateProgress, LearnerProfile, LearnerRecord, SessionProgressRecord,
    SessionStatus, completion_percent,
};
use academy_store::{AuditEvent, AuditEventType, Store, StoreError};
use academy_util::{LabId, LearnerId, SessionId, whole_days_between};
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::achievements::{self, ProgressSummary};
use crate::CompletionSink;

/// Tracker shared between the console loop and the session timer
pub type SharedTracker = Arc<Mutex<ProgressTracker>>;

pub struct ProgressTracker {
    record: LearnerRecord,
    total_sessions: usize,
    store: Arc<dyn Store>,

    /// Sessions whose latest state has not reached the store
    unsaved: BTreeSet<SessionId>,

    /// The learner row itself must be (re)written before per-session updates
    needs_full_save: bool,
}

impl ProgressTracker {
    /// Wrap an already-persisted learner record
    pub fn new(record: LearnerRecord, total_sessions: usize, store: Arc<dyn Store>) -> Self {
        debug!(
            learner_id = %record.profile.id,
            sessions = total_sessions,
            "Progress tracker created"
        );
        Self {
            record,
            total_sessions,
            store,
            unsaved: BTreeSet::new(),
            needs_full_save: false,
        }
    }

    pub fn into_shared(self) -> SharedTracker {
        Arc::new(Mutex::new(self))
    }

    pub fn learner_id(&self) -> &LearnerId {
        &self.record.profile.id
    }

    pub fn profile(&self) -> &LearnerProfile {
        &self.record.profile
    }

    pub fn progress(&self) -> &AggregateProgress {
        &self.record.progress
    }

    pub fn record(&self) -> &LearnerRecord {
        &self.record
    }

    pub fn total_sessions(&self) -> usize {
        self.total_sessions
    }

    // Mutations

    /// Mark a session complete. Returns false if it already was.
    pub fn mark_session_complete(&mut self, session_id: &SessionId, now: DateTime<Local>) -> bool {
        let changed = self.record.progress.entry(session_id).mark_completed(now);
        if !changed {
            debug!(session_id = %session_id, "Session already complete");
            self.flush(now);
            return false;
        }

        info!(learner_id = %self.learner_id(), session_id = %session_id, "Session completed");
        let _ = self
            .store
            .append_audit(AuditEvent::new(AuditEventType::SessionCompleted {
                learner_id: self.learner_id().clone(),
                session_id: session_id.clone(),
            }));
        self.persist(session_id, now);
        true
    }

    /// Mark a lab complete without touching the parent session's flag.
    /// Returns false if it already was.
    pub fn mark_lab_complete(
        &mut self,
        session_id: &SessionId,
        lab_id: &LabId,
        now: DateTime<Local>,
    ) -> bool {
        let changed = self
            .record
            .progress
            .entry(session_id)
            .mark_lab_completed(lab_id, now);
        if !changed {
            debug!(session_id = %session_id, lab_id = %lab_id, "Lab already complete");
            self.flush(now);
            return false;
        }

        info!(
            learner_id = %self.learner_id(),
            session_id = %session_id,
            lab_id = %lab_id,
            "Lab completed"
        );
        let _ = self
            .store
            .append_audit(AuditEvent::new(AuditEventType::LabCompleted {
                learner_id: self.learner_id().clone(),
                session_id: session_id.clone(),
                lab_id: lab_id.clone(),
            }));
        self.persist(session_id, now);
        true
    }

    /// Add practice time (minutes) and stamp `last_accessed`
    pub fn add_session_time(&mut self, session_id: &SessionId, minutes: u64, now: DateTime<Local>) {
        let record = self.record.progress.entry(session_id);
        record.add_time(minutes, now);
        debug!(
            session_id = %session_id,
            minutes,
            total = record.time_spent,
            "Session time added"
        );
        self.persist(session_id, now);
    }

    // Queries

    /// Whole-course completion, rounded half up
    pub fn aggregate_percent(&self) -> u32 {
        let completed = self.completed_session_count().min(self.total_sessions);
        completion_percent(completed, self.total_sessions)
    }

    pub fn completed_session_count(&self) -> usize {
        self.record.progress.completed_session_count()
    }

    pub fn total_time_minutes(&self) -> u64 {
        self.record.progress.total_time_minutes()
    }

    pub fn session_progress(&self, session_id: &SessionId) -> Option<&SessionProgressRecord> {
        self.record.progress.get(session_id)
    }

    pub fn session_status(&self, session_id: &SessionId) -> SessionStatus {
        self.session_progress(session_id)
            .map(SessionProgressRecord::status)
            .unwrap_or(SessionStatus::NotStarted)
    }

    pub fn is_lab_complete(&self, session_id: &SessionId, lab_id: &LabId) -> bool {
        self.session_progress(session_id)
            .is_some_and(|s| s.is_lab_completed(lab_id))
    }

    pub fn completed_lab_count(&self, session_id: &SessionId) -> usize {
        self.session_progress(session_id)
            .map(SessionProgressRecord::completed_lab_count)
            .unwrap_or(0)
    }

    /// Whole days until access expires; negative once expired
    pub fn days_remaining(&self, now: DateTime<Local>) -> i64 {
        whole_days_between(&now, &self.record.profile.expiry_date)
    }

    pub fn enrollment_days(&self, now: DateTime<Local>) -> i64 {
        whole_days_between(&self.record.profile.enrollment_date, &now)
    }

    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary {
            completed_sessions: self.completed_session_count(),
            total_sessions: self.total_sessions,
            percent: self.aggregate_percent(),
            total_minutes: self.total_time_minutes(),
        }
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        achievements::evaluate(&self.summary())
    }

    pub fn next_achievement(&self) -> Option<Achievement> {
        self.achievements().into_iter().find(|a| !a.earned)
    }

    // Persistence

    pub fn has_pending_saves(&self) -> bool {
        self.needs_full_save || !self.unsaved.is_empty()
    }

    /// Write the whole learner record. Returns false on failure.
    pub fn save_all(&mut self, now: DateTime<Local>) -> bool {
        match self.store.save_learner(&self.record, now) {
            Ok(()) => {
                self.needs_full_save = false;
                self.unsaved.clear();
                true
            }
            Err(e) => {
                warn!(learner_id = %self.learner_id(), error = %e, "Failed to save learner record");
                self.needs_full_save = true;
                false
            }
        }
    }

    /// Retry every pending write. Returns true when nothing is left pending.
    pub fn flush(&mut self, now: DateTime<Local>) -> bool {
        if self.needs_full_save {
            return self.save_all(now);
        }

        let mut retry = BTreeSet::new();
        for session_id in std::mem::take(&mut self.unsaved) {
            let Some(record) = self.record.progress.get(&session_id) else {
                continue;
            };
            let result = self
                .store
                .update_progress(&self.record.profile.id, &session_id, record, now);
            if let Err(e) = result {
                warn!(
                    learner_id = %self.record.profile.id,
                    session_id = %session_id,
                    error = %e,
                    "Failed to save session progress"
                );
                if matches!(e, StoreError::NotFound(_)) {
                    self.needs_full_save = true;
                }
                retry.insert(session_id);
            }
        }
        self.unsaved = retry;

        if self.needs_full_save {
            return self.save_all(now);
        }
        self.unsaved.is_empty()
    }

    fn persist(&mut self, session_id: &SessionId, now: DateTime<Local>) {
        self.unsaved.insert(session_id.clone());
        self.flush(now);
    }

    /// Final flush before the tracker is dropped. Returns false if some
    /// progress could not be written.
    pub fn close(&mut self, now: DateTime<Local>) -> bool {
        let flushed = self.flush(now);
        if !flushed {
            warn!(
                learner_id = %self.learner_id(),
                pending = self.unsaved.len(),
                "Closing with unsaved progress"
            );
        }
        flushed
    }
}

impl CompletionSink for ProgressTracker {
    fn lab_completed(&mut self, session_id: &SessionId, lab_id: &LabId) {
        self.mark_lab_complete(session_id, lab_id, academy_util::now());
    }
}
