//! Access gate: turns an access code into a live [`ProgressTracker`]

use academy_api::{ACCESS_PERIOD_DAYS, LearnerProfile, LearnerRecord};
use academy_config::{Curriculum, LearnerGrant};
use academy_store::{AuditEvent, AuditEventType, Store, StoreError};
use academy_util::{AcademyError, Result};
use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{info, warn};

use crate::ProgressTracker;

pub struct AccessGate {
    grants: Vec<LearnerGrant>,
    total_sessions: usize,
    store: Arc<dyn Store>,
}

impl AccessGate {
    pub fn new(curriculum: &Curriculum, store: Arc<dyn Store>) -> Self {
        Self {
            grants: curriculum.learners.clone(),
            total_sessions: curriculum.sessions.len(),
            store,
        }
    }

    /// Look up a grant by access code (case-insensitive)
    pub fn grant(&self, access_code: &str) -> Option<&LearnerGrant> {
        let code = access_code.trim().to_uppercase();
        self.grants.iter().find(|g| g.access_code == code)
    }

    /// Authenticate and load (or issue) the learner's record.
    ///
    /// A stored record that is missing, past its expiry date or malformed
    /// is replaced by a fresh one. Any other store failure refuses the
    /// login with [`AcademyError::ProgressUnavailable`] and leaves the
    /// stored record alone. `email`, when given, overrides the profile
    /// e-mail.
    pub fn login(
        &self,
        access_code: &str,
        email: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<ProgressTracker> {
        let grant = self
            .grant(access_code)
            .ok_or(AcademyError::InvalidAccessCode)?;

        if let Some(last_day) = grant.expires_on
            && now.date_naive() > last_day
        {
            info!(learner_id = %grant.id, %last_day, "Access code expired");
            return Err(AcademyError::AccessExpired);
        }

        let (mut record, fresh) = match self.store.load_learner(&grant.id, now) {
            Ok(Some(record)) if !record.profile.is_expired(now) => (record, false),
            Ok(Some(_)) => {
                self.discard(grant, "access period ended");
                (issue(grant, now), true)
            }
            Ok(None) => (issue(grant, now), true),
            Err(StoreError::Serialization(reason)) => {
                warn!(learner_id = %grant.id, %reason, "Stored progress is malformed");
                self.discard(grant, &reason);
                (issue(grant, now), true)
            }
            Err(e) => {
                warn!(learner_id = %grant.id, error = %e, "Failed to load stored progress");
                return Err(AcademyError::ProgressUnavailable(e.to_string()));
            }
        };

        if let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) {
            record.profile.email = email.to_string();
        }

        info!(
            learner_id = %record.profile.id,
            fresh,
            sessions_with_progress = record.progress.iter().count(),
            "Learner logged in"
        );
        let _ = self
            .store
            .append_audit(AuditEvent::new(AuditEventType::LearnerLoggedIn {
                learner_id: record.profile.id.clone(),
                fresh,
            }));

        let mut tracker = ProgressTracker::new(record, self.total_sessions, self.store.clone());
        tracker.save_all(now);
        Ok(tracker)
    }

    /// Final flush of the learner's progress. The caller drops the tracker
    /// afterwards.
    pub fn logout(&self, tracker: &mut ProgressTracker, now: DateTime<Local>) {
        tracker.close(now);
        info!(learner_id = %tracker.learner_id(), "Learner logged out");
        let _ = self
            .store
            .append_audit(AuditEvent::new(AuditEventType::LearnerLoggedOut {
                learner_id: tracker.learner_id().clone(),
            }));
    }

    fn discard(&self, grant: &LearnerGrant, reason: &str) {
        info!(learner_id = %grant.id, reason, "Discarding stored progress");
        let _ = self
            .store
            .append_audit(AuditEvent::new(AuditEventType::ProgressDiscarded {
                learner_id: grant.id.clone(),
                reason: reason.to_string(),
            }));
    }
}

fn issue(grant: &LearnerGrant, now: DateTime<Local>) -> LearnerRecord {
    LearnerRecord::issue(LearnerProfile {
        id: grant.id.clone(),
        email: grant.email.clone(),
        name: grant.name.clone(),
        access_level: grant.access_level,
        expiry_date: now + chrono::Duration::days(ACCESS_PERIOD_DAYS),
        enrollment_date: now,
    })
}
