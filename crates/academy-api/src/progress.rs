//! Progress records
//!
//! Record-level rules live here so that every writer agrees on them:
//! - `completed_at` timestamps are first-write-wins
//! - `time_spent` only ever grows

use academy_util::{LabId, SessionId};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Completion state of one lab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabProgressRecord {
    pub completed: bool,
    pub completed_at: DateTime<Local>,
}

/// Progress for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgressRecord {
    #[serde(default)]
    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Local>>,

    /// Accumulated minutes
    #[serde(default)]
    pub time_spent: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Local>>,

    #[serde(default)]
    pub labs: BTreeMap<LabId, LabProgressRecord>,
}

/// Coarse status shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl SessionProgressRecord {
    /// Mark the session completed. Returns false if it already was.
    pub fn mark_completed(&mut self, now: DateTime<Local>) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at.get_or_insert(now);
        true
    }

    /// Mark a lab completed. Returns false if it already was.
    pub fn mark_lab_completed(&mut self, lab_id: &LabId, now: DateTime<Local>) -> bool {
        if self.is_lab_completed(lab_id) {
            return false;
        }
        self.labs.insert(
            lab_id.clone(),
            LabProgressRecord {
                completed: true,
                completed_at: now,
            },
        );
        true
    }

    pub fn add_time(&mut self, minutes: u64, now: DateTime<Local>) {
        self.time_spent = self.time_spent.saturating_add(minutes);
        self.last_accessed = Some(now);
    }

    pub fn is_lab_completed(&self, lab_id: &LabId) -> bool {
        self.labs.get(lab_id).is_some_and(|lab| lab.completed)
    }

    pub fn completed_lab_count(&self) -> usize {
        self.labs.values().filter(|lab| lab.completed).count()
    }

    pub fn status(&self) -> SessionStatus {
        if self.completed {
            SessionStatus::Completed
        } else if self.last_accessed.is_some() {
            SessionStatus::InProgress
        } else {
            SessionStatus::NotStarted
        }
    }
}

/// All session records of one learner, keyed by session id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateProgress(BTreeMap<SessionId, SessionProgressRecord>);

impl AggregateProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&SessionProgressRecord> {
        self.0.get(session_id)
    }

    /// Record for a session, created empty on first touch
    pub fn entry(&mut self, session_id: &SessionId) -> &mut SessionProgressRecord {
        self.0.entry(session_id.clone()).or_default()
    }

    /// Replace one session's record wholesale
    pub fn insert(&mut self, session_id: SessionId, record: SessionProgressRecord) {
        self.0.insert(session_id, record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SessionId, &SessionProgressRecord)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn completed_session_count(&self) -> usize {
        self.0.values().filter(|s| s.completed).count()
    }

    pub fn total_time_minutes(&self) -> u64 {
        self.0.values().map(|s| s.time_spent).sum()
    }
}

impl FromIterator<(SessionId, SessionProgressRecord)> for AggregateProgress {
    fn from_iter<T: IntoIterator<Item = (SessionId, SessionProgressRecord)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// `round(100 * completed / total)`, halves rounding up. Zero when `total` is zero.
pub fn completion_percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let completed = completed as u64;
    let total = total as u64;
    ((200 * completed + total) / (2 * total)) as u32
}

/// An achievement badge and whether it has been earned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub earned: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 1, 10, minute, 0).unwrap()
    }

    #[test]
    fn completion_percent_rounds_half_up() {
        assert_eq!(completion_percent(0, 8), 0);
        assert_eq!(completion_percent(4, 8), 50);
        assert_eq!(completion_percent(3, 8), 38);
        assert_eq!(completion_percent(1, 8), 13);
        assert_eq!(completion_percent(8, 8), 100);
        assert_eq!(completion_percent(1, 0), 0);
    }

    #[test]
    fn session_completion_keeps_first_timestamp() {
        let mut record = SessionProgressRecord::default();
        assert!(record.mark_completed(at(0)));
        assert!(!record.mark_completed(at(5)));
        assert_eq!(record.completed_at, Some(at(0)));
    }

    #[test]
    fn lab_completion_keeps_first_timestamp() {
        let mut record = SessionProgressRecord::default();
        let lab = LabId::new("basic-navigation");

        assert!(record.mark_lab_completed(&lab, at(0)));
        assert!(!record.mark_lab_completed(&lab, at(9)));
        assert_eq!(record.labs[&lab].completed_at, at(0));
        assert!(!record.completed, "lab completion must not complete the session");
    }

    #[test]
    fn time_accumulates_and_touches_last_accessed() {
        let mut record = SessionProgressRecord::default();
        assert_eq!(record.status(), SessionStatus::NotStarted);

        record.add_time(1, at(1));
        record.add_time(3, at(2));
        assert_eq!(record.time_spent, 4);
        assert_eq!(record.last_accessed, Some(at(2)));
        assert_eq!(record.status(), SessionStatus::InProgress);

        record.mark_completed(at(3));
        assert_eq!(record.status(), SessionStatus::Completed);
    }

    #[test]
    fn aggregate_counts() {
        let mut progress = AggregateProgress::new();
        progress.entry(&SessionId::new("a")).mark_completed(at(0));
        progress.entry(&SessionId::new("b")).add_time(30, at(1));
        progress.entry(&SessionId::new("c")).add_time(15, at(2));

        assert_eq!(progress.completed_session_count(), 1);
        assert_eq!(progress.total_time_minutes(), 45);
    }

    #[test]
    fn record_parses_sparse_json() {
        let json = r#"{"timeSpent": 12, "labs": {"basic-navigation": {"completed": true, "completedAt": "2025-03-01T10:00:00+00:00"}}}"#;
        let record: SessionProgressRecord = serde_json::from_str(json).unwrap();
        assert!(!record.completed);
        assert_eq!(record.time_spent, 12);
        assert!(record.is_lab_completed(&LabId::new("basic-navigation")));
    }
}
