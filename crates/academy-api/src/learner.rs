//! The persisted learner record

use academy_util::LearnerId;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::AggregateProgress;

/// How long a record stays valid after it is issued
pub const ACCESS_PERIOD_DAYS: i64 = 90;

/// Access tier granted by an access code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    Standard,
    Premium,
}

/// Identity part of the learner record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub id: LearnerId,
    pub email: String,
    pub name: String,
    pub access_level: AccessLevel,
    pub expiry_date: DateTime<Local>,
    pub enrollment_date: DateTime<Local>,
}

impl LearnerProfile {
    pub fn is_expired(&self, now: DateTime<Local>) -> bool {
        self.expiry_date <= now
    }
}

/// Full durable payload: `{ id, email, name, accessLevel, expiryDate,
/// enrollmentDate, progress }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerRecord {
    #[serde(flatten)]
    pub profile: LearnerProfile,

    #[serde(default)]
    pub progress: AggregateProgress,
}

impl LearnerRecord {
    /// Issue a brand new record with an empty progress map
    pub fn issue(profile: LearnerProfile) -> Self {
        Self {
            profile,
            progress: AggregateProgress::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_uses_camel_case_keys() {
        let issued = Local.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let record = LearnerRecord::issue(LearnerProfile {
            id: LearnerId::new("user_001"),
            email: "student@example.com".into(),
            name: "Premium Student".into(),
            access_level: AccessLevel::Premium,
            expiry_date: issued + chrono::Duration::days(ACCESS_PERIOD_DAYS),
            enrollment_date: issued,
        });

        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["id", "email", "name", "accessLevel", "expiryDate", "enrollmentDate", "progress"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj["accessLevel"], "premium");
    }

    #[test]
    fn expiry_is_inclusive() {
        let issued = Local.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let profile = LearnerProfile {
            id: LearnerId::new("user_001"),
            email: String::new(),
            name: String::new(),
            access_level: AccessLevel::Standard,
            expiry_date: issued,
            enrollment_date: issued,
        };
        assert!(profile.is_expired(issued));
        assert!(!profile.is_expired(issued - chrono::Duration::seconds(1)));
    }
}
