//! SQLite-based store implementation

use academy_api::{AggregateProgress, LearnerProfile, LearnerRecord, SessionProgressRecord};
use academy_util::{LearnerId, SessionId};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::{AuditEvent, Store, StoreError, StoreResult, RECORD_RETENTION_DAYS};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            -- Learner identity records
            CREATE TABLE IF NOT EXISTS learners (
                id TEXT PRIMARY KEY,
                profile_json TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );

            -- One full progress record per learner and session
            CREATE TABLE IF NOT EXISTS progress (
                learner_id TEXT NOT NULL,
                session_id TEXT NOT NULL,
                record_json TEXT NOT NULL,
                PRIMARY KEY (learner_id, session_id)
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }

    fn expiry_from(now: DateTime<Local>) -> String {
        (now + chrono::Duration::days(RECORD_RETENTION_DAYS)).to_rfc3339()
    }
}

fn delete_learner(conn: &Connection, learner_id: &LearnerId) -> StoreResult<()> {
    conn.execute("DELETE FROM progress WHERE learner_id = ?", [learner_id.as_str()])?;
    conn.execute("DELETE FROM learners WHERE id = ?", [learner_id.as_str()])?;
    Ok(())
}

impl Store for SqliteStore {
    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|dt| dt.with_timezone(&Local))
                .unwrap_or_else(|_| academy_util::now());
            let event: crate::AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn load_learner(
        &self,
        learner_id: &LearnerId,
        now: DateTime<Local>,
    ) -> StoreResult<Option<LearnerRecord>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT profile_json, expires_at FROM learners WHERE id = ?",
                [learner_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((profile_json, expires_at)) = row else {
            return Ok(None);
        };

        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|e| StoreError::Serialization(format!("expires_at: {}", e)))?;
        if expires_at <= now {
            debug!(learner_id = %learner_id, "Stored record expired, discarding");
            delete_learner(&conn, learner_id)?;
            return Ok(None);
        }

        let profile: LearnerProfile = serde_json::from_str(&profile_json)?;

        let mut stmt =
            conn.prepare("SELECT session_id, record_json FROM progress WHERE learner_id = ?")?;
        let rows = stmt.query_map([learner_id.as_str()], |row| {
            let session_id: String = row.get(0)?;
            let record_json: String = row.get(1)?;
            Ok((session_id, record_json))
        })?;

        let mut progress = AggregateProgress::new();
        for row in rows {
            let (session_id, record_json) = row?;
            let record: SessionProgressRecord = serde_json::from_str(&record_json)?;
            progress.insert(SessionId::new(session_id), record);
        }

        debug!(learner_id = %learner_id, sessions = progress.iter().count(), "Learner loaded");
        Ok(Some(LearnerRecord { profile, progress }))
    }

    fn save_learner(&self, record: &LearnerRecord, now: DateTime<Local>) -> StoreResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let learner_id = record.profile.id.as_str();
        let profile_json = serde_json::to_string(&record.profile)?;

        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO learners (id, profile_json, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id)
            DO UPDATE SET profile_json = excluded.profile_json, expires_at = excluded.expires_at
            "#,
            params![learner_id, profile_json, Self::expiry_from(now)],
        )?;
        tx.execute("DELETE FROM progress WHERE learner_id = ?", [learner_id])?;
        for (session_id, session) in record.progress.iter() {
            tx.execute(
                "INSERT INTO progress (learner_id, session_id, record_json) VALUES (?, ?, ?)",
                params![learner_id, session_id.as_str(), serde_json::to_string(session)?],
            )?;
        }
        tx.commit()?;

        debug!(learner_id, "Learner saved");
        Ok(())
    }

    fn update_progress(
        &self,
        learner_id: &LearnerId,
        session_id: &SessionId,
        record: &SessionProgressRecord,
        now: DateTime<Local>,
    ) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let touched = conn.execute(
            "UPDATE learners SET expires_at = ? WHERE id = ?",
            params![Self::expiry_from(now), learner_id.as_str()],
        )?;
        if touched == 0 {
            return Err(StoreError::NotFound(format!("learner {}", learner_id)));
        }

        conn.execute(
            r#"
            INSERT INTO progress (learner_id, session_id, record_json)
            VALUES (?, ?, ?)
            ON CONFLICT(learner_id, session_id)
            DO UPDATE SET record_json = excluded.record_json
            "#,
            params![
                learner_id.as_str(),
                session_id.as_str(),
                serde_json::to_string(record)?
            ],
        )?;

        debug!(learner_id = %learner_id, session_id = %session_id, "Progress saved");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}
