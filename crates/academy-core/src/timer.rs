//! Time accrual for an open session
//!
//! While a learner has a session open, a background task credits a fixed
//! number of minutes to that session on every tick. The task belongs to
//! the view that started it and is aborted when the [`SessionTimer`] is
//! dropped, so leaving a session always stops accrual.

use academy_util::SessionId;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::SharedTracker;

pub struct SessionTimer {
    session_id: SessionId,
    handle: JoinHandle<()>,
}

impl SessionTimer {
    /// Start crediting `minutes_per_tick` to `session_id` every `interval`.
    /// The first credit lands one full interval after start.
    pub fn start(
        tracker: SharedTracker,
        session_id: SessionId,
        interval: Duration,
        minutes_per_tick: u64,
    ) -> Self {
        debug!(session_id = %session_id, ?interval, minutes_per_tick, "Session timer started");

        let task_session = session_id.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let mut tracker = tracker.lock().await;
                tracker.add_session_time(&task_session, minutes_per_tick, academy_util::now());
            }
        });

        Self { session_id, handle }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        debug!(session_id = %self.session_id, "Session timer stopped");
        self.handle.abort();
    }
}
