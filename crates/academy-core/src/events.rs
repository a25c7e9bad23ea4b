//! Events emitted by the lab controller

use academy_util::{LabId, RunId, SessionId};

/// Events emitted by [`crate::LabController`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabEvent {
    /// Lab definition resolved and the first step is active
    LabStarted {
        run_id: RunId,
        session_id: SessionId,
        lab_id: LabId,
        step_count: usize,
    },

    /// No definition for the requested lab
    LabNotFound { session_id: SessionId, lab_id: LabId },

    /// The active step was satisfied
    StepCompleted { index: usize, title: String },

    /// A new step became active
    StepActivated { index: usize, title: String },

    /// Every step is done; emitted once per run
    LabCompleted {
        run_id: RunId,
        session_id: SessionId,
        lab_id: LabId,
    },
}
