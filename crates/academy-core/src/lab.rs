//! Lab session controller
//!
//! Owns one learner's walk through a lab: the terminal output log, the
//! step cursor, and the completion signal. State machine:
//!
//! ```text
//! Idle --start--> Running --last step--> Complete
//!   \
//!    `--start (unknown lab)--> NotFound
//! ```
//!
//! `Complete` keeps accepting input (the terminal still works) but nothing
//! is validated any more. `NotFound` accepts no input at all.

use academy_api::{ContentRepository, LabDefinition, LabStep};
use academy_util::{LabId, RunId, SessionId};
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, info};

use crate::{Advance, LabEvent, Output, StepCursor, interpreter};

/// Prompt echoed in front of every submitted line
pub const PROMPT: &str = "student@linux-lab:~$ ";

const WELCOME_BANNER: &[&str] = &[
    "Welcome to Linux Mastery Academy Interactive Lab!",
    "Type commands below to practice. Use \"help\" for available commands.",
    "",
];

const RESET_BANNER: &[&str] = &["Terminal reset!", ""];

/// Receives the completion signal for a lab.
///
/// Implemented by [`crate::ProgressTracker`]; called synchronously from
/// [`LabController::submit`] exactly once per completed run.
pub trait CompletionSink {
    fn lab_completed(&mut self, session_id: &SessionId, lab_id: &LabId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabPhase {
    Idle,
    Running,
    Complete,
    NotFound,
}

/// Terminal output, oldest line dropped first once `cap` is reached
#[derive(Debug, Clone)]
pub struct OutputLog {
    lines: VecDeque<String>,
    cap: usize,
}

impl OutputLog {
    pub fn new(cap: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            cap: cap.max(1),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.cap {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// What one submitted line produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    /// Lines appended to the log, prompt echo included
    pub lines: Vec<String>,

    /// The log was wiped before `lines` were appended
    pub cleared: bool,

    pub events: Vec<LabEvent>,
}

#[derive(Debug)]
struct ActiveLab {
    run_id: RunId,
    session_id: SessionId,
    lab_id: LabId,
    definition: Option<LabDefinition>,
    cursor: StepCursor,
}

/// Drives a single lab run
#[derive(Debug)]
pub struct LabController {
    phase: LabPhase,
    active: Option<ActiveLab>,
    output: OutputLog,
}

impl LabController {
    pub fn new(output_cap: usize) -> Self {
        Self {
            phase: LabPhase::Idle,
            active: None,
            output: OutputLog::new(output_cap),
        }
    }

    /// Resolve `(session_id, lab_id)` and begin a fresh run.
    ///
    /// Any previous run is discarded. An unknown lab moves to `NotFound`
    /// instead of failing.
    pub fn start(
        &mut self,
        content: &impl ContentRepository,
        session_id: &SessionId,
        lab_id: &LabId,
    ) -> LabEvent {
        self.output.clear();
        let run_id = RunId::new();

        let Some(definition) = content.lab(session_id, lab_id) else {
            debug!(session_id = %session_id, lab_id = %lab_id, "Lab not found");
            self.phase = LabPhase::NotFound;
            self.active = Some(ActiveLab {
                run_id,
                session_id: session_id.clone(),
                lab_id: lab_id.clone(),
                definition: None,
                cursor: StepCursor::new(0),
            });
            return LabEvent::LabNotFound {
                session_id: session_id.clone(),
                lab_id: lab_id.clone(),
            };
        };

        let step_count = definition.steps.len();
        info!(
            run_id = %run_id,
            session_id = %session_id,
            lab_id = %lab_id,
            step_count,
            "Lab started"
        );

        for line in WELCOME_BANNER {
            self.output.push(*line);
        }

        self.phase = LabPhase::Running;
        self.active = Some(ActiveLab {
            run_id,
            session_id: session_id.clone(),
            lab_id: lab_id.clone(),
            definition: Some(definition.clone()),
            cursor: StepCursor::new(step_count),
        });

        LabEvent::LabStarted {
            run_id,
            session_id: session_id.clone(),
            lab_id: lab_id.clone(),
            step_count,
        }
    }

    /// Submit one line of learner input
    pub fn submit(&mut self, line: &str, sink: &mut dyn CompletionSink) -> Submission {
        if !matches!(self.phase, LabPhase::Running | LabPhase::Complete) {
            debug!(phase = ?self.phase, "Input ignored");
            return Submission::default();
        }
        let Some(active) = self.active.as_mut() else {
            return Submission::default();
        };

        let line = line.trim();
        let mut submission = Submission::default();

        let echo = format!("{}{}", PROMPT, line);
        self.output.push(echo.clone());
        submission.lines.push(echo);

        match interpreter::interpret(line) {
            Output::Clear => {
                self.output.clear();
                submission.cleared = true;
                submission.lines.clear();
            }
            Output::Lines(lines) => {
                for out in lines {
                    self.output.push(out.clone());
                    submission.lines.push(out);
                }
            }
        }

        if self.phase != LabPhase::Running {
            return submission;
        }
        let Some(definition) = active.definition.as_ref() else {
            return submission;
        };

        match active.cursor.check(line, &definition.steps) {
            Advance::Stay => {}
            Advance::Next { completed, active: next } => {
                debug!(run_id = %active.run_id, step = completed, "Step completed");
                submission.events.push(LabEvent::StepCompleted {
                    index: completed,
                    title: definition.steps[completed].title.clone(),
                });
                submission.events.push(LabEvent::StepActivated {
                    index: next,
                    title: definition.steps[next].title.clone(),
                });
            }
            Advance::Finished { completed } => {
                submission.events.push(LabEvent::StepCompleted {
                    index: completed,
                    title: definition.steps[completed].title.clone(),
                });

                info!(
                    run_id = %active.run_id,
                    session_id = %active.session_id,
                    lab_id = %active.lab_id,
                    "Lab completed"
                );
                self.phase = LabPhase::Complete;
                sink.lab_completed(&active.session_id, &active.lab_id);
                submission.events.push(LabEvent::LabCompleted {
                    run_id: active.run_id,
                    session_id: active.session_id.clone(),
                    lab_id: active.lab_id.clone(),
                });
            }
        }

        submission
    }

    /// Clear the terminal. Step progress is untouched.
    pub fn reset(&mut self) {
        if !matches!(self.phase, LabPhase::Running | LabPhase::Complete) {
            return;
        }
        self.output.clear();
        for line in RESET_BANNER {
            self.output.push(*line);
        }
    }

    /// Hint for the active step, if it has one
    pub fn hint(&self) -> Option<&str> {
        self.active_step().and_then(|step| step.hint.as_deref())
    }

    /// Leave the lab. Runtime state is discarded.
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(run_id = %active.run_id, "Lab closed");
        }
        self.phase = LabPhase::Idle;
        self.output.clear();
    }

    pub fn phase(&self) -> LabPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == LabPhase::Complete
    }

    pub fn run_id(&self) -> Option<RunId> {
        self.active.as_ref().map(|a| a.run_id)
    }

    pub fn definition(&self) -> Option<&LabDefinition> {
        self.active.as_ref().and_then(|a| a.definition.as_ref())
    }

    /// Index of the active step; `None` when idle or not found. Once the
    /// lab is complete this is the step count.
    pub fn active_step_index(&self) -> Option<usize> {
        match self.phase {
            LabPhase::Running | LabPhase::Complete => {
                self.active.as_ref().map(|a| a.cursor.active())
            }
            _ => None,
        }
    }

    pub fn active_step(&self) -> Option<&LabStep> {
        let index = self.active_step_index()?;
        self.definition()?.steps.get(index)
    }

    pub fn completed_steps(&self) -> Option<&BTreeSet<usize>> {
        self.active.as_ref().map(|a| a.cursor.completed())
    }

    pub fn output(&self) -> &OutputLog {
        &self.output
    }
}
