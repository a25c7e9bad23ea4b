//! Step validation
//!
//! A step is satisfied when the raw input line contains its expected
//! substring. Matching is plain case-sensitive containment with no
//! tokenization, so `ls -la` also satisfies a step expecting `ls`.
//! Steps without an expected substring can never be satisfied.

use academy_api::LabStep;
use std::collections::BTreeSet;

/// Does `line` satisfy `step`?
pub fn step_satisfied(line: &str, step: &LabStep) -> bool {
    step.expected
        .as_deref()
        .is_some_and(|expected| line.contains(expected))
}

/// Result of feeding one line to a [`StepCursor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Active step not satisfied (or lab already finished)
    Stay,
    /// `completed` was satisfied and `active` is now current
    Next { completed: usize, active: usize },
    /// `completed` was the last step
    Finished { completed: usize },
}

/// Tracks which step of a lab is active and which are done.
///
/// Only the active step is ever checked; input that would satisfy a later
/// step is ignored until the learner reaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCursor {
    total: usize,
    active: usize,
    completed: BTreeSet<usize>,
}

impl StepCursor {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            active: 0,
            completed: BTreeSet::new(),
        }
    }

    /// Index of the active step. Equal to the step count once finished.
    pub fn active(&self) -> usize {
        self.active
    }

    pub fn completed(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.active >= self.total
    }

    pub fn check(&mut self, line: &str, steps: &[LabStep]) -> Advance {
        if self.is_finished() {
            return Advance::Stay;
        }
        let Some(step) = steps.get(self.active) else {
            return Advance::Stay;
        };
        if !step_satisfied(line, step) {
            return Advance::Stay;
        }

        let completed = self.active;
        self.completed.insert(completed);
        self.active += 1;

        if self.is_finished() {
            Advance::Finished { completed }
        } else {
            Advance::Next {
                completed,
                active: self.active,
            }
        }
    }
}
