//! Lifecycle of a per-seed scheduler
//!
//! A scheduler moves strictly forward through these states. Cancellation may
//! skip `Draining`.

use crate::ScoutError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Created, nothing dequeued yet
    #[default]
    Idle,

    /// Dequeuing entries and dispatching fetches
    Running,

    /// Nothing left to dispatch; waiting for in-flight fetches
    Draining,

    /// Finished, either by exhaustion, budget or cancellation
    Done,
}

impl SchedulerState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if the scheduler may still dispatch new work
    pub fn accepts_work(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether moving from `self` to `next` is legal
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Done)
                | (Self::Running, Self::Draining)
                | (Self::Running, Self::Done)
                | (Self::Draining, Self::Done)
        )
    }

    /// Checked transition
    pub fn transition(&mut self, next: Self) -> Result<(), ScoutError> {
        if !self.can_transition_to(next) {
            return Err(ScoutError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
