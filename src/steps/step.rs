//! The step record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StepState;
use crate::action::ActionId;
use crate::error::{PlanError, Result};

/// Identifier of a step, unique within one plan.
pub type StepId = u64;

/// Execution phase a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// The action's planning callback.
    Plan,
    /// The action's main work.
    Run,
    /// Clean-up work after every run step finished.
    Finalize,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Plan => "plan",
            Self::Run => "run",
            Self::Finalize => "finalize",
        })
    }
}

/// Structured error captured on a failed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepError {
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backtrace: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_class: Option<String>,
}

impl StepError {
    /// Create an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            backtrace: Vec::new(),
            exception_class: None,
        }
    }

    /// Attach the class (kind) of the failure.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.exception_class = Some(class.into());
        self
    }

    /// Capture an `anyhow` error; the cause chain becomes the backtrace.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        Self {
            message: err.to_string(),
            backtrace: err.chain().skip(1).map(|cause| cause.to_string()).collect(),
            exception_class: None,
        }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.exception_class {
            Some(class) => write!(f, "{}: {}", class, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Execution record of one action in one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub action_id: ActionId,
    pub phase: Phase,
    pub state: StepState,

    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub error: Option<StepError>,
}

impl Step {
    /// Create a pending step.
    pub fn new(id: StepId, action_id: ActionId, phase: Phase) -> Self {
        Self {
            id,
            action_id,
            phase,
            state: StepState::Pending,
            started_at: None,
            ended_at: None,
            error: None,
        }
    }

    /// Move the step to `to`, validating the transition table.
    ///
    /// `started_at` is stamped the first time the step runs and `ended_at`
    /// whenever it reaches a terminal state.
    pub fn set_state(&mut self, to: StepState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(PlanError::InvalidStateTransition {
                step_id: self.id,
                from: self.state,
                to,
            });
        }

        let now = Utc::now();
        if to == StepState::Running && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if to.is_terminal() {
            self.ended_at = Some(now);
        }

        self.state = to;
        Ok(())
    }

    /// Fail a running step with the given error details.
    pub fn record_error(&mut self, error: StepError) -> Result<()> {
        self.set_state(StepState::Error)?;
        self.error = Some(error);
        Ok(())
    }

    /// Put a failed step back to pending so it can run again.
    ///
    /// This is the only way out of `error`; the transition table itself
    /// never leaves it.
    pub fn reset_for_retry(&mut self) -> Result<()> {
        if self.state != StepState::Error {
            return Err(PlanError::InvalidStateTransition {
                step_id: self.id,
                from: self.state,
                to: StepState::Pending,
            });
        }

        self.state = StepState::Pending;
        self.error = None;
        self.started_at = None;
        self.ended_at = None;
        Ok(())
    }
}
