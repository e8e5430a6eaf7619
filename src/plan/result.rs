//! Derived plan result and state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::steps::StepState;

/// Aggregated outcome of a set of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanResult {
    Pending,
    Success,
    Error,
}

impl PlanResult {
    pub const ALL: [PlanResult; 3] = [PlanResult::Pending, PlanResult::Success, PlanResult::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for PlanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|result| result.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown result '{}' (expected pending, success or error)", s))
    }
}

/// Lifecycle state of a plan, derived from its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanState {
    /// Planned, nothing started yet.
    Planned,
    /// Run phase in progress.
    Running,
    /// Finalize phase in progress.
    Finalizing,
    /// Finished with success, or halted by an error.
    Stopped,
}

impl fmt::Display for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Planned => "planned",
            Self::Running => "running",
            Self::Finalizing => "finalizing",
            Self::Stopped => "stopped",
        })
    }
}

/// Result of a set of step states, by priority.
///
/// Any `error` wins; otherwise any outstanding step keeps the result
/// `pending`; otherwise (including the empty set) it is `success`.
pub fn result_of<I>(states: I) -> PlanResult
where
    I: IntoIterator<Item = StepState>,
{
    let mut outstanding = false;
    for state in states {
        match state {
            StepState::Error => return PlanResult::Error,
            state if state.is_outstanding() => outstanding = true,
            _ => {}
        }
    }

    if outstanding {
        PlanResult::Pending
    } else {
        PlanResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StepState::*;

    #[test]
    fn error_dominates() {
        assert_eq!(result_of([Success, Pending, Error, Running]), PlanResult::Error);
    }

    #[test]
    fn outstanding_steps_keep_pending() {
        for state in [Pending, Running, Suspended] {
            assert_eq!(result_of([Success, state, Skipped]), PlanResult::Pending);
        }
    }

    #[test]
    fn skipped_counts_as_success() {
        assert_eq!(result_of([Success, Skipped]), PlanResult::Success);
        assert_eq!(result_of([Skipped]), PlanResult::Success);
    }

    #[test]
    fn empty_set_is_success() {
        assert_eq!(result_of([]), PlanResult::Success);
    }

    #[test]
    fn result_parses_from_str() {
        assert_eq!("Error".parse::<PlanResult>().unwrap(), PlanResult::Error);
        assert!("done".parse::<PlanResult>().is_err());
    }
}
