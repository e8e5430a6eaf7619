//! Step states and the transition table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// State of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    /// Created by the planner, not started yet.
    #[default]
    Pending,
    /// Picked up by the execution layer.
    Running,
    /// Waiting for an external job to complete.
    Suspended,
    /// Finished successfully.
    Success,
    /// Failed; only an explicit retry moves it back to pending.
    Error,
    /// Bypassed, either cancelled or intentionally not run.
    Skipped,
}

impl StepState {
    /// All states, in display order.
    pub const ALL: [StepState; 6] = [
        StepState::Pending,
        StepState::Running,
        StepState::Suspended,
        StepState::Success,
        StepState::Error,
        StepState::Skipped,
    ];

    /// Whether the transition table permits moving from `self` to `to`.
    pub fn can_transition_to(self, to: StepState) -> bool {
        use StepState::*;

        matches!(
            (self, to),
            (Pending, Running)
                | (Pending, Skipped)
                | (Running, Success)
                | (Running, Error)
                | (Running, Suspended)
                | (Running, Skipped)
                | (Suspended, Running)
        )
    }

    /// Terminal states end a step's execution.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Skipped)
    }

    /// Whether a step in this state lets the next step of a sequence start.
    pub fn passes_gate(self) -> bool {
        matches!(self, Self::Success | Self::Skipped)
    }

    /// Whether this state keeps a phase from being finished.
    pub fn is_outstanding(self) -> bool {
        matches!(self, Self::Pending | Self::Running | Self::Suspended)
    }

    /// Lowercase name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Suspended => "suspended",
            Self::Success => "success",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("unknown step state: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StepState::*;

    #[test]
    fn permitted_transitions() {
        let permitted = [
            (Pending, Running),
            (Pending, Skipped),
            (Running, Success),
            (Running, Error),
            (Running, Suspended),
            (Running, Skipped),
            (Suspended, Running),
        ];

        for from in StepState::ALL {
            for to in StepState::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    permitted.contains(&(from, to)),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn error_is_not_left_through_the_table() {
        assert!(!Error.can_transition_to(Pending));
        assert!(!Error.can_transition_to(Running));
    }

    #[test]
    fn terminal_states() {
        assert!(Success.is_terminal());
        assert!(Error.is_terminal());
        assert!(Skipped.is_terminal());
        assert!(!Suspended.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn only_success_and_skipped_pass_the_gate() {
        let passing: Vec<_> = StepState::ALL
            .into_iter()
            .filter(|s| s.passes_gate())
            .collect();
        assert_eq!(passing, vec![Success, Skipped]);
    }

    #[test]
    fn parses_from_str() {
        assert_eq!("running".parse::<StepState>().unwrap(), Running);
        assert_eq!("SKIPPED".parse::<StepState>().unwrap(), Skipped);
        assert!("done".parse::<StepState>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Suspended).unwrap();
        assert_eq!(json, "\"suspended\"");
    }
}
