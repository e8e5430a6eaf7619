//! Step records and the step state machine.
//!
//! A [`Step`] tracks the execution of exactly one action in exactly one
//! [`Phase`]. Steps are created by the planner and afterwards mutated only
//! through the narrow contract exposed here:
//!
//! - [`Step::set_state`] - validated against the [`StepState`] transition table
//! - [`Step::record_error`] - moves a running step to `error` with details
//! - [`Step::reset_for_retry`] - explicit resume request for a failed step
//!
//! # Example
//!
//! ```
//! use planflow::steps::{Phase, Step, StepState};
//!
//! let mut step = Step::new(4, 2, Phase::Run);
//! step.set_state(StepState::Running).unwrap();
//! step.set_state(StepState::Success).unwrap();
//!
//! assert!(step.state.passes_gate());
//! assert!(step.set_state(StepState::Running).is_err());
//! ```

pub mod state;
pub mod step;

pub use state::StepState;
pub use step::{Phase, Step, StepError, StepId};
