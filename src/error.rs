//! Error types for planflow operations.
//!
//! This module defines [`PlanError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `PlanError` for failures of the planning core and its persistence
//!   contract; these are always surfaced, never absorbed
//! - Failures of an action's own logic are not errors here: they are recorded
//!   on the step (`StepState::Error`) and surface through the plan result
//! - Use `anyhow::Error` (via `PlanError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

use crate::steps::{StepId, StepState};

/// Core error type for planflow operations.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A step mutation violates the step state machine.
    #[error("Invalid state transition for step {step_id}: {from} -> {to}")]
    InvalidStateTransition {
        step_id: StepId,
        from: StepState,
        to: StepState,
    },

    /// A step was started before its flow predecessors finished.
    #[error("Step {step_id} cannot start: its predecessors have not finished")]
    StepNotReady { step_id: StepId },

    /// The plan already finished successfully and no longer accepts mutations.
    #[error("Execution plan {plan_id} is finished and cannot be modified")]
    PlanFrozen { plan_id: String },

    /// Action dependency cycle detected while planning.
    #[error("Cyclic dependency detected: {cycle}")]
    CyclicDependency { cycle: String },

    /// A flow node with an unknown tag was encountered.
    #[error("Unknown flow variant: {variant}")]
    UnknownFlowVariant { variant: String },

    /// A persisted plan does not agree with its own flows or steps.
    #[error("Persisted plan {plan_id} is inconsistent: {message}")]
    DeserializationMismatch { plan_id: String, message: String },

    /// Referenced step does not exist in the plan.
    #[error("Unknown step: {step_id}")]
    UnknownStep { step_id: StepId },

    /// Referenced action does not exist.
    #[error("Unknown action: {name}")]
    UnknownAction { name: String },

    /// No persisted plan under the given id.
    #[error("Execution plan not found: {plan_id}")]
    PlanNotFound { plan_id: String },

    /// Invalid workflow definition.
    #[error("Invalid workflow definition: {message}")]
    DefinitionError { message: String },

    /// An explicitly requested settings file does not exist.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a settings or definition file.
    #[error("Failed to parse {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for planflow operations.
pub type Result<T> = std::result::Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_displays_states() {
        let err = PlanError::InvalidStateTransition {
            step_id: 7,
            from: StepState::Success,
            to: StepState::Running,
        };
        let msg = err.to_string();
        assert!(msg.contains("step 7"));
        assert!(msg.contains("success -> running"));
    }

    #[test]
    fn cyclic_dependency_displays_cycle() {
        let err = PlanError::CyclicDependency {
            cycle: "merge -> ci -> merge".into(),
        };
        assert!(err.to_string().contains("merge -> ci -> merge"));
    }

    #[test]
    fn unknown_flow_variant_displays_variant() {
        let err = PlanError::UnknownFlowVariant {
            variant: "parallel".into(),
        };
        assert!(err.to_string().contains("parallel"));
    }

    #[test]
    fn mismatch_displays_plan_and_message() {
        let err = PlanError::DeserializationMismatch {
            plan_id: "abc".into(),
            message: "step 4 missing".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc"));
        assert!(msg.contains("step 4 missing"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: PlanError = io_err.into();
        assert!(matches!(err, PlanError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts() {
        let err: PlanError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
