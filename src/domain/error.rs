//! Domain errors for the phase-task engine.

use thiserror::Error;
use uuid::Uuid;

use super::models::phase::Phase;
use super::models::task::TaskStatus;

/// Errors raised by the engine components.
///
/// Most of these never reach the learner: the engine recovers locally and keeps
/// routing messages. They surface through the outcome's fault list and the log.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Task {definition_id} is trigger-once and already has an instance")]
    DuplicateActivation { definition_id: String },

    #[error("Task {definition_id} has unsatisfied prerequisites: {missing:?}")]
    PrerequisiteUnsatisfied {
        definition_id: String,
        missing: Vec<String>,
    },

    #[error("Task instance not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Unknown task definition: {0}")]
    UnknownDefinition(String),

    #[error("Invalid task state transition from {from:?} to {to:?}")]
    InvalidStateTransition { from: TaskStatus, to: TaskStatus },

    #[error("Invalid phase transition from {from} to {to}")]
    InvalidPhaseTransition { from: Phase, to: Phase },

    #[error("Phase mismatch: active phase is {active}, update targeted {requested}")]
    PhaseMismatch { active: Phase, requested: Phase },

    #[error("Invalid step result: {0}")]
    InvalidStepResult(String),

    #[error("Invalid task catalog: {0}")]
    InvalidCatalog(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Session recorder error: {0}")]
    Recorder(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Recorder(err.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::Recorder(err.to_string())
    }
}
