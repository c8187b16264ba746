use thiserror::Error;

use crate::session::Step;

/// Errors that abort a single conversation turn or a graph/catalog build.
///
/// Malformed user input is never an error: handlers answer it with a
/// re-prompt. These variants cover broken invariants and misconfiguration.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("No handler registered for step: {0}")]
    StepNotFound(Step),

    #[error("Transition {from} -> {to} is not declared in the conversation graph")]
    IllegalTransition { from: Step, to: Step },

    #[error("Invalid conversation graph: {0}")]
    InvalidGraph(String),

    #[error("Invalid problem catalog: {0}")]
    InvalidCatalog(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Claim is missing field: {0}")]
    IncompleteClaim(&'static str),
}

pub type Result<T> = std::result::Result<T, FlowError>;

/// Failure reported by a [`crate::RecordSink`].
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Record sink is not configured")]
    NotConfigured,

    #[error("Record sink transport error: {0}")]
    Transport(String),

    #[error("Record sink rejected the claim with status {0}")]
    Rejected(u16),
}
