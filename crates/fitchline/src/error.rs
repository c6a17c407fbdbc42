//! Error types for the fitchline engine

use crate::matching::MatchError;
use crate::proof::ProofPosition;
use thiserror::Error;

/// Engine-level errors.
///
/// `MatchFailure` is a recoverable control-flow signal: callers trying rules
/// in sequence consume it silently and move on. The remaining variants are
/// user-visible failures with descriptive messages.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("rule '{rule}' does not apply: {reason}")]
    MatchFailure { rule: String, reason: MatchError },

    #[error("scope violation: {0}")]
    ScopeViolation(String),

    #[error("proof incomplete: {} obligation(s) remain", .positions.len())]
    IncompleteProof { positions: Vec<ProofPosition> },

    #[error("registry conflict: '{0}' is already registered")]
    RegistryConflict(String),

    #[error("invalid definition in record '{record}': {reason}")]
    InvalidDefinition { record: String, reason: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
