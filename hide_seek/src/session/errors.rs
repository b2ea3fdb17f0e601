//! Match error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{Ineligibility, Phase, RosterError};

/// Validation failures returned to the caller of a match command.
///
/// None of these leave partial state behind; the match is unchanged.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum MatchError {
    #[error("not enough players: {current}/{required}")]
    InsufficientPlayers { current: usize, required: usize },

    #[error("not allowed while {phase}")]
    WrongPhase { phase: Phase },

    #[error("already in the match")]
    AlreadyInMatch,

    #[error("not in the match")]
    NotInMatch,

    #[error("capture not eligible: {0}")]
    NotEligibleCapture(Ineligibility),

    /// The match actor has shut down
    #[error("match is unavailable")]
    Unavailable,
}

impl From<RosterError> for MatchError {
    fn from(value: RosterError) -> Self {
        match value {
            RosterError::AlreadyInMatch => Self::AlreadyInMatch,
            RosterError::NotAHider => Self::NotEligibleCapture(Ineligibility::TargetNotHider),
        }
    }
}

/// Result type for match operations
pub type MatchResult<T> = Result<T, MatchError>;
