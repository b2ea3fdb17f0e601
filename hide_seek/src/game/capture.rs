//! Capture validation.
//!
//! The resolver only decides and records; teleporting, messaging and scoring
//! the captured hider are left to whoever consumes the outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    entities::{ParticipantId, Phase},
    roster::Roster,
};

/// Why a capture attempt was turned down
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Ineligibility {
    /// Captures only count while seeking
    WrongPhase,
    AttackerNotSeeker,
    TargetNotHider,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::WrongPhase => "not seeking",
            Self::AttackerNotSeeker => "attacker is not a seeker",
            Self::TargetNotHider => "target is not a hider",
        };
        write!(f, "{repr}")
    }
}

/// Result of a capture attempt
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CaptureOutcome {
    Captured { remaining_hiders: usize },
    NotEligible(Ineligibility),
}

impl CaptureOutcome {
    pub fn is_captured(&self) -> bool {
        matches!(self, Self::Captured { .. })
    }
}

/// Validate a capture and, if it is legal, eliminate the target.
///
/// Nothing is mutated unless the outcome is `Captured`.
pub fn try_capture(
    attacker: &ParticipantId,
    target: &ParticipantId,
    phase: Phase,
    roster: &mut Roster,
) -> CaptureOutcome {
    if phase != Phase::Seeking {
        return CaptureOutcome::NotEligible(Ineligibility::WrongPhase);
    }
    if !roster.is_seeker(attacker) {
        return CaptureOutcome::NotEligible(Ineligibility::AttackerNotSeeker);
    }
    if roster.eliminate(target).is_err() {
        return CaptureOutcome::NotEligible(Ineligibility::TargetNotHider);
    }

    CaptureOutcome::Captured {
        remaining_hiders: roster.hider_count(),
    }
}
