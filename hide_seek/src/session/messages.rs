//! Match actor message types.

use tokio::sync::{mpsc, oneshot};

use super::{errors::MatchResult, events::MatchEvent};
use crate::game::{CaptureOutcome, ParticipantId, Phase, RosterSnapshot};
use std::time::Duration;

/// Messages that can be sent to a MatchActor
#[derive(Debug)]
pub enum MatchMessage {
    /// Enter the waiting set
    Join {
        participant: ParticipantId,
        response: oneshot::Sender<MatchResult<()>>,
    },

    /// Leave from any set
    Leave {
        participant: ParticipantId,
        response: oneshot::Sender<MatchResult<()>>,
    },

    /// Begin the countdown
    Start {
        response: oneshot::Sender<MatchResult<()>>,
    },

    /// Force the match back to an empty waiting state.
    /// Responds with the number of participants removed.
    Stop { response: oneshot::Sender<usize> },

    /// Seeker tags a hider
    Capture {
        attacker: ParticipantId,
        target: ParticipantId,
        response: oneshot::Sender<MatchResult<CaptureOutcome>>,
    },

    GetPhase {
        response: oneshot::Sender<Phase>,
    },

    GetRemainingTime {
        response: oneshot::Sender<Duration>,
    },

    GetRoster {
        response: oneshot::Sender<RosterSnapshot>,
    },

    GetStatus {
        response: oneshot::Sender<MatchStatus>,
    },

    /// Receive every subsequent event on `sender`
    Subscribe { sender: mpsc::Sender<MatchEvent> },

    /// Stop the actor loop
    Shutdown,
}

/// Summary for status bars and scoreboards
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MatchStatus {
    /// Current phase
    pub phase: Phase,

    /// Time left in the current phase
    pub remaining: Duration,

    /// Full length of the current phase
    pub phase_duration: Duration,

    pub waiting: usize,
    pub hiders: usize,
    pub seekers: usize,
    pub eliminated: usize,
}

impl MatchStatus {
    /// Everyone currently tracked by the match
    pub fn total(&self) -> usize {
        self.waiting + self.hiders + self.seekers + self.eliminated
    }

    /// Fraction of the phase still to run, in `[0, 1]`. Zero when untimed.
    pub fn progress_remaining(&self) -> f32 {
        if self.phase_duration.is_zero() {
            return 0.0;
        }
        (self.remaining.as_secs_f32() / self.phase_duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}
