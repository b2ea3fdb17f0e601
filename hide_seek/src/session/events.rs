//! Outbound match events and the sinks that receive them.
//!
//! Sinks are fire-and-forget: the match never waits on them and a failing
//! sink never rolls back a transition.

use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use tokio::sync::mpsc;

use crate::game::{ParticipantId, Phase, RosterSnapshot, Side};

/// Events emitted by the match state machine
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    /// Someone entered the waiting set
    ParticipantJoined {
        participant: ParticipantId,
        total: usize,
        min_players: usize,
    },

    /// Someone left, from any set
    ParticipantLeft {
        participant: ParticipantId,
        remaining: usize,
    },

    /// Phase transition. `duration` is the length of the new phase, zero
    /// for `Waiting`. Hiding -> Seeking is the signal to release seekers.
    PhaseChanged {
        from: Phase,
        to: Phase,
        duration: Duration,
    },

    TeamsAssigned {
        hiders: Vec<ParticipantId>,
        seekers: Vec<ParticipantId>,
    },

    PlayerCaptured {
        target: ParticipantId,
        attacker: ParticipantId,
        remaining_hiders: usize,
    },

    /// Match decided. `seeking_elapsed` is how long seeking lasted, which
    /// statistics collaborators use as survival time.
    MatchEnded {
        winner: Side,
        seeking_elapsed: Duration,
        roster: RosterSnapshot,
    },

    /// Forced stop, roster emptied
    MatchReset { removed: usize },
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::ParticipantJoined {
                participant,
                total,
                min_players,
            } => format!("{participant} joined ({total}/{min_players})"),
            Self::ParticipantLeft {
                participant,
                remaining,
            } => format!("{participant} left ({remaining} remaining)"),
            Self::PhaseChanged { from, to, duration } => {
                format!("{from} -> {to} ({}s)", duration.as_secs())
            }
            Self::TeamsAssigned { hiders, seekers } => {
                format!("teams: {} hiders, {} seekers", hiders.len(), seekers.len())
            }
            Self::PlayerCaptured {
                target,
                attacker,
                remaining_hiders,
            } => format!("{target} captured by {attacker} ({remaining_hiders} hiders left)"),
            Self::MatchEnded {
                winner,
                seeking_elapsed,
                ..
            } => format!("{winner} win after {}s of seeking", seeking_elapsed.as_secs()),
            Self::MatchReset { removed } => format!("match reset, {removed} removed"),
        };
        write!(f, "{repr}")
    }
}

/// Consumer of match events
pub trait EventSink: Send {
    /// Deliver one event. Must not block.
    fn publish(&self, event: &MatchEvent);

    /// `false` once the sink can no longer deliver and should be dropped.
    fn is_open(&self) -> bool {
        true
    }
}

/// Writes every event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, event: &MatchEvent) {
        match event {
            MatchEvent::MatchEnded { .. } | MatchEvent::MatchReset { .. } => {
                log::info!("Match event: {event}");
            }
            _ => log::debug!("Match event: {event}"),
        }
    }
}

/// Forwards events over a bounded channel
///
/// A full channel drops the event. A closed channel marks the sink dead.
pub struct ChannelSink {
    sender: mpsc::Sender<MatchEvent>,
    open: AtomicBool,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<MatchEvent>) -> Self {
        Self {
            sender,
            open: AtomicBool::new(true),
        }
    }

    /// Sink plus the receiving end
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<MatchEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }
}

impl EventSink for ChannelSink {
    fn publish(&self, event: &MatchEvent) {
        match self.sender.try_send(event.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("Event subscriber channel full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("Event subscriber disconnected");
                self.open.store(false, Ordering::Relaxed);
            }
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed) && !self.sender.is_closed()
    }
}
