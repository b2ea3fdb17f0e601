//! # Hide and Seek
//!
//! The match core of a multiplayer hide-and-seek mode.
//!
//! This library tracks who is in a match, splits them into hiders and
//! seekers, runs the timed phases and decides the winner. Movement, rendering
//! and persistence belong to the host; the host feeds in joins, leaves and
//! captures and listens for events.
//!
//! ## Phases
//!
//! A match cycles through five phases:
//!
//! - **Waiting**: Participants gather, nothing is timed
//! - **Starting**: Countdown before roles are handed out
//! - **Hiding**: Hiders move, seekers are held back
//! - **Seeking**: Seekers are released and may capture hiders
//! - **Ending**: Short grace period after a winner is decided
//!
//! Seekers win by capturing every hider. Hiders win if any of them is still
//! free when the seeking clock runs out.
//!
//! ## Core Modules
//!
//! - [`game`]: Participants, roster and capture rules
//! - [`session`]: State machine, clock, actor and events
//!
//! ## Example
//!
//! ```
//! use hide_seek::{Phase, Roster, ParticipantId};
//!
//! let mut roster = Roster::new();
//! roster.add_waiting(ParticipantId::random()).unwrap();
//! assert_eq!(roster.waiting_count(), 1);
//! assert_eq!(Phase::default(), Phase::Waiting);
//! ```

/// Match rules that do not depend on time.
pub mod game;
pub use game::{
    CaptureOutcome, Ineligibility, ParticipantId, Phase, Role, Roster, RosterSnapshot, Side,
};

/// Timed match lifecycle driven by an async actor.
pub mod session;
pub use session::{
    EventSink, LogSink, MatchActor, MatchConfig, MatchError, MatchEvent, MatchHandle,
    MatchResult, MatchSettings, MatchStatus,
};
