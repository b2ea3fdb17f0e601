//! Session module driving a single match with the async actor model.
//!
//! This module implements:
//! - MatchStateMachine: Phase transitions, clock and roster in one owner
//! - MatchActor: Async actor serialising every command and clock expiry
//! - MatchClock: Cancellable single-shot phase timer
//! - Event sinks for observers and configuration providers
//!
//! ## Architecture
//!
//! A match runs in its own Tokio task with an mpsc message inbox. Clock
//! expiries arrive on a second channel drained by the same loop, so
//! commands and timeouts are handled strictly one after the other.
//!
//! ## Example
//!
//! ```no_run
//! use hide_seek::session::{EventSink, LogSink, MatchActor, MatchConfig};
//! use hide_seek::game::ParticipantId;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sinks: Vec<Box<dyn EventSink>> = vec![Box::new(LogSink)];
//!     let handle = MatchActor::spawn(Arc::new(MatchConfig::default()), sinks);
//!
//!     handle.join(ParticipantId::random()).await.unwrap();
//!     handle.join(ParticipantId::random()).await.unwrap();
//!     handle.start().await.unwrap();
//! }
//! ```

pub mod actor;
pub mod clock;
pub mod config;
pub mod errors;
pub mod events;
pub mod messages;
pub mod state_machine;

pub use actor::{MatchActor, MatchHandle};
pub use clock::{ClockTicket, MatchClock};
pub use config::{ConfigError, MatchConfig, MatchSettings, SharedSettings};
pub use errors::{MatchError, MatchResult};
pub use events::{ChannelSink, EventSink, LogSink, MatchEvent};
pub use messages::{MatchMessage, MatchStatus};
pub use state_machine::MatchStateMachine;
