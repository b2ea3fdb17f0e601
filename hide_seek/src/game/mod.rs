//! Match rules that do not depend on time.
//!
//! This module provides:
//! - Participant, phase and role types
//! - The roster with its role assignment
//! - The capture resolver

pub mod capture;
pub mod entities;
pub mod roster;

pub use capture::{CaptureOutcome, Ineligibility, try_capture};
pub use entities::{ParticipantId, Phase, Role, RosterSnapshot, Side};
pub use roster::{Roster, RosterError, hider_count};
