//! Membership bookkeeping for a single match.

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use super::entities::{ParticipantId, Role, RosterSnapshot};

/// Errors raised by roster mutations
#[derive(Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum RosterError {
    #[error("already in the match")]
    AlreadyInMatch,
    #[error("not a hider")]
    NotAHider,
}

/// Four disjoint participant sets. A participant is in at most one of them.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    waiting: BTreeSet<ParticipantId>,
    hiders: BTreeSet<ParticipantId>,
    seekers: BTreeSet<ParticipantId>,
    eliminated: BTreeSet<ParticipantId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant to the waiting set
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInMatch` if the participant is in any set.
    pub fn add_waiting(&mut self, participant: ParticipantId) -> Result<(), RosterError> {
        if self.contains(&participant) {
            return Err(RosterError::AlreadyInMatch);
        }
        self.waiting.insert(participant);
        Ok(())
    }

    /// Remove a participant from whichever set holds it.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, participant: &ParticipantId) -> bool {
        self.waiting.remove(participant)
            || self.hiders.remove(participant)
            || self.seekers.remove(participant)
            || self.eliminated.remove(participant)
    }

    /// Split the waiting set into hiders and seekers
    ///
    /// The hider count is `total / 2` clamped to `[min_hiders, max_hiders]`
    /// and then to `[0, total]`. The waiting list is shuffled before it is
    /// sliced, so for a given count every participant is equally likely to
    /// land on either side. With a seeded `rng` the partition is
    /// reproducible.
    ///
    /// # Returns
    ///
    /// * `usize` - Number of hiders assigned
    pub fn assign_roles<R: Rng + ?Sized>(
        &mut self,
        min_hiders: usize,
        max_hiders: usize,
        rng: &mut R,
    ) -> usize {
        let mut pool: Vec<ParticipantId> = std::mem::take(&mut self.waiting).into_iter().collect();
        let total = pool.len();
        let hider_count = hider_count(total, min_hiders, max_hiders);

        pool.shuffle(rng);

        self.hiders.clear();
        self.seekers.clear();

        let seekers = pool.split_off(hider_count);
        self.hiders.extend(pool);
        self.seekers.extend(seekers);

        hider_count
    }

    /// Move a hider to the eliminated set
    ///
    /// # Errors
    ///
    /// Returns `NotAHider` unless the participant is currently a hider.
    pub fn eliminate(&mut self, participant: &ParticipantId) -> Result<(), RosterError> {
        if !self.hiders.remove(participant) {
            return Err(RosterError::NotAHider);
        }
        self.eliminated.insert(*participant);
        Ok(())
    }

    /// Put everyone back into the waiting set without dropping anyone.
    pub fn reset_to_waiting(&mut self) {
        let hiders = std::mem::take(&mut self.hiders);
        let seekers = std::mem::take(&mut self.seekers);
        let eliminated = std::mem::take(&mut self.eliminated);
        self.waiting.extend(hiders);
        self.waiting.extend(seekers);
        self.waiting.extend(eliminated);
    }

    /// Empty every set, returning how many participants were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.total();
        self.waiting.clear();
        self.hiders.clear();
        self.seekers.clear();
        self.eliminated.clear();
        removed
    }

    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.role_of(participant).is_some()
    }

    pub fn role_of(&self, participant: &ParticipantId) -> Option<Role> {
        if self.waiting.contains(participant) {
            Some(Role::Waiting)
        } else if self.hiders.contains(participant) {
            Some(Role::Hider)
        } else if self.seekers.contains(participant) {
            Some(Role::Seeker)
        } else if self.eliminated.contains(participant) {
            Some(Role::Eliminated)
        } else {
            None
        }
    }

    pub fn is_hider(&self, participant: &ParticipantId) -> bool {
        self.hiders.contains(participant)
    }

    pub fn is_seeker(&self, participant: &ParticipantId) -> bool {
        self.seekers.contains(participant)
    }

    pub fn waiting(&self) -> BTreeSet<ParticipantId> {
        self.waiting.clone()
    }

    pub fn hiders(&self) -> BTreeSet<ParticipantId> {
        self.hiders.clone()
    }

    pub fn seekers(&self) -> BTreeSet<ParticipantId> {
        self.seekers.clone()
    }

    pub fn eliminated(&self) -> BTreeSet<ParticipantId> {
        self.eliminated.clone()
    }

    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            waiting: self.waiting(),
            hiders: self.hiders(),
            seekers: self.seekers(),
            eliminated: self.eliminated(),
        }
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    pub fn hider_count(&self) -> usize {
        self.hiders.len()
    }

    pub fn seeker_count(&self) -> usize {
        self.seekers.len()
    }

    pub fn eliminated_count(&self) -> usize {
        self.eliminated.len()
    }

    pub fn total(&self) -> usize {
        self.waiting.len() + self.hiders.len() + self.seekers.len() + self.eliminated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Number of hiders for `total` participants.
///
/// `min_hiders` wins over `max_hiders` if the bounds are inverted, and the
/// result never exceeds `total`.
pub fn hider_count(total: usize, min_hiders: usize, max_hiders: usize) -> usize {
    (total / 2).min(max_hiders).max(min_hiders).min(total)
}
