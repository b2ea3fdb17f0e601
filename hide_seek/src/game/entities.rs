use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};
use uuid::Uuid;

/// Opaque handle for a connected player.
///
/// The match never creates or destroys participants; it only references
/// handles supplied by the host.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Fresh random handle, for hosts without their own player ids.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ParticipantId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable.
        let repr = self.0.simple().to_string();
        write!(f, "{}", &repr[..8])
    }
}

/// The step a match is currently in. The cycle is
/// `Waiting -> Starting -> Hiding -> Seeking -> Ending -> Waiting`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Waiting,
    Starting,
    Hiding,
    Seeking,
    Ending,
}

impl Phase {
    /// Hiding and seeking are the phases where roles are in play.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Hiding | Self::Seeking)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Starting => "starting",
            Self::Hiding => "hiding",
            Self::Seeking => "seeking",
            Self::Ending => "ending",
        };
        write!(f, "{repr}")
    }
}

/// Team that can win a match.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Hiders,
    Seekers,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Hiders => "hiders",
            Self::Seekers => "seekers",
        };
        write!(f, "{repr}")
    }
}

/// Which roster set a participant is currently in.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Waiting,
    Hider,
    Seeker,
    Eliminated,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Hider => "hider",
            Self::Seeker => "seeker",
            Self::Eliminated => "eliminated",
        };
        write!(f, "{repr}")
    }
}

/// Owned copy of every roster set, safe to hand to collaborators.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RosterSnapshot {
    pub waiting: BTreeSet<ParticipantId>,
    pub hiders: BTreeSet<ParticipantId>,
    pub seekers: BTreeSet<ParticipantId>,
    pub eliminated: BTreeSet<ParticipantId>,
}

impl RosterSnapshot {
    pub fn total(&self) -> usize {
        self.waiting.len() + self.hiders.len() + self.seekers.len() + self.eliminated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
