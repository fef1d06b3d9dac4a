//! Participant: one entrant of a bracket, identified by its user.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant row.
pub type ParticipantId = Uuid;

/// Identity of the person behind a participant (used in match slots).
pub type UserId = Uuid;

/// Where a participant stands in the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    #[default]
    Active,
    /// Lost twice. Terminal: never mutated again.
    Eliminated,
    Champion,
}

/// A seeded entrant.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub user_id: UserId,
    /// Lower is stronger.
    pub seed: u32,
    /// Index into the round-1 slot list, assigned when the tournament starts.
    pub bracket_position: Option<u32>,
    pub status: ParticipantStatus,
}

impl Participant {
    pub fn new(user_id: UserId, seed: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            seed,
            bracket_position: None,
            status: ParticipantStatus::Active,
        }
    }
}
