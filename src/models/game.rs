//! Match, its slots and bracket classification.

use crate::models::participant::UserId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which part of the bracket a match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    Winners,
    Losers,
    GrandFinals,
    BracketReset,
}

/// One of the two player positions of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Player1,
    Player2,
}

impl Slot {
    pub fn other(self) -> Self {
        match self {
            Slot::Player1 => Slot::Player2,
            Slot::Player2 => Slot::Player1,
        }
    }
}

/// The side of the bracket an entrant arrived from: still undefeated (winners)
/// or already carrying one loss (losers).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Winners,
    Losers,
}

/// Lifecycle of a single match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Entrants not all known yet.
    #[default]
    Waiting,
    /// Both entrants known, awaiting a result.
    Pending,
    Completed,
    /// Resolved without being played: only one entrant ever arrived.
    Walkover,
    /// Will never be played (empty bye, or an unneeded bracket reset).
    Skipped,
}

impl MatchStatus {
    /// True once nothing more can flow into or out of the match.
    pub fn is_settled(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Walkover | MatchStatus::Skipped)
    }
}

/// A single 1v1 match in the bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round_number: u32,
    /// 1-based position within the round.
    pub match_number: u32,
    pub player1_id: Option<UserId>,
    pub player2_id: Option<UserId>,
    pub player1_side: Option<Side>,
    pub player2_side: Option<Side>,
    /// None until resolved. Set exactly once.
    pub winner_id: Option<UserId>,
    pub bracket_type: BracketType,
    /// Global ordering of the match inside the generated bracket.
    pub bracket_position: u32,
    pub is_grand_finals: bool,
    pub is_bracket_reset: bool,
    /// Display links filled at generation time; advancement never reads them.
    pub next_winners_match_id: Option<MatchId>,
    pub next_losers_match_id: Option<MatchId>,
    pub status: MatchStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    pub fn new(
        tournament_id: TournamentId,
        bracket_type: BracketType,
        round_number: u32,
        match_number: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round_number,
            match_number,
            player1_id: None,
            player2_id: None,
            player1_side: None,
            player2_side: None,
            winner_id: None,
            bracket_type,
            bracket_position: 0,
            is_grand_finals: bracket_type == BracketType::GrandFinals,
            is_bracket_reset: bracket_type == BracketType::BracketReset,
            next_winners_match_id: None,
            next_losers_match_id: None,
            status: MatchStatus::Waiting,
            completed_at: None,
        }
    }

    pub fn player(&self, slot: Slot) -> Option<UserId> {
        match slot {
            Slot::Player1 => self.player1_id,
            Slot::Player2 => self.player2_id,
        }
    }

    pub fn side(&self, slot: Slot) -> Option<Side> {
        match slot {
            Slot::Player1 => self.player1_side,
            Slot::Player2 => self.player2_side,
        }
    }

    /// Fill a slot. Callers check occupancy first; the store enforces it.
    pub fn set_player(&mut self, slot: Slot, user_id: UserId, side: Side) {
        match slot {
            Slot::Player1 => {
                self.player1_id = Some(user_id);
                self.player1_side = Some(side);
            }
            Slot::Player2 => {
                self.player2_id = Some(user_id);
                self.player2_side = Some(side);
            }
        }
    }

    /// Which slot holds `user_id`, if any.
    pub fn slot_of(&self, user_id: UserId) -> Option<Slot> {
        if self.player1_id == Some(user_id) {
            Some(Slot::Player1)
        } else if self.player2_id == Some(user_id) {
            Some(Slot::Player2)
        } else {
            None
        }
    }

    /// First free slot, player1 preferred.
    pub fn empty_slot(&self) -> Option<Slot> {
        if self.player1_id.is_none() {
            Some(Slot::Player1)
        } else if self.player2_id.is_none() {
            Some(Slot::Player2)
        } else {
            None
        }
    }

    pub fn entrants(&self) -> impl Iterator<Item = UserId> + '_ {
        self.player1_id.iter().chain(self.player2_id.iter()).copied()
    }

    pub fn has_both_players(&self) -> bool {
        self.player1_id.is_some() && self.player2_id.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.winner_id.is_some()
    }
}
