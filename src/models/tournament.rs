//! Tournament row and BracketError.

use crate::models::game::MatchId;
use crate::models::participant::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of record could not be found.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Entity {
    Match(MatchId),
    Tournament(TournamentId),
    Participant(UserId),
}

/// Why a write was refused instead of overwriting state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConflictKind {
    /// The match already has a winner.
    AlreadyResolved,
    /// The target slot holds a different participant.
    SlotOccupied,
    /// The match does not have both entrants yet.
    MatchNotReady,
    /// The tournament is already completed.
    TournamentFinished,
    /// The same user appears twice in a participant list.
    DuplicateParticipant,
}

/// Errors that can occur while generating or advancing a bracket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// Fewer than 2 participants at generation time.
    InvalidBracket { participants: usize },
    NotFound(Entity),
    Conflict(ConflictKind),
    /// Winner and loser are not the two entrants of the match.
    InvalidResult { match_id: MatchId },
    /// Backing store failure (e.g. poisoned lock).
    Storage(String),
    /// Participant list could not be parsed.
    Import(String),
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::InvalidBracket { participants } => {
                write!(f, "Need at least 2 participants to build a bracket (got {})", participants)
            }
            BracketError::NotFound(Entity::Match(id)) => write!(f, "Match {} not found", id),
            BracketError::NotFound(Entity::Tournament(id)) => write!(f, "Tournament {} not found", id),
            BracketError::NotFound(Entity::Participant(id)) => write!(f, "Participant {} not found", id),
            BracketError::Conflict(kind) => match kind {
                ConflictKind::AlreadyResolved => write!(f, "Match already has a result"),
                ConflictKind::SlotOccupied => write!(f, "Match slot is already taken"),
                ConflictKind::MatchNotReady => write!(f, "Match does not have both players yet"),
                ConflictKind::TournamentFinished => write!(f, "Tournament is already completed"),
                ConflictKind::DuplicateParticipant => write!(f, "Participant listed more than once"),
            },
            BracketError::InvalidResult { match_id } => {
                write!(f, "Winner and loser must be the two players of match {}", match_id)
            }
            BracketError::Storage(msg) => write!(f, "Storage error: {}", msg),
            BracketError::Import(msg) => write!(f, "Could not read participants: {}", msg),
        }
    }
}

impl std::error::Error for BracketError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Active,
    Completed,
}

/// Tournament row. Authoritative match state lives in the match rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    /// Winners-bracket round count, fixed at generation.
    pub rounds: u32,
    /// Auto-resolve byes and walkovers after generation and each result.
    pub resolve_byes: bool,
    /// Serialized bracket written once at start, for display and audit only.
    pub bracket_structure: Option<serde_json::Value>,
    pub champion_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Tournament {
    pub fn new(name: impl Into<String>, rounds: u32, resolve_byes: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: TournamentStatus::Active,
            rounds,
            resolve_byes,
            bracket_structure: None,
            champion_id: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TournamentStatus::Completed
    }
}
