//! Bracket store: the persistence contract the engine runs against.
//!
//! The engine never holds state of its own. Every operation receives a store
//! (or a transaction on one) explicitly.

mod memory;

pub use memory::{MemoryStore, MemoryTables, MemoryTx};

use crate::models::{
    Bracket, BracketError, BracketType, Match, MatchId, MatchStatus, Participant, ParticipantStatus,
    Side, Slot, Tournament, TournamentId, TournamentStatus, UserId,
};

/// Record-level operations. Implementations see a single transaction: either
/// every call made through one value commits, or none does.
pub trait BracketStore {
    fn insert_tournament(&mut self, tournament: Tournament, participants: Vec<Participant>) -> Result<(), BracketError>;

    fn insert_matches(&mut self, matches: Vec<Match>) -> Result<(), BracketError>;

    fn load_match(&self, match_id: MatchId) -> Result<Match, BracketError>;

    fn load_tournament(&self, tournament_id: TournamentId) -> Result<Tournament, BracketError>;

    /// Matches of one round of one bracket, ordered by match number.
    fn list_matches(
        &self,
        tournament_id: TournamentId,
        round_number: u32,
        bracket_type: BracketType,
    ) -> Result<Vec<Match>, BracketError>;

    /// Every match of the tournament, in bracket order.
    fn list_tournament_matches(&self, tournament_id: TournamentId) -> Result<Vec<Match>, BracketError>;

    fn list_participants(&self, tournament_id: TournamentId) -> Result<Vec<Participant>, BracketError>;

    /// Put a participant in a slot. Must refuse if the slot holds someone else.
    fn write_match_slot(&mut self, match_id: MatchId, slot: Slot, user_id: UserId, side: Side) -> Result<(), BracketError>;

    /// Record the winner and mark the match completed. Must refuse if a winner is already set.
    fn set_match_winner(&mut self, match_id: MatchId, winner_id: UserId) -> Result<(), BracketError>;

    fn set_match_status(&mut self, match_id: MatchId, status: MatchStatus) -> Result<(), BracketError>;

    fn set_participant_status(
        &mut self,
        tournament_id: TournamentId,
        user_id: UserId,
        status: ParticipantStatus,
    ) -> Result<(), BracketError>;

    fn set_tournament_status(&mut self, tournament_id: TournamentId, status: TournamentStatus) -> Result<(), BracketError>;

    fn set_tournament_champion(&mut self, tournament_id: TournamentId, user_id: UserId) -> Result<(), BracketError>;

    /// Display/audit copy of the generated bracket. Never read back by the engine.
    fn persist_bracket_snapshot(&mut self, tournament_id: TournamentId, bracket: &Bracket) -> Result<(), BracketError>;
}

/// A store that can run a closure atomically. An `Err` from the closure rolls
/// back every write it made.
pub trait Transactional {
    type Tx: BracketStore;

    fn transaction<T, F>(&self, f: F) -> Result<T, BracketError>
    where
        F: FnOnce(&mut Self::Tx) -> Result<T, BracketError>;
}
