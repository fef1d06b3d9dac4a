//! Double-elimination bracket engine: library with models, bracket logic and store.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    advance_match, advance_match_in, generate_bracket, read_participants_csv, settle_walkovers,
    start_tournament, AdvanceOutcome,
};
pub use models::{
    Bracket, BracketError, BracketType, ConflictKind, Entity, Match, MatchId, MatchStatus, Participant,
    ParticipantId, ParticipantStatus, Side, Slot, Tournament, TournamentId, TournamentStatus, UserId,
};
pub use store::{BracketStore, MemoryStore, MemoryTables, MemoryTx, Transactional};
