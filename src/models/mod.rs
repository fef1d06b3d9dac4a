//! Data structures for the bracket engine: participants, matches, bracket, tournament.

mod bracket;
mod game;
mod participant;
mod tournament;

pub use bracket::Bracket;
pub use game::{BracketType, Match, MatchId, MatchStatus, Side, Slot};
pub use participant::{Participant, ParticipantId, ParticipantStatus, UserId};
pub use tournament::{BracketError, ConflictKind, Entity, Tournament, TournamentId, TournamentStatus};
