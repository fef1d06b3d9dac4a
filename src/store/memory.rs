//! In-memory bracket store. Tables are keyed per tournament; a transaction
//! saves a copy of each tournament the first time it writes to it and puts
//! those copies back if the closure fails.

use crate::models::{
    Bracket, BracketError, BracketType, ConflictKind, Entity, Match, MatchId, MatchStatus, Participant,
    ParticipantStatus, Side, Slot, Tournament, TournamentId, TournamentStatus, UserId,
};
use crate::store::{BracketStore, Transactional};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// One tournament with its participants and matches, plus last write time
/// (for inactivity cleanup).
#[derive(Clone, Debug)]
struct TournamentEntry {
    tournament: Tournament,
    participants: Vec<Participant>,
    matches: HashMap<MatchId, Match>,
    last_activity: Instant,
}

/// Tables of the in-memory store.
#[derive(Debug, Default)]
pub struct MemoryTables {
    entries: HashMap<TournamentId, TournamentEntry>,
    /// Which tournament each match belongs to.
    match_index: HashMap<MatchId, TournamentId>,
}

impl MemoryTables {
    pub fn tournament_count(&self) -> usize {
        self.entries.len()
    }

    fn entry(&self, tournament_id: TournamentId) -> Result<&TournamentEntry, BracketError> {
        self.entries
            .get(&tournament_id)
            .ok_or(BracketError::NotFound(Entity::Tournament(tournament_id)))
    }

    fn entry_mut(&mut self, tournament_id: TournamentId) -> Result<&mut TournamentEntry, BracketError> {
        let entry = self
            .entries
            .get_mut(&tournament_id)
            .ok_or(BracketError::NotFound(Entity::Tournament(tournament_id)))?;
        entry.last_activity = Instant::now();
        Ok(entry)
    }

    fn owner_of(&self, match_id: MatchId) -> Result<TournamentId, BracketError> {
        self.match_index
            .get(&match_id)
            .copied()
            .ok_or(BracketError::NotFound(Entity::Match(match_id)))
    }

    fn match_mut(&mut self, match_id: MatchId) -> Result<&mut Match, BracketError> {
        let tournament_id = self.owner_of(match_id)?;
        self.entry_mut(tournament_id)?
            .matches
            .get_mut(&match_id)
            .ok_or(BracketError::NotFound(Entity::Match(match_id)))
    }

    /// Replace a tournament's entry with `saved` (or drop it), keeping the match index in step.
    fn restore(&mut self, tournament_id: TournamentId, saved: Option<TournamentEntry>) {
        if let Some(current) = self.entries.remove(&tournament_id) {
            for id in current.matches.keys() {
                self.match_index.remove(id);
            }
        }
        if let Some(saved) = saved {
            for id in saved.matches.keys() {
                self.match_index.insert(*id, tournament_id);
            }
            self.entries.insert(tournament_id, saved);
        }
    }

    /// Drop tournaments with no writes for `timeout`. Returns how many were removed.
    fn evict_inactive(&mut self, timeout: Duration) -> usize {
        let stale: Vec<TournamentId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.last_activity.elapsed() >= timeout)
            .map(|(id, _)| *id)
            .collect();
        for id in &stale {
            self.restore(*id, None);
        }
        stale.len()
    }
}

impl BracketStore for MemoryTables {
    fn insert_tournament(&mut self, tournament: Tournament, participants: Vec<Participant>) -> Result<(), BracketError> {
        let id = tournament.id;
        self.restore(
            id,
            Some(TournamentEntry {
                tournament,
                participants,
                matches: HashMap::new(),
                last_activity: Instant::now(),
            }),
        );
        Ok(())
    }

    fn insert_matches(&mut self, matches: Vec<Match>) -> Result<(), BracketError> {
        for game in matches {
            let tournament_id = game.tournament_id;
            let entry = self.entry_mut(tournament_id)?;
            let id = game.id;
            entry.matches.insert(id, game);
            self.match_index.insert(id, tournament_id);
        }
        Ok(())
    }

    fn load_match(&self, match_id: MatchId) -> Result<Match, BracketError> {
        self.entry(self.owner_of(match_id)?)?
            .matches
            .get(&match_id)
            .cloned()
            .ok_or(BracketError::NotFound(Entity::Match(match_id)))
    }

    fn load_tournament(&self, tournament_id: TournamentId) -> Result<Tournament, BracketError> {
        Ok(self.entry(tournament_id)?.tournament.clone())
    }

    fn list_matches(
        &self,
        tournament_id: TournamentId,
        round_number: u32,
        bracket_type: BracketType,
    ) -> Result<Vec<Match>, BracketError> {
        let mut out: Vec<Match> = match self.entries.get(&tournament_id) {
            Some(entry) => entry
                .matches
                .values()
                .filter(|m| m.round_number == round_number && m.bracket_type == bracket_type)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        out.sort_by_key(|m| m.match_number);
        Ok(out)
    }

    fn list_tournament_matches(&self, tournament_id: TournamentId) -> Result<Vec<Match>, BracketError> {
        let mut out: Vec<Match> = self.entry(tournament_id)?.matches.values().cloned().collect();
        out.sort_by_key(|m| m.bracket_position);
        Ok(out)
    }

    fn list_participants(&self, tournament_id: TournamentId) -> Result<Vec<Participant>, BracketError> {
        Ok(self.entry(tournament_id)?.participants.clone())
    }

    fn write_match_slot(&mut self, match_id: MatchId, slot: Slot, user_id: UserId, side: Side) -> Result<(), BracketError> {
        let game = self.match_mut(match_id)?;
        match game.player(slot) {
            Some(current) if current != user_id => Err(BracketError::Conflict(ConflictKind::SlotOccupied)),
            _ => {
                game.set_player(slot, user_id, side);
                Ok(())
            }
        }
    }

    fn set_match_winner(&mut self, match_id: MatchId, winner_id: UserId) -> Result<(), BracketError> {
        let game = self.match_mut(match_id)?;
        if game.winner_id.is_some() {
            return Err(BracketError::Conflict(ConflictKind::AlreadyResolved));
        }
        game.winner_id = Some(winner_id);
        game.status = MatchStatus::Completed;
        game.completed_at = Some(Utc::now());
        Ok(())
    }

    fn set_match_status(&mut self, match_id: MatchId, status: MatchStatus) -> Result<(), BracketError> {
        self.match_mut(match_id)?.status = status;
        Ok(())
    }

    fn set_participant_status(
        &mut self,
        tournament_id: TournamentId,
        user_id: UserId,
        status: ParticipantStatus,
    ) -> Result<(), BracketError> {
        let participant = self
            .entry_mut(tournament_id)?
            .participants
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or(BracketError::NotFound(Entity::Participant(user_id)))?;
        participant.status = status;
        Ok(())
    }

    fn set_tournament_status(&mut self, tournament_id: TournamentId, status: TournamentStatus) -> Result<(), BracketError> {
        let tournament = &mut self.entry_mut(tournament_id)?.tournament;
        tournament.status = status;
        if status == TournamentStatus::Completed {
            tournament.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    fn set_tournament_champion(&mut self, tournament_id: TournamentId, user_id: UserId) -> Result<(), BracketError> {
        self.entry_mut(tournament_id)?.tournament.champion_id = Some(user_id);
        Ok(())
    }

    fn persist_bracket_snapshot(&mut self, tournament_id: TournamentId, bracket: &Bracket) -> Result<(), BracketError> {
        let snapshot = serde_json::to_value(bracket).map_err(|e| BracketError::Storage(e.to_string()))?;
        self.entry_mut(tournament_id)?.tournament.bracket_structure = Some(snapshot);
        Ok(())
    }
}

/// Transaction handle over [`MemoryTables`]. Before the first write to a
/// tournament its entry is copied aside; only tournaments actually written are copied.
#[derive(Debug)]
pub struct MemoryTx {
    tables: MemoryTables,
    saved: HashMap<TournamentId, Option<TournamentEntry>>,
}

impl MemoryTx {
    fn save(&mut self, tournament_id: TournamentId) {
        if !self.saved.contains_key(&tournament_id) {
            let copy = self.tables.entries.get(&tournament_id).cloned();
            self.saved.insert(tournament_id, copy);
        }
    }

    fn save_owner_of(&mut self, match_id: MatchId) -> Result<(), BracketError> {
        let tournament_id = self.tables.owner_of(match_id)?;
        self.save(tournament_id);
        Ok(())
    }

    fn rollback(mut self) -> MemoryTables {
        for (tournament_id, saved) in self.saved.drain() {
            self.tables.restore(tournament_id, saved);
        }
        self.tables
    }
}

impl BracketStore for MemoryTx {
    fn insert_tournament(&mut self, tournament: Tournament, participants: Vec<Participant>) -> Result<(), BracketError> {
        self.save(tournament.id);
        self.tables.insert_tournament(tournament, participants)
    }

    fn insert_matches(&mut self, matches: Vec<Match>) -> Result<(), BracketError> {
        for game in &matches {
            self.save(game.tournament_id);
        }
        self.tables.insert_matches(matches)
    }

    fn load_match(&self, match_id: MatchId) -> Result<Match, BracketError> {
        self.tables.load_match(match_id)
    }

    fn load_tournament(&self, tournament_id: TournamentId) -> Result<Tournament, BracketError> {
        self.tables.load_tournament(tournament_id)
    }

    fn list_matches(
        &self,
        tournament_id: TournamentId,
        round_number: u32,
        bracket_type: BracketType,
    ) -> Result<Vec<Match>, BracketError> {
        self.tables.list_matches(tournament_id, round_number, bracket_type)
    }

    fn list_tournament_matches(&self, tournament_id: TournamentId) -> Result<Vec<Match>, BracketError> {
        self.tables.list_tournament_matches(tournament_id)
    }

    fn list_participants(&self, tournament_id: TournamentId) -> Result<Vec<Participant>, BracketError> {
        self.tables.list_participants(tournament_id)
    }

    fn write_match_slot(&mut self, match_id: MatchId, slot: Slot, user_id: UserId, side: Side) -> Result<(), BracketError> {
        self.save_owner_of(match_id)?;
        self.tables.write_match_slot(match_id, slot, user_id, side)
    }

    fn set_match_winner(&mut self, match_id: MatchId, winner_id: UserId) -> Result<(), BracketError> {
        self.save_owner_of(match_id)?;
        self.tables.set_match_winner(match_id, winner_id)
    }

    fn set_match_status(&mut self, match_id: MatchId, status: MatchStatus) -> Result<(), BracketError> {
        self.save_owner_of(match_id)?;
        self.tables.set_match_status(match_id, status)
    }

    fn set_participant_status(
        &mut self,
        tournament_id: TournamentId,
        user_id: UserId,
        status: ParticipantStatus,
    ) -> Result<(), BracketError> {
        self.save(tournament_id);
        self.tables.set_participant_status(tournament_id, user_id, status)
    }

    fn set_tournament_status(&mut self, tournament_id: TournamentId, status: TournamentStatus) -> Result<(), BracketError> {
        self.save(tournament_id);
        self.tables.set_tournament_status(tournament_id, status)
    }

    fn set_tournament_champion(&mut self, tournament_id: TournamentId, user_id: UserId) -> Result<(), BracketError> {
        self.save(tournament_id);
        self.tables.set_tournament_champion(tournament_id, user_id)
    }

    fn persist_bracket_snapshot(&mut self, tournament_id: TournamentId, bracket: &Bracket) -> Result<(), BracketError> {
        self.save(tournament_id);
        self.tables.persist_bracket_snapshot(tournament_id, bracket)
    }
}

/// Shared in-memory store (one per server). Transactions are serialized by the
/// lock, so two results feeding the same match never race on its slots.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<MemoryTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read without opening a transaction.
    pub fn read<T, F>(&self, f: F) -> Result<T, BracketError>
    where
        F: FnOnce(&MemoryTables) -> Result<T, BracketError>,
    {
        let guard = self
            .tables
            .lock()
            .map_err(|_| BracketError::Storage("lock poisoned".to_string()))?;
        f(&*guard)
    }

    /// Refresh a tournament's activity time without changing it.
    pub fn touch(&self, tournament_id: TournamentId) -> Result<(), BracketError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| BracketError::Storage("lock poisoned".to_string()))?;
        guard.entry_mut(tournament_id).map(|_| ())
    }

    /// Remove tournaments with no activity for `timeout`. Returns how many were removed.
    pub fn evict_inactive(&self, timeout: Duration) -> Result<usize, BracketError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| BracketError::Storage("lock poisoned".to_string()))?;
        Ok(guard.evict_inactive(timeout))
    }
}

impl Transactional for MemoryStore {
    type Tx = MemoryTx;

    fn transaction<T, F>(&self, f: F) -> Result<T, BracketError>
    where
        F: FnOnce(&mut Self::Tx) -> Result<T, BracketError>,
    {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| BracketError::Storage("lock poisoned".to_string()))?;
        let mut tx = MemoryTx {
            tables: std::mem::take(&mut *guard),
            saved: HashMap::new(),
        };
        match f(&mut tx) {
            Ok(out) => {
                *guard = tx.tables;
                Ok(out)
            }
            Err(e) => {
                *guard = tx.rollback();
                Err(e)
            }
        }
    }
}
