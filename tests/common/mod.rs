//! Shared helpers for the integration tests.

#![allow(dead_code)]

use double_elim_web::{
    advance_match, start_tournament, AdvanceOutcome, BracketError, BracketStore, BracketType, Match,
    MemoryStore, Participant, ParticipantStatus, Tournament, TournamentId, UserId,
};
use uuid::Uuid;

pub fn users(n: usize) -> Vec<UserId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

/// Participants seeded 1..=n in the order of `users`.
pub fn seeded(users: &[UserId]) -> Vec<Participant> {
    users
        .iter()
        .enumerate()
        .map(|(i, &u)| Participant::new(u, i as u32 + 1))
        .collect()
}

pub fn start(n: usize, resolve_byes: bool) -> (MemoryStore, TournamentId, Vec<UserId>) {
    let store = MemoryStore::new();
    let ids = users(n);
    let tid = start_tournament(&store, "Test Cup", seeded(&ids), resolve_byes).unwrap();
    (store, tid, ids)
}

pub fn round(store: &MemoryStore, tid: TournamentId, bracket_type: BracketType, round: u32) -> Vec<Match> {
    store.read(|t| t.list_matches(tid, round, bracket_type)).unwrap()
}

pub fn game(store: &MemoryStore, tid: TournamentId, bracket_type: BracketType, round_no: u32, number: u32) -> Match {
    round(store, tid, bracket_type, round_no)
        .into_iter()
        .find(|m| m.match_number == number)
        .unwrap()
}

pub fn all_matches(store: &MemoryStore, tid: TournamentId) -> Vec<Match> {
    store.read(|t| t.list_tournament_matches(tid)).unwrap()
}

pub fn tournament(store: &MemoryStore, tid: TournamentId) -> Tournament {
    store.read(|t| t.load_tournament(tid)).unwrap()
}

pub fn status_of(store: &MemoryStore, tid: TournamentId, user: UserId) -> ParticipantStatus {
    store
        .read(|t| t.list_participants(tid))
        .unwrap()
        .into_iter()
        .find(|p| p.user_id == user)
        .unwrap()
        .status
}

/// Report `winner` beating the other player of `m`.
pub fn play(store: &MemoryStore, m: &Match, winner: UserId) -> Result<AdvanceOutcome, BracketError> {
    let loser = m.entrants().find(|&u| u != winner).unwrap();
    advance_match(store, m.id, winner, loser)
}

/// Re-read `m` and report its player in the given slot as winner.
pub fn play_slot(store: &MemoryStore, m: &Match, player1_wins: bool) -> Result<AdvanceOutcome, BracketError> {
    let m = store.read(|t| t.load_match(m.id)).unwrap();
    let winner = if player1_wins { m.player1_id.unwrap() } else { m.player2_id.unwrap() };
    play(store, &m, winner)
}
