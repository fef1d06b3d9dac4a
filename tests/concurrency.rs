//! Concurrent results feeding the same downstream match must both land.

mod common;

use common::{game, seeded, users};
use double_elim_web::{advance_match, start_tournament, BracketType, MatchStatus, MemoryStore};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_semifinal_results_fill_both_final_slots() {
    for _ in 0..50 {
        let store = Arc::new(MemoryStore::new());
        let ids = users(4);
        let tid = start_tournament(store.as_ref(), "Race", seeded(&ids), true).unwrap();
        let m1 = game(&store, tid, BracketType::Winners, 1, 1).id;
        let m2 = game(&store, tid, BracketType::Winners, 1, 2).id;
        let [a, b, c, d] = [ids[0], ids[1], ids[2], ids[3]];

        let first = {
            let store = Arc::clone(&store);
            tokio::task::spawn_blocking(move || advance_match(store.as_ref(), m1, a, b))
        };
        let second = {
            let store = Arc::clone(&store);
            tokio::task::spawn_blocking(move || advance_match(store.as_ref(), m2, d, c))
        };
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let final_ = game(&store, tid, BracketType::Winners, 2, 1);
        assert_eq!(final_.player1_id, Some(ids[0]));
        assert_eq!(final_.player2_id, Some(ids[3]));
        assert_eq!(final_.status, MatchStatus::Pending);

        let l1 = game(&store, tid, BracketType::Losers, 1, 1);
        let mut dropped: Vec<_> = l1.entrants().collect();
        dropped.sort();
        let mut expected = vec![ids[1], ids[2]];
        expected.sort();
        assert_eq!(dropped, expected);
        assert_eq!(l1.status, MatchStatus::Pending);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_reports_of_one_match_resolve_it_once() {
    let store = Arc::new(MemoryStore::new());
    let ids = users(4);
    let tid = start_tournament(store.as_ref(), "Double report", seeded(&ids), true).unwrap();
    let match_id = game(&store, tid, BracketType::Winners, 1, 1).id;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            let (winner, loser) = if i % 2 == 0 { (ids[0], ids[1]) } else { (ids[1], ids[0]) };
            tokio::task::spawn_blocking(move || advance_match(store.as_ref(), match_id, winner, loser))
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
    let resolved = game(&store, tid, BracketType::Winners, 1, 1);
    let winner = resolved.winner_id.unwrap();
    assert_eq!(game(&store, tid, BracketType::Winners, 2, 1).player1_id, Some(winner));
}
