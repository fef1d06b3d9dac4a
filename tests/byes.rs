//! Integration tests for byes, walkovers and complete play-throughs.

mod common;

use common::{all_matches, game, play, play_slot, start, status_of, tournament};
use double_elim_web::{BracketType, MatchStatus, MemoryStore, ParticipantStatus, TournamentId, TournamentStatus, UserId};

#[test]
fn lone_round_one_player_walks_over() {
    let (store, tid, ids) = start(3, true);
    let m2 = game(&store, tid, BracketType::Winners, 1, 2);
    assert_eq!(m2.status, MatchStatus::Walkover);
    assert_eq!(m2.winner_id, Some(ids[2]));

    let w2 = game(&store, tid, BracketType::Winners, 2, 1);
    assert_eq!(w2.player2_id, Some(ids[2]));
    assert_eq!(w2.status, MatchStatus::Waiting);
}

#[test]
fn empty_round_one_match_is_skipped_and_byes_cascade() {
    let (store, tid, ids) = start(5, true);
    assert_eq!(game(&store, tid, BracketType::Winners, 1, 4).status, MatchStatus::Skipped);
    assert_eq!(game(&store, tid, BracketType::Winners, 1, 3).status, MatchStatus::Walkover);

    let w2m2 = game(&store, tid, BracketType::Winners, 2, 2);
    assert_eq!(w2m2.status, MatchStatus::Walkover);
    assert_eq!(w2m2.winner_id, Some(ids[4]));
    assert_eq!(game(&store, tid, BracketType::Winners, 3, 1).player2_id, Some(ids[4]));
    // Neither match produced a loser, so their losers-bracket match never gets a player.
    assert_eq!(game(&store, tid, BracketType::Losers, 1, 2).status, MatchStatus::Skipped);
}

#[test]
fn walkover_in_losers_bracket_after_a_real_result() {
    let (store, tid, ids) = start(3, true);
    play(&store, &game(&store, tid, BracketType::Winners, 1, 1), ids[0]).unwrap();

    let l1 = game(&store, tid, BracketType::Losers, 1, 1);
    assert_eq!(l1.status, MatchStatus::Walkover);
    assert_eq!(l1.winner_id, Some(ids[1]));
    let l3 = game(&store, tid, BracketType::Losers, 3, 1);
    assert_eq!(l3.player1_id, Some(ids[1]));
    assert_eq!(status_of(&store, tid, ids[1]), ParticipantStatus::Active);
}

#[test]
fn byes_stay_open_when_not_resolved() {
    let (store, tid, ids) = start(3, false);
    let m2 = game(&store, tid, BracketType::Winners, 1, 2);
    assert_eq!(m2.status, MatchStatus::Waiting);
    assert_eq!((m2.player1_id, m2.player2_id), (Some(ids[2]), None));
    assert!(game(&store, tid, BracketType::Winners, 2, 1).player2_id.is_none());
}

#[test]
fn two_players_reach_grand_finals_through_a_walkover() {
    let (store, tid, ids) = start(2, true);
    play(&store, &game(&store, tid, BracketType::Winners, 1, 1), ids[1]).unwrap();

    let gf = game(&store, tid, BracketType::GrandFinals, 2, 1);
    assert_eq!(gf.player1_id, Some(ids[1]));
    assert_eq!(gf.player2_id, Some(ids[0]));
    assert_eq!(gf.status, MatchStatus::Pending);

    let outcome = play(&store, &gf, ids[0]).unwrap();
    assert!(outcome.bracket_reset_activated);
    let outcome = play(&store, &game(&store, tid, BracketType::BracketReset, 3, 1), ids[0]).unwrap();
    assert_eq!(outcome.champion, Some(ids[0]));
}

#[test]
fn two_players_finish_with_byes_left_open() {
    let (store, tid, ids) = start(2, false);
    play(&store, &game(&store, tid, BracketType::Winners, 1, 1), ids[0]).unwrap();

    let l1 = game(&store, tid, BracketType::Losers, 1, 1);
    assert_eq!(l1.status, MatchStatus::Walkover);
    assert_eq!(l1.winner_id, Some(ids[1]));
    let gf = game(&store, tid, BracketType::GrandFinals, 2, 1);
    assert_eq!((gf.player1_id, gf.player2_id), (Some(ids[0]), Some(ids[1])));
    assert_eq!(gf.status, MatchStatus::Pending);

    let reported = 1 + play_out(&store, tid, false);
    assert_eq!(reported, 3);
    assert_single_champion(&store, tid, &ids);
    assert_eq!(tournament(&store, tid).champion_id, Some(ids[1]));
}

#[test]
fn power_of_two_fields_play_out_with_byes_left_open() {
    for n in [2, 4, 8, 16] {
        let (store, tid, ids) = start(n, false);
        let reported = play_out(&store, tid, true);
        assert_single_champion(&store, tid, &ids);
        assert_eq!(reported, 2 * n - 2, "n = {}", n);
    }
}

/// Report pending matches in bracket order until the tournament completes.
/// Returns how many results were reported.
fn play_out(store: &MemoryStore, tid: TournamentId, player1_wins: bool) -> usize {
    let mut reported = 0;
    while tournament(store, tid).status == TournamentStatus::Active {
        let next = all_matches(store, tid)
            .into_iter()
            .find(|m| m.status == MatchStatus::Pending)
            .unwrap_or_else(|| panic!("tournament {} stalled after {} results", tid, reported));
        play_slot(store, &next, player1_wins).unwrap();
        reported += 1;
        assert!(reported < 200, "runaway tournament");
    }
    reported
}

fn assert_single_champion(store: &MemoryStore, tid: TournamentId, ids: &[UserId]) {
    let champion = tournament(store, tid).champion_id.unwrap();
    for &id in ids {
        let expected = if id == champion { ParticipantStatus::Champion } else { ParticipantStatus::Eliminated };
        assert_eq!(status_of(store, tid, id), expected);
    }
    assert!(all_matches(store, tid)
        .iter()
        .all(|m| m.status != MatchStatus::Pending));
}

#[test]
fn every_field_size_plays_out_without_reset() {
    for n in 2..=20 {
        let (store, tid, ids) = start(n, true);
        let reported = play_out(&store, tid, true);
        assert_single_champion(&store, tid, &ids);
        // Everyone but the champion loses twice; the champion never loses.
        assert_eq!(reported, 2 * n - 2, "n = {}", n);
        assert_eq!(tournament(&store, tid).champion_id, Some(ids[0]), "n = {}", n);
    }
}

#[test]
fn every_field_size_plays_out_with_reset() {
    for n in 2..=20 {
        let (store, tid, ids) = start(n, true);
        let reported = play_out(&store, tid, false);
        assert_single_champion(&store, tid, &ids);
        // The champion lost once in the grand finals, forcing the reset.
        assert_eq!(reported, 2 * n - 1, "n = {}", n);
        let reset = all_matches(&store, tid)
            .into_iter()
            .find(|m| m.bracket_type == BracketType::BracketReset)
            .unwrap();
        assert_eq!(reset.status, MatchStatus::Completed);
    }
}
