//! Match advancement: apply a reported result and move both players on.

use crate::logic::byes::{settle_pass_throughs, settle_walkovers};
use crate::logic::routing::{Destination, Layout, SlotRule};
use crate::models::{
    BracketError, BracketType, ConflictKind, Match, MatchId, MatchStatus, ParticipantStatus, Side, Slot,
    TournamentId, TournamentStatus, UserId,
};
use crate::store::{BracketStore, Transactional};
use serde::Serialize;

/// What a reported result changed beyond the match itself.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct AdvanceOutcome {
    pub tournament_completed: bool,
    pub champion: Option<UserId>,
    pub bracket_reset_activated: bool,
}

/// Record `winner_id` beating `loser_id` in `match_id` and route both players,
/// all inside one store transaction. Nothing is written if any step fails.
pub fn advance_match<D: Transactional>(
    db: &D,
    match_id: MatchId,
    winner_id: UserId,
    loser_id: UserId,
) -> Result<AdvanceOutcome, BracketError> {
    db.transaction(|tx| advance_match_in(tx, match_id, winner_id, loser_id))
}

/// Same as [`advance_match`], against an already open transaction.
pub fn advance_match_in<S: BracketStore>(
    store: &mut S,
    match_id: MatchId,
    winner_id: UserId,
    loser_id: UserId,
) -> Result<AdvanceOutcome, BracketError> {
    let game = store.load_match(match_id)?;
    let tournament = store.load_tournament(game.tournament_id)?;

    if tournament.is_completed() {
        return Err(BracketError::Conflict(ConflictKind::TournamentFinished));
    }
    if game.is_resolved() || game.status.is_settled() {
        return Err(BracketError::Conflict(ConflictKind::AlreadyResolved));
    }
    if !game.has_both_players() {
        return Err(BracketError::Conflict(ConflictKind::MatchNotReady));
    }
    let winner_slot = match (game.slot_of(winner_id), game.slot_of(loser_id)) {
        (Some(w), Some(l)) if w != l => w,
        _ => return Err(BracketError::InvalidResult { match_id }),
    };

    store.set_match_winner(match_id, winner_id)?;
    log::debug!("match {} ({:?} r{} #{}) won by {}", match_id, game.bracket_type, game.round_number, game.match_number, winner_id);

    let layout = Layout::new(tournament.rounds);
    let mut outcome = AdvanceOutcome::default();
    match game.bracket_type {
        BracketType::Winners => {
            advance_winner(store, &layout, &game, winner_id)?;
            drop_loser(store, &layout, &game, loser_id)?;
        }
        BracketType::Losers => {
            advance_winner(store, &layout, &game, winner_id)?;
            eliminate(store, game.tournament_id, loser_id)?;
        }
        BracketType::GrandFinals => {
            outcome = resolve_grand_finals(store, &layout, &game, winner_slot)?;
        }
        BracketType::BracketReset => {
            outcome = complete_tournament(store, game.tournament_id, winner_id, loser_id)?;
        }
    }

    if !outcome.tournament_completed {
        if tournament.resolve_byes {
            settle_walkovers(store, &tournament)?;
        } else {
            settle_pass_throughs(store, &tournament)?;
        }
    }
    Ok(outcome)
}

/// Winners or losers match: the winner moves to the next match on its path.
pub(crate) fn advance_winner<S: BracketStore>(
    store: &mut S,
    layout: &Layout,
    game: &Match,
    winner_id: UserId,
) -> Result<(), BracketError> {
    match layout.winner_target(game.bracket_type, game.round_number, game.match_number) {
        Some(dest) => place(store, game.tournament_id, &dest, winner_id),
        None => Ok(()),
    }
}

/// Winners match: the loser drops into losers round `2r - 1`.
fn drop_loser<S: BracketStore>(store: &mut S, layout: &Layout, game: &Match, loser_id: UserId) -> Result<(), BracketError> {
    match layout.loser_target(game.bracket_type, game.round_number, game.match_number) {
        Some(dest) => place(store, game.tournament_id, &dest, loser_id),
        None => Ok(()),
    }
}

fn eliminate<S: BracketStore>(store: &mut S, tournament_id: TournamentId, user_id: UserId) -> Result<(), BracketError> {
    log::debug!("participant {} eliminated", user_id);
    store.set_participant_status(tournament_id, user_id, ParticipantStatus::Eliminated)
}

/// Write `user_id` into the destination match and mark it pending once full.
fn place<S: BracketStore>(
    store: &mut S,
    tournament_id: TournamentId,
    dest: &Destination,
    user_id: UserId,
) -> Result<(), BracketError> {
    let mut target = store
        .list_matches(tournament_id, dest.round_number, dest.bracket_type)?
        .into_iter()
        .nth(dest.match_number as usize - 1)
        .ok_or_else(|| {
            BracketError::Storage(format!(
                "no {:?} match #{} in round {}",
                dest.bracket_type, dest.match_number, dest.round_number
            ))
        })?;
    if target.is_resolved() {
        return Err(BracketError::Conflict(ConflictKind::AlreadyResolved));
    }
    let slot = match dest.slot {
        SlotRule::Fixed(slot) => slot,
        SlotRule::FirstEmpty => target
            .empty_slot()
            .ok_or(BracketError::Conflict(ConflictKind::SlotOccupied))?,
    };
    store.write_match_slot(target.id, slot, user_id, dest.side)?;
    target.set_player(slot, user_id, dest.side);
    log::debug!(
        "{} -> {:?} r{} #{} {:?}",
        user_id, dest.bracket_type, dest.round_number, target.match_number, slot
    );
    if target.has_both_players() {
        store.set_match_status(target.id, MatchStatus::Pending)?;
    }
    Ok(())
}

/// Grand finals: the side tag decides. A winners-side win ends the tournament;
/// a losers-side win opens the bracket reset with the same two players.
fn resolve_grand_finals<S: BracketStore>(
    store: &mut S,
    layout: &Layout,
    game: &Match,
    winner_slot: Slot,
) -> Result<AdvanceOutcome, BracketError> {
    let loser_slot = winner_slot.other();
    let (winner_id, loser_id) = match (game.player(winner_slot), game.player(loser_slot)) {
        (Some(w), Some(l)) => (w, l),
        _ => return Err(BracketError::Conflict(ConflictKind::MatchNotReady)),
    };
    let reset = store
        .list_matches(game.tournament_id, layout.bracket_reset_round(), BracketType::BracketReset)?
        .into_iter()
        .next();

    match game.side(winner_slot) {
        Some(Side::Winners) => {
            if let Some(reset) = reset {
                store.set_match_status(reset.id, MatchStatus::Skipped)?;
            }
            complete_tournament(store, game.tournament_id, winner_id, loser_id)
        }
        Some(Side::Losers) => {
            let reset = reset.ok_or_else(|| BracketError::Storage("bracket reset match missing".to_string()))?;
            if reset.is_resolved() || reset.player1_id.is_some() || reset.player2_id.is_some() {
                return Err(BracketError::Conflict(ConflictKind::SlotOccupied));
            }
            store.write_match_slot(reset.id, Slot::Player1, loser_id, Side::Winners)?;
            store.write_match_slot(reset.id, Slot::Player2, winner_id, Side::Losers)?;
            store.set_match_status(reset.id, MatchStatus::Pending)?;
            log::info!("bracket reset activated in tournament {}", game.tournament_id);
            Ok(AdvanceOutcome {
                tournament_completed: false,
                champion: None,
                bracket_reset_activated: true,
            })
        }
        None => Err(BracketError::Storage(format!("grand finals entrant {} has no side", winner_id))),
    }
}

fn complete_tournament<S: BracketStore>(
    store: &mut S,
    tournament_id: TournamentId,
    champion: UserId,
    runner_up: UserId,
) -> Result<AdvanceOutcome, BracketError> {
    eliminate(store, tournament_id, runner_up)?;
    store.set_participant_status(tournament_id, champion, ParticipantStatus::Champion)?;
    store.set_tournament_champion(tournament_id, champion)?;
    store.set_tournament_status(tournament_id, TournamentStatus::Completed)?;
    log::info!("tournament {} completed, champion {}", tournament_id, champion);
    Ok(AdvanceOutcome {
        tournament_completed: true,
        champion: Some(champion),
        bracket_reset_activated: false,
    })
}
