//! Byes and walkovers: resolve matches that can only ever receive one player.

use crate::logic::advancer::advance_winner;
use crate::logic::routing::Layout;
use crate::models::{BracketError, BracketType, Match, MatchId, MatchStatus, Tournament};
use crate::store::BracketStore;
use std::collections::HashMap;

/// Settle every waiting match whose feeders are all done: one entrant wins by
/// walkover and moves on, no entrant means the match is skipped. Repeats until
/// nothing changes, since each walkover may complete another match's feeders.
///
/// The bracket reset is never touched here; grand finals resolution owns it.
pub fn settle_walkovers<S: BracketStore>(store: &mut S, tournament: &Tournament) -> Result<Vec<MatchId>, BracketError> {
    settle(store, tournament, |_| true)
}

/// Settle only losers matches fed by a single match. Those can never receive
/// a second player, so they pass through even when byes are left open.
pub(crate) fn settle_pass_throughs<S: BracketStore>(
    store: &mut S,
    tournament: &Tournament,
) -> Result<Vec<MatchId>, BracketError> {
    let layout = Layout::new(tournament.rounds);
    settle(store, tournament, |m| {
        m.bracket_type == BracketType::Losers && layout.feeders(m.bracket_type, m.round_number, m.match_number).len() == 1
    })
}

fn settle<S, P>(store: &mut S, tournament: &Tournament, eligible: P) -> Result<Vec<MatchId>, BracketError>
where
    S: BracketStore,
    P: Fn(&Match) -> bool,
{
    let layout = Layout::new(tournament.rounds);
    let mut settled = Vec::new();

    while let Some(game) = next_settleable(store, &layout, tournament, &eligible)? {
        let entrants: Vec<_> = game.entrants().collect();
        match entrants.as_slice() {
            [only] => {
                store.set_match_winner(game.id, *only)?;
                store.set_match_status(game.id, MatchStatus::Walkover)?;
                log::debug!("walkover for {} in {:?} r{} #{}", only, game.bracket_type, game.round_number, game.match_number);
                advance_winner(store, &layout, &game, *only)?;
            }
            [] => store.set_match_status(game.id, MatchStatus::Skipped)?,
            _ => store.set_match_status(game.id, MatchStatus::Pending)?,
        }
        settled.push(game.id);
    }
    Ok(settled)
}

fn next_settleable<S, P>(
    store: &S,
    layout: &Layout,
    tournament: &Tournament,
    eligible: &P,
) -> Result<Option<Match>, BracketError>
where
    S: BracketStore,
    P: Fn(&Match) -> bool,
{
    let matches = store.list_tournament_matches(tournament.id)?;
    let by_position: HashMap<(BracketType, u32, u32), MatchStatus> = matches
        .iter()
        .map(|m| ((m.bracket_type, m.round_number, m.match_number), m.status))
        .collect();

    let found = matches.into_iter().find(|m| {
        m.status == MatchStatus::Waiting
            && m.bracket_type != BracketType::BracketReset
            && eligible(m)
            && layout
                .feeders(m.bracket_type, m.round_number, m.match_number)
                .iter()
                .all(|f| by_position.get(&f.key()).map_or(true, |status| status.is_settled()))
    });
    Ok(found)
}
