//! Bracket generation: build the full double-elimination topology from a participant list.

use crate::logic::routing::{Destination, Layout};
use crate::models::{Bracket, BracketError, BracketType, Match, MatchId, MatchStatus, Participant, Side, TournamentId};
use std::collections::HashMap;

/// Generate the bracket for `participants`, pairing round 1 sequentially by
/// input order (`[0, 1], [2, 3], …`). Pure: nothing is persisted.
///
/// Slots past the end of the list are left empty; they are byes and are only
/// advanced if the tournament settles walkovers.
pub fn generate_bracket(tournament_id: TournamentId, participants: &[Participant]) -> Result<Bracket, BracketError> {
    if participants.len() < 2 {
        return Err(BracketError::InvalidBracket { participants: participants.len() });
    }
    let layout = Layout::for_players(participants.len());

    let mut winners_bracket = Vec::new();
    for round in 1..=layout.rounds() {
        for number in 1..=layout.winners_matches_in_round(round) {
            let mut game = Match::new(tournament_id, BracketType::Winners, round, number);
            if round == 1 {
                let first = 2 * (number as usize - 1);
                if let Some(p) = participants.get(first) {
                    game.player1_id = Some(p.user_id);
                    game.player1_side = Some(Side::Winners);
                }
                if let Some(p) = participants.get(first + 1) {
                    game.player2_id = Some(p.user_id);
                    game.player2_side = Some(Side::Winners);
                }
                if game.has_both_players() {
                    game.status = MatchStatus::Pending;
                }
            }
            winners_bracket.push(game);
        }
    }

    let mut losers_bracket = Vec::new();
    for round in 1..=layout.losers_rounds() {
        for number in 1..=layout.losers_matches_in_round(round) {
            losers_bracket.push(Match::new(tournament_id, BracketType::Losers, round, number));
        }
    }

    let grand_finals = Match::new(tournament_id, BracketType::GrandFinals, layout.grand_finals_round(), 1);
    let bracket_reset = Match::new(tournament_id, BracketType::BracketReset, layout.bracket_reset_round(), 1);

    let mut bracket = Bracket {
        winners_bracket,
        losers_bracket,
        grand_finals,
        bracket_reset: Some(bracket_reset),
    };
    link_matches(&mut bracket, &layout);
    Ok(bracket)
}

/// Number positions in bracket order and fill the display links.
fn link_matches(bracket: &mut Bracket, layout: &Layout) {
    let ids: HashMap<(BracketType, u32, u32), MatchId> = bracket
        .matches()
        .map(|m| ((m.bracket_type, m.round_number, m.match_number), m.id))
        .collect();
    let lookup = |dest: Option<Destination>| {
        dest.and_then(|d| ids.get(&(d.bracket_type, d.round_number, d.match_number)).copied())
    };

    let mut position = 0;
    for game in bracket.winners_bracket.iter_mut().chain(bracket.losers_bracket.iter_mut()) {
        game.bracket_position = position;
        position += 1;
        game.next_winners_match_id = lookup(layout.winner_target(game.bracket_type, game.round_number, game.match_number));
        game.next_losers_match_id = lookup(layout.loser_target(game.bracket_type, game.round_number, game.match_number));
    }
    bracket.grand_finals.bracket_position = position;
    if let Some(reset) = bracket.bracket_reset.as_mut() {
        reset.bracket_position = position + 1;
    }
}
