//! Bracket: the generated match topology of one tournament.

use crate::models::game::Match;
use serde::{Deserialize, Serialize};

/// Produced once by the generator. Individual matches are then mutated through
/// the store; the container is kept only as a display snapshot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub winners_bracket: Vec<Match>,
    pub losers_bracket: Vec<Match>,
    pub grand_finals: Match,
    pub bracket_reset: Option<Match>,
}

impl Bracket {
    /// All matches in bracket order.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.winners_bracket
            .iter()
            .chain(self.losers_bracket.iter())
            .chain(std::iter::once(&self.grand_finals))
            .chain(self.bracket_reset.iter())
    }

    pub fn into_matches(self) -> Vec<Match> {
        let mut all = self.winners_bracket;
        all.extend(self.losers_bracket);
        all.push(self.grand_finals);
        all.extend(self.bracket_reset);
        all
    }

    /// Number of winners-bracket rounds.
    pub fn winners_rounds(&self) -> u32 {
        self.winners_bracket.iter().map(|m| m.round_number).max().unwrap_or(0)
    }

    /// Number of losers-bracket rounds (a round may hold no matches).
    pub fn losers_rounds(&self) -> u32 {
        self.losers_bracket.iter().map(|m| m.round_number).max().unwrap_or(0)
    }

    /// Matches of one winners-bracket round, ordered by match number.
    pub fn winners_round(&self, round: u32) -> Vec<&Match> {
        let mut ms: Vec<_> = self.winners_bracket.iter().filter(|m| m.round_number == round).collect();
        ms.sort_by_key(|m| m.match_number);
        ms
    }

    /// Matches of one losers-bracket round, ordered by match number.
    pub fn losers_round(&self, round: u32) -> Vec<&Match> {
        let mut ms: Vec<_> = self.losers_bracket.iter().filter(|m| m.round_number == round).collect();
        ms.sort_by_key(|m| m.match_number);
        ms
    }
}
