//! Bracket shape and slot routing, derived from round/match-number arithmetic only.
//!
//! With `R` winners rounds the losers bracket has `2R - 1` rounds. Odd losers
//! rounds receive the losers of winners round `(l + 1) / 2`; even rounds are
//! internal and halve the field. Losers round 2 carries no matches: the round-1
//! survivors go straight to round 3, where the winners round-2 losers drop in.
//!
//! Losers match counts per round:
//!
//! | players | losers rounds |
//! |---------|---------------|
//! | 2       | `[1]`         |
//! | 4       | `[1, 0, 1]`   |
//! | 8       | `[2, 0, 2, 1, 1]` |
//! | 16      | `[4, 0, 4, 2, 2, 1, 1]` |
//!
//! With two players the single losers match has one feeder and is always a
//! pass-through to the grand finals.

use crate::models::{BracketType, Side, Slot};

/// How the target slot is chosen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SlotRule {
    Fixed(Slot),
    /// Whichever slot is empty, player1 preferred.
    FirstEmpty,
}

/// Where a participant goes after a match resolves.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Destination {
    pub bracket_type: BracketType,
    pub round_number: u32,
    pub match_number: u32,
    pub slot: SlotRule,
    /// Side tag written with the participant.
    pub side: Side,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Winner,
    Loser,
}

/// A match whose winner or loser flows into another match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Feeder {
    pub bracket_type: BracketType,
    pub round_number: u32,
    pub match_number: u32,
    pub outcome: Outcome,
}

impl Feeder {
    fn winner(bracket_type: BracketType, round_number: u32, match_number: u32) -> Self {
        Self { bracket_type, round_number, match_number, outcome: Outcome::Winner }
    }

    fn loser(bracket_type: BracketType, round_number: u32, match_number: u32) -> Self {
        Self { bracket_type, round_number, match_number, outcome: Outcome::Loser }
    }

    pub fn key(&self) -> (BracketType, u32, u32) {
        (self.bracket_type, self.round_number, self.match_number)
    }
}

/// Shape of a double-elimination bracket with `rounds` winners rounds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Layout {
    rounds: u32,
}

impl Layout {
    pub fn new(rounds: u32) -> Self {
        Self { rounds: rounds.max(1) }
    }

    /// `ceil(log2(player_count))`, at least 1.
    pub fn for_players(player_count: usize) -> Self {
        let slots = player_count.max(2);
        Self::new(usize::BITS - (slots - 1).leading_zeros())
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Round-1 slot count, `2^rounds`.
    pub fn slots(&self) -> u32 {
        1 << self.rounds
    }

    pub fn winners_matches_in_round(&self, round: u32) -> u32 {
        if round == 0 || round > self.rounds {
            return 0;
        }
        1 << (self.rounds - round)
    }

    pub fn losers_rounds(&self) -> u32 {
        2 * self.rounds - 1
    }

    pub fn losers_matches_in_round(&self, round: u32) -> u32 {
        let r = self.rounds;
        if round == 0 || round > self.losers_rounds() {
            return 0;
        }
        if r == 1 {
            // The lone winners loser walks through to the grand finals.
            return 1;
        }
        match round {
            1 => 1 << (r - 2),
            2 => 0,
            l if l % 2 == 1 => 1 << (r - (l + 1) / 2),
            l => 1 << (r - l / 2 - 1),
        }
    }

    pub fn losers_match_count(&self) -> u32 {
        (1..=self.losers_rounds()).map(|l| self.losers_matches_in_round(l)).sum()
    }

    pub fn grand_finals_round(&self) -> u32 {
        self.rounds + self.losers_match_count() / 2 + 1
    }

    pub fn bracket_reset_round(&self) -> u32 {
        self.grand_finals_round() + 1
    }

    fn grand_finals(&self, slot: Slot, side: Side) -> Destination {
        Destination {
            bracket_type: BracketType::GrandFinals,
            round_number: self.grand_finals_round(),
            match_number: 1,
            slot: SlotRule::Fixed(slot),
            side,
        }
    }

    fn losers(&self, round_number: u32, match_number: u32) -> Destination {
        Destination {
            bracket_type: BracketType::Losers,
            round_number,
            match_number,
            slot: SlotRule::FirstEmpty,
            side: Side::Losers,
        }
    }

    /// Where the winner of a winners or losers match goes. Grand finals and
    /// bracket reset are resolved separately.
    pub fn winner_target(&self, bracket_type: BracketType, round: u32, match_number: u32) -> Option<Destination> {
        match bracket_type {
            BracketType::Winners if round >= self.rounds => Some(self.grand_finals(Slot::Player1, Side::Winners)),
            BracketType::Winners => {
                let slot = if match_number % 2 == 1 { Slot::Player1 } else { Slot::Player2 };
                Some(Destination {
                    bracket_type: BracketType::Winners,
                    round_number: round + 1,
                    match_number: match_number.div_ceil(2),
                    slot: SlotRule::Fixed(slot),
                    side: Side::Winners,
                })
            }
            BracketType::Losers if round >= self.losers_rounds() => {
                Some(self.grand_finals(Slot::Player2, Side::Losers))
            }
            BracketType::Losers if round == 1 => Some(self.losers(3, match_number)),
            BracketType::Losers if round % 2 == 1 => Some(self.losers(round + 1, match_number.div_ceil(2))),
            BracketType::Losers => Some(self.losers(round + 1, match_number)),
            BracketType::GrandFinals | BracketType::BracketReset => None,
        }
    }

    /// Where the loser of a winners match drops: losers round `2r - 1`. Round-1
    /// losers pair up two per match; later drops meet one losers survivor each.
    pub fn loser_target(&self, bracket_type: BracketType, round: u32, match_number: u32) -> Option<Destination> {
        if bracket_type != BracketType::Winners {
            return None;
        }
        let index = if round == 1 { (match_number - 1) / 2 } else { match_number - 1 };
        Some(self.losers(2 * round - 1, index + 1))
    }

    /// Matches whose results flow into the given match.
    pub fn feeders(&self, bracket_type: BracketType, round: u32, match_number: u32) -> Vec<Feeder> {
        use BracketType::*;
        let m = match_number;
        match bracket_type {
            Winners if round <= 1 => Vec::new(),
            Winners => vec![
                Feeder::winner(Winners, round - 1, 2 * m - 1),
                Feeder::winner(Winners, round - 1, 2 * m),
            ],
            Losers if self.rounds == 1 => vec![Feeder::loser(Winners, 1, 1)],
            Losers if round == 1 => vec![Feeder::loser(Winners, 1, 2 * m - 1), Feeder::loser(Winners, 1, 2 * m)],
            Losers if round % 2 == 1 => {
                let previous = if round == 3 { 1 } else { round - 1 };
                vec![Feeder::loser(Winners, (round + 1) / 2, m), Feeder::winner(Losers, previous, m)]
            }
            Losers => vec![
                Feeder::winner(Losers, round - 1, 2 * m - 1),
                Feeder::winner(Losers, round - 1, 2 * m),
            ],
            GrandFinals => vec![
                Feeder::winner(Winners, self.rounds, 1),
                Feeder::winner(Losers, self.losers_rounds(), 1),
            ],
            BracketReset => Vec::new(),
        }
    }
}
