//! Bracket engine logic: generation, routing, advancement, walkovers, start-up.

mod advancer;
mod byes;
mod generator;
mod import;
pub mod routing;
mod setup;

pub use advancer::{advance_match, advance_match_in, AdvanceOutcome};
pub use byes::settle_walkovers;
pub use generator::generate_bracket;
pub use import::read_participants_csv;
pub use setup::start_tournament;
