//! Participant import from CSV (`user_id,seed` with a header row).

use crate::models::{BracketError, Participant, UserId};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct ParticipantRow {
    user_id: UserId,
    seed: u32,
}

/// Read a participant list. Whitespace around fields is ignored.
pub fn read_participants_csv<R: Read>(reader: R) -> Result<Vec<Participant>, BracketError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.deserialize::<ParticipantRow>()
        .map(|row| {
            row.map(|r| Participant::new(r.user_id, r.seed))
                .map_err(|e| BracketError::Import(e.to_string()))
        })
        .collect()
}
