//! Tournament start: order participants, generate the bracket and persist it in one transaction.

use crate::logic::byes::settle_walkovers;
use crate::logic::generator::generate_bracket;
use crate::logic::routing::Layout;
use crate::models::{BracketError, ConflictKind, Participant, Tournament, TournamentId};
use crate::store::{BracketStore, Transactional};
use std::collections::HashSet;

/// Start a tournament for `participants`.
///
/// Participants are ordered by seed (ties keep input order) and given their
/// bracket positions; round 1 then pairs them sequentially. The tournament row,
/// participants, every match and the bracket snapshot are written atomically.
/// With `resolve_byes`, empty round-1 slots are settled before reporting opens.
pub fn start_tournament<D: Transactional>(
    db: &D,
    name: &str,
    mut participants: Vec<Participant>,
    resolve_byes: bool,
) -> Result<TournamentId, BracketError> {
    let mut seen = HashSet::new();
    if !participants.iter().all(|p| seen.insert(p.user_id)) {
        return Err(BracketError::Conflict(ConflictKind::DuplicateParticipant));
    }

    participants.sort_by_key(|p| p.seed);
    for (position, p) in participants.iter_mut().enumerate() {
        p.bracket_position = Some(position as u32);
    }

    let layout = Layout::for_players(participants.len());
    let tournament = Tournament::new(name.trim(), layout.rounds(), resolve_byes);
    let bracket = generate_bracket(tournament.id, &participants)?;

    let tournament_id = db.transaction(|tx| {
        let id = tournament.id;
        tx.insert_tournament(tournament.clone(), participants.clone())?;
        tx.insert_matches(bracket.clone().into_matches())?;
        tx.persist_bracket_snapshot(id, &bracket)?;
        if resolve_byes {
            settle_walkovers(tx, &tournament)?;
        }
        Ok(id)
    })?;

    log::info!(
        "tournament {} started: {} participants, {} winners rounds",
        tournament_id,
        participants.len(),
        layout.rounds()
    );
    Ok(tournament_id)
}
