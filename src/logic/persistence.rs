//! Loading and saving a tournament's bracket through a [`TournamentRecord`].

use crate::logic::codec::{deserialize, serialize};
use crate::models::{Bracket, TournamentError, TournamentId};
use crate::store::TournamentRecord;

/// Load the saved bracket. Absent or malformed text both mean "no bracket yet".
pub fn load_bracket<R: TournamentRecord + ?Sized>(
    record: &R,
    tournament_id: TournamentId,
) -> Result<Option<Bracket>, TournamentError> {
    let Some(text) = record.load(tournament_id)? else {
        return Ok(None);
    };
    match deserialize(&text) {
        Ok(bracket) => Ok(Some(bracket)),
        Err(e) => {
            log::warn!("Ignoring saved bracket for tournament {}: {}", tournament_id, e);
            Ok(None)
        }
    }
}

/// Save the bracket. On failure the caller still owns the unchanged bracket and may retry.
pub fn save_bracket<R: TournamentRecord + ?Sized>(
    record: &mut R,
    tournament_id: TournamentId,
    bracket: &Bracket,
) -> Result<(), TournamentError> {
    let text = serialize(bracket)?;
    record.save(tournament_id, &text)
}
