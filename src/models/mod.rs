//! Data structures for the knockout tournament: teams, brackets, tournament records.

mod bracket;
mod team;
mod tournament;

pub use bracket::{Bracket, BracketError, BracketMatch, Round, Slot, Winner};
pub use team::{Team, TeamEntry, TeamId};
pub use tournament::{Tournament, TournamentError, TournamentId};
