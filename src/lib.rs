//! Knockout tournament organizer: library with models, bracket engine and storage.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    bracket_size, build_bracket, clear_score, deserialize, is_bye, load_bracket, record_score,
    reorganize, save_bracket, serialize, validate, DrawOrder,
};
pub use models::{
    Bracket, BracketError, BracketMatch, Round, Slot, Team, TeamEntry, TeamId, Tournament,
    TournamentError, TournamentId, Winner,
};
pub use store::{FileRecord, MemoryStore, TeamStore, TournamentRecord};
