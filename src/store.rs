//! Collaborators the engine reads teams from and persists brackets to.

use crate::models::{Team, TeamId, Tournament, TournamentError, TournamentId};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Source of the teams registered for a tournament.
pub trait TeamStore {
    /// Teams in registration order.
    fn teams(&self, tournament_id: TournamentId) -> Result<Vec<Team>, TournamentError>;

    /// Number of players on a team's roster.
    fn player_count(&self, tournament_id: TournamentId, team_id: &str) -> Result<usize, TournamentError>;
}

/// Storage for a tournament's serialized bracket.
pub trait TournamentRecord {
    /// Serialized bracket, or `None` if none was saved yet.
    fn load(&self, tournament_id: TournamentId) -> Result<Option<String>, TournamentError>;

    fn save(&mut self, tournament_id: TournamentId, text: &str) -> Result<(), TournamentError>;

    /// Forget the saved bracket. Removing a bracket that was never saved is not an error.
    fn remove(&mut self, tournament_id: TournamentId) -> Result<(), TournamentError>;
}

/// In-memory tournaments and serialized brackets.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tournaments: HashMap<TournamentId, Tournament>,
    brackets: HashMap<TournamentId, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tournament: Tournament) -> TournamentId {
        let id = tournament.id;
        self.tournaments.insert(id, tournament);
        id
    }

    pub fn get(&self, id: TournamentId) -> Option<&Tournament> {
        self.tournaments.get(&id)
    }

    pub fn get_mut(&mut self, id: TournamentId) -> Option<&mut Tournament> {
        self.tournaments.get_mut(&id)
    }

    /// Remove a tournament and its bracket.
    pub fn remove_tournament(&mut self, id: TournamentId) -> Option<Tournament> {
        self.brackets.remove(&id);
        self.tournaments.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.tournaments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tournaments.is_empty()
    }

    fn tournament(&self, id: TournamentId) -> Result<&Tournament, TournamentError> {
        self.get(id).ok_or(TournamentError::TournamentNotFound(id))
    }
}

impl TeamStore for MemoryStore {
    fn teams(&self, tournament_id: TournamentId) -> Result<Vec<Team>, TournamentError> {
        Ok(self.tournament(tournament_id)?.teams())
    }

    fn player_count(&self, tournament_id: TournamentId, team_id: &str) -> Result<usize, TournamentError> {
        self.tournament(tournament_id)?
            .get_team(team_id)
            .map(|e| e.player_count())
            .ok_or_else(|| TournamentError::TeamNotFound(TeamId::from(team_id)))
    }
}

impl TournamentRecord for MemoryStore {
    fn load(&self, tournament_id: TournamentId) -> Result<Option<String>, TournamentError> {
        Ok(self.brackets.get(&tournament_id).cloned())
    }

    fn save(&mut self, tournament_id: TournamentId, text: &str) -> Result<(), TournamentError> {
        self.brackets.insert(tournament_id, text.to_string());
        Ok(())
    }

    fn remove(&mut self, tournament_id: TournamentId) -> Result<(), TournamentError> {
        self.brackets.remove(&tournament_id);
        Ok(())
    }
}

/// Brackets stored as `<dir>/<tournament id>.json`.
#[derive(Clone, Debug)]
pub struct FileRecord {
    dir: PathBuf,
}

impl FileRecord {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, tournament_id: TournamentId) -> PathBuf {
        self.dir.join(format!("{}.json", tournament_id))
    }
}

fn io_failure(action: &str, path: &Path, e: std::io::Error) -> TournamentError {
    TournamentError::PersistenceFailure(format!("{} {}: {}", action, path.display(), e))
}

impl TournamentRecord for FileRecord {
    fn load(&self, tournament_id: TournamentId) -> Result<Option<String>, TournamentError> {
        let path = self.path(tournament_id);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_failure("read", &path, e)),
        }
    }

    /// Writes a temporary file and renames it over the old one, so a failed save
    /// leaves the previous bracket in place.
    fn save(&mut self, tournament_id: TournamentId, text: &str) -> Result<(), TournamentError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_failure("create", &self.dir, e))?;
        let path = self.path(tournament_id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(|e| io_failure("write", &tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_failure("rename", &path, e))?;
        log::debug!("Saved bracket for tournament {} to {}", tournament_id, path.display());
        Ok(())
    }

    fn remove(&mut self, tournament_id: TournamentId) -> Result<(), TournamentError> {
        let path = self.path(tournament_id);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Removed bracket file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_failure("remove", &path, e)),
        }
    }
}
