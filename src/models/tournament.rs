//! Tournament record, roster management and TournamentError.

use crate::models::bracket::BracketError;
use crate::models::team::{Team, TeamEntry, TeamId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::io::Read;
use uuid::Uuid;

/// Errors that can occur during tournament and roster operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Name is empty after trimming.
    InvalidName,
    /// A team with this name already exists (names are unique, case-insensitive).
    DuplicateTeamName,
    /// A player with this name is already on the team.
    DuplicatePlayerName,
    /// Team not found in the tournament.
    TeamNotFound(TeamId),
    /// Player not found on the team.
    PlayerNotFound,
    /// No tournament with this id.
    TournamentNotFound(TournamentId),
    /// Roster CSV could not be read.
    InvalidCsv(String),
    /// Loading or saving the bracket failed; the in-memory bracket is still valid.
    PersistenceFailure(String),
    /// The bracket engine rejected the operation.
    Bracket(BracketError),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidName => write!(f, "Name must not be empty"),
            TournamentError::DuplicateTeamName => write!(f, "A team with this name already exists"),
            TournamentError::DuplicatePlayerName => {
                write!(f, "A player with this name is already on the team")
            }
            TournamentError::TeamNotFound(_) => write!(f, "Team not found"),
            TournamentError::PlayerNotFound => write!(f, "Player not found"),
            TournamentError::TournamentNotFound(_) => write!(f, "No tournament"),
            TournamentError::InvalidCsv(reason) => write!(f, "Invalid roster CSV: {}", reason),
            TournamentError::PersistenceFailure(reason) => {
                write!(f, "Could not persist bracket: {}", reason)
            }
            TournamentError::Bracket(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TournamentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TournamentError::Bracket(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BracketError> for TournamentError {
    fn from(e: BracketError) -> Self {
        TournamentError::Bracket(e)
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// A tournament and its registered teams.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub sport: String,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// Registered teams, in registration order.
    pub teams: Vec<TeamEntry>,
}

/// One row of a roster CSV: `team,player`.
#[derive(Debug, Deserialize)]
struct RosterRow {
    team: String,
    #[serde(default)]
    player: Option<String>,
}

impl Tournament {
    /// Create a tournament with no teams.
    pub fn new(
        name: impl Into<String>,
        sport: impl Into<String>,
        start_date: NaiveDate,
    ) -> Result<Self, TournamentError> {
        let name = name.into().trim().to_string();
        let sport = sport.into().trim().to_string();
        if name.is_empty() || sport.is_empty() {
            return Err(TournamentError::InvalidName);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            sport,
            start_date,
            created_at: Utc::now(),
            teams: Vec::new(),
        })
    }

    /// Teams in registration order (what a bracket is drawn from).
    pub fn teams(&self) -> Vec<Team> {
        self.teams.iter().map(|e| e.team.clone()).collect()
    }

    pub fn get_team(&self, team_id: &str) -> Option<&TeamEntry> {
        self.teams.iter().find(|e| e.team.id == team_id)
    }

    fn get_team_mut(&mut self, team_id: &str) -> Option<&mut TeamEntry> {
        self.teams.iter_mut().find(|e| e.team.id == team_id)
    }

    fn find_team_by_name(&self, name: &str) -> Option<&TeamEntry> {
        self.teams
            .iter()
            .find(|e| e.team.name.eq_ignore_ascii_case(name))
    }

    /// Register a team. Names must be unique (case-insensitive). Returns the new team.
    pub fn add_team(&mut self, name: impl Into<String>) -> Result<Team, TournamentError> {
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::InvalidName);
        }
        if self.find_team_by_name(name_trimmed).is_some() {
            return Err(TournamentError::DuplicateTeamName);
        }
        let team = Team::with_name(name_trimmed);
        self.teams.push(TeamEntry::new(team.clone()));
        Ok(team)
    }

    /// Remove a team by id. An existing bracket keeps its own copy of the team.
    pub fn remove_team(&mut self, team_id: &str) -> Result<(), TournamentError> {
        let idx = self
            .teams
            .iter()
            .position(|e| e.team.id == team_id)
            .ok_or_else(|| TournamentError::TeamNotFound(team_id.to_string()))?;
        self.teams.remove(idx);
        Ok(())
    }

    /// Add a player to a team's roster (names unique within the team, case-insensitive).
    pub fn add_player(&mut self, team_id: &str, name: impl Into<String>) -> Result<(), TournamentError> {
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::InvalidName);
        }
        let entry = self
            .get_team_mut(team_id)
            .ok_or_else(|| TournamentError::TeamNotFound(team_id.to_string()))?;
        if entry.has_player(name_trimmed) {
            return Err(TournamentError::DuplicatePlayerName);
        }
        entry.players.push(name_trimmed.to_string());
        Ok(())
    }

    /// Remove a player from a team's roster by name.
    pub fn remove_player(&mut self, team_id: &str, name: &str) -> Result<(), TournamentError> {
        let entry = self
            .get_team_mut(team_id)
            .ok_or_else(|| TournamentError::TeamNotFound(team_id.to_string()))?;
        let idx = entry
            .players
            .iter()
            .position(|p| p.eq_ignore_ascii_case(name.trim()))
            .ok_or(TournamentError::PlayerNotFound)?;
        entry.players.remove(idx);
        Ok(())
    }

    /// Import a roster from CSV with a `team,player` header, one row per player.
    ///
    /// Rows with an empty `player` just register the team. Teams that already exist are
    /// reused and players already on a team are skipped. The CSV is parsed completely
    /// before anything is added. Returns the number of teams created.
    pub fn import_teams_csv<R: Read>(&mut self, reader: R) -> Result<usize, TournamentError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut rows = Vec::new();
        for record in rdr.deserialize::<RosterRow>() {
            let row = record.map_err(|e| TournamentError::InvalidCsv(e.to_string()))?;
            if row.team.is_empty() {
                return Err(TournamentError::InvalidCsv("row without team name".to_string()));
            }
            rows.push(row);
        }

        let mut created = 0;
        for row in rows {
            let team_id = match self.find_team_by_name(&row.team) {
                Some(entry) => entry.team.id.clone(),
                None => {
                    created += 1;
                    self.add_team(row.team)?.id
                }
            };
            if let Some(player) = row.player.filter(|p| !p.is_empty()) {
                match self.add_player(&team_id, player) {
                    Ok(()) | Err(TournamentError::DuplicatePlayerName) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        log::info!("Imported roster into tournament {}: {} new team(s)", self.id, created);
        Ok(created)
    }
}
