//! Team and roster entry data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque team identifier (stored and persisted as a string).
pub type TeamId = String;

/// A team as it appears in a bracket slot.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

impl Team {
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Team with a freshly generated id.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), name)
    }
}

/// A registered team and the names of its players.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub team: Team,
    pub players: Vec<String>,
}

impl TeamEntry {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            players: Vec::new(),
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// True if a player with this name (case-insensitive) is already on the roster.
    pub fn has_player(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.eq_ignore_ascii_case(name))
    }
}
