//! Draw order: how teams are ordered before a bracket is built.

use crate::models::Team;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Caller-chosen ordering policy for building or reorganizing a bracket.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawOrder {
    /// Teams in registration order.
    #[default]
    Registered,
    /// Random draw. With a seed the draw is reproducible.
    Shuffled {
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl DrawOrder {
    /// Order `teams` according to this policy.
    pub fn arrange(&self, mut teams: Vec<Team>) -> Vec<Team> {
        match *self {
            DrawOrder::Registered => {}
            DrawOrder::Shuffled { seed: Some(seed) } => {
                teams.shuffle(&mut StdRng::seed_from_u64(seed));
            }
            DrawOrder::Shuffled { seed: None } => {
                teams.shuffle(&mut rand::thread_rng());
            }
        }
        teams
    }
}
