//! Bracket, Round, BracketMatch and the engine's error type.

use crate::models::team::Team;
use serde::{Deserialize, Serialize};

/// One side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// Slot in the next round that the winner of match `match_index` feeds into.
    pub fn feeding(match_index: usize) -> Self {
        if match_index % 2 == 0 {
            Slot::A
        } else {
            Slot::B
        }
    }

    /// The opposite side.
    pub fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }

    fn offset(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::A => write!(f, "A"),
            Slot::B => write!(f, "B"),
        }
    }
}

/// Outcome marker of a match. Persisted as `"none"`, `"A"` or `"B"`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Winner {
    #[default]
    #[serde(rename = "none")]
    Undecided,
    #[serde(rename = "A")]
    SlotA,
    #[serde(rename = "B")]
    SlotB,
}

impl Winner {
    pub fn slot(self) -> Option<Slot> {
        match self {
            Winner::Undecided => None,
            Winner::SlotA => Some(Slot::A),
            Winner::SlotB => Some(Slot::B),
        }
    }
}

impl From<Slot> for Winner {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::A => Winner::SlotA,
            Slot::B => Winner::SlotB,
        }
    }
}

/// A single match: two slots, each a team or empty (bye / not yet decided).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub slot_a: Option<Team>,
    pub slot_b: Option<Team>,
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    pub winner: Winner,
}

impl BracketMatch {
    /// Round-0 match between two pool entries.
    pub fn new(slot_a: Option<Team>, slot_b: Option<Team>) -> Self {
        Self {
            slot_a,
            slot_b,
            ..Self::default()
        }
    }

    pub fn team(&self, slot: Slot) -> Option<&Team> {
        match slot {
            Slot::A => self.slot_a.as_ref(),
            Slot::B => self.slot_b.as_ref(),
        }
    }

    pub fn score(&self, slot: Slot) -> Option<u32> {
        match slot {
            Slot::A => self.score_a,
            Slot::B => self.score_b,
        }
    }

    pub(crate) fn set_team(&mut self, slot: Slot, team: Option<Team>) {
        match slot {
            Slot::A => self.slot_a = team,
            Slot::B => self.slot_b = team,
        }
    }

    pub(crate) fn set_score(&mut self, slot: Slot, score: Option<u32>) {
        match slot {
            Slot::A => self.score_a = score,
            Slot::B => self.score_b = score,
        }
    }

    /// Drop both scores and the winner (inputs of the match changed).
    pub(crate) fn reset_result(&mut self) {
        self.score_a = None;
        self.score_b = None;
        self.winner = Winner::Undecided;
    }

    /// Team that currently advances out of this match, if any.
    pub fn winning_team(&self) -> Option<&Team> {
        self.winner.slot().and_then(|s| self.team(s))
    }
}

/// Ordered matches of one round. Persisted as a bare array.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Round {
    pub matches: Vec<BracketMatch>,
}

impl Round {
    /// Round of `len` empty matches, waiting for winners from the previous round.
    pub fn empty(len: usize) -> Self {
        Self {
            matches: vec![BracketMatch::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Single-elimination bracket: rounds from the first (index 0) to the final.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub rounds: Vec<Round>,
}

impl Bracket {
    pub fn get(&self, round: usize, match_index: usize) -> Option<&BracketMatch> {
        self.rounds.get(round)?.matches.get(match_index)
    }

    pub(crate) fn get_mut(&mut self, round: usize, match_index: usize) -> Option<&mut BracketMatch> {
        self.rounds.get_mut(round)?.matches.get_mut(match_index)
    }

    /// Number of pool positions (teams + byes) in the first round.
    pub fn size(&self) -> usize {
        self.rounds.first().map_or(0, |r| r.len() * 2)
    }

    /// Number of real teams seeded into the first round.
    pub fn team_count(&self) -> usize {
        self.rounds.first().map_or(0, |r| {
            r.matches
                .iter()
                .map(|m| usize::from(m.slot_a.is_some()) + usize::from(m.slot_b.is_some()))
                .sum()
        })
    }

    pub fn final_match(&self) -> Option<&BracketMatch> {
        self.rounds.last()?.matches.first()
    }

    /// Winner of the final, once decided.
    pub fn champion(&self) -> Option<&Team> {
        self.final_match()?.winning_team()
    }

    pub fn is_complete(&self) -> bool {
        self.champion().is_some()
    }

    /// A slot is dead when every first-round position feeding it is empty: it can never hold a team.
    ///
    /// Slot `s` of match `m` in round `r` covers `2^r` consecutive first-round positions
    /// starting at `(2m + s) * 2^r`.
    pub fn is_dead_slot(&self, round: usize, match_index: usize, slot: Slot) -> bool {
        let Some(first) = self.rounds.first() else {
            return true;
        };
        let span = match u32::try_from(round).ok().and_then(|r| 1usize.checked_shl(r)) {
            Some(span) => span,
            None => return true,
        };
        let start = match_index
            .saturating_mul(2)
            .saturating_add(slot.offset())
            .saturating_mul(span);
        (start..start.saturating_add(span)).all(|pos| {
            let side = if pos % 2 == 0 { Slot::A } else { Slot::B };
            first
                .matches
                .get(pos / 2)
                .map_or(true, |m| m.team(side).is_none())
        })
    }
}

/// Errors reported by the bracket engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// A bracket needs at least two teams.
    InsufficientTeams { found: usize },
    /// Round or match index does not address an existing match.
    OutOfRange { round: usize, match_index: usize },
    /// A slot of the match has no team yet, so it cannot be scored.
    EmptySlot {
        round: usize,
        match_index: usize,
        slot: Slot,
    },
    /// The match is a bye and resolves without scores.
    ByeMatch { round: usize, match_index: usize },
    /// Persisted text is not a valid bracket.
    MalformedBracket(String),
    /// Bracket could not be encoded.
    Encode(String),
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::InsufficientTeams { found } => {
                write!(f, "Need at least 2 teams to build a bracket (found {})", found)
            }
            BracketError::OutOfRange { round, match_index } => {
                write!(f, "No match {} in round {}", match_index, round)
            }
            BracketError::EmptySlot {
                round,
                match_index,
                slot,
            } => write!(
                f,
                "Slot {} of match {} in round {} has no team yet",
                slot, match_index, round
            ),
            BracketError::ByeMatch { round, match_index } => {
                write!(f, "Match {} in round {} is a bye", match_index, round)
            }
            BracketError::MalformedBracket(reason) => write!(f, "Malformed bracket: {}", reason),
            BracketError::Encode(reason) => write!(f, "Could not encode bracket: {}", reason),
        }
    }
}

impl std::error::Error for BracketError {}
