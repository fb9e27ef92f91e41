//! Bracket text format (JSON) and structural validation of persisted brackets.

use crate::logic::scoring::{is_bye, outcome};
use crate::models::{Bracket, BracketError, Slot};
use std::collections::HashSet;

/// Encode a bracket as JSON: `{"rounds": [[match, ...], ...]}`.
pub fn serialize(bracket: &Bracket) -> Result<String, BracketError> {
    serde_json::to_string(bracket).map_err(|e| BracketError::Encode(e.to_string()))
}

/// Decode and validate a bracket. Anything that is not a consistent bracket is
/// [`BracketError::MalformedBracket`]; callers treat that as "no bracket yet".
pub fn deserialize(text: &str) -> Result<Bracket, BracketError> {
    let bracket: Bracket =
        serde_json::from_str(text).map_err(|e| BracketError::MalformedBracket(e.to_string()))?;
    validate(&bracket)?;
    Ok(bracket)
}

fn malformed(reason: impl Into<String>) -> BracketError {
    BracketError::MalformedBracket(reason.into())
}

/// Check shape, winner and propagation invariants of a bracket.
pub fn validate(bracket: &Bracket) -> Result<(), BracketError> {
    let first = bracket
        .rounds
        .first()
        .ok_or_else(|| malformed("bracket has no rounds"))?;
    if !first.len().is_power_of_two() {
        return Err(malformed(format!(
            "first round has {} matches, expected a power of two",
            first.len()
        )));
    }
    for (i, pair) in bracket.rounds.windows(2).enumerate() {
        if pair[1].len() * 2 != pair[0].len() {
            return Err(malformed(format!(
                "round {} has {} matches, expected {}",
                i + 1,
                pair[1].len(),
                pair[0].len() / 2
            )));
        }
    }
    if bracket.rounds.last().map(|r| r.len()) != Some(1) {
        return Err(malformed("last round must be a single final match"));
    }
    if bracket.team_count() < 2 {
        return Err(malformed("fewer than 2 teams"));
    }

    // First round: teams first, then byes, no team twice.
    let mut seen = HashSet::new();
    let mut bye_seen = false;
    for slot in first.matches.iter().flat_map(|m| [&m.slot_a, &m.slot_b]) {
        match slot {
            Some(team) if bye_seen => {
                return Err(malformed(format!("team {} is seeded after a bye", team.id)));
            }
            Some(team) if !seen.insert(team.id.as_str()) => {
                return Err(malformed(format!("team {} is seeded twice", team.id)));
            }
            Some(_) => {}
            None => bye_seen = true,
        }
    }

    for (r, round) in bracket.rounds.iter().enumerate() {
        for (m, current) in round.matches.iter().enumerate() {
            let scored = current.score_a.is_some() || current.score_b.is_some();
            if scored && is_bye(bracket, r, m) {
                return Err(malformed(format!("round {} match {} is a bye with a score", r, m)));
            }
            if scored && (current.slot_a.is_none() || current.slot_b.is_none()) {
                return Err(malformed(format!(
                    "round {} match {} has a score but is missing a team",
                    r, m
                )));
            }
            if current.winner != outcome(bracket, r, m) {
                return Err(malformed(format!(
                    "round {} match {} winner does not match its scores",
                    r, m
                )));
            }
            if let Some(next) = bracket.get(r + 1, m / 2) {
                if next.team(Slot::feeding(m)) != current.winning_team() {
                    return Err(malformed(format!(
                        "round {} match {} winner was not carried into round {}",
                        r,
                        m,
                        r + 1
                    )));
                }
            }
        }
    }
    Ok(())
}
