//! Bracket construction: seed teams into the first round, pad with byes, resolve walkovers.

use crate::logic::scoring::settle;
use crate::models::{Bracket, BracketError, BracketMatch, Round, Team};

/// Number of first-round positions for `team_count` teams (next power of two).
pub fn bracket_size(team_count: usize) -> usize {
    team_count.max(1).next_power_of_two()
}

/// Build a single-elimination bracket from teams in the given order.
///
/// 1. Pool = teams followed by `size - n` empty slots (byes).
/// 2. Round 0 pairs the pool in order: (0, 1), (2, 3), ...
/// 3. Each later round has half as many empty matches, down to the final.
/// 4. Bye matches resolve at once and their team advances.
///
/// The order is used as given; shuffle beforehand for a random draw.
pub fn build_bracket(teams: &[Team]) -> Result<Bracket, BracketError> {
    if teams.len() < 2 {
        return Err(BracketError::InsufficientTeams { found: teams.len() });
    }
    let size = bracket_size(teams.len());

    let pool: Vec<Option<Team>> = teams
        .iter()
        .cloned()
        .map(Some)
        .chain(std::iter::repeat(None))
        .take(size)
        .collect();

    let first = Round {
        matches: pool
            .chunks_exact(2)
            .map(|pair| BracketMatch::new(pair[0].clone(), pair[1].clone()))
            .collect(),
    };

    let mut rounds = vec![first];
    let mut len = size / 2;
    while len > 1 {
        len /= 2;
        rounds.push(Round::empty(len));
    }

    let mut bracket = Bracket { rounds };
    for m in 0..bracket.rounds[0].len() {
        settle(&mut bracket, 0, m);
    }

    log::info!(
        "Built bracket: {} teams, {} byes, {} rounds",
        teams.len(),
        size - teams.len(),
        bracket.rounds.len()
    );
    Ok(bracket)
}

/// Replace a bracket with a fresh draw. Same as [`build_bracket`]; the caller supplies the new order.
pub fn reorganize(teams: &[Team]) -> Result<Bracket, BracketError> {
    log::info!("Reorganizing bracket with {} teams", teams.len());
    build_bracket(teams)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_next_power_of_two() {
        assert_eq!(bracket_size(2), 2);
        assert_eq!(bracket_size(3), 4);
        assert_eq!(bracket_size(5), 8);
        assert_eq!(bracket_size(8), 8);
        assert_eq!(bracket_size(9), 16);
    }
}
