//! Score entry, winner determination and forward propagation through later rounds.

use crate::models::{Bracket, BracketError, Slot, Winner};

/// Winner a match should have given its slots and scores.
///
/// A team facing a dead slot (one that can never be filled) advances without scores.
/// Otherwise both teams and both scores are needed and the strictly higher score wins;
/// a tie is undecided.
pub(crate) fn outcome(bracket: &Bracket, round: usize, match_index: usize) -> Winner {
    let Some(m) = bracket.get(round, match_index) else {
        return Winner::Undecided;
    };
    match (m.slot_a.is_some(), m.slot_b.is_some()) {
        (true, false) if bracket.is_dead_slot(round, match_index, Slot::B) => Winner::SlotA,
        (false, true) if bracket.is_dead_slot(round, match_index, Slot::A) => Winner::SlotB,
        (true, true) => match (m.score_a, m.score_b) {
            (Some(a), Some(b)) if a > b => Winner::SlotA,
            (Some(a), Some(b)) if b > a => Winner::SlotB,
            _ => Winner::Undecided,
        },
        _ => Winner::Undecided,
    }
}

/// True if the match resolves as a bye: one team and a dead opposite slot.
pub fn is_bye(bracket: &Bracket, round: usize, match_index: usize) -> bool {
    let Some(m) = bracket.get(round, match_index) else {
        return false;
    };
    match (m.slot_a.is_some(), m.slot_b.is_some()) {
        (true, false) => bracket.is_dead_slot(round, match_index, Slot::B),
        (false, true) => bracket.is_dead_slot(round, match_index, Slot::A),
        _ => false,
    }
}

/// Recompute a match's winner and carry the result forward.
///
/// When the team advanced out of a match differs from what sits in its next-round slot,
/// that slot is overwritten (or cleared), the next match's scores and winner are reset,
/// and the next match is settled in turn. Stops as soon as a slot is already up to date.
pub(crate) fn settle(bracket: &mut Bracket, round: usize, match_index: usize) {
    let (mut r, mut m) = (round, match_index);
    loop {
        let winner = outcome(bracket, r, m);
        let Some(current) = bracket.get_mut(r, m) else {
            return;
        };
        current.winner = winner;
        let advancing = current.winning_team().cloned();

        let next_round = r + 1;
        let next_match = m / 2;
        let slot = Slot::feeding(m);
        let Some(next) = bracket.get_mut(next_round, next_match) else {
            return;
        };
        if next.team(slot) == advancing.as_ref() {
            return;
        }

        match &advancing {
            Some(team) => log::debug!(
                "Advancing {} into round {} match {} slot {}",
                team.name,
                next_round,
                next_match,
                slot
            ),
            None => log::debug!(
                "Clearing round {} match {} slot {}",
                next_round,
                next_match,
                slot
            ),
        }
        next.set_team(slot, advancing);
        next.reset_result();

        r = next_round;
        m = next_match;
    }
}

/// Check that a score may be entered for this slot. Nothing is mutated.
fn check_scorable(
    bracket: &Bracket,
    round: usize,
    match_index: usize,
    slot: Slot,
) -> Result<(), BracketError> {
    let m = bracket
        .get(round, match_index)
        .ok_or(BracketError::OutOfRange { round, match_index })?;
    if is_bye(bracket, round, match_index) {
        return Err(BracketError::ByeMatch { round, match_index });
    }
    // Both teams must be known: propagation resets the scores of a match whose slot changes.
    for side in [slot, slot.other()] {
        if m.team(side).is_none() {
            return Err(BracketError::EmptySlot {
                round,
                match_index,
                slot: side,
            });
        }
    }
    Ok(())
}

/// Record one side's score and propagate any change of winner through later rounds.
///
/// Scores are only taken once both teams of the match are known.
/// A corrected score that flips the winner replaces the advanced team downstream;
/// one that makes the match a tie retracts it. Either way every dependent later match
/// has its scores and winner cleared. On error the bracket is left untouched.
pub fn record_score(
    bracket: &mut Bracket,
    round: usize,
    match_index: usize,
    slot: Slot,
    score: u32,
) -> Result<(), BracketError> {
    check_scorable(bracket, round, match_index, slot)?;
    if let Some(m) = bracket.get_mut(round, match_index) {
        m.set_score(slot, Some(score));
    }
    settle(bracket, round, match_index);
    Ok(())
}

/// Remove one side's score; the match becomes undecided and its advanced team is retracted.
pub fn clear_score(
    bracket: &mut Bracket,
    round: usize,
    match_index: usize,
    slot: Slot,
) -> Result<(), BracketError> {
    check_scorable(bracket, round, match_index, slot)?;
    if let Some(m) = bracket.get_mut(round, match_index) {
        m.set_score(slot, None);
    }
    settle(bracket, round, match_index);
    Ok(())
}
