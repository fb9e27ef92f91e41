//! Integration tests for bracket construction: shape, byes and walkovers.

use knockout_tournament_web::{
    bracket_size, build_bracket, reorganize, BracketError, Team, Winner,
};

fn teams(n: usize) -> Vec<Team> {
    (0..n).map(|i| Team::new(format!("t{i}"), format!("Team {i}"))).collect()
}

fn named(names: &[&str]) -> Vec<Team> {
    names.iter().map(|n| Team::new(n.to_lowercase(), *n)).collect()
}

#[test]
fn build_requires_at_least_2_teams() {
    assert_eq!(
        build_bracket(&teams(0)),
        Err(BracketError::InsufficientTeams { found: 0 })
    );
    assert_eq!(
        build_bracket(&teams(1)),
        Err(BracketError::InsufficientTeams { found: 1 })
    );
}

#[test]
fn rounds_halve_down_to_a_single_final() {
    for n in 2..=33 {
        let bracket = build_bracket(&teams(n)).unwrap();
        let size = bracket_size(n);
        assert_eq!(bracket.rounds.len(), size.trailing_zeros() as usize, "n = {n}");
        assert_eq!(bracket.rounds[0].len(), size / 2, "n = {n}");
        for pair in bracket.rounds.windows(2) {
            assert_eq!(pair[1].len() * 2, pair[0].len(), "n = {n}");
        }
        assert_eq!(bracket.rounds.last().unwrap().len(), 1, "n = {n}");
    }
}

#[test]
fn first_round_has_one_empty_slot_per_bye() {
    for n in 2..=33 {
        let bracket = build_bracket(&teams(n)).unwrap();
        let empty: usize = bracket.rounds[0]
            .matches
            .iter()
            .map(|m| usize::from(m.slot_a.is_none()) + usize::from(m.slot_b.is_none()))
            .sum();
        assert_eq!(empty, bracket_size(n) - n, "n = {n}");
        assert_eq!(bracket.team_count(), n);
    }
}

#[test]
fn later_rounds_start_empty_without_byes() {
    let bracket = build_bracket(&teams(8)).unwrap();
    for round in &bracket.rounds[1..] {
        for m in &round.matches {
            assert!(m.slot_a.is_none() && m.slot_b.is_none());
            assert_eq!(m.winner, Winner::Undecided);
            assert_eq!((m.score_a, m.score_b), (None, None));
        }
    }
}

#[test]
fn two_teams_play_the_final_directly() {
    let bracket = build_bracket(&named(&["A", "B"])).unwrap();
    assert_eq!(bracket.rounds.len(), 1);
    let final_match = bracket.final_match().unwrap();
    assert_eq!(final_match.slot_a.as_ref().unwrap().name, "A");
    assert_eq!(final_match.slot_b.as_ref().unwrap().name, "B");
    assert_eq!(final_match.winner, Winner::Undecided);
}

#[test]
fn five_teams_pair_in_order_and_pad_with_byes() {
    let bracket = build_bracket(&named(&["A", "B", "C", "D", "E"])).unwrap();
    assert_eq!(bracket.size(), 8);
    assert_eq!(bracket.rounds.len(), 3);
    assert_eq!(bracket.rounds[1].len(), 2);
    assert_eq!(bracket.rounds[2].len(), 1);

    let slots: Vec<(Option<&str>, Option<&str>)> = bracket.rounds[0]
        .matches
        .iter()
        .map(|m| {
            (
                m.slot_a.as_ref().map(|t| t.name.as_str()),
                m.slot_b.as_ref().map(|t| t.name.as_str()),
            )
        })
        .collect();
    assert_eq!(
        slots,
        vec![
            (Some("A"), Some("B")),
            (Some("C"), Some("D")),
            (Some("E"), None),
            (None, None),
        ]
    );
}

#[test]
fn bye_team_advances_without_scores() {
    let bracket = build_bracket(&named(&["A", "B", "C", "D", "E"])).unwrap();

    let bye = &bracket.rounds[0].matches[2];
    assert_eq!(bye.winner, Winner::SlotA);
    assert_eq!((bye.score_a, bye.score_b), (None, None));

    // Nobody can come out of (bye, bye), so E walks over round 1 as well.
    let empty = &bracket.rounds[0].matches[3];
    assert_eq!(empty.winner, Winner::Undecided);
    let walkover = &bracket.rounds[1].matches[1];
    assert_eq!(walkover.slot_a.as_ref().unwrap().name, "E");
    assert!(walkover.slot_b.is_none());
    assert_eq!(walkover.winner, Winner::SlotA);

    let final_match = bracket.final_match().unwrap();
    assert!(final_match.slot_a.is_none());
    assert_eq!(final_match.slot_b.as_ref().unwrap().name, "E");
    assert_eq!(final_match.winner, Winner::Undecided);
    assert!(bracket.champion().is_none());
}

#[test]
fn three_teams_give_one_bye() {
    let bracket = build_bracket(&named(&["A", "B", "C"])).unwrap();
    let final_match = bracket.final_match().unwrap();
    assert!(final_match.slot_a.is_none());
    assert_eq!(final_match.slot_b.as_ref().unwrap().name, "C");
}

#[test]
fn build_is_deterministic_for_the_same_order() {
    let t = teams(11);
    assert_eq!(build_bracket(&t).unwrap(), build_bracket(&t).unwrap());
}

#[test]
fn reorganize_uses_the_new_order() {
    let t = named(&["A", "B", "C", "D"]);
    let first = build_bracket(&t).unwrap();

    let reordered = named(&["D", "C", "B", "A"]);
    let second = reorganize(&reordered).unwrap();
    assert_ne!(first, second);
    assert_eq!(second, build_bracket(&reordered).unwrap());
    assert_eq!(second.rounds[0].matches[0].slot_a.as_ref().unwrap().name, "D");
}
