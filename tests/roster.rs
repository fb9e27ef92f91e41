//! Integration tests for tournament rosters, the team store and draw order.

use chrono::NaiveDate;
use knockout_tournament_web::{
    DrawOrder, MemoryStore, Team, TeamStore, Tournament, TournamentError,
};
use uuid::Uuid;

fn tournament() -> Tournament {
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    Tournament::new("Interclasse 2025", "Futsal", date).unwrap()
}

#[test]
fn new_tournament_needs_name_and_sport() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    assert!(matches!(
        Tournament::new("  ", "Futsal", date),
        Err(TournamentError::InvalidName)
    ));
    assert!(matches!(
        Tournament::new("Cup", "", date),
        Err(TournamentError::InvalidName)
    ));
    let t = Tournament::new(" Cup ", "Futsal", date).unwrap();
    assert_eq!(t.name, "Cup");
    assert!(t.teams.is_empty());
}

#[test]
fn team_names_are_unique_ignoring_case() {
    let mut t = tournament();
    t.add_team("Lions").unwrap();
    assert_eq!(t.add_team(" lions "), Err(TournamentError::DuplicateTeamName));
    assert_eq!(t.add_team(""), Err(TournamentError::InvalidName));
    assert_eq!(t.teams().len(), 1);
}

#[test]
fn teams_keep_registration_order() {
    let mut t = tournament();
    for name in ["Lions", "Tigers", "Bears"] {
        t.add_team(name).unwrap();
    }
    let names: Vec<String> = t.teams().into_iter().map(|team| team.name).collect();
    assert_eq!(names, vec!["Lions", "Tigers", "Bears"]);
}

#[test]
fn remove_team_by_id() {
    let mut t = tournament();
    let lions = t.add_team("Lions").unwrap();
    t.add_team("Tigers").unwrap();
    t.remove_team(&lions.id).unwrap();
    assert_eq!(t.teams().len(), 1);
    assert_eq!(
        t.remove_team(&lions.id),
        Err(TournamentError::TeamNotFound(lions.id.clone()))
    );
}

#[test]
fn players_join_a_team_once() {
    let mut t = tournament();
    let lions = t.add_team("Lions").unwrap();
    t.add_player(&lions.id, "Ana").unwrap();
    t.add_player(&lions.id, "Bruno").unwrap();
    assert_eq!(t.add_player(&lions.id, "ANA"), Err(TournamentError::DuplicatePlayerName));
    assert!(matches!(
        t.add_player("missing", "Carla"),
        Err(TournamentError::TeamNotFound(_))
    ));

    t.remove_player(&lions.id, "bruno").unwrap();
    assert_eq!(t.get_team(&lions.id).unwrap().players, vec!["Ana"]);
    assert_eq!(t.remove_player(&lions.id, "Bruno"), Err(TournamentError::PlayerNotFound));
}

#[test]
fn import_csv_creates_teams_and_rosters() {
    let mut t = tournament();
    t.add_team("Lions").unwrap();
    let csv = "team,player\nLions,Ana\nTigers,Bruno\ntigers,Carla\nTigers,Bruno\nBears,\n";
    let created = t.import_teams_csv(csv.as_bytes()).unwrap();
    assert_eq!(created, 2);

    let names: Vec<String> = t.teams().into_iter().map(|team| team.name).collect();
    assert_eq!(names, vec!["Lions", "Tigers", "Bears"]);
    assert_eq!(t.teams[0].players, vec!["Ana"]);
    assert_eq!(t.teams[1].players, vec!["Bruno", "Carla"]);
    assert!(t.teams[2].players.is_empty());
}

#[test]
fn import_csv_rejects_rows_without_team_and_adds_nothing() {
    let mut t = tournament();
    let csv = "team,player\nLions,Ana\n,Bruno\n";
    assert!(matches!(
        t.import_teams_csv(csv.as_bytes()),
        Err(TournamentError::InvalidCsv(_))
    ));
    assert!(t.teams.is_empty());
}

#[test]
fn memory_store_supplies_teams_and_player_counts() {
    let mut store = MemoryStore::new();
    let mut t = tournament();
    let lions = t.add_team("Lions").unwrap();
    t.add_team("Tigers").unwrap();
    t.add_player(&lions.id, "Ana").unwrap();
    let id = store.insert(t);

    let teams = store.teams(id).unwrap();
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0], lions);
    assert_eq!(store.player_count(id, &lions.id).unwrap(), 1);
    assert_eq!(store.player_count(id, &teams[1].id).unwrap(), 0);
    assert!(matches!(
        store.player_count(id, "missing"),
        Err(TournamentError::TeamNotFound(_))
    ));

    let unknown = Uuid::new_v4();
    assert_eq!(
        store.teams(unknown),
        Err(TournamentError::TournamentNotFound(unknown))
    );
}

fn teams(n: usize) -> Vec<Team> {
    (0..n).map(|i| Team::new(format!("t{i}"), format!("Team {i}"))).collect()
}

#[test]
fn registered_order_is_kept() {
    assert_eq!(DrawOrder::Registered.arrange(teams(6)), teams(6));
}

#[test]
fn seeded_shuffle_is_reproducible() {
    let order = DrawOrder::Shuffled { seed: Some(42) };
    let first = order.arrange(teams(16));
    assert_eq!(first, order.arrange(teams(16)));

    let mut sorted = first.clone();
    sorted.sort_by_key(|t| t.id.trim_start_matches('t').parse::<usize>().unwrap());
    assert_eq!(sorted, teams(16));
}

#[test]
fn unseeded_shuffle_is_a_permutation() {
    let mut drawn = DrawOrder::Shuffled { seed: None }.arrange(teams(10));
    drawn.sort_by_key(|t| t.id.trim_start_matches('t').parse::<usize>().unwrap());
    assert_eq!(drawn, teams(10));
}
