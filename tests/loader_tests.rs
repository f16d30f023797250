use peloton::error::PelotonError;
use peloton::fantasy::TEAM_SIZE;
use peloton::roster::{load_riders, load_riders_from_file, load_team, load_team_from_file};
use std::io::{Cursor, Write};

const HEADER: &str = "name,team,age,sprint,punch,itt,mountain,hills,abandon_chance\n";

fn csv(rows: &[&str]) -> Cursor<String> {
    let mut s = HEADER.to_string();
    for r in rows {
        s.push_str(r);
        s.push('\n');
    }
    Cursor::new(s)
}

#[test]
fn test_numbers_and_tier_letters() {
    let db = load_riders(csv(&[
        "Climber,Team A,23,E,C,B,S,A,0.05",
        "Sprinter, Team B ,29,97,60,55,40,65,0.2",
    ]))
    .unwrap();

    assert_eq!(db.len(), 2);
    let climber = db.get("Climber").unwrap();
    assert_eq!(climber.abilities.mountain, 98);
    assert_eq!(climber.abilities.hills, 90);
    assert_eq!(climber.abilities.itt, 80);
    assert_eq!(climber.abilities.punch, 70);
    assert_eq!(climber.abilities.sprint, 50);

    let sprinter = db.get("Sprinter").unwrap();
    assert_eq!(sprinter.team, "Team B");
    assert_eq!(sprinter.abilities.sprint, 97);
    assert_eq!(db.youth_riders(24), vec![0]);
    assert_eq!(db.team_riders("Team A"), vec![0]);
}

#[test]
fn test_invalid_rows_rejected() {
    let bad_score = load_riders(csv(&["X,T,25,Z,50,50,50,50,0.1"]));
    assert!(matches!(bad_score, Err(PelotonError::Validation(_))));

    let out_of_range = load_riders(csv(&["X,T,25,101,50,50,50,50,0.1"]));
    assert!(matches!(out_of_range, Err(PelotonError::Validation(_))));

    let bad_chance = load_riders(csv(&["X,T,25,50,50,50,50,50,1.5"]));
    assert!(matches!(bad_chance, Err(PelotonError::Validation(_))));

    let duplicate = load_riders(csv(&["X,T,25,50,50,50,50,50,0.1", "X,U,26,50,50,50,50,50,0.1"]));
    assert!(matches!(duplicate, Err(PelotonError::Validation(_))));

    let missing_column = load_riders(csv(&["X,T,25,50,50"]));
    assert!(matches!(missing_column, Err(PelotonError::Csv(_))));
}

#[test]
fn test_team_file_skips_comments() {
    let rows: Vec<String> = (0..22)
        .map(|i| format!("Rider {},T,25,50,50,50,50,50,0.1", i))
        .collect();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let db = load_riders(csv(&refs)).unwrap();

    let mut text = String::from("# my team\n\n");
    for i in 0..20 {
        text.push_str(&format!("  Rider {}\n", i));
    }
    let team = load_team(Cursor::new(text), &db).unwrap();
    assert_eq!(team.riders().len(), TEAM_SIZE);
    assert_eq!(team.names()[0], "Rider 0");

    let short = load_team(Cursor::new("Rider 0\nRider 1\n"), &db);
    assert!(matches!(short, Err(PelotonError::InvalidTeam(_))));
}

#[test]
fn test_load_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let riders_path = dir.path().join("riders.csv");
    let team_path = dir.path().join("team.txt");

    let mut f = std::fs::File::create(&riders_path).unwrap();
    f.write_all(HEADER.as_bytes()).unwrap();
    for i in 0..20 {
        writeln!(f, "R{},T,25,50,50,50,50,50,0.1", i).unwrap();
    }
    let mut t = std::fs::File::create(&team_path).unwrap();
    for i in (0..20).rev() {
        writeln!(t, "R{}", i).unwrap();
    }

    let db = load_riders_from_file(&riders_path).unwrap();
    let team = load_team_from_file(&team_path, &db).unwrap();
    assert_eq!(team.riders()[0], 19);

    assert!(matches!(
        load_riders_from_file(dir.path().join("missing.csv")),
        Err(PelotonError::Io(_))
    ));
}

#[test]
fn test_bundled_data_is_consistent() {
    let db = load_riders_from_file("data/riders.csv").unwrap();
    assert!(db.len() >= 100);
    let team = load_team_from_file("data/team.txt", &db).unwrap();
    assert_eq!(team.riders().len(), TEAM_SIZE);
}
