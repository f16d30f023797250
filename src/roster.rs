use crate::error::{PelotonError, PtResult};
use crate::fantasy::TeamSelection;
use crate::riders::{AbilityScores, Rider, RiderDatabase};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    team: String,
    age: u8,
    sprint: String,
    punch: String,
    itt: String,
    mountain: String,
    hills: String,
    abandon_chance: f64,
}

/// Numeric score or tier letter.
fn parse_score(raw: &str, rider: &str, column: &str) -> PtResult<u8> {
    let raw = raw.trim();
    let score = match raw.to_ascii_uppercase().as_str() {
        "S" => 98,
        "A" => 90,
        "B" => 80,
        "C" => 70,
        "D" => 60,
        "E" => 50,
        other => other.parse::<u8>().map_err(|_| {
            PelotonError::Validation(format!(
                "rider '{}': '{}' is not a valid {} score",
                rider, raw, column
            ))
        })?,
    };
    Ok(score)
}

impl TryFrom<RosterRow> for Rider {
    type Error = PelotonError;

    fn try_from(row: RosterRow) -> PtResult<Self> {
        let name = row.name.trim().to_string();
        let abilities = AbilityScores {
            sprint: parse_score(&row.sprint, &name, "sprint")?,
            punch: parse_score(&row.punch, &name, "punch")?,
            itt: parse_score(&row.itt, &name, "itt")?,
            mountain: parse_score(&row.mountain, &name, "mountain")?,
            hills: parse_score(&row.hills, &name, "hills")?,
        };
        Ok(Rider {
            name,
            team: row.team.trim().to_string(),
            age: row.age,
            abilities,
            abandon_chance: row.abandon_chance,
        })
    }
}

/// Reads a rider CSV with a header row:
/// `name,team,age,sprint,punch,itt,mountain,hills,abandon_chance`.
pub fn load_riders<R: Read>(reader: R) -> PtResult<RiderDatabase> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut riders = Vec::new();
    for row in rdr.deserialize::<RosterRow>() {
        let rider = Rider::try_from(row?)?;
        if rider.is_non_starter() {
            warn!("{} has abandon chance 1.0 and will not start", rider.name);
        }
        riders.push(rider);
    }
    RiderDatabase::new(riders)
}

pub fn load_riders_from_file<P: AsRef<Path>>(path: P) -> PtResult<RiderDatabase> {
    let path = path.as_ref();
    let db = load_riders(File::open(path)?)?;
    info!("Loaded {} riders from {}", db.len(), path.display());
    Ok(db)
}

/// One rider name per line, team order. Blank lines and `#` comments are
/// skipped.
pub fn load_team<R: Read>(reader: R, db: &RiderDatabase) -> PtResult<TeamSelection> {
    let mut names = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        names.push(line.to_string());
    }
    TeamSelection::new(&names, db)
}

pub fn load_team_from_file<P: AsRef<Path>>(path: P, db: &RiderDatabase) -> PtResult<TeamSelection> {
    load_team(File::open(path)?, db)
}
