#![allow(dead_code)]

use peloton::discipline::Discipline;
use peloton::race::{StageOutcome, StageResult};
use peloton::riders::{AbilityScores, Rider, RiderDatabase, RiderId};
use peloton::stages::StageProfile;

/// Builder for Rider to keep fixtures short.
pub struct RiderBuilder {
    rider: Rider,
}

impl RiderBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            rider: Rider {
                name: name.to_string(),
                team: "Test Team".to_string(),
                age: 28,
                abilities: AbilityScores {
                    sprint: 50,
                    punch: 50,
                    itt: 50,
                    mountain: 50,
                    hills: 50,
                },
                abandon_chance: 0.0,
            },
        }
    }

    pub fn team(mut self, team: &str) -> Self {
        self.rider.team = team.to_string();
        self
    }

    pub fn age(mut self, age: u8) -> Self {
        self.rider.age = age;
        self
    }

    pub fn all(mut self, score: u8) -> Self {
        self.rider.abilities = AbilityScores {
            sprint: score,
            punch: score,
            itt: score,
            mountain: score,
            hills: score,
        };
        self
    }

    pub fn sprint(mut self, score: u8) -> Self {
        self.rider.abilities.sprint = score;
        self
    }

    pub fn mountain(mut self, score: u8) -> Self {
        self.rider.abilities.mountain = score;
        self
    }

    pub fn itt(mut self, score: u8) -> Self {
        self.rider.abilities.itt = score;
        self
    }

    pub fn abandon(mut self, chance: f64) -> Self {
        self.rider.abandon_chance = chance;
        self
    }

    pub fn build(self) -> Rider {
        self.rider
    }
}

pub fn rider_name(i: usize) -> String {
    format!("Rider {:02}", i)
}

/// `n` interchangeable riders named "Rider 00", "Rider 01", ...
pub fn field(n: usize) -> RiderDatabase {
    let riders = (0..n).map(|i| RiderBuilder::new(&rider_name(i)).build()).collect();
    RiderDatabase::new(riders).expect("valid field")
}

/// A stage where `order` finished in that order and `out` abandoned.
pub fn stage_outcome(stage: usize, order: &[RiderId], out: &[RiderId]) -> StageOutcome {
    let mut results: Vec<StageResult> = order
        .iter()
        .enumerate()
        .map(|(i, &rider)| StageResult {
            rider,
            position: (i + 1) as f64,
            rank: Some(i + 1),
            time_gap: Some(i as f64),
            abandoned: false,
        })
        .collect();
    results.extend(out.iter().map(|&rider| StageResult {
        rider,
        position: 99.0,
        rank: None,
        time_gap: None,
        abandoned: true,
    }));
    StageOutcome {
        stage,
        profile: StageProfile::pure(Discipline::Sprint),
        results,
    }
}

/// A stage where every rider in `order` took part and is ranked by that
/// order; riders listed in `out` abandoned during it but keep their place.
pub fn stage_with_abandons(stage: usize, order: &[RiderId], out: &[RiderId]) -> StageOutcome {
    let results = order
        .iter()
        .enumerate()
        .map(|(i, &rider)| StageResult {
            rider,
            position: (i + 1) as f64,
            rank: Some(i + 1),
            time_gap: Some(i as f64),
            abandoned: out.contains(&rider),
        })
        .collect();
    StageOutcome {
        stage,
        profile: StageProfile::pure(Discipline::Sprint),
        results,
    }
}
