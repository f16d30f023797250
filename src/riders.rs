use crate::discipline::Discipline;
use crate::error::{PelotonError, PtResult};
use crate::generator::{self, Triangle};
use crate::stages::StageProfile;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumIter};

/// Index of a rider inside its `RiderDatabase` (registration order).
pub type RiderId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub sprint: u8,
    pub punch: u8,
    pub itt: u8,
    pub mountain: u8,
    pub hills: u8,
}

impl AbilityScores {
    /// Break-away stages are ridden on the same engine as hilly ones.
    pub fn score(&self, discipline: Discipline) -> u8 {
        match discipline {
            Discipline::Sprint => self.sprint,
            Discipline::Punch => self.punch,
            Discipline::Itt => self.itt,
            Discipline::Mountain => self.mountain,
            Discipline::Hills | Discipline::BreakAway => self.hills,
        }
    }

    fn as_array(&self) -> [u8; 5] {
        [self.sprint, self.punch, self.itt, self.mountain, self.hills]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rider {
    pub name: String,
    pub team: String,
    pub age: u8,
    pub abilities: AbilityScores,
    /// Probability of not reaching the finish of the whole race.
    pub abandon_chance: f64,
}

impl Rider {
    pub fn is_youth(&self, age_limit: u8) -> bool {
        self.age < age_limit
    }

    /// A rider certain to abandon never takes the start.
    pub fn is_non_starter(&self) -> bool {
        self.abandon_chance >= 1.0
    }

    fn validate(&self) -> PtResult<()> {
        if self.name.trim().is_empty() {
            return Err(PelotonError::Validation(
                "rider name must not be empty".to_string(),
            ));
        }
        if let Some(score) = self.abilities.as_array().iter().find(|&&s| s > 100) {
            return Err(PelotonError::Validation(format!(
                "rider '{}' has ability score {} outside 0..=100",
                self.name, score
            )));
        }
        if !(0.0..=1.0).contains(&self.abandon_chance) {
            return Err(PelotonError::Validation(format!(
                "rider '{}' has abandon chance {} outside [0, 1]",
                self.name, self.abandon_chance
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, EnumIter, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum AbilityTier {
    Exceptional,
    WorldClass,
    Elite,
    VeryGood,
    Good,
    Average,
    BelowAverage,
}

impl AbilityTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            98..=u8::MAX => Self::Exceptional,
            95..=97 => Self::WorldClass,
            90..=94 => Self::Elite,
            80..=89 => Self::VeryGood,
            70..=79 => Self::Good,
            50..=69 => Self::Average,
            _ => Self::BelowAverage,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Exceptional => 0,
            Self::WorldClass => 1,
            Self::Elite => 2,
            Self::VeryGood => 3,
            Self::Good => 4,
            Self::Average => 5,
            Self::BelowAverage => 6,
        }
    }
}

/// Maps an ability score to the finishing-position triangle of its tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierTable {
    tiers: [Triangle; 7],
}

impl TierTable {
    /// Tiers are ordered best first. A better tier may never have a worse
    /// min, mode or max than the tier below it.
    pub fn new(tiers: [Triangle; 7]) -> PtResult<Self> {
        for t in &tiers {
            Triangle::new(t.min, t.mode, t.max)?;
        }
        for pair in tiers.windows(2) {
            let (better, worse) = (pair[0], pair[1]);
            if better.min > worse.min || better.mode > worse.mode || better.max > worse.max {
                return Err(PelotonError::Config(format!(
                    "tier triples must not get better as ability drops: {:?} then {:?}",
                    better, worse
                )));
            }
        }
        Ok(Self { tiers })
    }

    pub fn triangle(&self, tier: AbilityTier) -> Triangle {
        self.tiers[tier.index()]
    }

    pub fn triangle_for(&self, score: u8) -> Triangle {
        self.triangle(AbilityTier::from_score(score))
    }
}

impl<'de> Deserialize<'de> for TierTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Fields {
            tiers: [Triangle; 7],
        }

        let fields = Fields::deserialize(deserializer)?;
        Self::new(fields.tiers).map_err(serde::de::Error::custom)
    }
}

impl Default for TierTable {
    fn default() -> Self {
        let t = |min, mode, max| Triangle { min, mode, max };
        Self {
            tiers: [
                t(1.0, 1.0, 10.0),
                t(1.0, 3.0, 20.0),
                t(1.0, 6.0, 30.0),
                t(1.0, 15.0, 40.0),
                t(5.0, 20.0, 50.0),
                t(20.0, 30.0, 60.0),
                t(50.0, 75.0, 150.0),
            ],
        }
    }
}

/// A rider's five scores resolved into one triangle per discipline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityProfile {
    triples: [Triangle; Discipline::COUNT],
}

impl AbilityProfile {
    pub fn new(scores: &AbilityScores, tiers: &TierTable) -> Self {
        let mut triples = [Triangle {
            min: 0.0,
            mode: 0.0,
            max: 0.0,
        }; Discipline::COUNT];
        for discipline in Discipline::iter() {
            triples[discipline.index()] = tiers.triangle_for(scores.score(discipline));
        }
        Self { triples }
    }

    #[inline(always)]
    pub fn triple(&self, discipline: Discipline) -> Triangle {
        self.triples[discipline.index()]
    }

    pub fn blend(&self, stage: &StageProfile) -> Triangle {
        generator::blend(self, stage)
    }
}

/// Read-only rider snapshot shared by every simulation.
#[derive(Debug, Clone, Default)]
pub struct RiderDatabase {
    riders: Vec<Rider>,
    by_name: HashMap<String, RiderId>,
}

impl RiderDatabase {
    /// Validates every rider before anything is stored.
    pub fn new(riders: Vec<Rider>) -> PtResult<Self> {
        let mut by_name = HashMap::with_capacity(riders.len());
        for (id, rider) in riders.iter().enumerate() {
            rider.validate()?;
            if by_name.insert(rider.name.clone(), id).is_some() {
                return Err(PelotonError::Validation(format!(
                    "duplicate rider name '{}'",
                    rider.name
                )));
            }
        }
        Ok(Self { riders, by_name })
    }

    pub fn len(&self) -> usize {
        self.riders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.riders.is_empty()
    }

    pub fn rider(&self, id: RiderId) -> &Rider {
        &self.riders[id]
    }

    pub fn id_of(&self, name: &str) -> PtResult<RiderId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| PelotonError::UnknownRider(name.to_string()))
    }

    pub fn get(&self, name: &str) -> PtResult<&Rider> {
        self.id_of(name).map(|id| &self.riders[id])
    }

    pub fn riders(&self) -> &[Rider] {
        &self.riders
    }

    pub fn iter(&self) -> impl Iterator<Item = (RiderId, &Rider)> {
        self.riders.iter().enumerate()
    }

    pub fn youth_riders(&self, age_limit: u8) -> Vec<RiderId> {
        self.iter()
            .filter(|(_, r)| r.is_youth(age_limit))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn team_riders(&self, team: &str) -> Vec<RiderId> {
        self.iter()
            .filter(|(_, r)| r.team == team)
            .map(|(id, _)| id)
            .collect()
    }
}
