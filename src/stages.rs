use crate::discipline::Discipline;
use crate::error::{PelotonError, PtResult};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use tracing::debug;

/// Allowed drift of the weight sum away from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Number of stages in the reference race.
pub const DEFAULT_STAGE_COUNT: usize = 21;

/// Weighted terrain mixture of one stage. Weights always sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageProfile {
    weights: [f64; Discipline::COUNT],
}

impl StageProfile {
    pub fn new(parts: &[(Discipline, f64)]) -> PtResult<Self> {
        let mut weights = [0.0; Discipline::COUNT];
        let mut seen = [false; Discipline::COUNT];

        for &(discipline, weight) in parts {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(PelotonError::Validation(format!(
                    "weight for {} must be within [0, 1], got {}",
                    discipline, weight
                )));
            }
            let slot = discipline.index();
            if seen[slot] {
                return Err(PelotonError::Validation(format!(
                    "discipline {} listed twice",
                    discipline
                )));
            }
            seen[slot] = true;
            weights[slot] = weight;
        }

        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(PelotonError::InvalidStageProfile { total });
        }
        Ok(Self { weights })
    }

    pub fn pure(discipline: Discipline) -> Self {
        let mut weights = [0.0; Discipline::COUNT];
        weights[discipline.index()] = 1.0;
        Self { weights }
    }

    #[inline(always)]
    pub fn weight(&self, discipline: Discipline) -> f64 {
        self.weights[discipline.index()]
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Disciplines with a non-zero share, in enum order.
    pub fn parts(&self) -> impl Iterator<Item = (Discipline, f64)> + '_ {
        Discipline::iter()
            .map(|d| (d, self.weight(d)))
            .filter(|&(_, w)| w > 0.0)
    }

    pub fn is_pure(&self) -> bool {
        self.parts().count() == 1
    }

    /// Heaviest discipline. Ties go to the one declared first in `Discipline`.
    pub fn primary_discipline(&self) -> Discipline {
        let mut best = Discipline::Sprint;
        let mut best_weight = f64::NEG_INFINITY;
        for (d, w) in self.parts() {
            if w > best_weight {
                best = d;
                best_weight = w;
            }
        }
        best
    }

    /// Weighted seconds lost per finishing place.
    pub fn seconds_per_place(&self) -> f64 {
        self.parts().map(|(d, w)| d.seconds_per_place() * w).sum()
    }
}

/// The race route: one profile per stage, numbered from 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageCatalog {
    profiles: Vec<StageProfile>,
    defaults: Vec<StageProfile>,
}

impl StageCatalog {
    pub fn new(profiles: Vec<StageProfile>) -> PtResult<Self> {
        if profiles.is_empty() {
            return Err(PelotonError::Validation(
                "a race needs at least one stage".to_string(),
            ));
        }
        Ok(Self {
            defaults: profiles.clone(),
            profiles,
        })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, stage: usize) -> PtResult<&StageProfile> {
        stage
            .checked_sub(1)
            .and_then(|i| self.profiles.get(i))
            .ok_or(PelotonError::UnknownStage(stage))
    }

    /// Replaces one stage profile. Validation already happened when the
    /// profile was built, so only the stage number can fail here.
    pub fn update(&mut self, stage: usize, profile: StageProfile) -> PtResult<()> {
        let slot = stage
            .checked_sub(1)
            .and_then(|i| self.profiles.get_mut(i))
            .ok_or(PelotonError::UnknownStage(stage))?;
        *slot = profile;
        debug!("Stage {} profile updated", stage);
        Ok(())
    }

    /// Builds and installs a profile from raw parts, all-or-nothing.
    pub fn update_parts(&mut self, stage: usize, parts: &[(Discipline, f64)]) -> PtResult<()> {
        let profile = StageProfile::new(parts)?;
        self.update(stage, profile)
    }

    pub fn reset(&mut self, stage: usize) -> PtResult<()> {
        let idx = stage
            .checked_sub(1)
            .filter(|&i| i < self.profiles.len())
            .ok_or(PelotonError::UnknownStage(stage))?;
        self.profiles[idx] = self.defaults[idx];
        Ok(())
    }

    pub fn reset_all(&mut self) {
        self.profiles.clone_from(&self.defaults);
    }

    /// `(stage_number, profile)` in race order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &StageProfile)> {
        self.profiles.iter().enumerate().map(|(i, p)| (i + 1, p))
    }

    pub fn stages_of(&self, discipline: Discipline) -> Vec<usize> {
        self.iter()
            .filter(|(_, p)| p.primary_discipline() == discipline)
            .map(|(n, _)| n)
            .collect()
    }
}

// Deserialized values go through the same checks as constructed ones.
impl<'de> Deserialize<'de> for StageProfile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Fields {
            weights: [f64; Discipline::COUNT],
        }

        let fields = Fields::deserialize(deserializer)?;
        let parts: Vec<(Discipline, f64)> = Discipline::iter()
            .zip(fields.weights)
            .filter(|&(_, w)| w != 0.0)
            .collect();
        Self::new(&parts).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for StageCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Fields {
            profiles: Vec<StageProfile>,
            defaults: Vec<StageProfile>,
        }

        let fields = Fields::deserialize(deserializer)?;
        if fields.defaults.len() != fields.profiles.len() {
            return Err(serde::de::Error::custom(format!(
                "{} stage profiles but {} defaults",
                fields.profiles.len(),
                fields.defaults.len()
            )));
        }
        let mut catalog = Self::new(fields.defaults).map_err(serde::de::Error::custom)?;
        catalog.profiles = fields.profiles;
        Ok(catalog)
    }
}

impl Default for StageCatalog {
    fn default() -> Self {
        use Discipline::*;
        let table: [&[(Discipline, f64)]; DEFAULT_STAGE_COUNT] = [
            &[(Sprint, 1.0)],
            &[(Punch, 0.8), (Sprint, 0.2)],
            &[(Sprint, 1.0)],
            &[(Punch, 0.7), (Sprint, 0.3)],
            &[(Itt, 1.0)],
            &[(Punch, 0.6), (BreakAway, 0.3), (Mountain, 0.1)],
            &[(Punch, 0.7), (Mountain, 0.3)],
            &[(Sprint, 0.9), (Punch, 0.1)],
            &[(Sprint, 1.0)],
            &[(Mountain, 0.5), (BreakAway, 0.5)],
            &[(BreakAway, 0.2), (Sprint, 0.2), (Punch, 0.6)],
            &[(Mountain, 1.0)],
            &[(Itt, 0.2), (Mountain, 0.8)],
            &[(Mountain, 0.8), (BreakAway, 0.2)],
            &[(BreakAway, 0.8), (Sprint, 0.2)],
            &[(Mountain, 1.0)],
            &[(BreakAway, 0.4), (Sprint, 0.6)],
            &[(Mountain, 1.0)],
            &[(Mountain, 1.0)],
            &[(BreakAway, 0.8), (Sprint, 0.2)],
            &[(Sprint, 0.6), (Punch, 0.4)],
        ];

        let profiles: Vec<StageProfile> = table
            .iter()
            .map(|parts| {
                let mut weights = [0.0; Discipline::COUNT];
                for &(d, w) in parts.iter() {
                    weights[d.index()] = w;
                }
                StageProfile { weights }
            })
            .collect();

        Self {
            defaults: profiles.clone(),
            profiles,
        }
    }
}
