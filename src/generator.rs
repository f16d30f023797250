use crate::discipline::Discipline;
use crate::error::{PelotonError, PtResult};
use crate::riders::AbilityProfile;
use crate::stages::StageProfile;
use fastrand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use strum::IntoEnumIterator;

/// Triangular distribution over finishing position.
/// Lower is better: `min` is the best plausible place, `max` the worst.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Triangle {
    pub min: f64,
    pub mode: f64,
    pub max: f64,
}

impl Triangle {
    pub fn new(min: f64, mode: f64, max: f64) -> PtResult<Self> {
        if !(min.is_finite() && mode.is_finite() && max.is_finite()) {
            return Err(PelotonError::Validation(
                "triangle parameters must be finite".to_string(),
            ));
        }
        if !(min <= mode && mode <= max) {
            return Err(PelotonError::Validation(format!(
                "triangle requires min <= mode <= max, got ({}, {}, {})",
                min, mode, max
            )));
        }
        Ok(Self { min, mode, max })
    }

    /// Inverse-CDF draw. Consumes exactly one uniform from `rng`.
    pub fn sample(&self, rng: &mut Rng) -> f64 {
        let u = rng.f64();
        self.quantile(u)
    }

    /// Position at cumulative probability `u` in [0, 1).
    pub fn quantile(&self, u: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return self.min;
        }
        let left = self.mode - self.min;
        let cut = left / span;
        if u < cut {
            self.min + (u * span * left).sqrt()
        } else {
            self.max - ((1.0 - u) * span * (self.max - self.mode)).sqrt()
        }
    }

    pub fn mean(&self) -> f64 {
        (self.min + self.mode + self.max) / 3.0
    }
}

impl<'de> Deserialize<'de> for Triangle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Fields {
            min: f64,
            mode: f64,
            max: f64,
        }

        let f = Fields::deserialize(deserializer)?;
        Self::new(f.min, f.mode, f.max).map_err(serde::de::Error::custom)
    }
}

/// Linear blend of the rider's per-discipline triples by stage weight.
///
/// This mixes distribution parameters rather than sampled outcomes, so a
/// mixed stage is still a single triangular draw. A convex combination of
/// ordered triples stays ordered, which keeps `min <= mode <= max`.
pub fn blend(ability: &AbilityProfile, stage: &StageProfile) -> Triangle {
    let mut min = 0.0;
    let mut mode = 0.0;
    let mut max = 0.0;

    for discipline in Discipline::iter() {
        let w = stage.weight(discipline);
        if w == 0.0 {
            continue;
        }
        let t = ability.triple(discipline);
        min += w * t.min;
        mode += w * t.mode;
        max += w * t.max;
    }

    // Rounding can push a collapsed bound a hair past its neighbour.
    let mode = mode.clamp(min, max.max(min));
    Triangle {
        min,
        mode,
        max: max.max(mode),
    }
}

/// One continuous finishing position for one rider on one stage.
pub fn sample(ability: &AbilityProfile, stage: &StageProfile, rng: &mut Rng) -> f64 {
    blend(ability, stage).sample(rng)
}
