use crate::riders::Rider;
use fastrand::Rng;
use tracing::trace;

/// Independent per-stage crash/abandon trials.
///
/// A rider's `abandon_chance` is a whole-race probability; it is spread evenly
/// over the stages so that surviving every stage at the base scale reproduces
/// it. `scale` multiplies the per-stage figure and never compounds.
#[derive(Debug, Clone, Copy)]
pub struct AbandonmentModel {
    stage_count: usize,
    scale: f64,
}

impl AbandonmentModel {
    pub fn new(stage_count: usize, scale: f64) -> Self {
        Self {
            stage_count: stage_count.max(1),
            scale,
        }
    }

    pub fn stage_probability(&self, rider: &Rider) -> f64 {
        let chance = rider.abandon_chance;
        if chance <= 0.0 {
            return 0.0;
        }
        if chance >= 1.0 {
            return 1.0;
        }
        let per_stage = 1.0 - (1.0 - chance).powf(1.0 / self.stage_count as f64);
        (per_stage * self.scale).clamp(0.0, 1.0)
    }

    /// One Bernoulli trial. Always consumes exactly one draw so the random
    /// stream does not depend on the rider's chance.
    pub fn decide(&self, rider: &Rider, stage: usize, rng: &mut Rng) -> bool {
        let roll = rng.f64();
        let abandoned = roll < self.stage_probability(rider);
        if abandoned {
            trace!(rider = %rider.name, stage, roll, "abandon roll hit");
        }
        abandoned
    }
}
