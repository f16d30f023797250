use super::BONUS_SLOTS;
use crate::error::{PelotonError, PtResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Rank -> points lookups for fantasy scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointTables {
    regular: [u32; 10],
    special: [u32; 10],
    special_stages: Vec<usize>,
    bonus: [u32; BONUS_SLOTS],
}

impl PointTables {
    /// Every table must be non-increasing by rank.
    pub fn new(
        regular: [u32; 10],
        special: [u32; 10],
        mut special_stages: Vec<usize>,
        bonus: [u32; BONUS_SLOTS],
    ) -> PtResult<Self> {
        check_ordered("regular_points", &regular)?;
        check_ordered("special_points", &special)?;
        check_ordered("bonus_points", &bonus)?;
        if special_stages.contains(&0) {
            return Err(PelotonError::Config(
                "special_stages are numbered from 1".to_string(),
            ));
        }
        special_stages.sort_unstable();
        special_stages.dedup();
        Ok(Self {
            regular,
            special,
            special_stages,
            bonus,
        })
    }

    pub fn is_special(&self, stage: usize) -> bool {
        self.special_stages.binary_search(&stage).is_ok()
    }

    pub fn special_stages(&self) -> &[usize] {
        &self.special_stages
    }

    /// Points for finishing `rank` (1-based) on `stage`. Outside the top 10
    /// there is nothing.
    pub fn stage_points(&self, stage: usize, rank: usize) -> u32 {
        let table = if self.is_special(stage) {
            &self.special
        } else {
            &self.regular
        };
        rank.checked_sub(1)
            .and_then(|i| table.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Flat bonus for bonus position `position` (1-based).
    pub fn bonus(&self, position: usize) -> u32 {
        position
            .checked_sub(1)
            .and_then(|i| self.bonus.get(i))
            .copied()
            .unwrap_or(0)
    }
}

impl<'de> Deserialize<'de> for PointTables {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Fields {
            regular: [u32; 10],
            special: [u32; 10],
            special_stages: Vec<usize>,
            bonus: [u32; BONUS_SLOTS],
        }

        let f = Fields::deserialize(deserializer)?;
        Self::new(f.regular, f.special, f.special_stages, f.bonus)
            .map_err(serde::de::Error::custom)
    }
}

impl Default for PointTables {
    fn default() -> Self {
        Self {
            regular: [20, 15, 12, 9, 7, 5, 4, 3, 2, 1],
            special: [30, 20, 15, 12, 10, 8, 6, 4, 2, 1],
            special_stages: vec![5, 13, 14, 17, 18],
            bonus: [5, 4, 3, 2, 1],
        }
    }
}

fn check_ordered(name: &str, values: &[u32]) -> PtResult<()> {
    if values.windows(2).any(|w| w[0] < w[1]) {
        return Err(PelotonError::Config(format!(
            "{} must not increase with rank: {:?}",
            name, values
        )));
    }
    Ok(())
}
