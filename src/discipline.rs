use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter, EnumString};

/// Terrain categories a stage can be made of.
#[derive(
    Debug,
    Clone,
    Copy,
    EnumIter,
    EnumString,
    EnumCount,
    Display,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    Sprint,
    Punch,
    Itt,
    Mountain,
    Hills,
    BreakAway,
}

const MAJOR_TABLE: [u32; 10] = [50, 45, 40, 35, 30, 25, 20, 15, 10, 5];
const MINOR_TABLE: [u32; 10] = [20, 18, 16, 14, 12, 10, 8, 6, 4, 2];
const INTERMEDIATE_TABLE: [u32; 10] = [10, 8, 7, 6, 5, 4, 3, 2, 1, 0];

impl Discipline {
    /// Stable slot used to index per-discipline arrays.
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            Self::Sprint => 0,
            Self::Punch => 1,
            Self::Itt => 2,
            Self::Mountain => 3,
            Self::Hills => 4,
            Self::BreakAway => 5,
        }
    }

    /// Seconds lost per finishing place on a stage of this kind.
    pub fn seconds_per_place(self) -> f64 {
        match self {
            Self::Sprint => 0.1,
            Self::Punch => 0.2,
            Self::Itt => 5.0,
            Self::Mountain => 20.0,
            Self::Hills | Self::BreakAway => 1.0,
        }
    }

    /// Points-classification table, indexed by rank - 1.
    pub fn sprint_table(self) -> Option<&'static [u32; 10]> {
        match self {
            Self::Sprint => Some(&MAJOR_TABLE),
            Self::Punch => Some(&MINOR_TABLE),
            Self::Hills | Self::BreakAway => Some(&INTERMEDIATE_TABLE),
            Self::Itt | Self::Mountain => None,
        }
    }

    /// Mountains-classification table, indexed by rank - 1.
    pub fn mountain_table(self) -> Option<&'static [u32; 10]> {
        match self {
            Self::Mountain => Some(&MAJOR_TABLE),
            Self::Hills | Self::BreakAway => Some(&MINOR_TABLE),
            Self::Punch => Some(&INTERMEDIATE_TABLE),
            Self::Sprint | Self::Itt => None,
        }
    }
}
