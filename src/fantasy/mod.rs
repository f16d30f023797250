pub mod scoring;
pub mod slots;
pub mod tables;
pub mod team;

pub use self::scoring::{field_points, FantasyScore, FantasyScoringEngine, RiderScore};
pub use self::slots::{Replacement, SlotBoard, SlotState};
pub use self::tables::PointTables;
pub use self::team::TeamSelection;

/// Riders in a fantasy team.
pub const TEAM_SIZE: usize = 20;
/// Leading slots that earn stage points.
pub const SCORING_SLOTS: usize = 15;
/// Leading scoring slots that also earn the top-10 bonus.
pub const BONUS_SLOTS: usize = 5;
