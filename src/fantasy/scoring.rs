use super::{PointTables, Replacement, SlotBoard, TeamSelection, SCORING_SLOTS};
use crate::race::StageOutcome;
use crate::riders::RiderId;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiderScore {
    pub rider: RiderId,
    pub stage_points: u32,
    pub bonus_points: u32,
    /// Stages in which the rider held a scoring slot and finished.
    pub stages_scored: u32,
}

impl RiderScore {
    pub fn total(&self) -> u32 {
        self.stage_points + self.bonus_points
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FantasyScore {
    pub team_total: u32,
    /// Points earned in each logical scoring slot, whoever held it.
    pub slot_totals: Vec<u32>,
    /// One entry per team member, in team order.
    pub riders: Vec<RiderScore>,
    pub stage_totals: Vec<u32>,
    pub replacements: Vec<Replacement>,
}

impl FantasyScore {
    pub fn rider(&self, rider: RiderId) -> Option<&RiderScore> {
        self.riders.iter().find(|r| r.rider == rider)
    }
}

/// Stage-by-stage fantasy scorer. Feed it stages in order, either inline
/// while a race runs or afterwards from recorded outcomes.
#[derive(Debug, Clone)]
pub struct FantasyScoringEngine {
    tables: PointTables,
    board: SlotBoard,
    riders: Vec<RiderScore>,
    slot_totals: Vec<u32>,
    stage_totals: Vec<u32>,
}

impl FantasyScoringEngine {
    pub fn new(team: &TeamSelection, tables: PointTables) -> Self {
        let riders = team
            .riders()
            .iter()
            .map(|&rider| RiderScore {
                rider,
                stage_points: 0,
                bonus_points: 0,
                stages_scored: 0,
            })
            .collect();
        Self {
            tables,
            board: SlotBoard::new(team),
            riders,
            slot_totals: vec![0; SCORING_SLOTS],
            stage_totals: Vec::new(),
        }
    }

    pub fn board(&self) -> &SlotBoard {
        &self.board
    }

    /// Scores one stage.
    ///
    /// Team riders missing from the stage altogether never started it, so
    /// their slots are closed up before anything is scored. Riders flagged as
    /// abandoning during the stage earn nothing for it and are promoted out
    /// at the boundary, so the new arrangement scores from the next stage.
    pub fn apply_stage(&mut self, outcome: &StageOutcome) {
        let stage = outcome.stage;

        let absent: Vec<RiderId> = self
            .board
            .active_riders()
            .filter(|&r| outcome.result_of(r).is_none())
            .collect();
        for rider in absent {
            self.board.mark_abandoned(rider);
        }
        self.board.promote(stage);

        let mut stage_total = 0;
        let scoring: Vec<(usize, RiderId)> = self.board.scoring_slots().collect();
        for (slot, rider) in scoring {
            let Some(rank) = outcome
                .result_of(rider)
                .filter(|r| !r.abandoned)
                .and_then(|r| r.rank)
            else {
                continue;
            };
            let points = self.tables.stage_points(stage, rank);
            let bonus = match self.board.bonus_slot_of(rider) {
                Some(position) if rank <= 10 => self.tables.bonus(position),
                _ => 0,
            };

            if let Some(score) = self.riders.iter_mut().find(|s| s.rider == rider) {
                score.stage_points += points;
                score.bonus_points += bonus;
                score.stages_scored += 1;
            }
            self.slot_totals[slot] += points + bonus;
            stage_total += points + bonus;
        }
        self.stage_totals.push(stage_total);

        for result in outcome.abandoned() {
            self.board.mark_abandoned(result.rider);
        }
        if self.board.has_vacancies() {
            self.board.promote(stage + 1);
            debug!(
                "Stage {}: team down to {} scoring riders",
                stage,
                self.board.active_scoring_count()
            );
        }
    }

    pub fn finish(self) -> FantasyScore {
        FantasyScore {
            team_total: self.slot_totals.iter().sum(),
            slot_totals: self.slot_totals,
            riders: self.riders,
            stage_totals: self.stage_totals,
            replacements: self.board.replacement_history().to_vec(),
        }
    }

    /// Post-pass over recorded stages. Gives the same answer as feeding the
    /// stages inline.
    pub fn score(team: &TeamSelection, tables: &PointTables, stages: &[StageOutcome]) -> FantasyScore {
        let mut engine = Self::new(team, tables.clone());
        for outcome in stages {
            engine.apply_stage(outcome);
        }
        engine.finish()
    }
}

/// Stage points every rider would earn from a scoring slot over the given
/// stages, indexed by rider id. Bonus points are left out, and so is the
/// stage a rider abandons in.
pub fn field_points(stages: &[StageOutcome], tables: &PointTables, rider_count: usize) -> Vec<u32> {
    let mut points = vec![0; rider_count];
    for outcome in stages {
        for result in outcome.finishers() {
            if let (Some(rank), Some(p)) = (result.rank, points.get_mut(result.rider)) {
                *p += tables.stage_points(outcome.stage, rank);
            }
        }
    }
    points
}
