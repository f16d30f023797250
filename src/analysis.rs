use crate::classification::Classification;
use crate::error::PtResult;
use crate::fantasy::{field_points, FantasyScore, PointTables, TeamSelection};
use crate::race::{RaceOutcome, RaceSimulator};
use crate::riders::{RiderDatabase, RiderId};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

/// Receives updates while a batch of races runs. Called from worker threads.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_progress(&self, _completed: usize, _total: usize) {}
}

/// Integer sums for one rider across races. Every field merges by plain
/// addition, so any merge order gives the same aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiderAggregate {
    pub races: u64,
    pub starts: u64,
    pub finishes: u64,
    pub points: u64,
    pub points_sq: u64,
    pub finished_points: u64,
    pub stage_wins: u64,
    pub top_tens: u64,
    pub gc_rank_sum: u64,
}

impl RiderAggregate {
    pub fn merge(&mut self, other: &Self) {
        self.races += other.races;
        self.starts += other.starts;
        self.finishes += other.finishes;
        self.points += other.points;
        self.points_sq += other.points_sq;
        self.finished_points += other.finished_points;
        self.stage_wins += other.stage_wins;
        self.top_tens += other.top_tens;
        self.gc_rank_sum += other.gc_rank_sum;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TeamAggregate {
    pub races: u64,
    pub points: u64,
    pub points_sq: u64,
    pub min: u32,
    pub max: u32,
    pub abandonments: u64,
}

impl Default for TeamAggregate {
    fn default() -> Self {
        Self {
            races: 0,
            points: 0,
            points_sq: 0,
            min: u32::MAX,
            max: 0,
            abandonments: 0,
        }
    }
}

impl TeamAggregate {
    fn from_score(score: &FantasyScore) -> Self {
        let total = score.team_total;
        Self {
            races: 1,
            points: total as u64,
            points_sq: (total as u64) * (total as u64),
            min: total,
            max: total,
            abandonments: score.replacements.len() as u64,
        }
    }

    pub fn merge(&mut self, other: &Self) {
        self.races += other.races;
        self.points += other.points;
        self.points_sq += other.points_sq;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.abandonments += other.abandonments;
    }

    pub fn summary(&self) -> Option<TeamSummary> {
        if self.races == 0 {
            return None;
        }
        let (mean, variance) = moments(self.points, self.points_sq, self.races);
        Some(TeamSummary {
            races: self.races,
            mean,
            std_dev: variance.sqrt(),
            min: self.min,
            max: self.max,
            mean_abandonments: self.abandonments as f64 / self.races as f64,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub races: u64,
    pub mean: f64,
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
    pub mean_abandonments: f64,
}

/// Expected-value view of one rider, the input a team optimizer consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiderProjection {
    pub rider: RiderId,
    pub name: String,
    pub team: String,
    pub mean: f64,
    pub variance: f64,
    pub finish_rate: f64,
    pub mean_if_finished: f64,
    pub stage_wins: f64,
    pub mean_gc_rank: Option<f64>,
}

/// Sums over any number of races.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub riders: Vec<RiderAggregate>,
    pub team: TeamAggregate,
}

impl Aggregate {
    pub fn empty(rider_count: usize) -> Self {
        Self {
            riders: vec![RiderAggregate::default(); rider_count],
            team: TeamAggregate::default(),
        }
    }

    pub fn from_race(
        race: &RaceOutcome,
        score: Option<&FantasyScore>,
        tables: &PointTables,
        rider_count: usize,
    ) -> Self {
        let mut agg = Self::empty(rider_count);
        let points = field_points(&race.stages, tables, rider_count);

        for (id, entry) in agg.riders.iter_mut().enumerate() {
            let p = points[id] as u64;
            entry.races = 1;
            entry.points = p;
            entry.points_sq = p * p;
        }

        if let Some(first) = race.stages.first() {
            for result in &first.results {
                agg.riders[result.rider].starts = 1;
            }
        }

        for outcome in &race.stages {
            if let Some(winner) = outcome.winner() {
                agg.riders[winner].stage_wins += 1;
            }
            for result in outcome.finishers() {
                if result.rank.is_some_and(|r| r <= 10) {
                    agg.riders[result.rider].top_tens += 1;
                }
            }
        }

        for (pos, (rider, _)) in race
            .final_ranking(Classification::General)
            .into_iter()
            .enumerate()
        {
            let entry = &mut agg.riders[rider];
            entry.finishes = 1;
            entry.finished_points = entry.points;
            entry.gc_rank_sum = pos as u64 + 1;
        }

        if let Some(score) = score {
            agg.team = TeamAggregate::from_score(score);
        }
        agg
    }

    pub fn merge(mut self, other: Self) -> Self {
        for (mine, theirs) in self.riders.iter_mut().zip(other.riders.iter()) {
            mine.merge(theirs);
        }
        self.team.merge(&other.team);
        self
    }

    /// Per-rider projections, best expected points first (ties by name).
    pub fn projections(&self, db: &RiderDatabase) -> Vec<RiderProjection> {
        let mut out: Vec<RiderProjection> = self
            .riders
            .iter()
            .enumerate()
            .filter(|(id, _)| *id < db.len())
            .map(|(id, agg)| {
                let rider = db.rider(id);
                let (mean, variance) = moments(agg.points, agg.points_sq, agg.races);
                let per_race = |v: u64| {
                    if agg.races == 0 {
                        0.0
                    } else {
                        v as f64 / agg.races as f64
                    }
                };
                RiderProjection {
                    rider: id,
                    name: rider.name.clone(),
                    team: rider.team.clone(),
                    mean,
                    variance,
                    finish_rate: per_race(agg.finishes),
                    mean_if_finished: if agg.finishes == 0 {
                        0.0
                    } else {
                        agg.finished_points as f64 / agg.finishes as f64
                    },
                    stage_wins: per_race(agg.stage_wins),
                    mean_gc_rank: (agg.finishes > 0)
                        .then(|| agg.gc_rank_sum as f64 / agg.finishes as f64),
                }
            })
            .collect();

        out.sort_by(|a, b| b.mean.total_cmp(&a.mean).then_with(|| a.name.cmp(&b.name)));
        out
    }

    pub fn team_summary(&self) -> Option<TeamSummary> {
        self.team.summary()
    }
}

fn moments(sum: u64, sum_sq: u64, n: u64) -> (f64, f64) {
    if n == 0 {
        return (0.0, 0.0);
    }
    let n = n as f64;
    let mean = sum as f64 / n;
    let variance = (sum_sq as f64 / n - mean * mean).max(0.0);
    (mean, variance)
}

/// Many independent races over one simulator. Race `i` uses seed
/// `base_seed + i`, so results do not depend on thread scheduling.
pub struct MonteCarlo {
    simulator: Arc<RaceSimulator>,
    runs: usize,
}

impl MonteCarlo {
    pub fn new(simulator: Arc<RaceSimulator>, runs: usize) -> Self {
        Self { simulator, runs }
    }

    pub fn run(
        &self,
        base_seed: u64,
        team: Option<&TeamSelection>,
        callback: &dyn ProgressCallback,
    ) -> PtResult<Aggregate> {
        if let Some(team) = team {
            self.simulator.check_team(team)?;
        }

        let rider_count = self.simulator.riders().len();
        let tables = self.simulator.points();
        let completed = AtomicUsize::new(0);
        let total = self.runs;

        info!("Simulating {} races from seed {}", total, base_seed);

        let aggregate = (0..total)
            .into_par_iter()
            .map(|i| {
                let seed = base_seed.wrapping_add(i as u64);
                let (race, score) = self.simulator.simulate(seed, team);
                let agg = Aggregate::from_race(&race, score.as_ref(), tables, rider_count);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                callback.on_progress(done, total);
                agg
            })
            .reduce(|| Aggregate::empty(rider_count), Aggregate::merge);

        info!("Finished {} races", total);
        Ok(aggregate)
    }
}
