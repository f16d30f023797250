use crate::abandonment::AbandonmentModel;
use crate::classification::{Classification, ClassificationTracker};
use crate::config::Config;
use crate::error::{PelotonError, PtResult};
use crate::fantasy::{FantasyScore, FantasyScoringEngine, PointTables, TeamSelection};
use crate::generator;
use crate::riders::{AbilityProfile, RiderDatabase, RiderId};
use crate::stages::{StageCatalog, StageProfile};
use fastrand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResult {
    pub rider: RiderId,
    /// Continuous sampled finishing position.
    pub position: f64,
    /// 1-based place among every rider who took the stage start, riders
    /// who abandoned during it included.
    pub rank: Option<usize>,
    /// Seconds behind the fastest rider on the stage.
    pub time_gap: Option<f64>,
    pub abandoned: bool,
}

/// Results of one stage in rank order. Riders who abandoned during the stage
/// keep the place they were on when they left.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutcome {
    pub stage: usize,
    pub profile: StageProfile,
    pub results: Vec<StageResult>,
}

impl StageOutcome {
    /// Best-placed rider who reached the finish.
    pub fn winner(&self) -> Option<RiderId> {
        self.finishers().next().map(|r| r.rider)
    }

    pub fn result_of(&self, rider: RiderId) -> Option<&StageResult> {
        self.results.iter().find(|r| r.rider == rider)
    }

    pub fn rank_of(&self, rider: RiderId) -> Option<usize> {
        self.result_of(rider).and_then(|r| r.rank)
    }

    pub fn finishers(&self) -> impl Iterator<Item = &StageResult> {
        self.results.iter().filter(|r| !r.abandoned)
    }

    pub fn abandoned(&self) -> impl Iterator<Item = &StageResult> {
        self.results.iter().filter(|r| r.abandoned)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WithdrawalKind {
    NonStarter,
    Stage(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Withdrawal {
    pub rider: RiderId,
    pub kind: WithdrawalKind,
}

#[derive(Debug, Clone)]
pub struct RaceOutcome {
    pub seed: u64,
    pub stages: Vec<StageOutcome>,
    pub classifications: ClassificationTracker,
    pub withdrawals: Vec<Withdrawal>,
}

impl RaceOutcome {
    pub fn stage(&self, stage: usize) -> Option<&StageOutcome> {
        stage.checked_sub(1).and_then(|i| self.stages.get(i))
    }

    pub fn stage_winner(&self, stage: usize) -> Option<RiderId> {
        self.stage(stage).and_then(StageOutcome::winner)
    }

    /// Riders who reached the finish, in final general classification order.
    pub fn finishers(&self) -> Vec<RiderId> {
        self.classifications
            .ranking(Classification::General)
            .into_iter()
            .map(|(rider, _)| rider)
            .collect()
    }

    pub fn is_finisher(&self, rider: RiderId) -> bool {
        self.classifications
            .is_active(Classification::General, rider)
    }

    pub fn final_ranking(&self, class: Classification) -> Vec<(RiderId, f64)> {
        self.classifications.ranking(class)
    }
}

/// Runs whole races over a shared rider and route snapshot.
pub struct RaceSimulator {
    riders: Arc<RiderDatabase>,
    catalog: Arc<StageCatalog>,
    profiles: Vec<AbilityProfile>,
    abandonment: AbandonmentModel,
    youth_age_limit: u8,
    points: PointTables,
}

impl RaceSimulator {
    pub fn new(
        riders: Arc<RiderDatabase>,
        catalog: Arc<StageCatalog>,
        config: &Config,
    ) -> PtResult<Self> {
        if riders.is_empty() {
            return Err(PelotonError::Validation(
                "cannot race without riders".to_string(),
            ));
        }
        config.race.validate()?;
        let tiers = config.tiers.table()?;
        let points = config.points.tables()?;

        for &stage in points.special_stages() {
            if stage > catalog.len() {
                warn!(
                    "Special stage {} is beyond the {}-stage route and will never score",
                    stage,
                    catalog.len()
                );
            }
        }

        let profiles = riders
            .riders()
            .iter()
            .map(|r| AbilityProfile::new(&r.abilities, &tiers))
            .collect();

        Ok(Self {
            abandonment: AbandonmentModel::new(catalog.len(), config.race.abandon_scale),
            youth_age_limit: config.race.youth_age_limit,
            riders,
            catalog,
            profiles,
            points,
        })
    }

    pub fn riders(&self) -> &Arc<RiderDatabase> {
        &self.riders
    }

    pub fn catalog(&self) -> &Arc<StageCatalog> {
        &self.catalog
    }

    pub fn points(&self) -> &PointTables {
        &self.points
    }

    pub fn run(&self, seed: u64) -> RaceOutcome {
        self.simulate(seed, None).0
    }

    /// Runs a race with the team scored stage by stage.
    pub fn run_with_team(
        &self,
        team: &TeamSelection,
        seed: u64,
    ) -> PtResult<(RaceOutcome, FantasyScore)> {
        self.check_team(team)?;
        let (outcome, score) = self.simulate(seed, Some(team));
        let score = score.ok_or_else(|| {
            PelotonError::InvalidTeam("team was not scored".to_string())
        })?;
        Ok((outcome, score))
    }

    /// Rejects a team picked against a different rider snapshot.
    pub fn check_team(&self, team: &TeamSelection) -> PtResult<()> {
        if team.matches(&self.riders) {
            Ok(())
        } else {
            Err(PelotonError::InvalidTeam(
                "team was selected from a different rider list".to_string(),
            ))
        }
    }

    /// One race. Draw order is fixed: riders in database order, a position
    /// draw then an abandonment draw for each rider still racing.
    pub(crate) fn simulate(
        &self,
        seed: u64,
        team: Option<&TeamSelection>,
    ) -> (RaceOutcome, Option<FantasyScore>) {
        let mut rng = Rng::with_seed(seed);
        let mut tracker = ClassificationTracker::new(&self.riders, self.youth_age_limit);
        let mut engine = team.map(|t| FantasyScoringEngine::new(t, self.points.clone()));

        let mut racing: Vec<bool> = Vec::with_capacity(self.riders.len());
        let mut withdrawals = Vec::new();
        for (id, rider) in self.riders.iter() {
            let starts = !rider.is_non_starter();
            if !starts {
                withdrawals.push(Withdrawal {
                    rider: id,
                    kind: WithdrawalKind::NonStarter,
                });
            }
            racing.push(starts);
        }

        debug!(
            "Race start: {} riders, {} stages, seed {}",
            racing.iter().filter(|&&r| r).count(),
            self.catalog.len(),
            seed
        );

        let mut stages = Vec::with_capacity(self.catalog.len());
        for (stage, profile) in self.catalog.iter() {
            let mut results = Vec::new();
            for (id, rider) in self.riders.iter() {
                if !racing[id] {
                    continue;
                }
                let position = generator::sample(&self.profiles[id], profile, &mut rng);
                let abandoned = self.abandonment.decide(rider, stage, &mut rng);
                results.push(StageResult {
                    rider: id,
                    position,
                    rank: None,
                    time_gap: None,
                    abandoned,
                });
            }

            results.sort_by(|a, b| a.position.total_cmp(&b.position));

            let per_place = profile.seconds_per_place();
            for (i, result) in results.iter_mut().enumerate() {
                result.rank = Some(i + 1);
                result.time_gap = Some(i as f64 * per_place);
            }
            for result in results.iter().filter(|r| r.abandoned) {
                racing[result.rider] = false;
                withdrawals.push(Withdrawal {
                    rider: result.rider,
                    kind: WithdrawalKind::Stage(stage),
                });
                debug!(
                    "Stage {}: {} abandons",
                    stage,
                    self.riders.rider(result.rider).name
                );
            }

            let outcome = StageOutcome {
                stage,
                profile: *profile,
                results,
            };
            tracker.apply_stage(&outcome);
            if let Some(engine) = engine.as_mut() {
                engine.apply_stage(&outcome);
            }
            if let Some(winner) = outcome.winner() {
                debug!("Stage {} won by {}", stage, self.riders.rider(winner).name);
            }
            stages.push(outcome);
        }

        let outcome = RaceOutcome {
            seed,
            stages,
            classifications: tracker,
            withdrawals,
        };
        debug!(
            "Race finished: {} finishers, {} withdrawals",
            outcome.finishers().len(),
            outcome.withdrawals.len()
        );
        (outcome, engine.map(FantasyScoringEngine::finish))
    }
}
