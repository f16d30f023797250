use crate::discipline::Discipline;
use crate::race::StageOutcome;
use crate::riders::{RiderDatabase, RiderId};
use crate::stages::StageProfile;
use serde::Serialize;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

#[derive(
    Debug, Clone, Copy, EnumIter, EnumCountMacro, Display, PartialEq, Eq, Hash, Serialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum Classification {
    General,
    Sprint,
    Mountain,
    Youth,
}

impl Classification {
    /// Time ledgers rank ascending, points ledgers descending.
    pub fn lower_is_better(self) -> bool {
        match self {
            Self::General | Self::Youth => true,
            Self::Sprint | Self::Mountain => false,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::General => 0,
            Self::Sprint => 1,
            Self::Mountain => 2,
            Self::Youth => 3,
        }
    }
}

// Guards the float products below against landing a hair under an integer.
const POINT_EPSILON: f64 = 1e-9;

/// Classification points for `rank` on a mixed stage: each discipline's
/// table contribution is scaled by its weight and floored on its own.
pub fn weighted_points(
    profile: &StageProfile,
    rank: usize,
    table: fn(Discipline) -> Option<&'static [u32; 10]>,
) -> u32 {
    if rank == 0 || rank > 10 {
        return 0;
    }
    profile
        .parts()
        .filter_map(|(d, w)| table(d).map(|t| (w * t[rank - 1] as f64 + POINT_EPSILON).floor()))
        .sum::<f64>() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingEntry {
    pub rider: RiderId,
    pub total: f64,
    pub active: bool,
    /// Current rank while active, rank held at withdrawal afterwards.
    pub rank: Option<usize>,
}

#[derive(Debug, Clone, Default)]
struct Ledger {
    entries: Vec<StandingEntry>,
    slot_of: Vec<Option<usize>>,
}

impl Ledger {
    fn new(rider_count: usize) -> Self {
        Self {
            entries: Vec::new(),
            slot_of: vec![None; rider_count],
        }
    }

    fn register(&mut self, rider: RiderId) {
        if self.slot_of[rider].is_none() {
            self.slot_of[rider] = Some(self.entries.len());
            self.entries.push(StandingEntry {
                rider,
                total: 0.0,
                active: true,
                rank: None,
            });
        }
    }

    fn entry_mut(&mut self, rider: RiderId) -> Option<&mut StandingEntry> {
        match self.slot_of.get(rider).copied().flatten() {
            Some(slot) => Some(&mut self.entries[slot]),
            None => None,
        }
    }

    fn entry(&self, rider: RiderId) -> Option<&StandingEntry> {
        self.slot_of
            .get(rider)
            .copied()
            .flatten()
            .map(|slot| &self.entries[slot])
    }

    fn add(&mut self, rider: RiderId, amount: f64) {
        if let Some(e) = self.entry_mut(rider) {
            if e.active {
                e.total += amount;
            }
        }
    }

    fn freeze(&mut self, rider: RiderId) {
        if let Some(e) = self.entry_mut(rider) {
            e.active = false;
        }
    }

    /// Active entries in ranking order. The sort is stable over
    /// registration order, so the first-registered rider wins a tie.
    fn ordered_active(&self, lower_is_better: bool) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.entries.len())
            .filter(|&i| self.entries[i].active)
            .collect();
        order.sort_by(|&a, &b| {
            let (ta, tb) = (self.entries[a].total, self.entries[b].total);
            if lower_is_better {
                ta.total_cmp(&tb)
            } else {
                tb.total_cmp(&ta)
            }
        });
        order
    }

    fn rerank(&mut self, lower_is_better: bool) {
        let order = self.ordered_active(lower_is_better);
        for (pos, idx) in order.into_iter().enumerate() {
            self.entries[idx].rank = Some(pos + 1);
        }
    }
}

/// Leaders after one stage, kept for export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSnapshot {
    pub stage: usize,
    pub leaders: [Option<RiderId>; Classification::COUNT],
}

impl StageSnapshot {
    pub fn leader(&self, class: Classification) -> Option<RiderId> {
        self.leaders[class.index()]
    }
}

/// Race-long general, sprint, mountain and youth standings.
#[derive(Debug, Clone)]
pub struct ClassificationTracker {
    ledgers: [Ledger; Classification::COUNT],
    snapshots: Vec<StageSnapshot>,
}

impl ClassificationTracker {
    /// Registers every starter; youth only takes riders under `youth_age_limit`.
    pub fn new(riders: &RiderDatabase, youth_age_limit: u8) -> Self {
        let n = riders.len();
        let mut ledgers = [
            Ledger::new(n),
            Ledger::new(n),
            Ledger::new(n),
            Ledger::new(n),
        ];
        for (id, rider) in riders.iter() {
            if rider.is_non_starter() {
                continue;
            }
            for class in Classification::iter() {
                if class == Classification::Youth && !rider.is_youth(youth_age_limit) {
                    continue;
                }
                ledgers[class.index()].register(id);
            }
        }
        let mut tracker = Self {
            ledgers,
            snapshots: Vec::new(),
        };
        tracker.rerank_all();
        tracker
    }

    /// Folds one stage in. Riders who abandoned during the stage are frozen
    /// before anything is credited, so their totals stop at the previous stage.
    /// Finishers are credited at their full-field rank.
    pub fn apply_stage(&mut self, outcome: &StageOutcome) {
        for result in outcome.results.iter().filter(|r| r.abandoned) {
            for ledger in self.ledgers.iter_mut() {
                ledger.freeze(result.rider);
            }
        }

        for result in outcome.finishers() {
            let (Some(rank), Some(gap)) = (result.rank, result.time_gap) else {
                continue;
            };
            let sprint = weighted_points(&outcome.profile, rank, Discipline::sprint_table);
            let mountain = weighted_points(&outcome.profile, rank, Discipline::mountain_table);

            self.ledger_mut(Classification::General).add(result.rider, gap);
            self.ledger_mut(Classification::Youth).add(result.rider, gap);
            self.ledger_mut(Classification::Sprint)
                .add(result.rider, sprint as f64);
            self.ledger_mut(Classification::Mountain)
                .add(result.rider, mountain as f64);
        }

        self.rerank_all();

        let mut leaders = [None; Classification::COUNT];
        for class in Classification::iter() {
            leaders[class.index()] = self.leader(class);
        }
        self.snapshots.push(StageSnapshot {
            stage: outcome.stage,
            leaders,
        });
    }

    fn ledger(&self, class: Classification) -> &Ledger {
        &self.ledgers[class.index()]
    }

    fn ledger_mut(&mut self, class: Classification) -> &mut Ledger {
        &mut self.ledgers[class.index()]
    }

    fn rerank_all(&mut self) {
        for class in Classification::iter() {
            self.ledger_mut(class).rerank(class.lower_is_better());
        }
    }

    /// Active riders only, best first.
    pub fn ranking(&self, class: Classification) -> Vec<(RiderId, f64)> {
        let ledger = self.ledger(class);
        ledger
            .ordered_active(class.lower_is_better())
            .into_iter()
            .map(|i| (ledger.entries[i].rider, ledger.entries[i].total))
            .collect()
    }

    /// Every entry: active riders in rank order, then withdrawn riders by
    /// the rank they held when they left.
    pub fn standings(&self, class: Classification) -> Vec<StandingEntry> {
        let ledger = self.ledger(class);
        let mut active: Vec<StandingEntry> = ledger
            .ordered_active(class.lower_is_better())
            .into_iter()
            .map(|i| ledger.entries[i].clone())
            .collect();
        let mut frozen: Vec<StandingEntry> = ledger
            .entries
            .iter()
            .filter(|e| !e.active)
            .cloned()
            .collect();
        frozen.sort_by_key(|e| e.rank.unwrap_or(usize::MAX));
        active.extend(frozen);
        active
    }

    pub fn leader(&self, class: Classification) -> Option<RiderId> {
        let ledger = self.ledger(class);
        ledger
            .ordered_active(class.lower_is_better())
            .first()
            .map(|&i| ledger.entries[i].rider)
    }

    pub fn total(&self, class: Classification, rider: RiderId) -> Option<f64> {
        self.ledger(class).entry(rider).map(|e| e.total)
    }

    pub fn rank(&self, class: Classification, rider: RiderId) -> Option<usize> {
        self.ledger(class).entry(rider).and_then(|e| e.rank)
    }

    pub fn is_active(&self, class: Classification, rider: RiderId) -> bool {
        self.ledger(class).entry(rider).is_some_and(|e| e.active)
    }

    pub fn entry_count(&self, class: Classification) -> usize {
        self.ledger(class).entries.len()
    }

    pub fn snapshots(&self) -> &[StageSnapshot] {
        &self.snapshots
    }
}
