use super::{BONUS_SLOTS, SCORING_SLOTS, TEAM_SIZE};
use crate::error::{PelotonError, PtResult};
use crate::riders::{RiderDatabase, RiderId};
use serde::Serialize;
use std::collections::HashSet;

/// An ordered fantasy team: 15 scoring riders followed by 5 reserves.
/// The first five scoring riders are bonus-eligible, in bonus order.
///
/// Names are captured at selection time so a simulator can tell whether the
/// team was picked against its own rider snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamSelection {
    riders: Vec<RiderId>,
    names: Vec<String>,
}

impl TeamSelection {
    pub fn new<S: AsRef<str>>(names: &[S], db: &RiderDatabase) -> PtResult<Self> {
        if names.len() != TEAM_SIZE {
            return Err(PelotonError::InvalidTeam(format!(
                "a team needs exactly {} riders, got {}",
                TEAM_SIZE,
                names.len()
            )));
        }
        let ids = names
            .iter()
            .map(|n| db.id_of(n.as_ref().trim()))
            .collect::<PtResult<Vec<_>>>()?;
        Self::from_ids(ids, db)
    }

    pub fn from_ids(riders: Vec<RiderId>, db: &RiderDatabase) -> PtResult<Self> {
        if riders.len() != TEAM_SIZE {
            return Err(PelotonError::InvalidTeam(format!(
                "a team needs exactly {} riders, got {}",
                TEAM_SIZE,
                riders.len()
            )));
        }
        let mut seen = HashSet::with_capacity(TEAM_SIZE);
        for &id in &riders {
            if id >= db.len() {
                return Err(PelotonError::InvalidTeam(format!(
                    "rider id {} is not in the database",
                    id
                )));
            }
            if !seen.insert(id) {
                return Err(PelotonError::InvalidTeam(format!(
                    "'{}' is selected more than once",
                    db.rider(id).name
                )));
            }
        }
        let names = riders.iter().map(|&id| db.rider(id).name.clone()).collect();
        Ok(Self { riders, names })
    }

    pub fn riders(&self) -> &[RiderId] {
        &self.riders
    }

    pub fn scoring(&self) -> &[RiderId] {
        &self.riders[..SCORING_SLOTS]
    }

    pub fn reserves(&self) -> &[RiderId] {
        &self.riders[SCORING_SLOTS..]
    }

    pub fn bonus(&self) -> &[RiderId] {
        &self.riders[..BONUS_SLOTS]
    }

    pub fn contains(&self, rider: RiderId) -> bool {
        self.riders.contains(&rider)
    }

    /// Rider names in team order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether every pick still resolves to the same rider in `db`.
    pub fn matches(&self, db: &RiderDatabase) -> bool {
        self.riders
            .iter()
            .zip(&self.names)
            .all(|(&id, name)| db.riders().get(id).is_some_and(|r| &r.name == name))
    }
}
