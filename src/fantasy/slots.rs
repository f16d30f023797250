use super::{TeamSelection, BONUS_SLOTS, SCORING_SLOTS, TEAM_SIZE};
use crate::riders::RiderId;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotState {
    /// Held by the rider who was there last stage.
    Active,
    /// Occupant abandoned; waiting for the stage-boundary promotion.
    Vacated,
    /// Occupant changed at the last promotion.
    Reassigned,
    /// No rider left to move in. Scores nothing.
    Unfilled,
}

#[derive(Debug, Clone, Copy)]
struct RiderRecord {
    rider: RiderId,
    abandoned: bool,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    state: SlotState,
    occupant: Option<usize>,
}

/// One slot vacated by an abandonment and how the promotion resolved it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    /// First stage the new arrangement scores.
    pub effective_stage: usize,
    pub rider: RiderId,
    /// Team position (0-based) the rider was picked in.
    pub original_slot: usize,
    /// Logical slot (0-based) the rider held when leaving.
    pub vacated_slot: usize,
    pub filled_by: Option<RiderId>,
}

/// Logical team slots over a fixed arena of rider records.
///
/// Slots are ranks, not bindings: an abandonment leaves a hole that
/// `promote` closes by shifting every later occupant up one place. Bonus
/// positions compact the same way but are never refilled from below.
#[derive(Debug, Clone)]
pub struct SlotBoard {
    records: [RiderRecord; TEAM_SIZE],
    slots: [Slot; TEAM_SIZE],
    bonus: [Option<usize>; BONUS_SLOTS],
    pending: Vec<(usize, usize)>,
    history: Vec<Replacement>,
}

impl SlotBoard {
    pub fn new(team: &TeamSelection) -> Self {
        let mut records = [RiderRecord {
            rider: 0,
            abandoned: false,
        }; TEAM_SIZE];
        let mut slots = [Slot {
            state: SlotState::Active,
            occupant: None,
        }; TEAM_SIZE];
        for (i, &rider) in team.riders().iter().enumerate() {
            records[i].rider = rider;
            slots[i].occupant = Some(i);
        }
        let mut bonus = [None; BONUS_SLOTS];
        for (i, b) in bonus.iter_mut().enumerate() {
            *b = Some(i);
        }
        Self {
            records,
            slots,
            bonus,
            pending: Vec::new(),
            history: Vec::new(),
        }
    }

    fn record_of(&self, rider: RiderId) -> Option<usize> {
        self.records.iter().position(|r| r.rider == rider)
    }

    /// Whether `rider` is on the team and has not abandoned.
    pub fn is_active(&self, rider: RiderId) -> bool {
        self.record_of(rider)
            .is_some_and(|i| !self.records[i].abandoned)
    }

    /// Team riders still in the race, in original team order.
    pub fn active_riders(&self) -> impl Iterator<Item = RiderId> + '_ {
        self.records
            .iter()
            .filter(|r| !r.abandoned)
            .map(|r| r.rider)
    }

    /// Vacates the rider's slot and bonus position. Returns false if the
    /// rider is not on the team or already out.
    pub fn mark_abandoned(&mut self, rider: RiderId) -> bool {
        let Some(record) = self.record_of(rider) else {
            return false;
        };
        if self.records[record].abandoned {
            return false;
        }
        self.records[record].abandoned = true;

        if let Some(slot) = self.slots.iter().position(|s| s.occupant == Some(record)) {
            self.slots[slot].occupant = None;
            self.slots[slot].state = SlotState::Vacated;
            self.pending.push((record, slot));
        }
        for b in self.bonus.iter_mut() {
            if *b == Some(record) {
                *b = None;
            }
        }
        true
    }

    pub fn has_vacancies(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Closes every hole left since the last promotion. Occupants keep their
    /// relative order, so the first reserve moves into the scoring group and
    /// trailing slots go unfilled once the reserves run out.
    pub fn promote(&mut self, effective_stage: usize) {
        if self.pending.is_empty() {
            return;
        }

        let before = self.slots;
        let remaining: Vec<usize> = before.iter().filter_map(|s| s.occupant).collect();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            match remaining.get(i) {
                Some(&record) => {
                    slot.state = if before[i].occupant == Some(record) {
                        SlotState::Active
                    } else {
                        SlotState::Reassigned
                    };
                    slot.occupant = Some(record);
                }
                None => {
                    slot.occupant = None;
                    slot.state = SlotState::Unfilled;
                }
            }
        }

        let kept: Vec<usize> = self.bonus.iter().flatten().copied().collect();
        for (i, b) in self.bonus.iter_mut().enumerate() {
            *b = kept.get(i).copied();
        }

        for (record, vacated_slot) in std::mem::take(&mut self.pending) {
            let filled_by = self.slots[vacated_slot]
                .occupant
                .map(|r| self.records[r].rider);
            debug!(
                "Slot {} vacated by rider {} from stage {}, filled by {:?}",
                vacated_slot + 1,
                self.records[record].rider,
                effective_stage,
                filled_by
            );
            self.history.push(Replacement {
                effective_stage,
                rider: self.records[record].rider,
                original_slot: record,
                vacated_slot,
                filled_by,
            });
        }
    }

    /// `(slot, rider)` for every occupied scoring slot.
    pub fn scoring_slots(&self) -> impl Iterator<Item = (usize, RiderId)> + '_ {
        self.slots[..SCORING_SLOTS]
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.occupant.map(|r| (i, self.records[r].rider)))
    }

    pub fn active_scoring_count(&self) -> usize {
        self.scoring_slots().count()
    }

    pub fn occupant(&self, slot: usize) -> Option<RiderId> {
        self.slots
            .get(slot)
            .and_then(|s| s.occupant)
            .map(|r| self.records[r].rider)
    }

    pub fn state(&self, slot: usize) -> Option<SlotState> {
        self.slots.get(slot).map(|s| s.state)
    }

    /// Bonus position (1-based) the rider currently holds.
    pub fn bonus_slot_of(&self, rider: RiderId) -> Option<usize> {
        let record = self.record_of(rider)?;
        self.bonus
            .iter()
            .position(|&b| b == Some(record))
            .map(|i| i + 1)
    }

    pub fn replacement_history(&self) -> &[Replacement] {
        &self.history
    }
}
