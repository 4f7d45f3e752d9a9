//! The shared millisecond timeline that alignable annotations point into.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::ids::TimeslotId;
use super::Millis;
use crate::error::EafError;

/// Owns every timeslot of a document and hands out fresh ids.
///
/// A slot's value is optional: EAF allows unaligned slots, and `allocate`
/// registers a slot before its time is known.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Timeline {
    slots: BTreeMap<TimeslotId, Option<Millis>>,

    /// Highest numeric suffix ever issued or loaded.
    last_issued: u64,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh slot with no time value and returns its id.
    pub fn allocate(&mut self) -> TimeslotId {
        self.last_issued += 1;
        let id = TimeslotId::new(self.last_issued);
        self.slots.insert(id, None);
        id
    }

    /// Registers a slot read from a file, keeping the counter ahead of it.
    pub fn insert_loaded(&mut self, id: TimeslotId, value: Option<Millis>) {
        self.last_issued = self.last_issued.max(id.as_u64());
        self.slots.insert(id, value);
    }

    /// Moves the counter past every slot present. A counter that is
    /// already ahead stays where it is.
    pub(crate) fn resync_counter(&mut self) {
        let highest = self.slots.keys().map(TimeslotId::as_u64).max().unwrap_or(0);
        self.last_issued = self.last_issued.max(highest);
    }

    /// Sets the time value of an existing slot.
    pub fn set(&mut self, id: TimeslotId, millis: Millis) -> Result<(), EafError> {
        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(EafError::TimeslotNotFound(id))?;
        *slot = Some(millis);
        Ok(())
    }

    /// Returns the value of a slot (`None` if it is unaligned).
    pub fn get(&self, id: TimeslotId) -> Result<Option<Millis>, EafError> {
        self.slots
            .get(&id)
            .copied()
            .ok_or(EafError::TimeslotNotFound(id))
    }

    /// Removes a slot, returning whether it existed.
    pub fn remove(&mut self, id: TimeslotId) -> bool {
        self.slots.remove(&id).is_some()
    }

    pub fn contains(&self, id: TimeslotId) -> bool {
        self.slots.contains_key(&id)
    }

    /// `(min, max)` over all slots that carry a time value.
    pub fn full_range(&self) -> Result<(Millis, Millis), EafError> {
        let mut values = self.slots.values().flatten().copied();
        let first = values.next().ok_or(EafError::EmptyTimeline)?;
        Ok(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Drops every slot not in `referenced`, returning how many were removed.
    pub fn cleanup(&mut self, referenced: &BTreeSet<TimeslotId>) -> usize {
        let before = self.slots.len();
        self.slots.retain(|id, _| referenced.contains(id));
        before - self.slots.len()
    }

    /// Adds `delta` to every timed slot.
    pub(crate) fn shift_all(&mut self, delta: Millis) {
        for value in self.slots.values_mut().flatten() {
            *value += delta;
        }
    }

    /// Slots in numeric-suffix order.
    pub fn iter(&self) -> impl Iterator<Item = (TimeslotId, Option<Millis>)> + '_ {
        self.slots.iter().map(|(id, value)| (*id, *value))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Highest suffix issued so far; the next allocation is one above it.
    pub fn last_issued(&self) -> u64 {
        self.last_issued
    }
}
