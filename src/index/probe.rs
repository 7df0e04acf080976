//! Linear Probing
//!
//! Insert, lookup and delete over any [`SlotStore`].

use crate::error::{BinioError, Result};
use crate::layout::SlotState;

use super::SlotStore;

/// Position of a live key found by a lookup probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Index slot holding the key
    pub slot: u32,
    /// Record position the slot points at
    pub rec_index: u32,
}

/// Open-addressing index over a slot store
pub struct ProbeIndex<S> {
    slots: S,
}

impl<S: SlotStore> ProbeIndex<S> {
    pub fn new(slots: S) -> Self {
        Self { slots }
    }

    /// Give back the underlying slot store
    pub fn into_inner(self) -> S {
        self.slots
    }

    pub fn capacity(&self) -> u32 {
        self.slots.capacity()
    }

    /// First slot probed for `key`
    pub fn home_slot(&self, key: u32) -> u32 {
        key % self.slots.capacity()
    }

    /// Slots in probe order for `key`, visiting each slot exactly once
    fn probe_sequence(&self, key: u32) -> impl Iterator<Item = u32> {
        let capacity = self.slots.capacity();
        let start = self.home_slot(key);
        (0..capacity).map(move |i| ((u64::from(start) + u64::from(i)) % u64::from(capacity)) as u32)
    }

    /// Find the slot an insert of `key` should use
    ///
    /// Prefers the first tombstone on the probe path over an empty slot
    /// further along. A key already present anywhere before the first empty
    /// slot is a duplicate. When the whole table is scanned without meeting
    /// an empty slot, the first tombstone is still usable; only a table with
    /// neither empty slots nor tombstones is full.
    pub fn find_insert_slot(&mut self, key: u32) -> Result<u32> {
        if SlotState::is_reserved_key(key) {
            return Err(BinioError::ReservedKey(key));
        }

        let mut first_tombstone = None;
        for slot in self.probe_sequence(key) {
            match self.slots.read_slot(slot)? {
                SlotState::Occupied { key: k, .. } if k == key => {
                    return Err(BinioError::DuplicateKey(key));
                }
                SlotState::Occupied { .. } => {}
                SlotState::Tombstone => {
                    first_tombstone.get_or_insert(slot);
                }
                SlotState::Empty => return Ok(first_tombstone.unwrap_or(slot)),
            }
        }

        first_tombstone.ok_or(BinioError::IndexFull {
            capacity: self.slots.capacity(),
        })
    }

    /// Insert `key → rec_index`, returning the slot used
    pub fn insert(&mut self, key: u32, rec_index: u32) -> Result<u32> {
        let slot = self.find_insert_slot(key)?;
        self.slots
            .write_slot(slot, SlotState::Occupied { key, rec_index })?;
        Ok(slot)
    }

    /// Find a live key
    ///
    /// Tombstones do not end the probe; the first empty slot does.
    pub fn lookup(&mut self, key: u32) -> Result<Option<Probe>> {
        if SlotState::is_reserved_key(key) {
            return Ok(None);
        }

        for slot in self.probe_sequence(key) {
            match self.slots.read_slot(slot)? {
                SlotState::Empty => return Ok(None),
                SlotState::Occupied { key: k, rec_index } if k == key => {
                    return Ok(Some(Probe { slot, rec_index }));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    /// Tombstone the slot of `key`, returning where it pointed
    pub fn remove(&mut self, key: u32) -> Result<Option<Probe>> {
        let found = self.lookup(key)?;
        if let Some(probe) = found {
            self.slots.write_slot(probe.slot, SlotState::Tombstone)?;
        }
        Ok(found)
    }

    /// All live entries as `(slot, key, rec_index)` in slot order
    pub fn live_entries(&mut self) -> Result<Vec<(u32, u32, u32)>> {
        let mut out = Vec::new();
        for slot in 0..self.slots.capacity() {
            if let SlotState::Occupied { key, rec_index } = self.slots.read_slot(slot)? {
                out.push((slot, key, rec_index));
            }
        }
        Ok(out)
    }
}
