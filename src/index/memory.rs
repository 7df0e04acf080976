//! In-memory slot array

use crate::error::{BinioError, Result};
use crate::layout::SlotState;

use super::SlotStore;

/// Slot store held in a `Vec`, used to exercise probing without a file
#[derive(Debug, Clone)]
pub struct MemorySlots {
    slots: Vec<SlotState>,
}

impl MemorySlots {
    /// All-empty store with `capacity` slots
    pub fn new(capacity: u32) -> Result<Self> {
        if capacity == 0 {
            return Err(BinioError::Config("index capacity must be positive".into()));
        }
        Ok(Self {
            slots: vec![SlotState::Empty; capacity as usize],
        })
    }

    pub fn slots(&self) -> &[SlotState] {
        &self.slots
    }
}

impl SlotStore for MemorySlots {
    fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    fn read_slot(&mut self, slot: u32) -> Result<SlotState> {
        Ok(self.slots[slot as usize])
    }

    fn write_slot(&mut self, slot: u32, state: SlotState) -> Result<()> {
        self.slots[slot as usize] = state;
        Ok(())
    }
}
