//! On-disk index region
//!
//! Reads and writes individual 16-byte slots right after the header.

use std::fs::File;

use crate::error::Result;
use crate::layout::{Endian, SlotState, HEADER_SIZE, INDEX_SLOT_SIZE};
use crate::store::{read_at, write_at};

use super::SlotStore;

/// Index region of an open table file
pub struct FileSlots<'a> {
    file: &'a mut File,
    endian: Endian,
    capacity: u32,
}

impl<'a> FileSlots<'a> {
    pub fn new(file: &'a mut File, endian: Endian, capacity: u32) -> Self {
        Self {
            file,
            endian,
            capacity,
        }
    }

    fn offset(slot: u32) -> u64 {
        HEADER_SIZE as u64 + u64::from(slot) * INDEX_SLOT_SIZE as u64
    }

    /// Write `capacity` empty slots in one pass (new files only)
    pub fn initialize(&mut self) -> Result<()> {
        let empty = SlotState::Empty.encode(self.endian);
        let mut region = Vec::with_capacity(self.capacity as usize * INDEX_SLOT_SIZE);
        for _ in 0..self.capacity {
            region.extend_from_slice(&empty);
        }
        write_at(self.file, Self::offset(0), &region)
    }
}

impl SlotStore for FileSlots<'_> {
    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn read_slot(&mut self, slot: u32) -> Result<SlotState> {
        let mut buf = [0u8; INDEX_SLOT_SIZE];
        read_at(self.file, Self::offset(slot), &mut buf, "index slot")?;
        SlotState::decode(&buf, self.endian)
    }

    fn write_slot(&mut self, slot: u32, state: SlotState) -> Result<()> {
        write_at(self.file, Self::offset(slot), &state.encode(self.endian))
    }
}
