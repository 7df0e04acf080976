//! Index Module
//!
//! Open-addressing hash index over integer keys.
//!
//! ## Responsibilities
//! - Map a live key to its record position
//! - Linear probing from `key % capacity`, wrapping once around the table
//! - Tombstone deletion so probe chains stay intact
//!
//! ## Slot States
//! ```text
//! Empty      key == 0            stops every probe
//! Tombstone  key == 0xFFFFFFFF   skipped by lookups, reused by inserts
//! Occupied   any other key       live entry → rec_index
//! ```
//!
//! The index never grows or compacts. Capacity is fixed when the table is
//! created, and long tombstone runs make lookups slower over time.

mod file_slots;
mod memory;
mod probe;

use crate::error::Result;
use crate::layout::SlotState;

pub use file_slots::FileSlots;
pub use memory::MemorySlots;
pub use probe::{Probe, ProbeIndex};

/// Backing array of index slots
///
/// Implemented by the on-disk index region and by an in-memory vector used
/// for tests and benchmarks. Slot numbers are always `< capacity()`.
pub trait SlotStore {
    /// Number of slots; never zero
    fn capacity(&self) -> u32;

    /// Read the state of one slot
    fn read_slot(&mut self, slot: u32) -> Result<SlotState>;

    /// Overwrite one slot
    fn write_slot(&mut self, slot: u32, state: SlotState) -> Result<()>;
}
