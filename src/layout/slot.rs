//! Index Slot
//!
//! 16-byte entries of the index region: key, record position, 8 reserved bytes.

use bytes::BufMut;

use crate::error::Result;

use super::{check_width, Endian};

/// Index slot size in bytes
pub const INDEX_SLOT_SIZE: usize = 16;

/// Stored key of a never-used slot
pub const EMPTY_KEY: u32 = 0;

/// Stored key of a slot whose entry was deleted
pub const TOMBSTONE_KEY: u32 = u32::MAX;

/// Decoded state of one index slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Never occupied; ends every probe
    Empty,
    /// Previously occupied; probes continue through it
    Tombstone,
    /// Live entry pointing at a record position
    Occupied { key: u32, rec_index: u32 },
}

impl SlotState {
    /// True for the two key values that can never be live keys
    pub fn is_reserved_key(key: u32) -> bool {
        key == EMPTY_KEY || key == TOMBSTONE_KEY
    }

    pub fn encode(self, endian: Endian) -> [u8; INDEX_SLOT_SIZE] {
        let (key, rec_index) = match self {
            SlotState::Empty => (EMPTY_KEY, 0),
            SlotState::Tombstone => (TOMBSTONE_KEY, 0),
            SlotState::Occupied { key, rec_index } => (key, rec_index),
        };
        let mut out = [0u8; INDEX_SLOT_SIZE];
        let mut buf = &mut out[..];
        endian.put_u32(&mut buf, key);
        endian.put_u32(&mut buf, rec_index);
        out
    }

    pub fn decode(buf: &[u8], endian: Endian) -> Result<Self> {
        check_width(buf, INDEX_SLOT_SIZE, "index slot")?;
        let mut cur = buf;
        let key = endian.get_u32(&mut cur);
        let rec_index = endian.get_u32(&mut cur);
        Ok(match key {
            EMPTY_KEY => SlotState::Empty,
            TOMBSTONE_KEY => SlotState::Tombstone,
            key => SlotState::Occupied { key, rec_index },
        })
    }
}
