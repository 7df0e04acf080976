//! File Header
//!
//! The 128-byte region at offset 0 of every table file.

use bytes::{Buf, BufMut};

use crate::error::{BinioError, Result};

use super::{check_width, Endian, INDEX_SLOT_SIZE};

/// Header size in bytes
pub const HEADER_SIZE: usize = 128;

/// Format version written into new files
pub const FORMAT_VERSION: u8 = 1;

/// Bytes used by header fields; the rest is reserved and zero
const HEADER_FIELDS_SIZE: usize = 36;

/// Stored value of `free_head` when the free list is empty
const NO_FREE_SLOT: i32 = -1;

/// Current Unix time in seconds, clamped into the 4-byte header field
pub fn now_ts() -> u32 {
    let ts = chrono::Utc::now().timestamp();
    ts.clamp(0, i64::from(u32::MAX)) as u32
}

/// In-memory copy of a table file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Table kind tag ("CUST", "CARS", "CONT")
    pub magic: [u8; 4],
    pub version: u8,
    /// Byte order used by the whole file
    pub endian: Endian,
    pub record_size: u16,
    pub created_at: u32,
    pub updated_at: u32,
    /// Next key handed out by `Table::next_id`; 0 is never issued
    pub next_id: u32,
    pub active_count: u32,
    pub deleted_count: u32,
    /// First reclaimed record position, `None` when the free list is empty
    pub free_head: Option<u32>,
    /// Index capacity, fixed at creation
    pub index_slots: u32,
}

impl Header {
    /// Header for a freshly created table
    pub fn new(magic: [u8; 4], record_size: u16, index_slots: u32) -> Self {
        let now = now_ts();
        Self {
            magic,
            version: FORMAT_VERSION,
            endian: Endian::Little,
            record_size,
            created_at: now,
            updated_at: now,
            next_id: 1,
            active_count: 0,
            deleted_count: 0,
            free_head: None,
            index_slots,
        }
    }

    /// Encode to exactly [`HEADER_SIZE`] bytes in the header's own byte order
    pub fn encode(&self) -> Vec<u8> {
        let e = self.endian;
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        buf.put_slice(&self.magic);
        buf.put_u8(self.version);
        buf.put_u8(e.flag());
        e.put_u16(&mut buf, self.record_size);
        e.put_u32(&mut buf, self.created_at);
        e.put_u32(&mut buf, self.updated_at);
        e.put_u32(&mut buf, self.next_id);
        e.put_u32(&mut buf, self.active_count);
        e.put_u32(&mut buf, self.deleted_count);
        e.put_i32(&mut buf, encode_free_index(self.free_head));
        e.put_u32(&mut buf, self.index_slots);
        buf.put_bytes(0, HEADER_SIZE - HEADER_FIELDS_SIZE);
        buf
    }

    /// Decode a header
    ///
    /// Little-endian is assumed. The endian flag is a single byte and reads
    /// the same in either order; if it says big-endian, the numeric fields
    /// are decoded in that order instead.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        check_width(buf, HEADER_SIZE, "header")?;
        Self::decode_with(buf, Endian::from_flag(buf[5]))
    }

    fn decode_with(buf: &[u8], e: Endian) -> Result<Self> {
        let mut cur = buf;
        let mut magic = [0u8; 4];
        cur.copy_to_slice(&mut magic);
        let version = cur.get_u8();
        let _flag = cur.get_u8();
        let record_size = e.get_u16(&mut cur);
        let created_at = e.get_u32(&mut cur);
        let updated_at = e.get_u32(&mut cur);
        let next_id = e.get_u32(&mut cur);
        let active_count = e.get_u32(&mut cur);
        let deleted_count = e.get_u32(&mut cur);
        let free_head = decode_free_index(e.get_i32(&mut cur), "header free_head")?;
        let index_slots = e.get_u32(&mut cur);

        Ok(Self {
            magic,
            version,
            endian: e,
            record_size,
            created_at,
            updated_at,
            next_id,
            active_count,
            deleted_count,
            free_head,
            index_slots,
        })
    }

    /// Byte offset of index slot `slot`
    pub fn slot_offset(&self, slot: u32) -> u64 {
        HEADER_SIZE as u64 + u64::from(slot) * INDEX_SLOT_SIZE as u64
    }

    /// Byte offset where the record region starts
    pub fn records_offset(&self) -> u64 {
        self.slot_offset(self.index_slots)
    }

    /// Magic tag as text, lossy for foreign files
    pub fn magic_str(&self) -> String {
        String::from_utf8_lossy(&self.magic).into_owned()
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = now_ts();
    }
}

/// Encode a free-list link; `None` becomes -1
pub(crate) fn encode_free_index(index: Option<u32>) -> i32 {
    match index {
        // Allocation stops before positions stop fitting in an i32.
        Some(i) => i as i32,
        None => NO_FREE_SLOT,
    }
}

/// Decode a free-list link; -1 means end of list, other negatives are corrupt
pub(crate) fn decode_free_index(raw: i32, what: &str) -> Result<Option<u32>> {
    match raw {
        NO_FREE_SLOT => Ok(None),
        i if i >= 0 => Ok(Some(i as u32)),
        other => Err(BinioError::Format(format!("{} is corrupt: {}", what, other))),
    }
}
