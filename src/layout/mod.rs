//! Layout Module
//!
//! Fixed byte layouts shared by every table file.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (128 bytes)                                      │
//! │   Magic (4) | Version (1) | Endian (1) | RecSize (2)    │
//! │   Created (4) | Updated (4) | NextId (4)                │
//! │   Active (4) | Deleted (4) | FreeHead i32 (4)           │
//! │   IndexSlots (4) | Reserved (92)                        │
//! ├─────────────────────────────────────────────────────────┤
//! │ Index Region (IndexSlots × 16 bytes)                    │
//! │   [Key: u32][RecIndex: u32][Reserved: 8]                │
//! ├─────────────────────────────────────────────────────────┤
//! │ Record Region (N × RecSize bytes)                       │
//! │   [Flag: u8][entity fields ...][pad, holds next-free]   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Integers are little-endian unless the header's endian flag is 1.

mod header;
mod slot;

use bytes::{Buf, BufMut};

use crate::error::{BinioError, Result};

pub use header::{now_ts, Header, FORMAT_VERSION, HEADER_SIZE};
pub(crate) use header::{decode_free_index, encode_free_index};
pub use slot::{SlotState, EMPTY_KEY, INDEX_SLOT_SIZE, TOMBSTONE_KEY};

// =============================================================================
// Byte Order
// =============================================================================

/// Byte order of every integer in one table file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Stored header tag for this byte order
    pub fn flag(self) -> u8 {
        match self {
            Endian::Little => 0,
            Endian::Big => 1,
        }
    }

    /// Only a flag of 1 selects big-endian; anything else reads as little
    pub fn from_flag(flag: u8) -> Self {
        if flag == 1 {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Endian::Little => "Little-Endian",
            Endian::Big => "Big-Endian",
        }
    }

    pub fn put_u16<B: BufMut>(self, buf: &mut B, v: u16) {
        match self {
            Endian::Little => buf.put_u16_le(v),
            Endian::Big => buf.put_u16(v),
        }
    }

    pub fn put_u32<B: BufMut>(self, buf: &mut B, v: u32) {
        match self {
            Endian::Little => buf.put_u32_le(v),
            Endian::Big => buf.put_u32(v),
        }
    }

    pub fn put_i32<B: BufMut>(self, buf: &mut B, v: i32) {
        match self {
            Endian::Little => buf.put_i32_le(v),
            Endian::Big => buf.put_i32(v),
        }
    }

    pub fn get_u16<B: Buf>(self, buf: &mut B) -> u16 {
        match self {
            Endian::Little => buf.get_u16_le(),
            Endian::Big => buf.get_u16(),
        }
    }

    pub fn get_u32<B: Buf>(self, buf: &mut B) -> u32 {
        match self {
            Endian::Little => buf.get_u32_le(),
            Endian::Big => buf.get_u32(),
        }
    }

    pub fn get_i32<B: Buf>(self, buf: &mut B) -> i32 {
        match self {
            Endian::Little => buf.get_i32_le(),
            Endian::Big => buf.get_i32(),
        }
    }
}

// =============================================================================
// Fixed-Width Helpers
// =============================================================================

/// Fail unless `buf` is exactly `expected` bytes; nothing is partially decoded
pub fn check_width(buf: &[u8], expected: usize, what: &str) -> Result<()> {
    if buf.len() != expected {
        return Err(BinioError::Format(format!(
            "{} must be {} bytes, got {}",
            what,
            expected,
            buf.len()
        )));
    }
    Ok(())
}

/// Write `text` as UTF-8, cut at `width` bytes and zero-padded
///
/// The cut is byte-exact and may split a multi-byte character; the
/// dangling prefix is dropped again by [`decode_text`].
pub fn put_text<B: BufMut>(buf: &mut B, text: &str, width: usize) {
    let bytes = text.as_bytes();
    let n = bytes.len().min(width);
    buf.put_slice(&bytes[..n]);
    buf.put_bytes(0, width - n);
}

/// Read a `width`-byte text field written by [`put_text`]
pub fn get_text<B: Buf>(buf: &mut B, width: usize) -> String {
    let mut raw = vec![0u8; width];
    buf.copy_to_slice(&mut raw);
    decode_text(&raw)
}

/// Strip trailing zero bytes and decode, dropping invalid UTF-8 sequences
pub fn decode_text(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    raw[..end].utf8_chunks().map(|chunk| chunk.valid()).collect()
}
