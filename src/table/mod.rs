//! Table Module
//!
//! One table file = header + index region + record region, driven by a
//! record codec.
//!
//! ## Responsibilities
//! - Create or open a table file and validate its header
//! - CRUD by integer key, keeping header, index and records consistent
//! - Snapshot iteration over record positions
//! - Persist and fsync the header at the end of every mutating call
//!
//! ## Concurrency Model
//! A `Table` owns its file handle exclusively. There is no locking: two
//! processes (or two `Table` values) writing the same file will corrupt it.
//!
//! ## Atomicity
//! Every call is durable on its own, but nothing spans calls, and inside
//! `add` the record write happens before the index insert. If the insert
//! fails (duplicate key, full index) the written record stays behind,
//! unreferenced by the index and not on the free list.

mod engine;
mod iterator;

use crate::error::Result;
use crate::layout::Endian;

pub use engine::Table;
pub use iterator::TableIter;

/// Flag byte of a live record
pub const FLAG_ACTIVE: u8 = 1;

/// Flag byte of a soft-deleted record
pub const FLAG_DELETED: u8 = 0;

/// Schema binding for one kind of fixed-size record
///
/// Byte 0 of every encoded record is the flag byte. The 4 bytes at
/// `FREE_NEXT_OFFSET` must lie in padding that `encode` leaves zero; they
/// hold the free-list link while the record is deleted.
pub trait RecordCodec: Sized {
    /// Table kind tag written into the header
    const MAGIC: [u8; 4];

    /// Encoded record width in bytes
    const RECORD_SIZE: usize;

    /// Offset of the next-free link inside the trailing pad
    const FREE_NEXT_OFFSET: usize;

    /// Index capacity used when the file is created without an override
    const INDEX_SLOTS: u32;

    /// Short name for logs and reports
    const NAME: &'static str;

    /// Encode to exactly `RECORD_SIZE` bytes
    fn encode(&self, endian: Endian) -> Vec<u8>;

    /// Decode exactly `RECORD_SIZE` bytes
    fn decode(buf: &[u8], endian: Endian) -> Result<Self>;
}

/// Which records an iteration yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// Only records whose flag byte is 1
    Active,
    /// Every whole record, including soft-deleted ones
    All,
}
