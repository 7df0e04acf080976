//! Store Module
//!
//! Fixed-stride record region with a free-list allocator.
//!
//! ## Responsibilities
//! - Translate record positions to file offsets
//! - Derive the record count from the file size (never stored)
//! - Reuse slots of soft-deleted records, most recently deleted first
//!
//! ## Free List
//! ```text
//! header.free_head ──► rec 7 ──► rec 2 ──► -1
//!                      └ next-free i32 lives in the record's trailing pad
//! ```

mod free_list;
mod region;

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{BinioError, Result};

pub use free_list::{allocate, release};
pub use region::{records_in, RecordRegion};

/// Read exactly `buf.len()` bytes at `offset`; a short read is a format error
pub(crate) fn read_at(file: &mut File, offset: u64, buf: &mut [u8], what: &str) -> Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(buf)
        .map_err(|e| BinioError::from_read(e, what))
}

/// Write all of `data` at `offset`
pub(crate) fn write_at(file: &mut File, offset: u64, data: &[u8]) -> Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(data)?;
    Ok(())
}
