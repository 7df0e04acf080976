//! Record Region
//!
//! Raw access to record-sized blocks following the index region.

use std::fs::File;

use crate::error::{BinioError, Result};
use crate::layout::{check_width, decode_free_index, encode_free_index, Endian, Header};

use super::{read_at, write_at};

/// Record region of an open table file
pub struct RecordRegion<'a> {
    file: &'a mut File,
    /// Offset of record 0
    base: u64,
    record_size: usize,
    /// Offset of the next-free link inside a record
    free_next_offset: usize,
    endian: Endian,
}

impl<'a> RecordRegion<'a> {
    /// Region described by `header` for records of `record_size` bytes
    pub fn new(
        file: &'a mut File,
        header: &Header,
        record_size: usize,
        free_next_offset: usize,
    ) -> Self {
        Self {
            file,
            base: header.records_offset(),
            record_size,
            free_next_offset,
            endian: header.endian,
        }
    }

    /// Number of whole records, derived from the current file size
    ///
    /// Partial trailing bytes are not counted.
    pub fn count(&mut self) -> Result<u32> {
        let len = self.file.metadata()?.len();
        Ok(records_in(len, self.base, self.record_size))
    }

    fn offset(&self, rec_index: u32) -> u64 {
        self.base + u64::from(rec_index) * self.record_size as u64
    }

    /// Read one whole record
    pub fn read(&mut self, rec_index: u32) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.record_size];
        let offset = self.offset(rec_index);
        read_at(self.file, offset, &mut buf, &format!("record {}", rec_index))?;
        Ok(buf)
    }

    /// Overwrite one whole record; `data` must be exactly one record wide
    pub fn write(&mut self, rec_index: u32, data: &[u8]) -> Result<()> {
        check_width(data, self.record_size, "record")?;
        let offset = self.offset(rec_index);
        write_at(self.file, offset, data)
    }

    /// Overwrite the flag byte of a record
    pub fn write_flag(&mut self, rec_index: u32, flag: u8) -> Result<()> {
        let offset = self.offset(rec_index);
        write_at(self.file, offset, &[flag])
    }

    /// Next-free link stored in a free record
    pub fn read_next_free(&mut self, rec_index: u32) -> Result<Option<u32>> {
        let mut buf = [0u8; 4];
        let offset = self.offset(rec_index) + self.free_next_offset as u64;
        read_at(self.file, offset, &mut buf, &format!("free link of record {}", rec_index))?;
        let raw = self.endian.get_i32(&mut &buf[..]);
        decode_free_index(raw, &format!("free link of record {}", rec_index))
    }

    /// Store the next-free link inside a record's pad
    pub fn write_next_free(&mut self, rec_index: u32, next: Option<u32>) -> Result<()> {
        let mut buf = [0u8; 4];
        self.endian.put_i32(&mut &mut buf[..], encode_free_index(next));
        let offset = self.offset(rec_index) + self.free_next_offset as u64;
        write_at(self.file, offset, &buf)
    }

    /// Largest position the allocator may hand out
    pub(crate) fn max_records() -> u32 {
        i32::MAX as u32
    }

    pub(crate) fn check_position(&mut self, rec_index: u32) -> Result<()> {
        let count = self.count()?;
        if rec_index >= count {
            return Err(BinioError::Format(format!(
                "free list points at record {} but only {} records exist",
                rec_index, count
            )));
        }
        Ok(())
    }
}

/// Whole records in a file of `file_len` bytes whose records start at `base`
pub fn records_in(file_len: u64, base: u64, record_size: usize) -> u32 {
    if file_len <= base || record_size == 0 {
        return 0;
    }
    let n = (file_len - base) / record_size as u64;
    n.min(u64::from(u32::MAX)) as u32
}
