//! Table Iterator
//!
//! Sequential iteration over record positions in ascending order.

use std::marker::PhantomData;

use crate::error::Result;
use crate::layout::Endian;
use crate::store::RecordRegion;

use super::{RecordCodec, Scan, FLAG_ACTIVE};

/// Iterator over `(rec_index, record)` pairs of a table
///
/// The end position is fixed when the iterator is created.
pub struct TableIter<'a, R> {
    region: RecordRegion<'a>,
    endian: Endian,
    /// Next position to read
    next: u32,
    /// One past the last position of the snapshot
    end: u32,
    scan: Scan,
    _codec: PhantomData<fn() -> R>,
}

impl<'a, R> TableIter<'a, R> {
    pub(super) fn new(region: RecordRegion<'a>, endian: Endian, end: u32, scan: Scan) -> Self {
        Self {
            region,
            endian,
            next: 0,
            end,
            scan,
            _codec: PhantomData,
        }
    }

    /// Number of positions in the snapshot
    pub fn snapshot_len(&self) -> u32 {
        self.end
    }
}

impl<R: RecordCodec> Iterator for TableIter<'_, R> {
    type Item = Result<(u32, R)>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.end {
            let rec_index = self.next;
            self.next += 1;

            let raw = match self.region.read(rec_index) {
                Ok(raw) => raw,
                Err(e) => return Some(Err(e)),
            };
            if self.scan == Scan::Active && raw[0] != FLAG_ACTIVE {
                continue;
            }
            return Some(R::decode(&raw, self.endian).map(|record| (rec_index, record)));
        }
        None
    }
}
