//! Free-List Allocator
//!
//! LIFO stack of reclaimed record positions, threaded through the records.

use tracing::debug;

use crate::error::{BinioError, Result};
use crate::layout::Header;

use super::RecordRegion;

/// Pick the record position for a new record
///
/// Pops the free list when it is non-empty; otherwise returns the current
/// record count, so the next write grows the file by one record. Only the
/// in-memory header is changed; the caller persists it.
pub fn allocate(region: &mut RecordRegion<'_>, header: &mut Header) -> Result<u32> {
    match header.free_head {
        Some(head) => {
            region.check_position(head)?;
            let next = region.read_next_free(head)?;
            header.free_head = next;
            debug!(rec_index = head, ?next, "Reusing free record slot");
            Ok(head)
        }
        None => {
            let count = region.count()?;
            if count >= RecordRegion::max_records() {
                return Err(BinioError::Format(format!(
                    "record region is exhausted at {} records",
                    count
                )));
            }
            Ok(count)
        }
    }
}

/// Push `rec_index` onto the free list
///
/// Stores the previous head inside the record's pad, then makes the record
/// the new head.
pub fn release(region: &mut RecordRegion<'_>, header: &mut Header, rec_index: u32) -> Result<()> {
    region.write_next_free(rec_index, header.free_head)?;
    header.free_head = Some(rec_index);
    Ok(())
}
