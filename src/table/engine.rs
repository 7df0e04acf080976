//! Table Engine
//!
//! Composes the layout codec, index and record store over one file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{BinioError, Result};
use crate::index::{FileSlots, ProbeIndex};
use crate::layout::{Header, SlotState, FORMAT_VERSION, HEADER_SIZE};
use crate::store::{self, read_at, write_at, RecordRegion};

use super::{RecordCodec, Scan, TableIter, FLAG_DELETED};

/// A fixed-record table file
///
/// The header is cached in memory and written back, followed by an fsync,
/// at the end of every mutating call.
pub struct Table<R> {
    /// Path of the table file
    path: PathBuf,

    /// Exclusively owned file handle
    file: File,

    /// Cached header, authoritative while the table is open
    header: Header,

    _codec: PhantomData<fn() -> R>,
}

impl<R: RecordCodec> Table<R> {
    /// Open or create a table with the codec's default index capacity
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_slots(path, R::INDEX_SLOTS)
    }

    /// Open a table, creating it with `index_slots` slots if missing
    ///
    /// `index_slots` is ignored for an existing file; the capacity stored in
    /// its header wins.
    pub fn open_with_slots(path: impl AsRef<Path>, index_slots: u32) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::open_existing(path)
        } else {
            Self::create(path, index_slots)
        }
    }

    fn create(path: &Path, index_slots: u32) -> Result<Self> {
        if index_slots == 0 {
            return Err(BinioError::Config(format!(
                "{} index capacity must be positive",
                R::NAME
            )));
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        let header = Header::new(R::MAGIC, R::RECORD_SIZE as u16, index_slots);
        write_at(&mut file, 0, &header.encode())?;
        FileSlots::new(&mut file, header.endian, index_slots).initialize()?;
        file.flush()?;
        file.sync_all()?;

        debug!(
            table = R::NAME,
            path = %path.display(),
            index_slots,
            "Created table file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
            _codec: PhantomData,
        })
    }

    fn open_existing(path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;

        let mut buf = [0u8; HEADER_SIZE];
        read_at(&mut file, 0, &mut buf, "header")?;
        let header = Header::decode(&buf)?;

        if header.magic != R::MAGIC || usize::from(header.record_size) != R::RECORD_SIZE {
            return Err(BinioError::Format(format!(
                "bad file format for {}: magic {:?} record size {}, expected {:?} record size {}",
                path.display(),
                header.magic_str(),
                header.record_size,
                String::from_utf8_lossy(&R::MAGIC),
                R::RECORD_SIZE
            )));
        }
        if header.index_slots == 0 {
            return Err(BinioError::Format(format!(
                "bad file format for {}: index has no slots",
                path.display()
            )));
        }
        if header.version != FORMAT_VERSION {
            warn!(
                table = R::NAME,
                version = header.version,
                "Opening table with unexpected format version"
            );
        }

        debug!(
            table = R::NAME,
            path = %path.display(),
            next_id = header.next_id,
            active = header.active_count,
            deleted = header.deleted_count,
            "Opened table file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
            _codec: PhantomData,
        })
    }

    /// Flush, fsync and close the file
    pub fn close(mut self) -> Result<()> {
        self.sync()
    }

    // =========================================================================
    // Key Allocation
    // =========================================================================

    /// Hand out the next key and persist the counter immediately
    ///
    /// A key is consumed even if the caller's following `add` fails.
    pub fn next_id(&mut self) -> Result<u32> {
        let id = self.header.next_id;
        if SlotState::is_reserved_key(id) {
            return Err(BinioError::Format(format!(
                "{} key space is exhausted",
                R::NAME
            )));
        }
        self.header.next_id = id + 1;
        self.persist_header()?;
        Ok(id)
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Store `record` under `key`, returning its record position
    ///
    /// The record is written before the index insert. A duplicate key or a
    /// full index leaves that record orphaned: it is not rolled back and it
    /// stays off the free list, on disk as well as in memory.
    pub fn add(&mut self, key: u32, record: &R) -> Result<u32> {
        if SlotState::is_reserved_key(key) {
            return Err(BinioError::ReservedKey(key));
        }
        let data = record.encode(self.header.endian);

        let rec_index = {
            let mut region = Self::region(&mut self.file, &self.header);
            let rec_index = store::allocate(&mut region, &mut self.header)?;
            region.write(rec_index, &data)?;
            rec_index
        };

        if let Err(e) = self.index().insert(key, rec_index) {
            warn!(
                table = R::NAME,
                key,
                rec_index,
                error = %e,
                "Index insert failed; record slot left orphaned"
            );
            // The orphan may have been popped off the free list; that pop
            // must reach disk or a reopen would hand the slot out again.
            if let Err(persist) = self.persist_header() {
                warn!(
                    table = R::NAME,
                    error = %persist,
                    "Failed to persist header after orphaning record"
                );
            }
            return Err(e);
        }

        self.header.active_count += 1;
        self.persist_header()?;

        debug!(table = R::NAME, key, rec_index, "Added record");
        Ok(rec_index)
    }

    /// Read and decode the record stored under `key`
    pub fn read(&mut self, key: u32) -> Result<Option<R>> {
        let endian = self.header.endian;
        match self.read_raw(key)? {
            Some(raw) => Ok(Some(R::decode(&raw, endian)?)),
            None => Ok(None),
        }
    }

    /// Raw bytes of the record stored under `key`
    ///
    /// The flag byte is not checked; callers tell live and deleted records
    /// apart themselves.
    pub fn read_raw(&mut self, key: u32) -> Result<Option<Vec<u8>>> {
        let probe = match self.index().lookup(key)? {
            Some(probe) => probe,
            None => return Ok(None),
        };
        let mut region = Self::region(&mut self.file, &self.header);
        Ok(Some(region.read(probe.rec_index)?))
    }

    /// True if `key` has a live index entry
    pub fn contains(&mut self, key: u32) -> Result<bool> {
        Ok(self.index().lookup(key)?.is_some())
    }

    /// Overwrite the record stored under `key` in place
    pub fn update(&mut self, key: u32, record: &R) -> Result<()> {
        let probe = self.index().lookup(key)?.ok_or(BinioError::NotFound(key))?;
        let data = record.encode(self.header.endian);
        {
            let mut region = Self::region(&mut self.file, &self.header);
            region.write(probe.rec_index, &data)?;
        }
        self.persist_header()
    }

    /// Soft-delete the record stored under `key`
    ///
    /// Clears its flag byte, pushes its position onto the free list and
    /// tombstones its index slot.
    pub fn delete(&mut self, key: u32) -> Result<()> {
        let probe = self.index().lookup(key)?.ok_or(BinioError::NotFound(key))?;
        {
            let mut region = Self::region(&mut self.file, &self.header);
            region.write_flag(probe.rec_index, FLAG_DELETED)?;
            store::release(&mut region, &mut self.header, probe.rec_index)?;
        }
        self.index().remove(key)?;

        self.header.active_count = self.header.active_count.saturating_sub(1);
        self.header.deleted_count += 1;
        self.persist_header()?;

        debug!(table = R::NAME, key, rec_index = probe.rec_index, "Deleted record");
        Ok(())
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Iterate record positions `0..N` as of now
    ///
    /// `N` is taken from the file size when this is called; records appended
    /// later are not seen.
    pub fn iter(&mut self, scan: Scan) -> Result<TableIter<'_, R>> {
        let mut region = Self::region(&mut self.file, &self.header);
        let end = region.count()?;
        Ok(TableIter::new(region, self.header.endian, end, scan))
    }

    /// Active records only
    pub fn iter_active(&mut self) -> Result<TableIter<'_, R>> {
        self.iter(Scan::Active)
    }

    /// Every record, live or soft-deleted
    pub fn iter_all(&mut self) -> Result<TableIter<'_, R>> {
        self.iter(Scan::All)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the table file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the cached header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Number of records in the record region, derived from file size
    pub fn record_count(&mut self) -> Result<u32> {
        Self::region(&mut self.file, &self.header).count()
    }

    /// Live index entries as `(slot, key, rec_index)`
    pub fn index_entries(&mut self) -> Result<Vec<(u32, u32, u32)>> {
        self.index().live_entries()
    }

    /// Index slot currently holding `key`
    pub fn slot_of(&mut self, key: u32) -> Result<Option<u32>> {
        Ok(self.index().lookup(key)?.map(|probe| probe.slot))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn index(&mut self) -> ProbeIndex<FileSlots<'_>> {
        ProbeIndex::new(FileSlots::new(
            &mut self.file,
            self.header.endian,
            self.header.index_slots,
        ))
    }

    fn region<'f>(file: &'f mut File, header: &Header) -> RecordRegion<'f> {
        RecordRegion::new(file, header, R::RECORD_SIZE, R::FREE_NEXT_OFFSET)
    }

    /// Refresh `updated_at`, write the header and force it to disk
    fn persist_header(&mut self) -> Result<()> {
        self.header.touch();
        write_at(&mut self.file, 0, &self.header.encode())?;
        self.sync()
    }

    fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}
