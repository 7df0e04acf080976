//! Header Inspection
//!
//! Reads only the 128-byte header of a table file. The magic tag is reported,
//! not checked, so any file with a well-formed header can be inspected.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::error::{BinioError, Result};
use crate::layout::{Header, HEADER_SIZE, INDEX_SLOT_SIZE};
use crate::store::records_in;

/// Everything the inspector knows about one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: String,
    /// `customers`, `cars`, `contracts` or `unknown`
    pub table: &'static str,
    pub magic: String,
    pub version: u8,
    pub endianness: &'static str,
    pub record_size: u16,
    pub index_slots: u32,
    pub index_slot_size: usize,
    pub created_at: u32,
    pub created_at_str: String,
    pub updated_at: u32,
    pub updated_at_str: String,
    pub next_id: u32,
    pub active_count: u32,
    pub deleted_count: u32,
    /// -1 when the free list is empty
    pub free_head: i64,
    pub file_size: u64,
    /// Derived from the file size
    pub total_records: u32,
}

/// Table kind for a magic tag
pub fn table_kind(magic: &[u8; 4]) -> &'static str {
    match magic {
        b"CUST" => "customers",
        b"CARS" => "cars",
        b"CONT" => "contracts",
        _ => "unknown",
    }
}

/// Inspect the header of `path`
pub fn inspect_file(path: &Path) -> Result<FileReport> {
    let mut file = File::open(path)?;
    let file_size = file.metadata()?.len();

    let mut raw = [0u8; HEADER_SIZE];
    file.read_exact(&mut raw).map_err(|e| {
        BinioError::from_read(e, &format!("header (need {} bytes)", HEADER_SIZE))
    })?;
    let header = Header::decode(&raw)?;

    let total_records = if header.record_size == 0 {
        0
    } else {
        records_in(file_size, header.records_offset(), usize::from(header.record_size))
    };

    Ok(FileReport {
        file: path.display().to_string(),
        table: table_kind(&header.magic),
        magic: header.magic_str(),
        version: header.version,
        endianness: header.endian.label(),
        record_size: header.record_size,
        index_slots: header.index_slots,
        index_slot_size: INDEX_SLOT_SIZE,
        created_at: header.created_at,
        created_at_str: local_time(header.created_at),
        updated_at: header.updated_at,
        updated_at_str: local_time(header.updated_at),
        next_id: header.next_id,
        active_count: header.active_count,
        deleted_count: header.deleted_count,
        free_head: header.free_head.map_or(-1, i64::from),
        file_size,
        total_records,
    })
}

impl FileReport {
    /// Human-readable block, one field per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("File : {}\n", self.file));
        out.push_str(&format!("Type : {}  (magic={})\n", self.table, self.magic));
        out.push_str(&format!("Endian : {}\n", self.endianness));
        out.push_str(&format!("Record Size : {} bytes\n", self.record_size));
        out.push_str(&format!(
            "Index Slots : {}  (slot size = {} bytes)\n",
            self.index_slots, self.index_slot_size
        ));
        out.push_str(&format!("Created : {}\n", self.created_at_str));
        out.push_str(&format!("Updated : {}\n", self.updated_at_str));
        out.push_str(&format!("Next ID : {}\n", self.next_id));
        out.push_str(&format!(
            "Active : {}    Deleted : {}\n",
            self.active_count, self.deleted_count
        ));
        out.push_str(&format!("Free-list Head : {}\n", self.free_head));
        out.push_str(&format!(
            "File Size : {} bytes  |  Records : {}\n",
            self.file_size, self.total_records
        ));
        out
    }
}

fn local_time(ts: u32) -> String {
    match Local.timestamp_opt(i64::from(ts), 0).single() {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}
