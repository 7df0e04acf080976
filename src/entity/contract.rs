//! Rental contract record

use bytes::{Buf, BufMut};

use crate::config::DEFAULT_CONTRACT_SLOTS;
use crate::error::Result;
use crate::layout::{check_width, Endian};
use crate::table::{RecordCodec, FLAG_ACTIVE, FLAG_DELETED};

/// Encoded contract width
pub const CONTRACT_SIZE: usize = 64;

const PAD_OFFSET: usize = 26;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub active: bool,
    pub rent_id: u32,
    pub cus_id: u32,
    pub car_id: u32,
    /// Rental start as YYYYMMDD
    pub rent_ymd: u32,
    /// Return date as YYYYMMDD, 0 while open
    pub return_ymd: u32,
    /// Amount charged in cents, 0 while open
    pub total_cents: u32,
    pub returned: bool,
}

impl Contract {
    /// Still rented out
    pub fn is_open(&self) -> bool {
        !self.returned
    }
}

impl RecordCodec for Contract {
    const MAGIC: [u8; 4] = *b"CONT";
    const RECORD_SIZE: usize = CONTRACT_SIZE;
    const FREE_NEXT_OFFSET: usize = PAD_OFFSET;
    const INDEX_SLOTS: u32 = DEFAULT_CONTRACT_SLOTS;
    const NAME: &'static str = "contracts";

    fn encode(&self, e: Endian) -> Vec<u8> {
        let mut buf = Vec::with_capacity(CONTRACT_SIZE);
        buf.put_u8(if self.active { FLAG_ACTIVE } else { FLAG_DELETED });
        e.put_u32(&mut buf, self.rent_id);
        e.put_u32(&mut buf, self.cus_id);
        e.put_u32(&mut buf, self.car_id);
        e.put_u32(&mut buf, self.rent_ymd);
        e.put_u32(&mut buf, self.return_ymd);
        e.put_u32(&mut buf, self.total_cents);
        buf.put_u8(u8::from(self.returned));
        buf.put_bytes(0, CONTRACT_SIZE - PAD_OFFSET);
        buf
    }

    fn decode(buf: &[u8], e: Endian) -> Result<Self> {
        check_width(buf, CONTRACT_SIZE, "contract record")?;
        let mut cur = buf;
        Ok(Self {
            active: cur.get_u8() == FLAG_ACTIVE,
            rent_id: e.get_u32(&mut cur),
            cus_id: e.get_u32(&mut cur),
            car_id: e.get_u32(&mut cur),
            rent_ymd: e.get_u32(&mut cur),
            return_ymd: e.get_u32(&mut cur),
            total_cents: e.get_u32(&mut cur),
            returned: cur.get_u8() != 0,
        })
    }
}
