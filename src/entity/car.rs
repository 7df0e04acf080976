//! Car record

use bytes::{Buf, BufMut};

use crate::config::DEFAULT_CAR_SLOTS;
use crate::error::{BinioError, Result};
use crate::layout::{check_width, get_text, put_text, Endian};
use crate::table::{RecordCodec, FLAG_ACTIVE, FLAG_DELETED};

/// Encoded car width
pub const CAR_SIZE: usize = 128;

const LICENSE_WIDTH: usize = 12;
const BRAND_WIDTH: usize = 12;
const MODEL_WIDTH: usize = 16;
const PAD_OFFSET: usize = 60;

/// Rental status of a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CarStatus {
    Available,
    Rented,
    Maintenance,
    Retired,
}

impl CarStatus {
    /// Every status in code order
    pub const ALL: [CarStatus; 4] = [
        CarStatus::Available,
        CarStatus::Rented,
        CarStatus::Maintenance,
        CarStatus::Retired,
    ];

    pub fn code(self) -> u8 {
        match self {
            CarStatus::Available => 0,
            CarStatus::Rented => 1,
            CarStatus::Maintenance => 2,
            CarStatus::Retired => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            CarStatus::Available => "available",
            CarStatus::Rented => "rented",
            CarStatus::Maintenance => "maintenance",
            CarStatus::Retired => "retired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    pub active: bool,
    pub car_id: u32,
    /// License plate
    pub license: String,
    pub brand: String,
    pub model: String,
    pub year: u16,
    /// Daily rate in cents
    pub rate_cents: u32,
    pub odometer_km: u32,
    pub status: CarStatus,
    /// Unix time of the last change made through the application
    pub updated_at: u32,
}

impl RecordCodec for Car {
    const MAGIC: [u8; 4] = *b"CARS";
    const RECORD_SIZE: usize = CAR_SIZE;
    const FREE_NEXT_OFFSET: usize = PAD_OFFSET;
    const INDEX_SLOTS: u32 = DEFAULT_CAR_SLOTS;
    const NAME: &'static str = "cars";

    fn encode(&self, e: Endian) -> Vec<u8> {
        let mut buf = Vec::with_capacity(CAR_SIZE);
        buf.put_u8(if self.active { FLAG_ACTIVE } else { FLAG_DELETED });
        e.put_u32(&mut buf, self.car_id);
        put_text(&mut buf, &self.license, LICENSE_WIDTH);
        put_text(&mut buf, &self.brand, BRAND_WIDTH);
        put_text(&mut buf, &self.model, MODEL_WIDTH);
        e.put_u16(&mut buf, self.year);
        e.put_u32(&mut buf, self.rate_cents);
        e.put_u32(&mut buf, self.odometer_km);
        buf.put_u8(self.status.code());
        e.put_u32(&mut buf, self.updated_at);
        buf.put_bytes(0, CAR_SIZE - PAD_OFFSET);
        buf
    }

    fn decode(buf: &[u8], e: Endian) -> Result<Self> {
        check_width(buf, CAR_SIZE, "car record")?;
        let mut cur = buf;
        let active = cur.get_u8() == FLAG_ACTIVE;
        let car_id = e.get_u32(&mut cur);
        let license = get_text(&mut cur, LICENSE_WIDTH);
        let brand = get_text(&mut cur, BRAND_WIDTH);
        let model = get_text(&mut cur, MODEL_WIDTH);
        let year = e.get_u16(&mut cur);
        let rate_cents = e.get_u32(&mut cur);
        let odometer_km = e.get_u32(&mut cur);
        let status_code = cur.get_u8();
        let updated_at = e.get_u32(&mut cur);

        let status = CarStatus::from_code(status_code).ok_or_else(|| {
            BinioError::Format(format!(
                "car {} has unknown status code {}",
                car_id, status_code
            ))
        })?;

        Ok(Self {
            active,
            car_id,
            license,
            brand,
            model,
            year,
            rate_cents,
            odometer_km,
            status,
            updated_at,
        })
    }
}
