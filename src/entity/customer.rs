//! Customer record

use bytes::{Buf, BufMut};

use crate::config::DEFAULT_CUSTOMER_SLOTS;
use crate::error::{BinioError, Result};
use crate::layout::{check_width, get_text, put_text, Endian};
use crate::table::{RecordCodec, FLAG_ACTIVE, FLAG_DELETED};

/// Encoded customer width
pub const CUSTOMER_SIZE: usize = 128;

const ID_CARD_WIDTH: usize = 13;
const NAME_WIDTH: usize = 50;
const PHONE_WIDTH: usize = 10;
const PAD_OFFSET: usize = 83;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    #[default]
    Unknown,
    Male,
    Female,
}

impl Gender {
    pub fn code(self) -> u8 {
        match self {
            Gender::Unknown => 0,
            Gender::Male => 1,
            Gender::Female => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Gender::Unknown),
            1 => Some(Gender::Male),
            2 => Some(Gender::Female),
            _ => None,
        }
    }

    /// Parse "unk" / "male" / "female" (case-insensitive)
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "unk" => Some(Gender::Unknown),
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Unknown => "unk",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub active: bool,
    pub cus_id: u32,
    /// National id card number, 13 digits
    pub id_card: String,
    pub name: String,
    pub phone: String,
    /// Birth date as YYYYMMDD, 0 when unknown
    pub birth_ymd: u32,
    pub gender: Gender,
}

impl RecordCodec for Customer {
    const MAGIC: [u8; 4] = *b"CUST";
    const RECORD_SIZE: usize = CUSTOMER_SIZE;
    const FREE_NEXT_OFFSET: usize = PAD_OFFSET;
    const INDEX_SLOTS: u32 = DEFAULT_CUSTOMER_SLOTS;
    const NAME: &'static str = "customers";

    fn encode(&self, e: Endian) -> Vec<u8> {
        let mut buf = Vec::with_capacity(CUSTOMER_SIZE);
        buf.put_u8(if self.active { FLAG_ACTIVE } else { FLAG_DELETED });
        e.put_u32(&mut buf, self.cus_id);
        put_text(&mut buf, &self.id_card, ID_CARD_WIDTH);
        put_text(&mut buf, &self.name, NAME_WIDTH);
        put_text(&mut buf, &self.phone, PHONE_WIDTH);
        e.put_u32(&mut buf, self.birth_ymd);
        buf.put_u8(self.gender.code());
        buf.put_bytes(0, CUSTOMER_SIZE - PAD_OFFSET);
        buf
    }

    fn decode(buf: &[u8], e: Endian) -> Result<Self> {
        check_width(buf, CUSTOMER_SIZE, "customer record")?;
        let mut cur = buf;
        let active = cur.get_u8() == FLAG_ACTIVE;
        let cus_id = e.get_u32(&mut cur);
        let id_card = get_text(&mut cur, ID_CARD_WIDTH);
        let name = get_text(&mut cur, NAME_WIDTH);
        let phone = get_text(&mut cur, PHONE_WIDTH);
        let birth_ymd = e.get_u32(&mut cur);
        let gender_code = cur.get_u8();
        let gender = Gender::from_code(gender_code).ok_or_else(|| {
            BinioError::Format(format!(
                "customer {} has unknown gender code {}",
                cus_id, gender_code
            ))
        })?;

        Ok(Self {
            active,
            cus_id,
            id_card,
            name,
            phone,
            birth_ymd,
            gender,
        })
    }
}
