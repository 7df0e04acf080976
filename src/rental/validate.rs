//! Input validation
//!
//! Rules applied before anything is written. Failures are `Validation` errors.

use chrono::Datelike;

use crate::entity::CarStatus;
use crate::error::{BinioError, Result};

use super::dates;

/// Maximum plate length accepted from input (the stored field is 12 bytes)
pub const MAX_PLATE_CHARS: usize = 16;

pub fn is_id_card(s: &str) -> bool {
    s.len() == 13 && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_phone(s: &str) -> bool {
    (9..=10).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_plate(s: &str) -> bool {
    let n = s.trim().chars().count();
    n > 0 && n <= MAX_PLATE_CHARS
}

/// 1900 up to next year
pub fn is_year(year: i32) -> bool {
    (1900..=dates::today().year() + 1).contains(&year)
}

pub fn check_customer(name: &str, id_card: &str, phone: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BinioError::Validation("name must not be empty".into()));
    }
    if !is_id_card(id_card) {
        return Err(BinioError::Validation(format!(
            "id card '{}' must be exactly 13 digits",
            id_card
        )));
    }
    if !is_phone(phone) {
        return Err(BinioError::Validation(format!(
            "phone '{}' must be 9-10 digits",
            phone
        )));
    }
    Ok(())
}

/// Check car input and convert it to stored units `(year, rate_cents, odometer_km)`
pub fn check_car(plate: &str, year: i32, rate: f64, odometer_km: i64) -> Result<(u16, u32, u32)> {
    if !is_plate(plate) {
        return Err(BinioError::Validation(format!(
            "plate must be 1-{} characters",
            MAX_PLATE_CHARS
        )));
    }
    if !is_year(year) {
        return Err(BinioError::Validation(format!("year {} is out of range", year)));
    }
    let rate_cents = rate_to_cents(rate)?;
    let odometer_km = u32::try_from(odometer_km)
        .map_err(|_| BinioError::Validation(format!("odometer {} is out of range", odometer_km)))?;
    Ok((year as u16, rate_cents, odometer_km))
}

/// Daily rate in currency units → cents, rounded
pub fn rate_to_cents(rate: f64) -> Result<u32> {
    let cents = (rate * 100.0).round();
    if !cents.is_finite() || cents < 0.0 || cents > f64::from(u32::MAX) {
        return Err(BinioError::Validation(format!("rate {} is out of range", rate)));
    }
    Ok(cents as u32)
}

/// Parse a status filter
///
/// Accepts the full label, the numeric code, or a prefix matching exactly
/// one label. Empty input means "no filter".
pub fn parse_status(input: &str) -> Result<Option<CarStatus>> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Ok(None);
    }

    if let Ok(code) = input.parse::<u8>() {
        return CarStatus::from_code(code)
            .map(Some)
            .ok_or_else(|| BinioError::Validation(format!("unknown status code {}", code)));
    }

    if let Some(status) = CarStatus::ALL.into_iter().find(|s| s.label() == input) {
        return Ok(Some(status));
    }

    let matched: Vec<CarStatus> = CarStatus::ALL
        .into_iter()
        .filter(|s| s.label().starts_with(&input))
        .collect();
    match matched.as_slice() {
        [one] => Ok(Some(*one)),
        [] => Err(BinioError::Validation(format!("unknown status '{}'", input))),
        many => Err(BinioError::Validation(format!(
            "ambiguous status '{}': {}",
            input,
            many.iter().map(|s| s.label()).collect::<Vec<_>>().join(", ")
        ))),
    }
}
