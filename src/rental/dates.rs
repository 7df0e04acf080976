//! Calendar helpers
//!
//! Dates are stored as YYYYMMDD integers; 0 means "no date".

use chrono::{Datelike, Local, NaiveDate};

use crate::error::{BinioError, Result};

/// `2025-07-14` → `20250714`
pub fn ymd_from_date(date: NaiveDate) -> u32 {
    date.year() as u32 * 10_000 + date.month() * 100 + date.day()
}

/// `20250714` → `2025-07-14`; `None` for 0 or an impossible date
pub fn date_from_ymd(ymd: u32) -> Option<NaiveDate> {
    if ymd == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt((ymd / 10_000) as i32, (ymd / 100) % 100, ymd % 100)
}

/// Parse `YYYY-MM-DD`; an empty string is the "no date" value 0
pub fn parse_ymd(input: &str) -> Result<u32> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(ymd_from_date)
        .map_err(|_| BinioError::Validation(format!("invalid date '{}', expected YYYY-MM-DD", input)))
}

/// Render a stored date; 0 renders as "-"
pub fn format_ymd(ymd: u32) -> String {
    if ymd == 0 {
        return "-".to_string();
    }
    format!("{:04}-{:02}-{:02}", ymd / 10_000, (ymd / 100) % 100, ymd % 100)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn today_ymd() -> u32 {
    ymd_from_date(today())
}

/// Days charged between rent and return; a same-day return counts as 1
pub fn rental_days(rent_ymd: u32, return_ymd: u32) -> Result<u32> {
    let rent = date_from_ymd(rent_ymd)
        .ok_or_else(|| BinioError::Validation(format!("invalid rent date {}", rent_ymd)))?;
    let ret = date_from_ymd(return_ymd)
        .ok_or_else(|| BinioError::Validation(format!("invalid return date {}", return_ymd)))?;
    let days = (ret - rent).num_days();
    Ok(days.clamp(1, i64::from(u32::MAX)) as u32)
}
