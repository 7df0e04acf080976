//! Fleet Report
//!
//! Plain-text summary of the cars table, written to `report.txt`.
//!
//! The car table scans every record, deleted ones included. Counts, rate
//! statistics and brand totals only look at active cars. Records that fail
//! to decode are counted and skipped rather than failing the report.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use chrono::Local;
use tracing::{info, warn};

use crate::entity::{Car, CarStatus};
use crate::error::{BinioError, Result};
use crate::layout::Endian;
use crate::rental::dates::format_ymd;
use crate::rental::RentalDb;
use crate::VERSION;

const TITLE: &str = "Car Rent System - Summary Report";
const RATE_UNIT: &str = "THB/day";

/// Render the report
pub fn generate_report(db: &mut RentalDb) -> Result<String> {
    let open_by_car = db.open_contracts_by_car()?;
    let (cars, unreadable) = scan_cars(db)?;

    let mut names = NameCache::default();
    let mut lines = Vec::new();

    let ts = Local::now().format("%Y-%m-%d %H:%M:%S (%z)");
    lines.push(TITLE.to_string());
    lines.push(format!("Generated At : {}", ts));
    lines.push(format!("App Version  : {}", VERSION));
    lines.push(format!("Endianness   : {}", Endian::Little.label()));
    lines.push("Encoding     : UTF-8 (fixed-length)".to_string());
    lines.push(String::new());

    let head = format!(
        "{:>5} | {:<10} | {:<10} | {:<10} | {:>4} | {:>14} | {:<7} | {:<3} | {:<20}",
        "CarID",
        "Plate",
        "Brand",
        "Model",
        "Year",
        format!("Rate ({})", RATE_UNIT),
        "Record",
        "Rented",
        "Renter"
    );
    let rule = "-".repeat(head.chars().count());
    lines.push(head);
    lines.push(rule);

    let mut active = 0usize;
    let mut rented = 0usize;
    let mut available = 0usize;
    let mut rates = Vec::new();
    let mut by_brand: BTreeMap<String, usize> = BTreeMap::new();

    for car in &cars {
        let rented_now = car.active && car.status == CarStatus::Rented;
        let renter = if rented_now {
            match open_by_car.get(&car.car_id) {
                Some(open) => names.get(db, open.cus_id)?,
                None => "(unknown)".to_string(),
            }
        } else {
            String::new()
        };

        lines.push(format!(
            "{:>5} | {:<10.10} | {:<10.10} | {:<10.10} | {:>4} | {:>14.2} | {:<7} | {:<3} | {:<20.20}",
            car.car_id,
            car.license,
            car.brand,
            car.model,
            car.year,
            f64::from(car.rate_cents) / 100.0,
            if car.active { "Active" } else { "Deleted" },
            if rented_now { "Yes" } else { "No" },
            renter
        ));

        if car.active {
            active += 1;
            rates.push(car.rate_cents);
            *by_brand.entry(car.brand.clone()).or_default() += 1;
            if rented_now {
                rented += 1;
            }
            if car.status == CarStatus::Available {
                available += 1;
            }
        }
    }

    lines.push(String::new());
    lines.push("Summary (Active only)".to_string());
    lines.push(format!("- Total Cars (records) : {}", cars.len()));
    lines.push(format!("- Active Cars          : {}", active));
    lines.push(format!("- Deleted Cars         : {}", cars.len() - active));
    lines.push(format!("- Currently Rented     : {}", rented));
    lines.push(format!("- Available Now        : {}", available));
    if unreadable > 0 {
        lines.push(format!("- Unreadable Records   : {}", unreadable));
    }
    lines.push(String::new());

    let (min, max, avg) = rate_stats(&rates);
    lines.push(format!("Rate Statistics ({}, Active only)", RATE_UNIT));
    lines.push(format!("- Min : {}", money(min)));
    lines.push(format!("- Max : {}", money(max)));
    lines.push(format!("- Avg : {}", money(avg)));
    lines.push(String::new());

    lines.push("Cars by Brand (Active only)".to_string());
    if by_brand.is_empty() {
        lines.push("(no active cars)".to_string());
    } else {
        for (brand, n) in &by_brand {
            lines.push(format!("- {} : {}", brand, n));
        }
    }

    lines.push(String::new());
    lines.push("Open Rentals".to_string());
    if open_by_car.is_empty() {
        lines.push("(none)".to_string());
    } else {
        lines.push(format!(
            "{:>6} | {:>5} | {:<10} | {:<24} | {:<10}",
            "RentID", "CarID", "Plate", "Customer", "Rent Date"
        ));
        lines.push("-".repeat(64));

        let mut open: Vec<_> = open_by_car.values().collect();
        open.sort_by_key(|c| (c.rent_ymd, c.car_id));
        for contract in open {
            let plate = match readable(db.car(contract.car_id))? {
                Some(Some(car)) => car.license,
                _ => format!("car#{}", contract.car_id),
            };
            let name = names.get(db, contract.cus_id)?;
            lines.push(format!(
                "{:>6} | {:>5} | {:<10.10} | {:<24.24} | {:<10}",
                contract.rent_id,
                contract.car_id,
                plate,
                name,
                format_ymd(contract.rent_ymd)
            ));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

/// Render the report and write it to `path`
pub fn write_report(db: &mut RentalDb, path: &Path) -> Result<()> {
    let text = generate_report(db)?;
    fs::write(path, text)?;
    info!(path = %path.display(), "Wrote report");
    Ok(())
}

/// Every car record plus the number that failed to decode
///
/// A record with a corrupt code byte is skipped so one bad record does not
/// hide the rest of the fleet. I/O errors still abort.
fn scan_cars(db: &mut RentalDb) -> Result<(Vec<Car>, usize)> {
    let mut cars = Vec::new();
    let mut unreadable = 0;
    for item in db.cars_table().iter_all()? {
        match readable(item)? {
            Some((_, car)) => cars.push(car),
            None => unreadable += 1,
        }
    }
    Ok((cars, unreadable))
}

/// Customer names looked up once per report
#[derive(Default)]
struct NameCache {
    names: HashMap<u32, String>,
}

impl NameCache {
    fn get(&mut self, db: &mut RentalDb, cus_id: u32) -> Result<String> {
        if let Some(name) = self.names.get(&cus_id) {
            return Ok(name.clone());
        }
        let name = match readable(db.customer_name(cus_id))? {
            Some(name) => name,
            None => format!("cus#{}", cus_id),
        };
        self.names.insert(cus_id, name.clone());
        Ok(name)
    }
}

/// Turn a `Format` error into `None` (logged), keep other errors
fn readable<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(BinioError::Format(reason)) => {
            warn!(%reason, "Unreadable record in report");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// `(min, max, avg)` in currency units; zeros when empty
fn rate_stats(rates: &[u32]) -> (f64, f64, f64) {
    let (Some(min), Some(max)) = (rates.iter().min(), rates.iter().max()) else {
        return (0.0, 0.0, 0.0);
    };
    let sum: u64 = rates.iter().map(|&r| u64::from(r)).sum();
    let avg = sum as f64 / rates.len() as f64 / 100.0;
    (f64::from(*min) / 100.0, f64::from(*max) / 100.0, avg)
}

/// Two decimals with comma thousands separators: `1234.5` → `1,234.50`
pub fn money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac)
}
