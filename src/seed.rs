//! Sample Data
//!
//! Fills a data directory with generated customers, cars and contracts.
//! Runs append to whatever the tables already hold and reuse free slots.
//! Output is deterministic for a given seed and starting state.

use chrono::{Datelike, Days, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::entity::{CarStatus, Gender};
use crate::error::{BinioError, Result};
use crate::rental::dates::{today, ymd_from_date};
use crate::rental::{NewCar, NewCustomer, RentalDb};
use crate::report;

const FIRST_NAMES: [&str; 10] = [
    "Somchai", "Sudarat", "Anan", "Napat", "Arisa", "Kittisak", "Warin", "Ploy", "Somsak",
    "Siriporn",
];

const LAST_NAMES: [&str; 10] = [
    "Boonmee", "Chaiyakul", "Srisuk", "Prasert", "Chanthara", "Pattana", "Sukprasert", "Deejai",
    "Inthra", "Thavorn",
];

const BRAND_MODELS: [(&str, [&str; 3]); 5] = [
    ("Toyota", ["Vios", "Yaris", "Altis"]),
    ("Honda", ["City", "Civic", "Jazz"]),
    ("Mazda", ["2", "3", "CX-30"]),
    ("Nissan", ["Almera", "Note", "March"]),
    ("Mitsu", ["Attrage", "Mirage", "Xpander"]),
];

/// Daily rates in cents
const RATES: [u32; 6] = [90_000, 120_000, 150_000, 180_000, 200_000, 250_000];

const ID_CARD_BASE: u64 = 1_103_700_000_000;

/// What to generate
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub customers: usize,
    pub cars: usize,
    /// `None` means half of `min(customers, cars)`, at least 1
    pub contracts: Option<usize>,
    pub seed: u64,
    /// Write `report.txt` afterwards
    pub report: bool,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            customers: 10,
            cars: 10,
            contracts: None,
            seed: 42,
            report: false,
        }
    }
}

impl SeedPlan {
    pub fn contract_target(&self) -> usize {
        self.contracts
            .unwrap_or_else(|| (self.customers.min(self.cars) / 2).max(1))
    }
}

/// What a seeding run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub customer_ids: Vec<u32>,
    pub car_ids: Vec<u32>,
    pub contract_ids: Vec<u32>,
    /// Contracts left open (car still rented)
    pub open_contracts: usize,
}

/// Generate the data described by `plan`
pub fn seed(db: &mut RentalDb, plan: &SeedPlan) -> Result<SeedSummary> {
    let mut rng = StdRng::seed_from_u64(plan.seed);
    let mut summary = SeedSummary::default();

    for _ in 0..plan.customers {
        let next_id = db.customers_table().header().next_id;
        let cus_id = db.add_customer(random_customer(&mut rng, next_id))?;
        summary.customer_ids.push(cus_id);
    }
    debug!(count = summary.customer_ids.len(), "Seeded customers");

    let max_year = today().year() + 1;
    for _ in 0..plan.cars {
        let (brand, models) = BRAND_MODELS[rng.gen_range(0..BRAND_MODELS.len())];
        let model = models[rng.gen_range(0..models.len())];
        let year = rng.gen_range(2017..=max_year);
        let rate_cents = RATES[rng.gen_range(0..RATES.len())];
        let odometer_km = rng.gen_range(5_000..=120_000);

        // The plate follows the id the table is about to hand out.
        let plate = format!("TH-{:04}", db.cars_table().header().next_id);
        let car_id = db.add_car(NewCar {
            license: plate,
            brand: brand.to_string(),
            model: model.to_string(),
            year,
            rate: f64::from(rate_cents) / 100.0,
            odometer_km,
            status: CarStatus::Available,
        })?;
        summary.car_ids.push(car_id);
    }
    debug!(count = summary.car_ids.len(), "Seeded cars");

    let mut free_cars = summary.car_ids.clone();
    for k in 0..plan.contract_target() {
        if summary.customer_ids.is_empty() || free_cars.is_empty() {
            break;
        }
        let cus_id = summary.customer_ids[rng.gen_range(0..summary.customer_ids.len())];
        let car_id = free_cars.swap_remove(rng.gen_range(0..free_cars.len()));

        let rent = NaiveDate::from_ymd_opt(2025, rng.gen_range(6..=9), rng.gen_range(1..=25))
            .ok_or_else(|| BinioError::Validation("generated an impossible date".into()))?;
        let rent_id = db.open_contract(cus_id, car_id, ymd_from_date(rent))?;

        if k % 2 == 0 {
            let days = rng.gen_range(1..=5);
            let ret = rent
                .checked_add_days(Days::new(days))
                .ok_or_else(|| BinioError::Validation("return date overflow".into()))?;
            db.return_car(rent_id, ymd_from_date(ret))?;
        } else {
            summary.open_contracts += 1;
        }
        summary.contract_ids.push(rent_id);
    }

    if plan.report {
        let path = db.report_path();
        report::write_report(db, &path)?;
    }

    info!(
        customers = summary.customer_ids.len(),
        cars = summary.car_ids.len(),
        contracts = summary.contract_ids.len(),
        open = summary.open_contracts,
        "Seed complete"
    );
    Ok(summary)
}

/// `next_id` is the id the customers table hands out next
fn random_customer(rng: &mut StdRng, next_id: u32) -> NewCustomer {
    let name = format!(
        "{} {}",
        FIRST_NAMES.choose(rng).copied().unwrap_or("Somchai"),
        LAST_NAMES.choose(rng).copied().unwrap_or("Boonmee")
    );
    let id_card = format!("{:013}", ID_CARD_BASE + u64::from(next_id));
    let phone = format!("08{:08}", rng.gen_range(10_000_000..=99_999_999u32));
    let birth = NaiveDate::from_ymd_opt(
        rng.gen_range(1980..=2005),
        rng.gen_range(1..=12),
        rng.gen_range(1..=28),
    )
    .map(ymd_from_date)
    .unwrap_or(0);
    let gender = match rng.gen_range(0..3) {
        1 => Gender::Male,
        2 => Gender::Female,
        _ => Gender::Unknown,
    };

    NewCustomer {
        name,
        id_card,
        phone,
        birth_ymd: birth,
        gender,
    }
}
