//! Rental Module
//!
//! Application layer over the three tables.
//!
//! ## Responsibilities
//! - Validate input before anything is written
//! - Order writes across tables (contract first, car second)
//! - Policies the table engine does not enforce: a rented car cannot be
//!   deleted, a car's status must agree with its open contract
//!
//! Each table is independent on disk. A failure between the two writes of a
//! cross-table operation leaves the first write in place.

pub mod dates;
pub mod validate;

mod operations;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::entity::{Car, CarStatus, Cars, Contract, Contracts, Customer, Customers};
use crate::error::Result;
use crate::table::{RecordCodec, TableIter};

pub use operations::{CarChanges, CarUpdate, CustomerChanges, NewCar, NewCustomer, ReturnReceipt};

/// Active car counts per status plus open contracts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetStats {
    /// Indexed by `CarStatus::code()`
    pub by_status: [usize; 4],
    pub open_contracts: usize,
}

impl FleetStats {
    pub fn count(&self, status: CarStatus) -> usize {
        self.by_status[usize::from(status.code())]
    }
}

/// The three tables of one data directory
pub struct RentalDb {
    data_dir: PathBuf,
    customers: Customers,
    cars: Cars,
    contracts: Contracts,
}

impl RentalDb {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    pub const CUSTOMERS_FILE: &'static str = "customers.bin";
    pub const CARS_FILE: &'static str = "cars.bin";
    pub const CONTRACTS_FILE: &'static str = "contracts.bin";
    pub const REPORT_FILE: &'static str = "report.txt";

    /// Open or create all tables under `config.data_dir`
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let dir = &config.data_dir;
        let customers =
            Customers::open_with_slots(dir.join(Self::CUSTOMERS_FILE), config.customer_index_slots)?;
        let cars = Cars::open_with_slots(dir.join(Self::CARS_FILE), config.car_index_slots)?;
        let contracts =
            Contracts::open_with_slots(dir.join(Self::CONTRACTS_FILE), config.contract_index_slots)?;

        debug!(data_dir = %dir.display(), "Opened rental database");

        Ok(Self {
            data_dir: dir.clone(),
            customers,
            cars,
            contracts,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(&Config::builder().data_dir(path).build())
    }

    /// Sync and close every table; the first error wins
    pub fn close(self) -> Result<()> {
        let results = [
            self.customers.close(),
            self.cars.close(),
            self.contracts.close(),
        ];
        results.into_iter().collect()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Default location of the text report
    pub fn report_path(&self) -> PathBuf {
        self.data_dir.join(Self::REPORT_FILE)
    }

    /// Direct access to the customers table, bypassing application rules
    pub fn customers_table(&mut self) -> &mut Customers {
        &mut self.customers
    }

    /// Direct access to the cars table, bypassing application rules
    pub fn cars_table(&mut self) -> &mut Cars {
        &mut self.cars
    }

    /// Direct access to the contracts table, bypassing application rules
    pub fn contracts_table(&mut self) -> &mut Contracts {
        &mut self.contracts
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn customer(&mut self, cus_id: u32) -> Result<Option<Customer>> {
        self.customers.read(cus_id)
    }

    pub fn car(&mut self, car_id: u32) -> Result<Option<Car>> {
        self.cars.read(car_id)
    }

    pub fn contract(&mut self, rent_id: u32) -> Result<Option<Contract>> {
        self.contracts.read(rent_id)
    }

    pub fn list_customers(&mut self) -> Result<Vec<Customer>> {
        collect_records(self.customers.iter_active()?)
    }

    pub fn list_cars(&mut self) -> Result<Vec<Car>> {
        collect_records(self.cars.iter_active()?)
    }

    pub fn list_contracts(&mut self) -> Result<Vec<Contract>> {
        collect_records(self.contracts.iter_active()?)
    }

    /// Active customers whose name contains `query`, ignoring case
    pub fn search_customers(&mut self, query: &str) -> Result<Vec<Customer>> {
        let query = query.trim().to_lowercase();
        let mut all = self.list_customers()?;
        all.retain(|c| c.name.to_lowercase().contains(&query));
        Ok(all)
    }

    /// Active cars, optionally only those with `status`
    pub fn cars_by_status(&mut self, status: Option<CarStatus>) -> Result<Vec<Car>> {
        let mut all = self.list_cars()?;
        if let Some(status) = status {
            all.retain(|c| c.status == status);
        }
        Ok(all)
    }

    /// Active contracts whose rent date lies in `from..=to` (YYYYMMDD)
    pub fn contracts_in_range(&mut self, from_ymd: u32, to_ymd: u32) -> Result<Vec<Contract>> {
        let mut all = self.list_contracts()?;
        all.retain(|c| (from_ymd..=to_ymd).contains(&c.rent_ymd));
        Ok(all)
    }

    pub fn stats(&mut self) -> Result<FleetStats> {
        let mut stats = FleetStats::default();
        for car in self.list_cars()? {
            stats.by_status[usize::from(car.status.code())] += 1;
        }
        stats.open_contracts = self
            .list_contracts()?
            .iter()
            .filter(|c| c.is_open())
            .count();
        Ok(stats)
    }

    /// Latest open contract per car (latest = greatest rent date)
    pub fn open_contracts_by_car(&mut self) -> Result<HashMap<u32, Contract>> {
        let mut latest: HashMap<u32, Contract> = HashMap::new();
        for contract in self.list_contracts()? {
            if !contract.is_open() {
                continue;
            }
            // Ties keep the contract seen first.
            let newer = latest
                .get(&contract.car_id)
                .map_or(true, |prev| contract.rent_ymd > prev.rent_ymd);
            if newer {
                latest.insert(contract.car_id, contract);
            }
        }
        Ok(latest)
    }

    /// Latest open contract of one car
    pub fn open_contract_for(&mut self, car_id: u32) -> Result<Option<Contract>> {
        Ok(self.open_contracts_by_car()?.remove(&car_id))
    }

    /// Customer name for display; `cus#<id>` when the customer is gone
    pub fn customer_name(&mut self, cus_id: u32) -> Result<String> {
        Ok(match self.customers.read(cus_id)? {
            Some(c) => c.name,
            None => format!("cus#{}", cus_id),
        })
    }
}

fn collect_records<R: RecordCodec>(iter: TableIter<'_, R>) -> Result<Vec<R>> {
    iter.map(|item| item.map(|(_, record)| record)).collect()
}
