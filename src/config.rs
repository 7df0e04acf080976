//! Configuration for carrent-binio
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{BinioError, Result};

/// Default index capacity for the customers table
pub const DEFAULT_CUSTOMER_SLOTS: u32 = 1024;

/// Default index capacity for the cars table
pub const DEFAULT_CAR_SLOTS: u32 = 1024;

/// Default index capacity for the contracts table
pub const DEFAULT_CONTRACT_SLOTS: u32 = 2048;

/// Main configuration for a rental data directory
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── customers.bin
    ///     ├── cars.bin
    ///     ├── contracts.bin
    ///     └── report.txt
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Index Configuration
    // -------------------------------------------------------------------------
    // Only used when a table file is created. An existing file keeps the
    // capacity recorded in its header.
    /// Index slots for customers.bin
    pub customer_index_slots: u32,

    /// Index slots for cars.bin
    pub car_index_slots: u32,

    /// Index slots for contracts.bin
    pub contract_index_slots: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            customer_index_slots: DEFAULT_CUSTOMER_SLOTS,
            car_index_slots: DEFAULT_CAR_SLOTS,
            contract_index_slots: DEFAULT_CONTRACT_SLOTS,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject capacities the index cannot work with
    pub fn validate(&self) -> Result<()> {
        for (name, slots) in [
            ("customer_index_slots", self.customer_index_slots),
            ("car_index_slots", self.car_index_slots),
            ("contract_index_slots", self.contract_index_slots),
        ] {
            if slots == 0 {
                return Err(BinioError::Config(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all table files)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the index capacity used when creating customers.bin
    pub fn customer_index_slots(mut self, slots: u32) -> Self {
        self.config.customer_index_slots = slots;
        self
    }

    /// Set the index capacity used when creating cars.bin
    pub fn car_index_slots(mut self, slots: u32) -> Self {
        self.config.car_index_slots = slots;
        self
    }

    /// Set the index capacity used when creating contracts.bin
    pub fn contract_index_slots(mut self, slots: u32) -> Self {
        self.config.contract_index_slots = slots;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
