//! Rental operations
//!
//! Mutating operations with their validation and cross-table rules.

use tracing::info;

use crate::entity::{Car, CarStatus, Contract, Customer, Gender};
use crate::error::{BinioError, Result};
use crate::layout::now_ts;

use super::dates::{self, rental_days};
use super::validate::{check_car, check_customer};
use super::RentalDb;

/// Input for a new customer
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub name: String,
    pub id_card: String,
    pub phone: String,
    /// YYYYMMDD, 0 when unknown
    pub birth_ymd: u32,
    pub gender: Gender,
}

/// Partial customer update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct CustomerChanges {
    pub name: Option<String>,
    pub id_card: Option<String>,
    pub phone: Option<String>,
    pub birth_ymd: Option<u32>,
    pub gender: Option<Gender>,
}

/// Input for a new car, in user units
#[derive(Debug, Clone)]
pub struct NewCar {
    pub license: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    /// Daily rate in currency units
    pub rate: f64,
    pub odometer_km: i64,
    pub status: CarStatus,
}

/// Partial car update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct CarChanges {
    pub license: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    /// Daily rate in currency units
    pub rate: Option<f64>,
    pub odometer_km: Option<i64>,
    pub status: Option<CarStatus>,
}

/// Outcome of closing a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub rent_id: u32,
    pub car_id: u32,
    pub days: u32,
    pub total_cents: u32,
}

/// Outcome of a car update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarUpdate {
    pub car: Car,
    /// Contract closed because the car went from rented to available
    pub closed_contract: Option<ReturnReceipt>,
}

impl RentalDb {
    // =========================================================================
    // Add
    // =========================================================================

    pub fn add_customer(&mut self, input: NewCustomer) -> Result<u32> {
        let name = input.name.trim();
        let id_card = input.id_card.trim();
        let phone = input.phone.trim();
        check_customer(name, id_card, phone)?;

        let cus_id = self.customers.next_id()?;
        let customer = Customer {
            active: true,
            cus_id,
            id_card: id_card.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            birth_ymd: input.birth_ymd,
            gender: input.gender,
        };
        self.customers.add(cus_id, &customer)?;
        Ok(cus_id)
    }

    pub fn add_car(&mut self, input: NewCar) -> Result<u32> {
        let license = input.license.trim();
        let (year, rate_cents, odometer_km) =
            check_car(license, input.year, input.rate, input.odometer_km)?;

        let car_id = self.cars.next_id()?;
        let car = Car {
            active: true,
            car_id,
            license: license.to_string(),
            brand: input.brand.trim().to_string(),
            model: input.model.trim().to_string(),
            year,
            rate_cents,
            odometer_km,
            status: input.status,
            updated_at: now_ts(),
        };
        self.cars.add(car_id, &car)?;
        Ok(car_id)
    }

    /// Rent an available car to an existing customer
    ///
    /// Writes the contract first, then marks the car rented.
    pub fn open_contract(&mut self, cus_id: u32, car_id: u32, rent_ymd: u32) -> Result<u32> {
        let car = self
            .cars
            .read(car_id)?
            .ok_or_else(|| BinioError::Validation(format!("car {} not found", car_id)))?;
        if car.status != CarStatus::Available {
            return Err(BinioError::Validation(format!(
                "car {} is not available ({})",
                car_id,
                car.status.label()
            )));
        }
        if !self.customers.contains(cus_id)? {
            return Err(BinioError::Validation(format!("customer {} not found", cus_id)));
        }
        if dates::date_from_ymd(rent_ymd).is_none() {
            return Err(BinioError::Validation(format!("invalid rent date {}", rent_ymd)));
        }

        let rent_id = self.contracts.next_id()?;
        let contract = Contract {
            active: true,
            rent_id,
            cus_id,
            car_id,
            rent_ymd,
            return_ymd: 0,
            total_cents: 0,
            returned: false,
        };
        self.contracts.add(rent_id, &contract)?;

        let rented = Car {
            status: CarStatus::Rented,
            updated_at: now_ts(),
            ..car
        };
        self.cars.update(car_id, &rented)?;

        info!(rent_id, cus_id, car_id, "Opened contract");
        Ok(rent_id)
    }

    // =========================================================================
    // Update
    // =========================================================================

    pub fn update_customer(&mut self, cus_id: u32, changes: CustomerChanges) -> Result<Customer> {
        let current = self
            .customers
            .read(cus_id)?
            .ok_or(BinioError::NotFound(cus_id))?;

        let updated = Customer {
            active: true,
            cus_id,
            name: changes.name.map_or(current.name, |s| s.trim().to_string()),
            id_card: changes.id_card.map_or(current.id_card, |s| s.trim().to_string()),
            phone: changes.phone.map_or(current.phone, |s| s.trim().to_string()),
            birth_ymd: changes.birth_ymd.unwrap_or(current.birth_ymd),
            gender: changes.gender.unwrap_or(current.gender),
        };
        check_customer(&updated.name, &updated.id_card, &updated.phone)?;

        self.customers.update(cus_id, &updated)?;
        Ok(updated)
    }

    /// Update a car, keeping its status consistent with its open contract
    ///
    /// With an open contract, rented → available closes that contract as of
    /// `today` at the car's current rate; any other move away from rented is
    /// rejected. Without one, moving to rented is rejected. All checks run
    /// before anything is written.
    pub fn update_car(&mut self, car_id: u32, changes: CarChanges, today_ymd: u32) -> Result<CarUpdate> {
        let current = self.cars.read(car_id)?.ok_or(BinioError::NotFound(car_id))?;

        let license = changes
            .license
            .map_or_else(|| current.license.clone(), |s| s.trim().to_string());
        let year = changes.year.unwrap_or(i32::from(current.year));
        let rate = changes
            .rate
            .unwrap_or(f64::from(current.rate_cents) / 100.0);
        let odometer = changes
            .odometer_km
            .unwrap_or(i64::from(current.odometer_km));
        let (year, rate_cents, odometer_km) = check_car(&license, year, rate, odometer)?;

        let old_status = current.status;
        let new_status = changes.status.unwrap_or(old_status);

        let mut to_close = None;
        match self.open_contract_for(car_id)? {
            Some(open) => {
                if old_status == CarStatus::Rented && new_status == CarStatus::Available {
                    to_close = Some(open);
                } else if new_status != CarStatus::Rented {
                    return Err(BinioError::Validation(format!(
                        "car {} has open contract {}; return the car first or keep it rented",
                        car_id, open.rent_id
                    )));
                }
            }
            None if new_status == CarStatus::Rented => {
                return Err(BinioError::Validation(format!(
                    "car {} has no open contract; open a contract to rent it",
                    car_id
                )));
            }
            None => {}
        }

        let closed_contract = match to_close {
            Some(open) => Some(self.close_contract(open, today_ymd, current.rate_cents)?),
            None => None,
        };

        let car = Car {
            active: true,
            car_id,
            license,
            brand: changes.brand.map_or(current.brand, |s| s.trim().to_string()),
            model: changes.model.map_or(current.model, |s| s.trim().to_string()),
            year,
            rate_cents,
            odometer_km,
            status: new_status,
            updated_at: now_ts(),
        };
        self.cars.update(car_id, &car)?;

        Ok(CarUpdate {
            car,
            closed_contract,
        })
    }

    /// Close an open contract and free its car
    pub fn return_car(&mut self, rent_id: u32, return_ymd: u32) -> Result<ReturnReceipt> {
        let contract = self
            .contracts
            .read(rent_id)?
            .ok_or(BinioError::NotFound(rent_id))?;
        if contract.returned {
            return Err(BinioError::Validation(format!(
                "contract {} is already closed",
                rent_id
            )));
        }
        if return_ymd < contract.rent_ymd {
            return Err(BinioError::Validation(format!(
                "return date {} is before rent date {}",
                dates::format_ymd(return_ymd),
                dates::format_ymd(contract.rent_ymd)
            )));
        }

        let car = self.cars.read(contract.car_id)?.ok_or_else(|| {
            BinioError::Validation(format!(
                "car {} of contract {} not found",
                contract.car_id, rent_id
            ))
        })?;

        let receipt = self.close_contract(contract, return_ymd, car.rate_cents)?;

        let status = if car.status == CarStatus::Rented {
            CarStatus::Available
        } else {
            car.status
        };
        let car_id = car.car_id;
        let freed = Car {
            status,
            updated_at: now_ts(),
            ..car
        };
        self.cars.update(car_id, &freed)?;

        Ok(receipt)
    }

    /// Mark `contract` returned on `return_ymd`, charging `rate_cents` per day
    fn close_contract(&mut self, contract: Contract, return_ymd: u32, rate_cents: u32) -> Result<ReturnReceipt> {
        let days = rental_days(contract.rent_ymd, return_ymd)?;
        let total = u64::from(days) * u64::from(rate_cents);
        let total_cents = u32::try_from(total).map_err(|_| {
            BinioError::Validation(format!("total {} cents does not fit the contract", total))
        })?;

        let rent_id = contract.rent_id;
        let car_id = contract.car_id;
        let closed = Contract {
            active: true,
            return_ymd,
            total_cents,
            returned: true,
            ..contract
        };
        self.contracts.update(rent_id, &closed)?;

        info!(rent_id, car_id, days, total_cents, "Closed contract");
        Ok(ReturnReceipt {
            rent_id,
            car_id,
            days,
            total_cents,
        })
    }

    // =========================================================================
    // Delete
    // =========================================================================

    pub fn delete_customer(&mut self, cus_id: u32) -> Result<()> {
        self.customers.delete(cus_id)
    }

    /// Delete a car unless it is currently rented
    pub fn delete_car(&mut self, car_id: u32) -> Result<()> {
        let car = self.cars.read(car_id)?.ok_or(BinioError::NotFound(car_id))?;
        if car.status == CarStatus::Rented {
            return Err(BinioError::Validation(format!(
                "car {} is rented and cannot be deleted",
                car_id
            )));
        }
        self.cars.delete(car_id)
    }

    pub fn delete_contract(&mut self, rent_id: u32) -> Result<()> {
        self.contracts.delete(rent_id)
    }
}
