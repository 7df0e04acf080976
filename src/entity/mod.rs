//! Entity Module
//!
//! Record layouts of the three rental tables.
//!
//! ## Record Layouts (offsets in bytes)
//! ```text
//! Customer (128)  flag 0 | cus_id 1 | id_card[13] 5 | name[50] 18
//!                 phone[10] 68 | birth_ymd 78 | gender 82 | pad 83..128
//! Car (128)       flag 0 | car_id 1 | license[12] 5 | brand[12] 17
//!                 model[16] 29 | year u16 45 | rate_cents 47 | odometer 51
//!                 status 55 | updated_at 56 | pad 60..128
//! Contract (64)   flag 0 | rent_id 1 | cus_id 5 | car_id 9 | rent_ymd 13
//!                 return_ymd 17 | total_cents 21 | returned 25 | pad 26..64
//! ```
//!
//! The first 4 pad bytes of each layout hold the free-list link while the
//! record is deleted.

mod car;
mod contract;
mod customer;

use crate::table::Table;

pub use car::{Car, CarStatus, CAR_SIZE};
pub use contract::{Contract, CONTRACT_SIZE};
pub use customer::{Customer, Gender, CUSTOMER_SIZE};

/// customers.bin
pub type Customers = Table<Customer>;

/// cars.bin
pub type Cars = Table<Car>;

/// contracts.bin
pub type Contracts = Table<Contract>;
