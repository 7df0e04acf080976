//! # CarRent BinIO
//!
//! Fixed-record binary tables for a small car rental shop:
//! - One file per table: header, hash index, record region
//! - Open-addressing index with linear probing and tombstones
//! - Soft delete with a LIFO free list threaded through record padding
//! - Little-endian on disk, big-endian headers readable
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │          carrent / carrent-seed / carrent-inspect            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 RentalDb (rental, report)                    │
//! │        validation, cross-table ordering, status guard        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!        ┌──────────────┼──────────────┐
//!        ▼              ▼              ▼
//!  Table<Customer>  Table<Car>   Table<Contract>
//!        │              │              │
//!        └──────────────┼──────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Index    │          │    Store    │
//!   │  (probing)  │          │ (free list) │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬───────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │    Layout    │
//!               │ (header/slot)│
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod layout;
pub mod index;
pub mod store;
pub mod table;
pub mod entity;

pub mod rental;
pub mod report;
pub mod seed;
pub mod inspect;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BinioError, Result};
pub use config::Config;
pub use table::Table;
pub use rental::RentalDb;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the crate, printed in reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
