//! Tests for the seeder, the fleet report and the header inspector
//!
//! These tests verify:
//! - Seeding is deterministic for a seed and leaves consistent tables
//! - The report covers deleted cars and missing customers
//! - Header inspection reads counts and sizes without touching records

use std::fs;
use std::path::Path;

use carrent_binio::entity::{CarStatus, CAR_SIZE, CUSTOMER_SIZE};
use carrent_binio::inspect::{inspect_file, table_kind};
use carrent_binio::layout::{HEADER_SIZE, INDEX_SLOT_SIZE};
use carrent_binio::report::{generate_report, money, write_report};
use carrent_binio::seed::{seed, SeedPlan};
use carrent_binio::{BinioError, Config, RentalDb};
use tempfile::TempDir;

const CAR_SLOTS: u32 = 32;
const CUSTOMER_SLOTS: u32 = 32;

// =============================================================================
// Helper Functions
// =============================================================================

fn open_db(dir: &Path) -> RentalDb {
    let config = Config::builder()
        .data_dir(dir)
        .customer_index_slots(CUSTOMER_SLOTS)
        .car_index_slots(CAR_SLOTS)
        .contract_index_slots(32)
        .build();
    RentalDb::open(&config).unwrap()
}

fn plan(seed: u64) -> SeedPlan {
    SeedPlan {
        customers: 6,
        cars: 6,
        contracts: None,
        seed,
        report: false,
    }
}

/// Overwrite one byte of record `rec_index` in a closed table file
fn corrupt_byte(path: &Path, slots: u32, record_size: usize, rec_index: u32, offset: usize) {
    let mut bytes = fs::read(path).unwrap();
    let at = HEADER_SIZE
        + slots as usize * INDEX_SLOT_SIZE
        + rec_index as usize * record_size
        + offset;
    bytes[at] = 0xEE;
    fs::write(path, bytes).unwrap();
}

/// A seeded database in a fresh directory
fn setup_seeded() -> (TempDir, RentalDb) {
    let temp = TempDir::new().unwrap();
    let mut db = open_db(temp.path());
    seed(&mut db, &plan(7)).unwrap();
    (temp, db)
}

// =============================================================================
// Seed Tests
// =============================================================================

#[test]
fn test_default_contract_target() {
    assert_eq!(SeedPlan::default().contract_target(), 5);
    let small = SeedPlan {
        customers: 1,
        cars: 9,
        ..SeedPlan::default()
    };
    assert_eq!(small.contract_target(), 1);
    let explicit = SeedPlan {
        contracts: Some(8),
        ..SeedPlan::default()
    };
    assert_eq!(explicit.contract_target(), 8);
}

#[test]
fn test_seed_counts() {
    let temp = TempDir::new().unwrap();
    let mut db = open_db(temp.path());
    let summary = seed(&mut db, &plan(7)).unwrap();

    assert_eq!(summary.customer_ids, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(summary.car_ids, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(summary.contract_ids.len(), 3);
    // Contracts alternate returned / open
    assert_eq!(summary.open_contracts, 1);

    let stats = db.stats().unwrap();
    assert_eq!(stats.open_contracts, 1);
    assert_eq!(stats.count(CarStatus::Rented), 1);
    assert_eq!(stats.count(CarStatus::Available), 5);
}

#[test]
fn test_seed_is_deterministic() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let mut a = open_db(first.path());
    let mut b = open_db(second.path());

    assert_eq!(seed(&mut a, &plan(99)).unwrap(), seed(&mut b, &plan(99)).unwrap());
    assert_eq!(a.list_customers().unwrap(), b.list_customers().unwrap());
    assert_eq!(a.list_contracts().unwrap(), b.list_contracts().unwrap());

    let shape = |db: &mut RentalDb| -> Vec<(String, String, String, u16, u32)> {
        db.list_cars()
            .unwrap()
            .into_iter()
            .map(|c| (c.license, c.brand, c.model, c.year, c.rate_cents))
            .collect()
    };
    assert_eq!(shape(&mut a), shape(&mut b));
}

#[test]
fn test_seeded_records_are_valid() {
    let (_temp, mut db) = setup_seeded();

    for customer in db.list_customers().unwrap() {
        assert_eq!(customer.id_card.len(), 13);
        assert!(customer.phone.starts_with("08"));
        assert_eq!(customer.phone.len(), 10);
    }
    for car in db.list_cars().unwrap() {
        assert_eq!(car.license, format!("TH-{:04}", car.car_id));
        assert!(car.year >= 2017);
    }
    for contract in db.list_contracts().unwrap() {
        if contract.returned {
            assert!(contract.return_ymd > contract.rent_ymd);
            assert!(contract.total_cents > 0);
        } else {
            let car = db.car(contract.car_id).unwrap().unwrap();
            assert_eq!(car.status, CarStatus::Rented);
        }
    }
}

#[test]
fn test_seed_appends_to_existing_data() {
    let (_temp, mut db) = setup_seeded();
    let summary = seed(&mut db, &plan(8)).unwrap();
    assert_eq!(summary.customer_ids.first(), Some(&7));
    assert_eq!(db.list_customers().unwrap().len(), 12);
}

#[test]
fn test_seed_with_report_writes_file() {
    let temp = TempDir::new().unwrap();
    let mut db = open_db(temp.path());
    let plan = SeedPlan {
        report: true,
        ..plan(3)
    };
    seed(&mut db, &plan).unwrap();

    let text = fs::read_to_string(db.report_path()).unwrap();
    assert!(text.starts_with("Car Rent System - Summary Report"));
}

// =============================================================================
// Report Tests
// =============================================================================

#[test]
fn test_report_sections() {
    let (_temp, mut db) = setup_seeded();
    let text = generate_report(&mut db).unwrap();

    for section in [
        "Generated At",
        "App Version",
        "Endianness   : Little-Endian",
        "Summary (Active only)",
        "Rate Statistics (THB/day, Active only)",
        "Cars by Brand (Active only)",
        "Open Rentals",
    ] {
        assert!(text.contains(section), "missing '{}'", section);
    }
    assert!(text.contains("- Total Cars (records) : 6"));
    assert!(text.contains("- Currently Rented     : 1"));
}

#[test]
fn test_report_lists_deleted_cars() {
    let (_temp, mut db) = setup_seeded();
    let deleted = db
        .cars_by_status(Some(CarStatus::Available))
        .unwrap()
        .remove(0)
        .car_id;
    db.delete_car(deleted).unwrap();

    let text = generate_report(&mut db).unwrap();
    assert!(text.contains("Deleted"));
    assert!(text.contains("- Total Cars (records) : 6"));
    assert!(text.contains("- Active Cars          : 5"));
    assert!(text.contains("- Deleted Cars         : 1"));
}

#[test]
fn test_report_falls_back_for_missing_customer() {
    let temp = TempDir::new().unwrap();
    let mut db = open_db(temp.path());
    seed(
        &mut db,
        &SeedPlan {
            customers: 1,
            cars: 2,
            contracts: Some(2),
            ..plan(5)
        },
    )
    .unwrap();
    db.delete_customer(1).unwrap();

    let text = generate_report(&mut db).unwrap();
    assert!(text.contains("cus#1"));
}

#[test]
fn test_report_skips_unreadable_records() {
    let (temp, mut db) = setup_seeded();
    let spare = db
        .cars_by_status(Some(CarStatus::Available))
        .unwrap()
        .remove(0)
        .car_id;
    let renter = db
        .list_contracts()
        .unwrap()
        .into_iter()
        .find(|c| c.is_open())
        .unwrap()
        .cus_id;
    db.close().unwrap();

    // Status byte of a car, gender byte of the open contract's customer
    let cars = temp.path().join(RentalDb::CARS_FILE);
    corrupt_byte(&cars, CAR_SLOTS, CAR_SIZE, spare - 1, 55);
    let customers = temp.path().join(RentalDb::CUSTOMERS_FILE);
    corrupt_byte(&customers, CUSTOMER_SLOTS, CUSTOMER_SIZE, renter - 1, 82);

    let mut db = open_db(temp.path());
    assert!(matches!(db.car(spare), Err(BinioError::Format(_))));

    let text = generate_report(&mut db).unwrap();
    assert!(text.contains("- Total Cars (records) : 5"));
    assert!(text.contains("- Unreadable Records   : 1"));
    assert!(text.contains(&format!("cus#{}", renter)));
}

#[test]
fn test_empty_report() {
    let temp = TempDir::new().unwrap();
    let mut db = open_db(temp.path());
    let path = temp.path().join("out.txt");
    write_report(&mut db, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("(no active cars)"));
    assert!(text.contains("(none)"));
    assert!(text.contains("- Min : 0.00"));
}

#[test]
fn test_money_formatting() {
    assert_eq!(money(0.0), "0.00");
    assert_eq!(money(999.5), "999.50");
    assert_eq!(money(1234.5), "1,234.50");
    assert_eq!(money(1_234_567.891), "1,234,567.89");
    assert_eq!(money(-2500.0), "-2,500.00");
}

// =============================================================================
// Inspect Tests
// =============================================================================

#[test]
fn test_inspect_cars_file() {
    let (temp, db) = setup_seeded();
    db.close().unwrap();

    let report = inspect_file(&temp.path().join(RentalDb::CARS_FILE)).unwrap();
    assert_eq!(report.table, "cars");
    assert_eq!(report.magic, "CARS");
    assert_eq!(report.endianness, "Little-Endian");
    assert_eq!(usize::from(report.record_size), CAR_SIZE);
    assert_eq!(report.index_slots, CAR_SLOTS);
    assert_eq!(report.index_slot_size, INDEX_SLOT_SIZE);
    assert_eq!(report.next_id, 7);
    assert_eq!(report.active_count, 6);
    assert_eq!(report.deleted_count, 0);
    assert_eq!(report.free_head, -1);
    assert_eq!(report.total_records, 6);
    let expected = HEADER_SIZE + CAR_SLOTS as usize * INDEX_SLOT_SIZE + 6 * CAR_SIZE;
    assert_eq!(report.file_size, expected as u64);
}

#[test]
fn test_inspect_reports_free_head() {
    let (temp, mut db) = setup_seeded();
    let id = db
        .cars_by_status(Some(CarStatus::Available))
        .unwrap()
        .remove(0)
        .car_id;
    db.delete_car(id).unwrap();
    db.close().unwrap();

    let report = inspect_file(&temp.path().join(RentalDb::CARS_FILE)).unwrap();
    assert_eq!(report.active_count, 5);
    assert_eq!(report.deleted_count, 1);
    assert_eq!(report.free_head, i64::from(id - 1));
    assert_eq!(report.total_records, 6);
}

#[test]
fn test_inspect_truncated_file_is_format_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("short.bin");
    fs::write(&path, [0u8; 50]).unwrap();
    assert!(matches!(inspect_file(&path), Err(BinioError::Format(_))));
}

#[test]
fn test_inspect_json_fields() {
    let (temp, db) = setup_seeded();
    db.close().unwrap();

    let report = inspect_file(&temp.path().join(RentalDb::CONTRACTS_FILE)).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["table"], "contracts");
    assert_eq!(json["next_id"], 4);
    assert_eq!(json["free_head"], -1);
    assert!(json["created_at_str"].is_string());

    let rendered = report.render();
    assert!(rendered.contains("Type : contracts  (magic=CONT)"));
    assert!(rendered.contains("Free-list Head : -1"));
}

#[test]
fn test_table_kind() {
    assert_eq!(table_kind(b"CUST"), "customers");
    assert_eq!(table_kind(b"CARS"), "cars");
    assert_eq!(table_kind(b"CONT"), "contracts");
    assert_eq!(table_kind(b"XXXX"), "unknown");
}
