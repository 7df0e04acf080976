//! Tests for the rental application layer
//!
//! These tests verify:
//! - Input validation before any write
//! - Contract lifecycle across the cars and contracts tables
//! - The car status guard against open contracts
//! - Delete policies and views

use carrent_binio::entity::{CarStatus, Gender};
use carrent_binio::rental::dates::{format_ymd, parse_ymd, rental_days};
use carrent_binio::rental::validate::{is_id_card, is_phone, parse_status, rate_to_cents};
use carrent_binio::rental::{CarChanges, CustomerChanges, NewCar, NewCustomer, RentalDb};
use carrent_binio::{BinioError, Config};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_db() -> (TempDir, RentalDb) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path().join("data"))
        .customer_index_slots(16)
        .car_index_slots(16)
        .contract_index_slots(32)
        .build();
    let db = RentalDb::open(&config).unwrap();
    (temp_dir, db)
}

fn new_customer(name: &str) -> NewCustomer {
    NewCustomer {
        name: name.to_string(),
        id_card: "1103700000001".to_string(),
        phone: "0812345678".to_string(),
        birth_ymd: 19_900_101,
        gender: Gender::Male,
    }
}

fn new_car(plate: &str) -> NewCar {
    NewCar {
        license: plate.to_string(),
        brand: "Toyota".to_string(),
        model: "Yaris".to_string(),
        year: 2022,
        rate: 1200.0,
        odometer_km: 15_000,
        status: CarStatus::Available,
    }
}

/// One customer, one car, one open contract from 2025-06-01
fn setup_rental() -> (TempDir, RentalDb, u32, u32, u32) {
    let (temp, mut db) = setup_temp_db();
    let cus_id = db.add_customer(new_customer("Somchai Boonmee")).unwrap();
    let car_id = db.add_car(new_car("TH-0001")).unwrap();
    let rent_id = db.open_contract(cus_id, car_id, 20_250_601).unwrap();
    (temp, db, cus_id, car_id, rent_id)
}

fn assert_validation<T: std::fmt::Debug>(result: carrent_binio::Result<T>) {
    match result {
        Err(BinioError::Validation(_)) => {}
        other => panic!("expected validation error, got {:?}", other),
    }
}

// =============================================================================
// Open / Close Tests
// =============================================================================

#[test]
fn test_open_creates_table_files() {
    let (temp, db) = setup_temp_db();
    db.close().unwrap();

    let dir = temp.path().join("data");
    for name in [
        RentalDb::CUSTOMERS_FILE,
        RentalDb::CARS_FILE,
        RentalDb::CONTRACTS_FILE,
    ] {
        assert!(dir.join(name).exists(), "{} missing", name);
    }
}

#[test]
fn test_data_survives_reopen() {
    let (temp, mut db) = setup_temp_db();
    let id = db.add_customer(new_customer("Ploy Deejai")).unwrap();
    db.close().unwrap();

    let mut db = RentalDb::open_path(&temp.path().join("data")).unwrap();
    assert_eq!(db.customer(id).unwrap().unwrap().name, "Ploy Deejai");
}

#[test]
fn test_zero_slots_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .car_index_slots(0)
        .build();
    assert!(matches!(RentalDb::open(&config), Err(BinioError::Config(_))));
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_customer_validation() {
    let (_temp, mut db) = setup_temp_db();

    let mut bad = new_customer("Anan");
    bad.id_card = "12345".to_string();
    assert_validation(db.add_customer(bad));

    let mut bad = new_customer("Anan");
    bad.phone = "08-1234".to_string();
    assert_validation(db.add_customer(bad));

    assert_validation(db.add_customer(new_customer("   ")));

    // Nothing was written and no id was consumed
    assert!(db.list_customers().unwrap().is_empty());
    assert_eq!(db.customers_table().header().next_id, 1);
}

#[test]
fn test_customer_fields_are_trimmed() {
    let (_temp, mut db) = setup_temp_db();
    let mut input = new_customer("  Napat Pattana  ");
    input.phone = " 081234567 ".to_string();
    let id = db.add_customer(input).unwrap();

    let stored = db.customer(id).unwrap().unwrap();
    assert_eq!(stored.name, "Napat Pattana");
    assert_eq!(stored.phone, "081234567");
}

#[test]
fn test_car_validation() {
    let (_temp, mut db) = setup_temp_db();

    assert_validation(db.add_car(new_car("   ")));
    assert_validation(db.add_car(new_car("ABCDEFGHIJKLMNOPQ")));

    let mut bad = new_car("TH-1");
    bad.year = 1899;
    assert_validation(db.add_car(bad));

    let mut bad = new_car("TH-1");
    bad.rate = -1.0;
    assert_validation(db.add_car(bad));

    let mut bad = new_car("TH-1");
    bad.odometer_km = -5;
    assert_validation(db.add_car(bad));

    assert!(db.list_cars().unwrap().is_empty());
}

#[test]
fn test_rate_is_stored_in_cents() {
    let (_temp, mut db) = setup_temp_db();
    let mut input = new_car("TH-0002");
    input.rate = 1499.999;
    let id = db.add_car(input).unwrap();
    assert_eq!(db.car(id).unwrap().unwrap().rate_cents, 150_000);
    assert_eq!(rate_to_cents(12.34).unwrap(), 1234);
}

#[test]
fn test_long_plate_is_accepted_and_truncated() {
    let (_temp, mut db) = setup_temp_db();
    let id = db.add_car(new_car("ABCDEFGHIJKLMNOP")).unwrap();
    assert_eq!(db.car(id).unwrap().unwrap().license, "ABCDEFGHIJKL");
}

#[test]
fn test_validators() {
    assert!(is_id_card("1103700000001"));
    assert!(!is_id_card("110370000000a"));
    assert!(is_phone("081234567"));
    assert!(is_phone("0812345678"));
    assert!(!is_phone("08123456789"));
}

// =============================================================================
// Contract Lifecycle Tests
// =============================================================================

#[test]
fn test_open_contract_rents_car() {
    let (_temp, mut db, cus_id, car_id, rent_id) = setup_rental();

    let contract = db.contract(rent_id).unwrap().unwrap();
    assert_eq!(contract.cus_id, cus_id);
    assert_eq!(contract.car_id, car_id);
    assert_eq!(contract.rent_ymd, 20_250_601);
    assert_eq!(contract.return_ymd, 0);
    assert_eq!(contract.total_cents, 0);
    assert!(contract.is_open());

    assert_eq!(db.car(car_id).unwrap().unwrap().status, CarStatus::Rented);
}

#[test]
fn test_open_contract_requires_available_car() {
    let (_temp, mut db, cus_id, car_id, _rent_id) = setup_rental();
    assert_validation(db.open_contract(cus_id, car_id, 20_250_610));
    assert_validation(db.open_contract(cus_id, 999, 20_250_610));
}

#[test]
fn test_open_contract_requires_customer() {
    let (_temp, mut db) = setup_temp_db();
    let car_id = db.add_car(new_car("TH-0009")).unwrap();
    assert_validation(db.open_contract(77, car_id, 20_250_601));
    assert_eq!(db.car(car_id).unwrap().unwrap().status, CarStatus::Available);
    assert!(db.list_contracts().unwrap().is_empty());
}

#[test]
fn test_return_car_closes_contract() {
    let (_temp, mut db, _cus_id, car_id, rent_id) = setup_rental();

    let receipt = db.return_car(rent_id, 20_250_604).unwrap();
    assert_eq!(receipt.days, 3);
    assert_eq!(receipt.total_cents, 360_000);

    let contract = db.contract(rent_id).unwrap().unwrap();
    assert!(contract.returned);
    assert_eq!(contract.return_ymd, 20_250_604);
    assert_eq!(contract.total_cents, 360_000);
    assert_eq!(db.car(car_id).unwrap().unwrap().status, CarStatus::Available);
}

#[test]
fn test_same_day_return_charges_one_day() {
    let (_temp, mut db, _cus_id, _car_id, rent_id) = setup_rental();
    let receipt = db.return_car(rent_id, 20_250_601).unwrap();
    assert_eq!(receipt.days, 1);
    assert_eq!(receipt.total_cents, 120_000);
}

#[test]
fn test_return_car_rejections() {
    let (_temp, mut db, _cus_id, _car_id, rent_id) = setup_rental();

    assert_validation(db.return_car(rent_id, 20_250_531));
    assert!(matches!(db.return_car(999, 20_250_610), Err(BinioError::NotFound(999))));

    db.return_car(rent_id, 20_250_602).unwrap();
    assert_validation(db.return_car(rent_id, 20_250_603));
}

#[test]
fn test_return_keeps_non_rented_status() {
    let (_temp, mut db, _cus_id, car_id, rent_id) = setup_rental();
    // Bypass the guard to put the car in maintenance while rented out
    let mut car = db.car(car_id).unwrap().unwrap();
    car.status = CarStatus::Maintenance;
    db.cars_table().update(car_id, &car).unwrap();

    db.return_car(rent_id, 20_250_603).unwrap();
    assert_eq!(db.car(car_id).unwrap().unwrap().status, CarStatus::Maintenance);
}

// =============================================================================
// Status Guard Tests
// =============================================================================

#[test]
fn test_rented_to_available_auto_closes_contract() {
    let (_temp, mut db, _cus_id, car_id, rent_id) = setup_rental();

    let changes = CarChanges {
        status: Some(CarStatus::Available),
        ..Default::default()
    };
    let outcome = db.update_car(car_id, changes, 20_250_605).unwrap();

    let receipt = outcome.closed_contract.unwrap();
    assert_eq!(receipt.rent_id, rent_id);
    assert_eq!(receipt.days, 4);
    assert_eq!(receipt.total_cents, 480_000);
    assert_eq!(outcome.car.status, CarStatus::Available);

    let contract = db.contract(rent_id).unwrap().unwrap();
    assert!(contract.returned);
    assert_eq!(contract.return_ymd, 20_250_605);
}

#[test]
fn test_auto_close_charges_the_old_rate() {
    let (_temp, mut db, _cus_id, car_id, _rent_id) = setup_rental();
    let changes = CarChanges {
        status: Some(CarStatus::Available),
        rate: Some(2000.0),
        ..Default::default()
    };
    let outcome = db.update_car(car_id, changes, 20_250_602).unwrap();
    assert_eq!(outcome.closed_contract.unwrap().total_cents, 120_000);
    assert_eq!(outcome.car.rate_cents, 200_000);
}

#[test]
fn test_leaving_rented_otherwise_is_rejected() {
    let (_temp, mut db, _cus_id, car_id, rent_id) = setup_rental();

    for status in [CarStatus::Maintenance, CarStatus::Retired] {
        let changes = CarChanges {
            status: Some(status),
            ..Default::default()
        };
        assert_validation(db.update_car(car_id, changes, 20_250_605));
    }

    // Nothing changed on either side
    assert_eq!(db.car(car_id).unwrap().unwrap().status, CarStatus::Rented);
    assert!(db.contract(rent_id).unwrap().unwrap().is_open());
}

#[test]
fn test_rented_car_can_change_other_fields() {
    let (_temp, mut db, _cus_id, car_id, rent_id) = setup_rental();
    let changes = CarChanges {
        odometer_km: Some(16_000),
        ..Default::default()
    };
    let outcome = db.update_car(car_id, changes, 20_250_605).unwrap();
    assert_eq!(outcome.closed_contract, None);
    assert_eq!(outcome.car.odometer_km, 16_000);
    assert_eq!(outcome.car.status, CarStatus::Rented);
    assert!(db.contract(rent_id).unwrap().unwrap().is_open());
}

#[test]
fn test_setting_rented_without_contract_is_rejected() {
    let (_temp, mut db) = setup_temp_db();
    let car_id = db.add_car(new_car("TH-0010")).unwrap();
    let changes = CarChanges {
        status: Some(CarStatus::Rented),
        ..Default::default()
    };
    assert_validation(db.update_car(car_id, changes, 20_250_605));
    assert_eq!(db.car(car_id).unwrap().unwrap().status, CarStatus::Available);
}

#[test]
fn test_invalid_fields_block_auto_close() {
    let (_temp, mut db, _cus_id, car_id, rent_id) = setup_rental();
    let changes = CarChanges {
        status: Some(CarStatus::Available),
        year: Some(1800),
        ..Default::default()
    };
    assert_validation(db.update_car(car_id, changes, 20_250_605));
    assert!(db.contract(rent_id).unwrap().unwrap().is_open());
    assert_eq!(db.car(car_id).unwrap().unwrap().status, CarStatus::Rented);
}

#[test]
fn test_update_missing_car_is_not_found() {
    let (_temp, mut db) = setup_temp_db();
    let result = db.update_car(5, CarChanges::default(), 20_250_605);
    assert!(matches!(result, Err(BinioError::NotFound(5))));
}

// =============================================================================
// Customer Update Tests
// =============================================================================

#[test]
fn test_update_customer_merges_changes() {
    let (_temp, mut db) = setup_temp_db();
    let id = db.add_customer(new_customer("Warin Inthra")).unwrap();

    let changes = CustomerChanges {
        phone: Some("0899999999".to_string()),
        gender: Some(Gender::Female),
        ..Default::default()
    };
    let updated = db.update_customer(id, changes).unwrap();
    assert_eq!(updated.name, "Warin Inthra");
    assert_eq!(updated.phone, "0899999999");
    assert_eq!(updated.gender, Gender::Female);
    assert_eq!(db.customer(id).unwrap().unwrap(), updated);
}

#[test]
fn test_update_customer_validates_merged_record() {
    let (_temp, mut db) = setup_temp_db();
    let id = db.add_customer(new_customer("Warin Inthra")).unwrap();
    let changes = CustomerChanges {
        id_card: Some("42".to_string()),
        ..Default::default()
    };
    assert_validation(db.update_customer(id, changes));
    assert!(matches!(
        db.update_customer(99, CustomerChanges::default()),
        Err(BinioError::NotFound(99))
    ));
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_rented_car_cannot_be_deleted() {
    let (_temp, mut db, _cus_id, car_id, _rent_id) = setup_rental();
    assert_validation(db.delete_car(car_id));
    assert!(db.car(car_id).unwrap().is_some());
}

#[test]
fn test_table_layer_allows_deleting_rented_car() {
    let (_temp, mut db, _cus_id, car_id, _rent_id) = setup_rental();
    db.cars_table().delete(car_id).unwrap();
    assert!(db.car(car_id).unwrap().is_none());
}

#[test]
fn test_returned_car_can_be_deleted() {
    let (_temp, mut db, _cus_id, car_id, rent_id) = setup_rental();
    db.return_car(rent_id, 20_250_603).unwrap();
    db.delete_car(car_id).unwrap();
    assert!(matches!(db.delete_car(car_id), Err(BinioError::NotFound(_))));
}

#[test]
fn test_deleted_customer_name_fallback() {
    let (_temp, mut db, cus_id, _car_id, rent_id) = setup_rental();
    db.delete_customer(cus_id).unwrap();

    let contract = db.contract(rent_id).unwrap().unwrap();
    assert_eq!(db.customer_name(contract.cus_id).unwrap(), format!("cus#{}", cus_id));
}

#[test]
fn test_delete_contract() {
    let (_temp, mut db, _cus_id, _car_id, rent_id) = setup_rental();
    db.delete_contract(rent_id).unwrap();
    assert!(db.list_contracts().unwrap().is_empty());
    assert!(matches!(db.delete_contract(rent_id), Err(BinioError::NotFound(_))));
}

#[test]
fn test_ids_are_never_reused() {
    let (_temp, mut db) = setup_temp_db();
    let a = db.add_car(new_car("TH-A")).unwrap();
    let b = db.add_car(new_car("TH-B")).unwrap();
    db.delete_car(b).unwrap();
    let c = db.add_car(new_car("TH-C")).unwrap();

    assert_eq!((a, b, c), (1, 2, 3));
    // The freed record position is reused for the new id
    assert_eq!(db.cars_table().record_count().unwrap(), 2);
}

#[test]
fn test_small_car_index_fills_and_recovers() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .car_index_slots(4)
        .build();
    let mut db = RentalDb::open(&config).unwrap();

    for n in 1..=4 {
        db.add_car(new_car(&format!("TH-{}", n))).unwrap();
    }
    let err = db.add_car(new_car("TH-5")).unwrap_err();
    assert!(matches!(err, BinioError::IndexFull { capacity: 4 }));

    db.delete_car(2).unwrap();
    let id = db.add_car(new_car("TH-6")).unwrap();
    assert_eq!(id, 6);
    assert_eq!(db.car(id).unwrap().unwrap().license, "TH-6");
    assert_eq!(db.cars_table().slot_of(id).unwrap(), Some(2));

    // The failed fifth add left an unindexed record behind
    assert!(db.car(5).unwrap().is_none());
    assert_eq!(db.list_cars().unwrap().len(), 5);
}

// =============================================================================
// View Tests
// =============================================================================

#[test]
fn test_search_customers_ignores_case() {
    let (_temp, mut db) = setup_temp_db();
    db.add_customer(new_customer("Somchai Boonmee")).unwrap();
    db.add_customer(new_customer("Sudarat Srisuk")).unwrap();
    db.add_customer(new_customer("Somsak Thavorn")).unwrap();

    let found: Vec<String> = db
        .search_customers("SOM")
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(found, vec!["Somchai Boonmee", "Somsak Thavorn"]);
}

#[test]
fn test_cars_by_status_and_stats() {
    let (_temp, mut db, _cus_id, _car_id, _rent_id) = setup_rental();
    db.add_car(new_car("TH-0002")).unwrap();
    let mut spare = new_car("TH-0003");
    spare.status = CarStatus::Maintenance;
    db.add_car(spare).unwrap();

    assert_eq!(db.cars_by_status(None).unwrap().len(), 3);
    assert_eq!(db.cars_by_status(Some(CarStatus::Rented)).unwrap().len(), 1);

    let stats = db.stats().unwrap();
    assert_eq!(stats.count(CarStatus::Available), 1);
    assert_eq!(stats.count(CarStatus::Rented), 1);
    assert_eq!(stats.count(CarStatus::Maintenance), 1);
    assert_eq!(stats.count(CarStatus::Retired), 0);
    assert_eq!(stats.open_contracts, 1);
}

#[test]
fn test_contracts_in_range_is_inclusive() {
    let (_temp, mut db) = setup_temp_db();
    let cus = db.add_customer(new_customer("Kittisak Prasert")).unwrap();
    for (n, day) in [20_250_601, 20_250_615, 20_250_630].into_iter().enumerate() {
        let car = db.add_car(new_car(&format!("TH-R{}", n))).unwrap();
        db.open_contract(cus, car, day).unwrap();
    }

    let hits = db.contracts_in_range(20_250_601, 20_250_615).unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn test_open_contracts_by_car_keeps_latest() {
    let (_temp, mut db, cus_id, car_id, first) = setup_rental();
    // A second open contract for the same car, written past the guard
    let mut second = db.contract(first).unwrap().unwrap();
    second.rent_id = db.contracts_table().next_id().unwrap();
    second.rent_ymd = 20_250_610;
    db.contracts_table().add(second.rent_id, &second).unwrap();

    let latest = db.open_contract_for(car_id).unwrap().unwrap();
    assert_eq!(latest.rent_id, second.rent_id);
    assert_eq!(latest.cus_id, cus_id);
}

#[test]
fn test_parse_status() {
    assert_eq!(parse_status("").unwrap(), None);
    assert_eq!(parse_status("rented").unwrap(), Some(CarStatus::Rented));
    assert_eq!(parse_status("2").unwrap(), Some(CarStatus::Maintenance));
    assert_eq!(parse_status("ava").unwrap(), Some(CarStatus::Available));
    assert_eq!(parse_status("RET").unwrap(), Some(CarStatus::Retired));
    assert_validation(parse_status("re"));
    assert_validation(parse_status("7"));
    assert_validation(parse_status("sold"));
}

// =============================================================================
// Date Tests
// =============================================================================

#[test]
fn test_date_helpers() {
    assert_eq!(parse_ymd("2025-07-14").unwrap(), 20_250_714);
    assert_eq!(parse_ymd("").unwrap(), 0);
    assert_validation(parse_ymd("2025-02-30"));
    assert_eq!(format_ymd(20_250_714), "2025-07-14");
    assert_eq!(format_ymd(0), "-");
    assert_eq!(rental_days(20_250_228, 20_250_301).unwrap(), 1);
    assert_eq!(rental_days(20_241_228, 20_250_103).unwrap(), 6);
}
