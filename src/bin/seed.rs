//! CarRent Sample Data Seeder
//!
//! Appends generated customers, cars and contracts to a data directory.

use std::path::PathBuf;

use clap::Parser;
use carrent_binio::seed::{seed, SeedPlan};
use carrent_binio::{Config, RentalDb};
use tracing_subscriber::{fmt, EnvFilter};

/// CarRent sample data seeder
#[derive(Parser, Debug)]
#[command(name = "carrent-seed")]
#[command(about = "Fill CarRent binary files with sample data")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Customers to add
    #[arg(long, default_value = "10")]
    customers: usize,

    /// Cars to add
    #[arg(long, default_value = "10")]
    cars: usize,

    /// Contracts to open (default: half of min(customers, cars), at least 1)
    #[arg(long)]
    contracts: Option<usize>,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Write report.txt afterwards
    #[arg(long)]
    report: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,carrent_binio=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    tracing::info!("CarRent seeder v{}", carrent_binio::VERSION);
    tracing::info!("Data directory: {}", args.data_dir.display());

    let config = Config::builder().data_dir(&args.data_dir).build();
    let mut db = match RentalDb::open(&config) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open data directory: {}", e);
            std::process::exit(1);
        }
    };

    let plan = SeedPlan {
        customers: args.customers,
        cars: args.cars,
        contracts: args.contracts,
        seed: args.seed,
        report: args.report,
    };

    let outcome = seed(&mut db, &plan);
    let closed = db.close();

    match (outcome, closed) {
        (Ok(summary), Ok(())) => {
            println!(
                "Seeded customers={}, cars={}, contracts={} ({} open)",
                summary.customer_ids.len(),
                summary.car_ids.len(),
                summary.contract_ids.len(),
                summary.open_contracts
            );
            if plan.report {
                println!("Report: {}", args.data_dir.join(RentalDb::REPORT_FILE).display());
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Seeding failed: {}", e);
            std::process::exit(1);
        }
    }
}
