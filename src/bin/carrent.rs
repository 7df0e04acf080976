//! CarRent Interactive Menu
//!
//! Line-oriented menu over a data directory. Writes `report.txt` on exit.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use carrent_binio::config::{DEFAULT_CAR_SLOTS, DEFAULT_CONTRACT_SLOTS, DEFAULT_CUSTOMER_SLOTS};
use carrent_binio::entity::{Car, CarStatus, Gender};
use carrent_binio::rental::dates::{format_ymd, parse_ymd, today_ymd};
use carrent_binio::rental::validate::parse_status;
use carrent_binio::rental::{CarChanges, CustomerChanges, NewCar, NewCustomer};
use carrent_binio::{report, BinioError, Config, RentalDb, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// CarRent interactive menu
#[derive(Parser, Debug)]
#[command(name = "carrent")]
#[command(about = "Car rental records in fixed-length binary files")]
#[command(version)]
struct Args {
    /// Directory holding the .bin files and report.txt
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Index slots for a new customers file
    #[arg(long, default_value_t = DEFAULT_CUSTOMER_SLOTS)]
    customer_slots: u32,

    /// Index slots for a new cars file
    #[arg(long, default_value_t = DEFAULT_CAR_SLOTS)]
    car_slots: u32,

    /// Index slots for a new contracts file
    #[arg(long, default_value_t = DEFAULT_CONTRACT_SLOTS)]
    contract_slots: u32,
}

fn main() {
    // Quiet by default so log lines do not interleave with prompts
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .customer_index_slots(args.customer_slots)
        .car_index_slots(args.car_slots)
        .contract_index_slots(args.contract_slots)
        .build();

    let db = match RentalDb::open(&config) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open {}: {}", args.data_dir.display(), e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut menu = Menu {
        db,
        input: stdin.lock(),
    };
    menu.run();

    let path = menu.db.report_path();
    if let Err(e) = report::write_report(&mut menu.db, &path) {
        eprintln!("! report: {}", e);
    } else {
        println!("* report written to {}", path.display());
    }
    if let Err(e) = menu.db.close() {
        tracing::error!("Close failed: {}", e);
        std::process::exit(1);
    }
}

struct Menu<R> {
    db: RentalDb,
    input: R,
}

impl<R: BufRead> Menu<R> {
    fn run(&mut self) {
        loop {
            println!("\n===== CarRent-BinIO =====");
            println!("1) Add  2) Update  3) Delete  4) View  5) Report  0) Exit");
            let result = match self.ask("Choose: ") {
                Ok(choice) => match choice.as_str() {
                    "1" => self.submenu("[Add] 1) Customer 2) Car 3) Contract  0) Back", Self::add),
                    "2" => self.submenu("[Update] 1) Customer 2) Car 3) Return Car  0) Back", Self::update),
                    "3" => self.submenu("[Delete] 1) Customer 2) Car 3) Contract  0) Back", Self::delete),
                    "4" => self.submenu("[View] 1) Single 2) All 3) Filter 4) Stats  0) Back", Self::view),
                    "5" => self.report(),
                    "0" => return,
                    _ => {
                        println!("! invalid choice");
                        Ok(())
                    }
                },
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                if is_eof(&e) {
                    return;
                }
                println!("! error: {}", e);
            }
        }
    }

    fn submenu(&mut self, title: &str, action: fn(&mut Self, &str) -> Result<()>) -> Result<()> {
        loop {
            println!("\n{}", title);
            let choice = self.ask("Choose: ")?.to_lowercase();
            if matches!(choice.as_str(), "0" | "b" | "back") {
                return Ok(());
            }
            match action(self, &choice) {
                Ok(()) => {}
                Err(e) if is_eof(&e) => return Err(e),
                Err(e) => println!("! {}", e),
            }
        }
    }

    // =========================================================================
    // Prompts
    // =========================================================================

    /// Read one trimmed line; end of input is an `UnexpectedEof` I/O error
    fn ask(&mut self, label: &str) -> Result<String> {
        print!("{}", label);
        io::stdout().flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input").into());
        }
        Ok(line.trim().to_string())
    }

    fn ask_id(&mut self, label: &str) -> Result<u32> {
        let text = self.ask(label)?;
        text.parse()
            .map_err(|_| BinioError::Validation(format!("'{}' is not a valid id", text)))
    }

    fn ask_opt(&mut self, label: &str) -> Result<Option<String>> {
        let text = self.ask(label)?;
        Ok((!text.is_empty()).then_some(text))
    }

    fn ask_opt_num<T: std::str::FromStr>(&mut self, label: &str) -> Result<Option<T>> {
        match self.ask_opt(label)? {
            Some(text) => text
                .parse()
                .map(Some)
                .map_err(|_| BinioError::Validation(format!("'{}' is not a number", text))),
            None => Ok(None),
        }
    }

    fn ask_date(&mut self, label: &str) -> Result<u32> {
        let text = self.ask(label)?.to_lowercase();
        if matches!(text.as_str(), "" | "t" | "today" | "now") {
            return Ok(today_ymd());
        }
        parse_ymd(&text)
    }

    fn ask_gender(&mut self, label: &str) -> Result<Option<Gender>> {
        match self.ask_opt(label)? {
            Some(text) => Gender::parse(&text)
                .map(Some)
                .ok_or_else(|| BinioError::Validation(format!("unknown gender '{}'", text))),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    fn add(&mut self, choice: &str) -> Result<()> {
        match choice {
            "1" => {
                let name = self.ask("name: ")?;
                let id_card = self.ask("id card (13 digits): ")?;
                let phone = self.ask("phone: ")?;
                let birth_ymd = parse_ymd(&self.ask("birth YYYY-MM-DD (blank = none): ")?)?;
                let gender = self.ask_gender("gender male/female/unk: ")?.unwrap_or_default();
                let id = self.db.add_customer(NewCustomer {
                    name,
                    id_card,
                    phone,
                    birth_ymd,
                    gender,
                })?;
                println!("+ customer {}", id);
            }
            "2" => {
                let license = self.ask("plate: ")?;
                let brand = self.ask("brand: ")?;
                let model = self.ask("model: ")?;
                let year = self.ask_opt_num("year: ")?.unwrap_or(0);
                let rate = self.ask_opt_num("rate per day: ")?.unwrap_or(0.0);
                let odometer_km = self.ask_opt_num("odometer km: ")?.unwrap_or(0);
                let status = parse_status(&self.ask("status (blank = available): ")?)?
                    .unwrap_or(CarStatus::Available);
                let id = self.db.add_car(NewCar {
                    license,
                    brand,
                    model,
                    year,
                    rate,
                    odometer_km,
                    status,
                })?;
                println!("+ car {}", id);
            }
            "3" => {
                let cus_id = self.ask_id("cus_id: ")?;
                let car_id = self.ask_id("car_id: ")?;
                let rent_ymd = self.ask_date("rent date YYYY-MM-DD (blank = today): ")?;
                let id = self.db.open_contract(cus_id, car_id, rent_ymd)?;
                println!("+ contract {}", id);
            }
            _ => println!("! invalid choice"),
        }
        Ok(())
    }

    fn update(&mut self, choice: &str) -> Result<()> {
        match choice {
            "1" => {
                let id = self.ask_id("cus_id: ")?;
                if self.db.customer(id)?.is_none() {
                    println!("! customer {} not found", id);
                    return Ok(());
                }
                println!("(blank keeps the current value)");
                let changes = CustomerChanges {
                    name: self.ask_opt("name: ")?,
                    id_card: self.ask_opt("id card: ")?,
                    phone: self.ask_opt("phone: ")?,
                    birth_ymd: self.ask_opt("birth YYYY-MM-DD: ")?.map(|s| parse_ymd(&s)).transpose()?,
                    gender: self.ask_gender("gender male/female/unk: ")?,
                };
                self.db.update_customer(id, changes)?;
                println!("* customer {} updated", id);
            }
            "2" => {
                let id = self.ask_id("car_id: ")?;
                if self.db.car(id)?.is_none() {
                    println!("! car {} not found", id);
                    return Ok(());
                }
                println!("(blank keeps the current value)");
                let changes = CarChanges {
                    license: self.ask_opt("plate: ")?,
                    brand: self.ask_opt("brand: ")?,
                    model: self.ask_opt("model: ")?,
                    year: self.ask_opt_num("year: ")?,
                    rate: self.ask_opt_num("rate per day: ")?,
                    odometer_km: self.ask_opt_num("odometer km: ")?,
                    status: parse_status(&self.ask("status: ")?)?,
                };
                let outcome = self.db.update_car(id, changes, today_ymd())?;
                if let Some(r) = outcome.closed_contract {
                    println!(
                        "* contract {} closed: {:.2} ({} days)",
                        r.rent_id,
                        f64::from(r.total_cents) / 100.0,
                        r.days
                    );
                }
                println!("* car {} updated", id);
            }
            "3" => {
                let rent_id = self.ask_id("rent_id: ")?;
                let return_ymd = self.ask_date("return date YYYY-MM-DD (blank = today): ")?;
                let r = self.db.return_car(rent_id, return_ymd)?;
                println!(
                    "* contract {} closed: {:.2} ({} days)",
                    r.rent_id,
                    f64::from(r.total_cents) / 100.0,
                    r.days
                );
            }
            _ => println!("! invalid choice"),
        }
        Ok(())
    }

    fn delete(&mut self, choice: &str) -> Result<()> {
        match choice {
            "1" => {
                let id = self.ask_id("cus_id: ")?;
                self.db.delete_customer(id)?;
                println!("- customer {} deleted", id);
            }
            "2" => {
                let id = self.ask_id("car_id: ")?;
                self.db.delete_car(id)?;
                println!("- car {} deleted", id);
            }
            "3" => {
                let id = self.ask_id("rent_id: ")?;
                self.db.delete_contract(id)?;
                println!("- contract {} deleted", id);
            }
            _ => println!("! invalid choice"),
        }
        Ok(())
    }

    fn view(&mut self, choice: &str) -> Result<()> {
        match choice {
            "1" => self.view_single(),
            "2" => self.view_all(),
            "3" => self.view_filter(),
            "4" => {
                let stats = self.db.stats()?;
                println!("Cars by status:");
                for status in CarStatus::ALL {
                    println!("  {} = {}", status.label(), stats.count(status));
                }
                println!("Open contracts = {}", stats.open_contracts);
                Ok(())
            }
            _ => {
                println!("! invalid choice");
                Ok(())
            }
        }
    }

    fn ask_kind(&mut self) -> Result<Option<Kind>> {
        let text = self.ask("type (customer/car/contract, 0 = back): ")?.to_lowercase();
        Ok(match text.as_str() {
            "" | "0" | "b" | "back" => None,
            t if t.starts_with("cust") => Some(Kind::Customer),
            t if t.starts_with("car") => Some(Kind::Car),
            t if t.starts_with("cont") => Some(Kind::Contract),
            other => return Err(BinioError::Validation(format!("unknown type '{}'", other))),
        })
    }

    fn view_single(&mut self) -> Result<()> {
        let Some(kind) = self.ask_kind()? else {
            return Ok(());
        };
        let id = self.ask_id("id: ")?;
        match kind {
            Kind::Customer => match self.db.customer(id)? {
                Some(c) => println!(
                    "[Customer] id={} name={} id_card={} phone={} birth={} gender={}",
                    c.cus_id,
                    c.name,
                    c.id_card,
                    c.phone,
                    format_ymd(c.birth_ymd),
                    c.gender.label()
                ),
                None => println!("! not found"),
            },
            Kind::Car => match self.db.car(id)? {
                Some(c) => println!(
                    "[Car] id={} plate={} brand={} model={} year={} rate={:.2} status={}",
                    c.car_id,
                    c.license,
                    c.brand,
                    c.model,
                    c.year,
                    f64::from(c.rate_cents) / 100.0,
                    c.status.label()
                ),
                None => println!("! not found"),
            },
            Kind::Contract => match self.db.contract(id)? {
                Some(c) => println!(
                    "[Contract] id={} cus_id={} car_id={} rent={} return={} total={:.2} returned={}",
                    c.rent_id,
                    c.cus_id,
                    c.car_id,
                    format_ymd(c.rent_ymd),
                    format_ymd(c.return_ymd),
                    f64::from(c.total_cents) / 100.0,
                    c.returned
                ),
                None => println!("! not found"),
            },
        }
        Ok(())
    }

    fn view_all(&mut self) -> Result<()> {
        let Some(kind) = self.ask_kind()? else {
            return Ok(());
        };
        match kind {
            Kind::Customer => {
                for c in self.db.list_customers()? {
                    println!(
                        "{:>4} | {:<24} | {} | {} | {}",
                        c.cus_id,
                        c.name,
                        c.phone,
                        format_ymd(c.birth_ymd),
                        c.gender.label()
                    );
                }
            }
            Kind::Car => self.db.list_cars()?.iter().for_each(print_car),
            Kind::Contract => {
                println!(
                    "{:<7} | {:<6} | {:<24} | {:<6} | {:<22} | total",
                    "Rent_ID", "Cus_ID", "Name", "Car_ID", "Rent_Time"
                );
                for c in self.db.list_contracts()? {
                    let name = self.db.customer_name(c.cus_id)?;
                    let span = format!("{}->{}", format_ymd(c.rent_ymd), format_ymd(c.return_ymd));
                    println!(
                        "{:>7} | {:<6} | {:<24} | {:<6} | {:<22} | {:.2}",
                        c.rent_id,
                        c.cus_id,
                        name,
                        c.car_id,
                        span,
                        f64::from(c.total_cents) / 100.0
                    );
                }
            }
        }
        Ok(())
    }

    fn view_filter(&mut self) -> Result<()> {
        let Some(kind) = self.ask_kind()? else {
            return Ok(());
        };
        match kind {
            Kind::Customer => {
                let query = self.ask("name contains: ")?;
                for c in self.db.search_customers(&query)? {
                    println!("{:>4} | {}", c.cus_id, c.name);
                }
            }
            Kind::Car => {
                let status = parse_status(&self.ask("status (available/rented/maintenance/retired or blank): ")?)?;
                self.db.cars_by_status(status)?.iter().for_each(print_car);
            }
            Kind::Contract => {
                let range = self.ask("range FROM,TO (YYYY-MM-DD,YYYY-MM-DD): ")?;
                let (from, to) = range
                    .split_once(',')
                    .ok_or_else(|| BinioError::Validation("expected FROM,TO".into()))?;
                let (from, to) = (parse_ymd(from)?, parse_ymd(to)?);
                for c in self.db.contracts_in_range(from, to)? {
                    println!("{:>4} | {}", c.rent_id, format_ymd(c.rent_ymd));
                }
            }
        }
        Ok(())
    }

    fn report(&mut self) -> Result<()> {
        let path = self.db.report_path();
        report::write_report(&mut self.db, &path)?;
        println!("* report written to {}", path.display());
        Ok(())
    }
}

enum Kind {
    Customer,
    Car,
    Contract,
}

fn print_car(c: &Car) {
    println!(
        "{:>4} | {:<10} | {:<10} | {:<10} | {} | {:<10.2} | {:<10}",
        c.car_id,
        c.license,
        c.brand,
        c.model,
        c.year,
        f64::from(c.rate_cents) / 100.0,
        c.status.label()
    );
}

fn is_eof(err: &BinioError) -> bool {
    matches!(err, BinioError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
}
