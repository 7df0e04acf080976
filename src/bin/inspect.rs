//! CarRent Header Inspector
//!
//! Prints the header of one or more table files.

use std::path::PathBuf;

use clap::Parser;
use carrent_binio::inspect::inspect_file;
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

/// CarRent header inspector
#[derive(Parser, Debug)]
#[command(name = "carrent-inspect")]
#[command(about = "Inspect the 128-byte header of CarRent binary files")]
#[command(version)]
struct Args {
    /// Files to inspect
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Print a JSON array instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut entries = Vec::new();

    for path in &args.paths {
        match inspect_file(path) {
            Ok(report) if args.json => entries.push(json!(report)),
            Ok(report) => println!("\n{}", report.render().trim_end()),
            Err(e) if args.json => entries.push(json!({
                "file": path.display().to_string(),
                "error": e.to_string(),
            })),
            Err(e) => println!("\nFile : {}\n! Error : {}", path.display(), e),
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&entries) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                tracing::error!("JSON encoding failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
