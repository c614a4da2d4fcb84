//! rpmscan - list installed packages from an RPM Berkeley DB database
//!
//! Reads the `Packages` file written by rpm's Berkeley DB backend and
//! prints one line per installed package, optionally with extra tags.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use rpmscan_engine::{RpmDb, TagId};

/// List installed packages from an RPM Berkeley DB database
#[derive(Parser, Debug)]
#[command(name = "rpmscan")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the Packages database
    #[arg(default_value = "/var/lib/rpm/Packages")]
    db_path: PathBuf,

    /// Additional tag ID to capture for every package (repeatable)
    #[arg(short, long = "tag")]
    tags: Vec<i32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut db = RpmDb::open(&args.db_path)?;
    debug!(
        declared = db.declared_package_count(),
        "opened {}",
        args.db_path.display()
    );

    if args.tags.is_empty() {
        for pkg in db.list_packages()? {
            println!(
                "{:<50} {:>12} {:<24} {:<28} {}",
                pkg.nevra(),
                pkg.size,
                pkg.license,
                pkg.vendor,
                pkg.source_rpm
            );
        }
    } else {
        let requested: Vec<TagId> = args.tags.iter().map(|&id| TagId(id)).collect();
        for pkg in db.list_packages_with_tags(&requested)? {
            println!("{}", pkg.info.nevra());
            for (tag, value) in &pkg.tags_map {
                println!("  {tag} = {value}");
            }
        }
    }

    Ok(())
}
