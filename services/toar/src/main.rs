//! TOA conversion CLI
//!
//! Converts WorldView-2 DN rasters in a raster store to top-of-atmosphere
//! spectral radiance or planetary reflectance.

use std::sync::atomic::AtomicBool;

use anyhow::{bail, Context, Result};
use clap::Parser;
use raster_store::FsRasterStore;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use toar::cli::Args;
use toar::ToarConfig;

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    if args.info {
        println!("{}", radiometry::formula_summary());
        if args.bands.is_empty() && args.config.is_none() {
            return Ok(());
        }
    }

    let mut config = match &args.config {
        Some(path) => ToarConfig::from_yaml_file(path)?,
        None => ToarConfig::default(),
    };
    config.apply_env()?;
    args.apply_to(&mut config);

    if let Err(e) = config.validate() {
        bail!("Invalid configuration: {}", e);
    }

    let table = config.calibration_table()?;
    let mut store = FsRasterStore::open(&config.store)
        .with_context(|| format!("Failed to open raster store {:?}", config.store))?;

    info!(store = ?config.store, bands = ?config.bands, "Starting conversion");

    let cancel = AtomicBool::new(false);
    let report = toar::run(&mut store, &config, table, &cancel)?;

    for failure in &report.failures {
        error!(band = %failure.band, reason = %failure.reason, "Band not converted");
    }
    for output in &report.outputs {
        println!("{}", output);
    }

    if report.outputs.is_empty() {
        bail!("No band was converted");
    }
    Ok(())
}
