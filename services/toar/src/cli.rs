//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use radiometry::ConversionMode;

use crate::config::{FailurePolicy, ToarConfig};

/// Convert WorldView-2 DN rasters to top-of-atmosphere radiance or reflectance
#[derive(Parser, Debug)]
#[command(name = "toar")]
#[command(about = "Converts WorldView-2 digital numbers to Top-of-Atmosphere Spectral Radiance or Reflectance")]
pub struct Args {
    /// Raster store directory
    #[arg(long, env = "TOAR_STORE")]
    pub store: Option<PathBuf>,

    /// Band rasters to convert (comma separated or repeated)
    #[arg(short, long = "band", value_delimiter = ',')]
    pub bands: Vec<String>,

    /// Suffix for output rasters [default: toar, rad with --radiance]
    #[arg(long)]
    pub output_suffix: Option<String>,

    /// Acquisition time in UTC as found in the .IMD file, e.g. 2014_11_12T16:47:08.000000Z
    #[arg(long)]
    pub utc: Option<String>,

    /// Day of year (1-365), overrides --utc
    #[arg(long)]
    pub doy: Option<u32>,

    /// Mean sun elevation angle in degrees
    #[arg(long)]
    pub sea: Option<f64>,

    /// Convert to at-sensor radiance only
    #[arg(short, long)]
    pub radiance: bool,

    /// Keep the current region instead of matching each band's region
    #[arg(short, long)]
    pub keep_region: bool,

    /// Print the conversion formulas
    #[arg(short, long)]
    pub info: bool,

    /// Also write the intermediate radiance as <band>.rad
    #[arg(long)]
    pub keep_radiance: bool,

    /// Continue with the remaining bands when one fails
    #[arg(long)]
    pub skip_failed_bands: bool,

    /// YAML calibration table replacing the built-in WorldView-2 constants
    #[arg(long)]
    pub calibration: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl Args {
    /// Apply command-line values over `config`.
    pub fn apply_to(&self, config: &mut ToarConfig) {
        if let Some(store) = &self.store {
            config.store = store.clone();
        }
        if !self.bands.is_empty() {
            config.bands = self.bands.clone();
        }
        if let Some(suffix) = &self.output_suffix {
            config.output_suffix = suffix.clone();
        }
        if let Some(utc) = &self.utc {
            config.utc = Some(utc.clone());
        }
        if let Some(doy) = self.doy {
            config.doy = Some(doy);
        }
        if let Some(sea) = self.sea {
            config.sun_elevation = Some(sea);
        }
        if self.radiance {
            config.mode = ConversionMode::Radiance;
        }
        if self.keep_region {
            config.keep_region = true;
        }
        if self.keep_radiance {
            config.keep_radiance = true;
        }
        if self.skip_failed_bands {
            config.failure_policy = FailurePolicy::SkipBand;
        }
        if let Some(calibration) = &self.calibration {
            config.calibration = Some(calibration.clone());
        }
    }
}
