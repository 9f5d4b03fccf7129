//! Configuration for a conversion run.
//!
//! Sources, lowest precedence first: defaults, YAML file, `TOAR_*`
//! environment variables, command-line arguments.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use radiometry::{CalibrationTable, ConversionMode};
use serde::{Deserialize, Serialize};

/// What to do when a single band fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing band.
    #[default]
    Abort,
    /// Report the failure and continue with the remaining bands.
    SkipBand,
}

impl std::str::FromStr for FailurePolicy {
    type Err = anyhow::Error;

    /// Parse from string (case-insensitive, `-` and `_` interchangeable).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "abort" => Ok(Self::Abort),
            "skip" | "skip_band" => Ok(Self::SkipBand),
            _ => bail!("unknown failure policy '{}' (expected abort or skip_band)", s),
        }
    }
}

/// Suffix used for output rasters unless configured otherwise.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "toar";

/// Configuration for one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToarConfig {
    /// Raster store directory.
    pub store: PathBuf,

    /// Input band rasters; `@mapset` qualifiers are allowed.
    pub bands: Vec<String>,

    /// Suffix appended to output raster names.
    pub output_suffix: String,

    /// Acquisition time as written in the `.IMD` metadata.
    pub utc: Option<String>,

    /// Day of year (1..=365), overrides `utc`.
    pub doy: Option<u32>,

    /// Mean sun elevation angle in degrees.
    pub sun_elevation: Option<f64>,

    pub mode: ConversionMode,

    /// Operate on the store's current region instead of each band's own.
    pub keep_region: bool,

    /// Also keep the intermediate radiance when computing reflectance.
    pub keep_radiance: bool,

    pub failure_policy: FailurePolicy,

    /// YAML calibration table replacing the built-in WorldView-2 table.
    pub calibration: Option<PathBuf>,
}

impl Default for ToarConfig {
    fn default() -> Self {
        Self {
            store: PathBuf::from("toar-store"),
            bands: Vec::new(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            utc: None,
            doy: None,
            sun_elevation: None,
            mode: ConversionMode::Reflectance,
            keep_region: false,
            keep_radiance: false,
            failure_policy: FailurePolicy::Abort,
            calibration: None,
        }
    }
}

impl ToarConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a YAML file. Missing keys take their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        tracing::info!(path = ?path, bands = config.bands.len(), "Loaded configuration");
        Ok(config)
    }

    /// Override fields with any `TOAR_*` environment variables that are set.
    ///
    /// A variable that is set but cannot be parsed is an error.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Override fields from `TOAR_*` variables resolved through `lookup`.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(val) = lookup("TOAR_STORE") {
            self.store = PathBuf::from(val);
        }

        if let Some(val) = lookup("TOAR_BANDS") {
            self.bands = split_list(&val);
        }

        if let Some(val) = lookup("TOAR_OUTPUT_SUFFIX") {
            self.output_suffix = val;
        }

        if let Some(val) = lookup("TOAR_UTC") {
            self.utc = Some(val);
        }

        if let Some(val) = lookup("TOAR_DOY") {
            self.doy = Some(parse_var("TOAR_DOY", &val)?);
        }

        if let Some(val) = lookup("TOAR_SEA") {
            self.sun_elevation = Some(parse_var("TOAR_SEA", &val)?);
        }

        if let Some(val) = lookup("TOAR_MODE") {
            self.mode = parse_var("TOAR_MODE", &val)?;
        }

        if let Some(val) = lookup("TOAR_KEEP_REGION") {
            self.keep_region = parse_flag("TOAR_KEEP_REGION", &val)?;
        }

        if let Some(val) = lookup("TOAR_KEEP_RADIANCE") {
            self.keep_radiance = parse_flag("TOAR_KEEP_RADIANCE", &val)?;
        }

        if let Some(val) = lookup("TOAR_FAILURE_POLICY") {
            self.failure_policy = parse_var("TOAR_FAILURE_POLICY", &val)?;
        }

        if let Some(val) = lookup("TOAR_CALIBRATION") {
            self.calibration = Some(PathBuf::from(val));
        }

        Ok(())
    }

    /// Suffix for output rasters; the default `toar` becomes `rad` in radiance mode.
    pub fn effective_suffix(&self) -> &str {
        if self.output_suffix == DEFAULT_OUTPUT_SUFFIX {
            self.mode.default_suffix()
        } else {
            &self.output_suffix
        }
    }

    /// The calibration table to convert with.
    pub fn calibration_table(&self) -> Result<CalibrationTable> {
        match &self.calibration {
            Some(path) => CalibrationTable::from_yaml_file(path)
                .with_context(|| format!("Failed to load calibration table: {:?}", path)),
            None => Ok(CalibrationTable::worldview2()),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.bands.is_empty() {
            return Err("at least one band is required".to_string());
        }

        if self.utc.is_none() && self.doy.is_none() {
            return Err("either utc or doy is required".to_string());
        }

        match self.sun_elevation {
            None => return Err("sun elevation angle is required".to_string()),
            Some(sea) if !(0.0..=90.0).contains(&sea) => {
                return Err(format!("sun elevation {} is outside 0..=90 degrees", sea));
            }
            Some(_) => {}
        }

        let suffix = self.effective_suffix();
        if suffix.is_empty() || suffix.contains(['/', '\\', '@', '.']) {
            return Err(format!("invalid output suffix '{}'", suffix));
        }

        Ok(())
    }
}

/// Split a comma separated list, dropping empty items.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_var<T>(key: &str, val: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    val.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid {} value '{}': {}", key, val, e))
}

fn parse_flag(key: &str, val: &str) -> Result<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => bail!("invalid {} value '{}': expected true or false", key, val),
    }
}
