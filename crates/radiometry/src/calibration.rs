//! Per-band radiometric calibration constants.
//!
//! The built-in table holds the WorldView-2 absolute calibration factors,
//! effective bandwidths and band-averaged solar spectral irradiances from
//! "Radiometric Use of WorldView-2 Imagery, Technical Note" (2010), by
//! Todd Updike & Chris Comp.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RadiometryError, Result};

/// Calibration constants for one spectral band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationEntry {
    pub band_name: String,
    /// Effective bandwidth Δλ in μm.
    pub effective_bandwidth: f64,
    /// Band-averaged exoatmospheric solar irradiance in W/m²/μm.
    pub solar_irradiance: f64,
    /// Absolute radiometric calibration factor K in W/m²/sr/count.
    pub abs_calibration_factor: f64,
}

impl CalibrationEntry {
    /// Check that every constant is finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("effective_bandwidth", self.effective_bandwidth),
            ("solar_irradiance", self.solar_irradiance),
            ("abs_calibration_factor", self.abs_calibration_factor),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(RadiometryError::invalid_calibration(
                    &self.band_name,
                    field,
                    value,
                ));
            }
        }
        Ok(())
    }
}

/// A built-in table row: (band, K, Δλ, Esun).
type Row = (&'static str, f64, f64, f64);

const WORLDVIEW2: [Row; 9] = [
    ("Pan", 0.056783450, 0.28460000, 1580.8140),
    ("Coastal", 0.009295654, 0.04730000, 1758.2229),
    ("Blue", 0.012608250, 0.05430000, 1974.2416),
    ("Green", 0.009713071, 0.06300000, 1856.4104),
    ("Yellow", 0.005829815, 0.03740000, 1738.4791),
    ("Red", 0.011036230, 0.05740000, 1559.4555),
    ("RedEdge", 0.005188136, 0.03930000, 1342.0695),
    ("NIR1", 0.012243800, 0.09890000, 1069.7302),
    ("NIR2", 0.009042234, 0.09960000, 861.2866),
];

/// Names of the built-in WorldView-2 bands, in table order.
pub const WORLDVIEW2_BANDS: [&str; 9] = [
    "Pan", "Coastal", "Blue", "Green", "Yellow", "Red", "RedEdge", "NIR1", "NIR2",
];

/// Look up a band in the built-in WorldView-2 table.
///
/// Band names are matched exactly; strip any `@mapset` suffix first.
pub fn lookup(band_name: &str) -> Result<CalibrationEntry> {
    WORLDVIEW2
        .iter()
        .find(|(name, ..)| *name == band_name)
        .map(|&(name, k, bandwidth, esun)| CalibrationEntry {
            band_name: name.to_string(),
            effective_bandwidth: bandwidth,
            solar_irradiance: esun,
            abs_calibration_factor: k,
        })
        .ok_or_else(|| RadiometryError::UnknownBand(band_name.to_string()))
}

/// An immutable set of calibration entries.
///
/// [`CalibrationTable::worldview2`] is the compiled-in table; custom tables
/// for other sensors are validated on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    entries: Vec<CalibrationEntry>,
}

#[derive(Deserialize)]
struct TableFile {
    bands: Vec<CalibrationEntry>,
}

impl CalibrationTable {
    /// The built-in WorldView-2 table.
    pub fn worldview2() -> Self {
        let entries = WORLDVIEW2_BANDS
            .iter()
            .filter_map(|name| lookup(name).ok())
            .collect();
        Self { entries }
    }

    /// Build a custom table, rejecting non-positive constants and duplicate bands.
    pub fn from_entries(entries: Vec<CalibrationEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            entry.validate()?;
            if !seen.insert(entry.band_name.as_str()) {
                return Err(RadiometryError::ConfigError(format!(
                    "duplicate calibration entry for band '{}'",
                    entry.band_name
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Load a custom table from YAML:
    ///
    /// ```yaml
    /// bands:
    ///   - band_name: Red
    ///     abs_calibration_factor: 0.01103623
    ///     effective_bandwidth: 0.0574
    ///     solar_irradiance: 1559.4555
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: TableFile = serde_yaml::from_str(yaml)?;
        Self::from_entries(file.bands)
    }

    /// Load a custom table from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Look up a band by exact name.
    pub fn lookup(&self, band_name: &str) -> Result<&CalibrationEntry> {
        self.entries
            .iter()
            .find(|e| e.band_name == band_name)
            .ok_or_else(|| RadiometryError::UnknownBand(band_name.to_string()))
    }

    /// Band names in table order.
    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.band_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::worldview2()
    }
}
