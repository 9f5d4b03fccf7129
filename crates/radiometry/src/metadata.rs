//! Descriptive metadata attached to converted products.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationEntry;

/// Units of top-of-atmosphere spectral radiance.
pub const RADIANCE_UNITS: &str = "W / sq.m. / μm / ster";

/// Units of top-of-atmosphere planetary reflectance.
pub const REFLECTANCE_UNITS: &str = "Unitless planetary reflectance";

/// Reference for the calibration constants and equations.
pub const CALIBRATION_SOURCE: &str =
    "\"Radiometric Use of WorldView-2 Imagery, Technical Note (2010)\", by Todd Updike & Chris Comp";

/// Human-readable conversion formulas.
pub fn formula_summary() -> &'static str {
    "Spectral Radiance = K * DN / Effective Bandwidth | \
     Reflectance = ( Pi * Radiance * ESD^2 ) / ( BAND_Esun * cos(SZA) )"
}

/// Title, units, description and provenance for one output raster.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub title: String,
    pub units: String,
    pub description: String,
    pub source1: String,
    pub source2: String,
    /// Provenance string embedding the numeric parameters used.
    pub history: String,
}

impl ProductMetadata {
    /// Metadata for a radiance product.
    pub fn radiance(entry: &CalibrationEntry) -> Self {
        let band = &entry.band_name;
        Self {
            title: String::new(),
            units: RADIANCE_UNITS.to_string(),
            description: format!(
                "Top-of-Atmosphere {} band spectral Radiance [W/m^2/sr/μm]",
                band
            ),
            source1: CALIBRATION_SOURCE.to_string(),
            source2: String::new(),
            history: format!(
                "Radiance = {:.9} * {} / {:.6}; Conversion Factor={:.9}; Effective Bandwidth={:.3}",
                entry.abs_calibration_factor,
                band,
                entry.effective_bandwidth,
                entry.abs_calibration_factor,
                entry.effective_bandwidth
            ),
        }
    }

    /// Metadata for a reflectance product.
    pub fn reflectance(entry: &CalibrationEntry, esd: f64, sza: f64) -> Self {
        let band = &entry.band_name;
        Self {
            title: format!("{} band (Top of Atmosphere Reflectance)", band),
            units: REFLECTANCE_UNITS.to_string(),
            description: format!("Top of Atmosphere {} band spectral Reflectance", band),
            source1: CALIBRATION_SOURCE.to_string(),
            source2: String::new(),
            history: format!(
                "K={:.9}; Bandwidth={:.3}; ESD={:.6}; Esun={:.2}; SZA={:.1}",
                entry.abs_calibration_factor,
                entry.effective_bandwidth,
                esd,
                entry.solar_irradiance,
                sza
            ),
        }
    }
}
