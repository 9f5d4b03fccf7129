//! DN to radiance and radiance to reflectance conversion.
//!
//! Spectral radiance (W/m²/sr/μm):
//!
//! ```text
//! L(p) = K * DN(p) / Δλ
//! ```
//!
//! Top-of-atmosphere planetary reflectance (unitless):
//!
//! ```text
//! ρ(p) = π * L(p) * d² / (Esun * cos(θs))
//! ```
//!
//! where `d` is the Earth-Sun distance in AU and `θs` the solar zenith angle.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::calibration::{CalibrationEntry, CalibrationTable};
use crate::error::{RadiometryError, Result};
use crate::metadata::ProductMetadata;
use crate::types::{BandImage, ConversionContext};

/// Convert a DN image to top-of-atmosphere spectral radiance.
///
/// Arithmetic is done in f64 and stored as f32.
pub fn to_radiance(dn: &BandImage, entry: &CalibrationEntry) -> BandImage {
    let k = entry.abs_calibration_factor;
    let bandwidth = entry.effective_bandwidth;

    let data = dn
        .data
        .par_iter()
        .map(|&v| (k * v as f64 / bandwidth) as f32)
        .collect();

    BandImage {
        data,
        width: dn.width,
        height: dn.height,
    }
}

/// Convert a radiance image to top-of-atmosphere reflectance.
///
/// `cos(sza)` is evaluated once so every pixel shares the same divisor.
/// Output is not clamped.
pub fn to_reflectance(
    radiance: &BandImage,
    entry: &CalibrationEntry,
    esd: f64,
    sza_degrees: f64,
) -> BandImage {
    let cos_sza = sza_degrees.to_radians().cos();
    let factor = std::f64::consts::PI * esd * esd / (entry.solar_irradiance * cos_sza);

    let data = radiance
        .data
        .par_iter()
        .map(|&v| (v as f64 * factor) as f32)
        .collect();

    BandImage {
        data,
        width: radiance.width,
        height: radiance.height,
    }
}

/// Products computed for one band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandProducts {
    /// Bare band name the calibration was looked up with.
    pub band: String,
    pub radiance: BandImage,
    pub radiance_metadata: ProductMetadata,
    /// Present when the context asks for reflectance.
    pub reflectance: Option<(BandImage, ProductMetadata)>,
}

/// Applies calibration constants to band images under one shared context.
#[derive(Debug, Clone)]
pub struct RadiometricConverter {
    context: ConversionContext,
    table: CalibrationTable,
}

impl RadiometricConverter {
    /// Converter using the built-in WorldView-2 table.
    pub fn new(context: ConversionContext) -> Self {
        Self::with_table(context, CalibrationTable::worldview2())
    }

    /// Converter using a custom calibration table.
    pub fn with_table(context: ConversionContext, table: CalibrationTable) -> Self {
        Self { context, table }
    }

    pub fn context(&self) -> &ConversionContext {
        &self.context
    }

    pub fn table(&self) -> &CalibrationTable {
        &self.table
    }

    /// Convert one band: radiance first, then reflectance from that radiance.
    pub fn convert_band(&self, band: &str, dn: &BandImage) -> Result<BandProducts> {
        let entry = self.table.lookup(band)?;
        if !self.context.allows(band) {
            return Err(RadiometryError::BandNotRequested(band.to_string()));
        }

        info!(
            band = %band,
            k = entry.abs_calibration_factor,
            bandwidth = entry.effective_bandwidth,
            "Converting to spectral radiance"
        );
        let radiance = to_radiance(dn, entry);
        let radiance_metadata = ProductMetadata::radiance(entry);

        let reflectance = if self.context.mode.includes_reflectance() {
            info!(
                band = %band,
                esun = entry.solar_irradiance,
                esd = self.context.earth_sun_distance,
                sza = self.context.solar_zenith_angle,
                "Converting to top-of-atmosphere reflectance"
            );
            let image = to_reflectance(
                &radiance,
                entry,
                self.context.earth_sun_distance,
                self.context.solar_zenith_angle,
            );
            if let Some((min, max)) = image.range() {
                debug!(band = %band, min, max, "Reflectance range");
            }
            let metadata = ProductMetadata::reflectance(
                entry,
                self.context.earth_sun_distance,
                self.context.solar_zenith_angle,
            );
            Some((image, metadata))
        } else {
            None
        };

        Ok(BandProducts {
            band: band.to_string(),
            radiance,
            radiance_metadata,
            reflectance,
        })
    }

    /// Convert several bands in parallel.
    ///
    /// Results keep the input order; one band's failure does not affect the others.
    pub fn convert_bands(&self, inputs: &[(String, BandImage)]) -> Vec<Result<BandProducts>> {
        let never = AtomicBool::new(false);
        self.convert_bands_with_cancel(inputs, &never)
    }

    /// Like [`convert_bands`](Self::convert_bands), checking `cancel` before
    /// each band starts. Bands not yet started when it is set report
    /// [`RadiometryError::Cancelled`].
    pub fn convert_bands_with_cancel(
        &self,
        inputs: &[(String, BandImage)],
        cancel: &AtomicBool,
    ) -> Vec<Result<BandProducts>> {
        inputs
            .par_iter()
            .map(|(band, dn)| {
                if cancel.load(Ordering::Relaxed) {
                    return Err(RadiometryError::Cancelled(band.clone()));
                }
                self.convert_band(band, dn)
            })
            .collect()
    }
}
