//! Top-of-Atmosphere Radiometric Conversion for WorldView-2 Imagery
//!
//! This crate converts radiometrically corrected digital numbers (DN) to
//! top-of-atmosphere spectral radiance and planetary reflectance:
//!
//! - **Acquisition time**: UTC string → Julian Day → Earth-Sun distance
//! - **Calibration table**: band → (K, Δλ, Esun), compiled in
//! - **Converter**: DN → radiance → reflectance, per band, in parallel
//!
//! # Architecture
//!
//! ```text
//! utc / day-of-year ──► EarthSunDistance ──┐
//! sun elevation ─────► zenith angle ───────┤
//!                                          ▼
//!                                 ConversionContext
//!                                          │
//! band DN image ──► CalibrationTable ──► RadiometricConverter::convert_band
//!                                          │
//!                                          ├─► radiance     (always)
//!                                          └─► reflectance  (Reflectance mode)
//! ```
//!
//! # Example
//!
//! ```
//! use radiometry::{BandImage, ConversionContext, ConversionMode, EarthSunDistance, RadiometricConverter};
//!
//! let esd = EarthSunDistance::resolve(Some("2014_11_12T16:47:08.000000Z"), None)?;
//! let context = ConversionContext::new(esd.au, 53.8, vec!["Green".into()], ConversionMode::Reflectance)?;
//! let converter = RadiometricConverter::new(context);
//!
//! let products = converter.convert_band("Green", &BandImage::filled(100.0, 4, 4))?;
//! assert!(products.reflectance.is_some());
//! # Ok::<(), radiometry::RadiometryError>(())
//! ```

pub mod acquisition;
pub mod calibration;
pub mod convert;
pub mod error;
pub mod metadata;
pub mod types;

// Re-export commonly used types at crate root
pub use acquisition::{
    day_of_year_to_esd, jd_to_esd, julian_day, parse_utc, universal_time, AcquisitionTime,
    EarthSunDistance, EsdOrigin,
};
pub use calibration::{lookup, CalibrationEntry, CalibrationTable, WORLDVIEW2_BANDS};
pub use convert::{to_radiance, to_reflectance, BandProducts, RadiometricConverter};
pub use error::{RadiometryError, Result};
pub use metadata::{formula_summary, ProductMetadata, RADIANCE_UNITS, REFLECTANCE_UNITS};
pub use types::{BandImage, ConversionContext, ConversionMode};
