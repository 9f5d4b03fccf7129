//! Common test fixtures for radiometric conversion tests.
//!
//! Expected values were computed by hand from the published formulas.

use tempfile::TempDir;

/// Reference acquisitions.
pub mod acquisition {
    /// QuickBird launch (Krause, 2005): October 18, 2001 at 18:51:26 GMT.
    pub const QUICKBIRD_LAUNCH_UTC: &str = "2001_10_18T18:51:26.000000Z";

    /// Julian Day of the QuickBird launch.
    pub const QUICKBIRD_LAUNCH_JD: f64 = 2452201.286;

    /// Example `.IMD` acquisition string, with the trailing semicolon.
    pub const IMD_UTC: &str = "2014_11_12T16:47:08.000000Z;";

    /// Same acquisition with dash separators.
    pub const ISO_UTC: &str = "2014-11-12T16:47:08.000000Z";

    /// Day of year used by the end-to-end scenario.
    pub const SCENARIO_DOY: u32 = 100;

    /// Earth-Sun distance for day-of-year 100 substituted as a Julian Day.
    pub const SCENARIO_ESD: f64 = 1.016577300929809;

    /// Mean sun elevation angle of the end-to-end scenario (zenith 36.2°).
    pub const SCENARIO_SUN_ELEVATION: f64 = 53.8;
}

/// End-to-end Green band scenario with DN = 100 everywhere.
pub mod green_scenario {
    pub const BAND: &str = "Green";
    pub const DN: f32 = 100.0;

    /// 0.009713071 * 100 / 0.063
    pub const RADIANCE: f64 = 15.417573015873016;

    /// π * RADIANCE * ESD² / (1856.4104 * cos(36.2°))
    pub const REFLECTANCE: f64 = 0.03341338957629671;
}

/// Creates a temporary directory for a filesystem raster store.
///
/// The directory is removed when the returned guard is dropped.
pub fn temp_store_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("toar-store-")
        .tempdir()
        .expect("failed to create temporary store directory")
}
