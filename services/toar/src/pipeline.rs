//! Per-band conversion over a raster store.
//!
//! Inputs are read one band at a time under the region policy, converted in
//! parallel, then written as temporaries and renamed to `<band>.<suffix>`.
//! The caller's region is restored and leftover temporaries are removed on
//! every exit path.

use std::sync::atomic::AtomicBool;

use radiometry::{
    BandImage, BandProducts, CalibrationTable, ConversionContext, EarthSunDistance, EsdOrigin,
    ProductMetadata, RadiometricConverter, RadiometryError,
};
use raster_store::{
    Raster, RasterMetadata, RasterStore, Region, RegionGuard, StoreError, TempRasters,
};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::{FailurePolicy, ToarConfig};

/// Suffix of the intermediate radiance kept with `keep_radiance`.
pub const RADIANCE_SUFFIX: &str = "rad";

/// Errors that stop a conversion run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no input bands given")]
    NoBands,

    #[error(transparent)]
    Radiometry(#[from] RadiometryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A band failed under [`FailurePolicy::Abort`].
    #[error("band '{band}' failed: {reason}")]
    BandFailed { band: String, reason: String },
}

/// A band that failed under [`FailurePolicy::SkipBand`].
#[derive(Debug, Clone, PartialEq)]
pub struct BandFailure {
    pub band: String,
    pub reason: String,
}

/// Outcome of a conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub earth_sun_distance: f64,
    pub solar_zenith_angle: f64,
    /// Output rasters written, in band order.
    pub outputs: Vec<String>,
    pub failures: Vec<BandFailure>,
}

/// Strip an `@mapset` qualifier from a raster identifier.
pub fn strip_mapset(name: &str) -> &str {
    name.split('@').next().unwrap_or(name)
}

/// Convert every configured band found in `store`.
#[instrument(skip_all, fields(bands = config.bands.len(), mode = %config.mode))]
pub fn run<S: RasterStore + ?Sized>(
    store: &mut S,
    config: &ToarConfig,
    table: CalibrationTable,
    cancel: &AtomicBool,
) -> Result<PipelineReport, PipelineError> {
    let bands: Vec<String> = config
        .bands
        .iter()
        .map(|b| strip_mapset(b).to_string())
        .collect();
    if bands.is_empty() {
        return Err(PipelineError::NoBands);
    }

    let esd = EarthSunDistance::resolve(config.utc.as_deref(), config.doy)?;
    match &esd.origin {
        EsdOrigin::Utc(acquisition) => {
            info!(julian_day = acquisition.julian_day, "{}", acquisition)
        }
        EsdOrigin::DayOfYear(doy) => info!(doy, "Acquisition day of year"),
    }
    info!(earth_sun_distance = esd.au, "Earth-Sun distance (AU)");

    let sun_elevation = config.sun_elevation.ok_or_else(|| {
        RadiometryError::invalid_parameter("sun_elevation", "a sun elevation angle is required")
    })?;
    let context = ConversionContext::new(esd.au, sun_elevation, bands.clone(), config.mode)?;
    info!(
        solar_zenith_angle = context.solar_zenith_angle,
        "Solar zenith angle (degrees)"
    );

    let converter = RadiometricConverter::with_table(context, table);
    let suffix = config.effective_suffix().to_string();
    let policy = config.failure_policy;

    let mut report = PipelineReport {
        earth_sun_distance: converter.context().earth_sun_distance,
        solar_zenith_angle: converter.context().solar_zenith_angle,
        outputs: Vec::new(),
        failures: Vec::new(),
    };

    let mut temps = TempRasters::for_process(store);

    let inputs = read_inputs(&mut *temps, &bands, config.keep_region, policy, &mut report)?;
    let (images, regions): (Vec<(String, BandImage)>, Vec<Region>) = inputs.into_iter().unzip();

    let results = converter.convert_bands_with_cancel(&images, cancel);

    for (((band, _), region), result) in images.iter().zip(regions).zip(results) {
        let written = result
            .map_err(PipelineError::from)
            .and_then(|products| write_products(&mut temps, products, region, &suffix, config));

        match written {
            Ok(mut outputs) => report.outputs.append(&mut outputs),
            Err(e) => handle_failure(band, e, policy, &mut report)?,
        }
    }

    if config.keep_region {
        info!("Operated on current region");
    }
    info!(outputs = ?report.outputs, "Conversion complete");

    Ok(report)
}

/// Name of the final output raster for a band.
pub fn output_name(band: &str, suffix: &str) -> String {
    format!("{}.{}", band, suffix)
}

fn read_inputs<S: RasterStore + ?Sized>(
    store: &mut S,
    bands: &[String],
    keep_region: bool,
    policy: FailurePolicy,
    report: &mut PipelineReport,
) -> Result<Vec<((String, BandImage), Region)>, PipelineError> {
    let mut guard = RegionGuard::new(store)?;
    let mut inputs = Vec::with_capacity(bands.len());

    for band in bands {
        match read_band(&mut *guard, band, keep_region) {
            Ok(raster) => {
                let image = BandImage::new(raster.data, raster.region.cols, raster.region.rows)?;
                inputs.push(((band.clone(), image), raster.region));
            }
            Err(e) => handle_failure(band, e, policy, report)?,
        }
    }

    Ok(inputs)
}

fn read_band<S: RasterStore + ?Sized>(
    store: &mut S,
    band: &str,
    keep_region: bool,
) -> Result<Raster, PipelineError> {
    if keep_region {
        return Ok(store.read_in_current_region(band)?);
    }

    let raster = store.read(band)?;
    store.set_region(Some(raster.region))?;
    info!(band = %band, region = %raster.region, "Matching region to band");
    Ok(raster)
}

fn write_products<S: RasterStore + ?Sized>(
    temps: &mut TempRasters<'_, S>,
    products: BandProducts,
    region: Region,
    suffix: &str,
    config: &ToarConfig,
) -> Result<Vec<String>, PipelineError> {
    let band = products.band;
    let mut outputs = Vec::new();

    let tmp_rad = temps.temp_name(&band, "Radiance");
    temps.write(
        &tmp_rad,
        &Raster::new(products.radiance.data, region)?
            .with_metadata(to_raster_metadata(products.radiance_metadata)),
    )?;

    match products.reflectance {
        Some((image, metadata)) => {
            let tmp_toar = temps.temp_name(&band, "Reflectance");
            temps.write(
                &tmp_toar,
                &Raster::new(image.data, region)?.with_metadata(to_raster_metadata(metadata)),
            )?;

            let name = output_name(&band, suffix);
            temps.promote(&tmp_toar, &name)?;
            outputs.push(name);

            if config.keep_radiance {
                let name = output_name(&band, RADIANCE_SUFFIX);
                temps.promote(&tmp_rad, &name)?;
                outputs.push(name);
            }
        }
        None => {
            let name = output_name(&band, suffix);
            temps.promote(&tmp_rad, &name)?;
            outputs.push(name);
        }
    }

    info!(band = %band, outputs = ?outputs, "Wrote band products");
    Ok(outputs)
}

fn to_raster_metadata(meta: ProductMetadata) -> RasterMetadata {
    RasterMetadata {
        title: meta.title,
        units: meta.units,
        description: meta.description,
        source1: meta.source1,
        source2: meta.source2,
        history: meta.history,
    }
}

fn handle_failure(
    band: &str,
    err: PipelineError,
    policy: FailurePolicy,
    report: &mut PipelineReport,
) -> Result<(), PipelineError> {
    if let PipelineError::Radiometry(e) = &err {
        if e.is_global() || matches!(e, RadiometryError::Cancelled(_)) {
            return Err(err);
        }
    }

    match policy {
        FailurePolicy::Abort => Err(PipelineError::BandFailed {
            band: band.to_string(),
            reason: err.to_string(),
        }),
        FailurePolicy::SkipBand => {
            warn!(band = %band, error = %err, "Skipping band");
            report.failures.push(BandFailure {
                band: band.to_string(),
                reason: err.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster_store::MemoryRasterStore;

    fn store_with(bands: &[&str]) -> MemoryRasterStore {
        let mut store = MemoryRasterStore::new();
        let region = Region::with_shape(3, 2).unwrap();
        for band in bands {
            store
                .write(band, &Raster::new(vec![100.0; 6], region).unwrap())
                .unwrap();
        }
        store
    }

    fn config(bands: &[&str]) -> ToarConfig {
        ToarConfig {
            bands: bands.iter().map(|b| b.to_string()).collect(),
            doy: Some(100),
            sun_elevation: Some(53.8),
            ..Default::default()
        }
    }

    fn run_default(
        store: &mut MemoryRasterStore,
        config: &ToarConfig,
    ) -> Result<PipelineReport, PipelineError> {
        run(
            store,
            config,
            CalibrationTable::worldview2(),
            &AtomicBool::new(false),
        )
    }

    #[test]
    fn test_strip_mapset() {
        assert_eq!(strip_mapset("Green@PERMANENT"), "Green");
        assert_eq!(strip_mapset("Green"), "Green");
    }

    #[test]
    fn test_reflectance_outputs_and_cleanup() {
        let mut store = store_with(&["Green", "Red"]);
        let report = run_default(&mut store, &config(&["Green@PERMANENT", "Red"])).unwrap();

        assert_eq!(report.outputs, vec!["Green.toar", "Red.toar"]);
        assert_eq!(
            store.list().unwrap(),
            vec!["Green", "Green.toar", "Red", "Red.toar"]
        );
    }

    #[test]
    fn test_radiance_mode_uses_rad_suffix() {
        let mut store = store_with(&["Blue"]);
        let mut cfg = config(&["Blue"]);
        cfg.mode = radiometry::ConversionMode::Radiance;
        let report = run_default(&mut store, &cfg).unwrap();
        assert_eq!(report.outputs, vec!["Blue.rad"]);
        let out = store.read("Blue.rad").unwrap();
        assert_eq!(out.metadata.units, "W / sq.m. / μm / ster");
    }

    #[test]
    fn test_keep_radiance() {
        let mut store = store_with(&["NIR1"]);
        let mut cfg = config(&["NIR1"]);
        cfg.keep_radiance = true;
        let report = run_default(&mut store, &cfg).unwrap();
        assert_eq!(report.outputs, vec!["NIR1.toar", "NIR1.rad"]);
    }

    #[test]
    fn test_abort_on_unknown_band_cleans_up() {
        let mut store = store_with(&["Green", "Foo"]);
        let err = run_default(&mut store, &config(&["Foo", "Green"])).unwrap_err();
        assert!(matches!(err, PipelineError::BandFailed { ref band, .. } if band == "Foo"));
        assert_eq!(store.list().unwrap(), vec!["Foo", "Green"]);
        assert_eq!(store.region().unwrap(), None);
    }

    #[test]
    fn test_skip_band_continues() {
        let mut store = store_with(&["Green"]);
        let mut cfg = config(&["Missing", "Green"]);
        cfg.failure_policy = FailurePolicy::SkipBand;
        let report = run_default(&mut store, &cfg).unwrap();
        assert_eq!(report.outputs, vec!["Green.toar"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].band, "Missing");
    }

    #[test]
    fn test_global_errors_not_skipped() {
        let mut store = store_with(&["Green"]);
        let mut cfg = config(&["Green"]);
        cfg.doy = None;
        cfg.failure_policy = FailurePolicy::SkipBand;
        assert!(matches!(
            run_default(&mut store, &cfg),
            Err(PipelineError::Radiometry(RadiometryError::MissingMetadata))
        ));

        let mut cfg = config(&["Green"]);
        cfg.sun_elevation = None;
        assert!(matches!(
            run_default(&mut store, &cfg),
            Err(PipelineError::Radiometry(RadiometryError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn test_no_bands() {
        let mut store = store_with(&[]);
        assert!(matches!(
            run_default(&mut store, &config(&[])),
            Err(PipelineError::NoBands)
        ));
    }

    #[test]
    fn test_cancelled_before_conversion() {
        let mut store = store_with(&["Green"]);
        let err = run(
            &mut store,
            &config(&["Green"]),
            CalibrationTable::worldview2(),
            &AtomicBool::new(true),
        )
        .unwrap_err();
        assert!(err.to_string().contains("cancelled"));
        assert_eq!(store.list().unwrap(), vec!["Green"]);
    }
}
