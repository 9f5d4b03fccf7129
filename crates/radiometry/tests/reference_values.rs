//! Reference-value and property tests for the radiometric conversion chain.

use radiometry::{
    day_of_year_to_esd, jd_to_esd, julian_day, lookup, to_radiance, to_reflectance,
    AcquisitionTime, BandImage, CalibrationEntry, ConversionContext, ConversionMode,
    EarthSunDistance, RadiometricConverter, RadiometryError, WORLDVIEW2_BANDS,
};
use test_utils::{
    acquisition, assert_approx_eq, assert_relative_eq, create_dn_scene, green_scenario,
};

// ============================================================================
// Julian Day and Earth-Sun distance
// ============================================================================

#[test]
fn test_julian_day_quickbird_launch() {
    let t = AcquisitionTime::from_utc(acquisition::QUICKBIRD_LAUNCH_UTC).unwrap();
    assert_approx_eq!(t.julian_day, acquisition::QUICKBIRD_LAUNCH_JD, 0.001);

    let ut = radiometry::universal_time(18, 51, 26.0);
    assert_approx_eq!(
        julian_day(2001, 10, 18, ut),
        acquisition::QUICKBIRD_LAUNCH_JD,
        0.001
    );
}

#[test]
fn test_esd_within_bounds_over_a_year() {
    let start = julian_day(2014, 1, 1, 0.0);
    for day in 0..366 {
        for hour in [0.0, 6.0, 12.0, 18.0] {
            let esd = jd_to_esd(start + day as f64 + hour / 24.0).unwrap();
            assert!((0.983..=1.017).contains(&esd), "esd {} on day {}", esd, day);
        }
    }
}

#[test]
fn test_esd_perihelion_and_aphelion() {
    // Early January is closest to the sun, early July furthest.
    let january = jd_to_esd(julian_day(2014, 1, 3, 0.0)).unwrap();
    let july = jd_to_esd(julian_day(2014, 7, 4, 0.0)).unwrap();
    assert_approx_eq!(january, 0.98330, 0.0001);
    assert_approx_eq!(july, 1.01670, 0.0001);
}

#[test]
fn test_esd_out_of_range_is_reported() {
    match jd_to_esd(f64::NAN) {
        Err(RadiometryError::EarthSunDistanceOutOfRange(v)) => assert!(v.is_nan()),
        other => panic!("expected range error, got {:?}", other),
    }
}

#[test]
fn test_julian_day_continuous_across_new_year() {
    let dec31 = AcquisitionTime::from_utc("2013_12_31T23:59:59.000000Z").unwrap();
    let jan1 = AcquisitionTime::from_utc("2014_01_01T00:00:00.000000Z").unwrap();
    let step = jan1.julian_day - dec31.julian_day;
    assert!(step > 0.0 && step < 1.0, "discontinuity of {} days", step);
    assert_approx_eq!(step, 1.0 / 86400.0, 1e-6);
}

#[test]
fn test_julian_day_continuous_across_february_march() {
    let feb28 = julian_day(2014, 2, 28, 12.0);
    let mar1 = julian_day(2014, 3, 1, 12.0);
    assert_approx_eq!(mar1 - feb28, 1.0, 1e-9);

    // 2012 is a leap year
    let feb29 = julian_day(2012, 2, 29, 12.0);
    let mar1 = julian_day(2012, 3, 1, 12.0);
    assert_approx_eq!(mar1 - feb29, 1.0, 1e-9);
}

#[test]
fn test_separators_are_equivalent() {
    let a = AcquisitionTime::from_utc(acquisition::IMD_UTC).unwrap();
    let b = AcquisitionTime::from_utc(acquisition::ISO_UTC).unwrap();
    assert_eq!(a.earth_sun_distance, b.earth_sun_distance);
}

#[test]
fn test_day_of_year_path_matches_julian_substitution() {
    let esd = day_of_year_to_esd(acquisition::SCENARIO_DOY).unwrap();
    assert_eq!(esd, jd_to_esd(100.0).unwrap());
    assert_approx_eq!(esd, acquisition::SCENARIO_ESD, 1e-12);
}

// ============================================================================
// Calibration table
// ============================================================================

#[test]
fn test_unknown_band_rejected() {
    for name in ["Foo", "PAN", "nir1", "Nir2", "SWIR1", " Red"] {
        assert_eq!(
            lookup(name),
            Err(RadiometryError::UnknownBand(name.to_string()))
        );
    }
}

// ============================================================================
// Conversion properties
// ============================================================================

#[test]
fn test_radiance_linear_in_dn() {
    let dn = BandImage::new(create_dn_scene(16, 16, 7), 16, 16).unwrap();
    let scaled = BandImage::new(dn.data.iter().map(|v| v * 3.0).collect(), 16, 16).unwrap();

    for band in WORLDVIEW2_BANDS {
        let entry = lookup(band).unwrap();
        let base = to_radiance(&dn, &entry);
        let tripled = to_radiance(&scaled, &entry);
        for (a, b) in base.data.iter().zip(&tripled.data) {
            assert_relative_eq!(*b, *a * 3.0, 1e-6);
        }
    }
}

#[test]
fn test_reflectance_monotonicity() {
    let entry = lookup("Red").unwrap();
    let radiance = BandImage::new(vec![10.0, 20.0, 40.0], 3, 1).unwrap();

    // increasing in radiance
    let refl = to_reflectance(&radiance, &entry, 1.0, 30.0);
    assert!(refl.data[0] < refl.data[1] && refl.data[1] < refl.data[2]);

    // increasing in esd
    let near = to_reflectance(&radiance, &entry, 0.99, 30.0);
    let far = to_reflectance(&radiance, &entry, 1.01, 30.0);
    assert!(near.data.iter().zip(&far.data).all(|(n, f)| n < f));

    // decreasing in Esun
    let brighter_sun = CalibrationEntry {
        solar_irradiance: entry.solar_irradiance * 1.5,
        ..entry.clone()
    };
    let dimmer = to_reflectance(&radiance, &brighter_sun, 1.0, 30.0);
    assert!(dimmer.data.iter().zip(&refl.data).all(|(d, r)| d < r));
}

#[test]
fn test_green_end_to_end_scenario() {
    let esd = EarthSunDistance::resolve(None, Some(acquisition::SCENARIO_DOY)).unwrap();
    let context = ConversionContext::new(
        esd.au,
        acquisition::SCENARIO_SUN_ELEVATION,
        vec![green_scenario::BAND.to_string()],
        ConversionMode::Reflectance,
    )
    .unwrap();
    assert_approx_eq!(context.solar_zenith_angle, 36.2, 1e-9);

    let converter = RadiometricConverter::new(context);
    let dn = BandImage::filled(green_scenario::DN, 4, 3);
    let products = converter.convert_band(green_scenario::BAND, &dn).unwrap();

    assert_eq!(products.radiance.width, 4);
    assert_eq!(products.radiance.height, 3);
    for v in &products.radiance.data {
        assert_relative_eq!(*v, green_scenario::RADIANCE, 1e-6);
    }

    let (reflectance, metadata) = products.reflectance.unwrap();
    assert_eq!(reflectance.len(), 12);
    for v in &reflectance.data {
        assert_relative_eq!(*v, green_scenario::REFLECTANCE, 1e-6);
    }
    assert_eq!(metadata.units, "Unitless planetary reflectance");
    assert_eq!(products.radiance_metadata.units, "W / sq.m. / μm / ster");
}

#[test]
fn test_every_pixel_shares_divisor() {
    let converter = RadiometricConverter::new(
        ConversionContext::new(1.0, 45.0, vec![], ConversionMode::Reflectance).unwrap(),
    );
    let products = converter
        .convert_band("NIR2", &BandImage::filled(512.0, 64, 64))
        .unwrap();
    let (reflectance, _) = products.reflectance.unwrap();
    let first = reflectance.data[0];
    assert!(reflectance.data.iter().all(|&v| v == first));
}
