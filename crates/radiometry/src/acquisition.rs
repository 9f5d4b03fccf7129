//! Acquisition time resolution and Earth-Sun distance.
//!
//! The acquisition time recorded in WorldView-2 `.IMD` metadata is a UTC
//! string of the form `YYYY_MM_DDThh:mm:ss.ffffffZ;`. It is converted to a
//! Julian Day and from there to the Earth-Sun distance in astronomical units
//! (U.S. Naval Observatory approximation):
//!
//! ```text
//! D   = JD - 2451545.0
//! g   = 357.529 + 0.98560028 * D          (degrees)
//! ESD = 1.00014 - 0.01671 cos(g) - 0.00014 cos(2g)
//! ```
//!
//! When only a day-of-year is known, [`day_of_year_to_esd`] substitutes it for
//! the Julian Day. That path is a coarse approximation and is kept distinct
//! from [`AcquisitionTime::from_utc`] so callers know which one they used.

use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::{debug, warn};

use crate::error::{RadiometryError, Result};

/// Valid Earth-Sun distance range in astronomical units.
pub const ESD_MIN: f64 = 0.983;
pub const ESD_MAX: f64 = 1.017;

/// Julian Day of the J2000.0 epoch.
const J2000: f64 = 2451545.0;

/// Constant term of the Julian Day formula (Meeus).
const JULIAN_DAY_OFFSET: f64 = 1524.5;

/// Parsed acquisition timestamp with its derived Julian Day and Earth-Sun distance.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionTime {
    raw: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    /// Seconds including the fractional part.
    pub second: f64,
    /// Universal time in fractional hours.
    pub universal_time: f64,
    pub julian_day: f64,
    /// Earth-Sun distance in astronomical units.
    pub earth_sun_distance: f64,
}

impl AcquisitionTime {
    /// Parse a UTC acquisition string and derive Julian Day and Earth-Sun distance.
    ///
    /// Accepts `YYYY_MM_DDThh:mm:ss.ffffffZ` and `YYYY-MM-DDThh:mm:ss.ffffffZ`,
    /// with an optional trailing `;` as written in `.IMD` files. The fractional
    /// seconds are optional. Calendar fields are fully validated.
    pub fn from_utc(utc: &str) -> Result<Self> {
        let timestamp = parse_timestamp(utc)?;

        let second =
            timestamp.second() as f64 + timestamp.nanosecond() as f64 / 1_000_000_000.0;
        let universal_time = universal_time(timestamp.hour(), timestamp.minute(), second);
        let julian_day = julian_day(
            timestamp.year(),
            timestamp.month(),
            timestamp.day(),
            universal_time,
        );
        let earth_sun_distance = jd_to_esd(julian_day)?;

        debug!(
            utc = %utc,
            julian_day,
            earth_sun_distance,
            "Resolved acquisition time"
        );

        Ok(Self {
            raw: utc.to_string(),
            year: timestamp.year(),
            month: timestamp.month(),
            day: timestamp.day(),
            hour: timestamp.hour(),
            minute: timestamp.minute(),
            second,
            universal_time,
            julian_day,
            earth_sun_distance,
        })
    }

    /// The UTC string this acquisition time was parsed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for AcquisitionTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Acquisition time (UTC format): {}", self.raw)
    }
}

/// Shorthand for [`AcquisitionTime::from_utc`].
pub fn parse_utc(utc: &str) -> Result<AcquisitionTime> {
    AcquisitionTime::from_utc(utc)
}

fn parse_timestamp(utc: &str) -> Result<NaiveDateTime> {
    let trimmed = utc.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed);
    let body = trimmed
        .strip_suffix('Z')
        .ok_or_else(|| RadiometryError::parse(utc, "missing 'Z' UTC designator"))?;

    let bytes = body.as_bytes();
    if bytes.len() < 19 {
        return Err(RadiometryError::parse(
            utc,
            "expected YYYY_MM_DDThh:mm:ss[.ffffff]Z",
        ));
    }
    for idx in [4, 7] {
        if bytes[idx] != b'_' && bytes[idx] != b'-' {
            return Err(RadiometryError::parse(
                utc,
                format!("expected '_' or '-' date separator at offset {}", idx),
            ));
        }
    }
    if bytes[10] != b'T' {
        return Err(RadiometryError::parse(
            utc,
            "expected 'T' between date and time",
        ));
    }

    // '_' and '-' separators are equivalent; chrono only knows '-'.
    let normalized: String = body
        .char_indices()
        .map(|(i, c)| if i < 10 && c == '_' { '-' } else { c })
        .collect();

    let timestamp = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| RadiometryError::parse(utc, e.to_string()))?;

    // chrono represents a leap second as nanosecond >= 1e9
    if timestamp.nanosecond() >= 1_000_000_000 {
        return Err(RadiometryError::parse(utc, "seconds must be below 60"));
    }

    Ok(timestamp)
}

/// Convert hours, minutes and (fractional) seconds to universal time in hours.
pub fn universal_time(hours: u32, minutes: u32, seconds: f64) -> f64 {
    hours as f64 + minutes as f64 / 60.0 + seconds / 3600.0
}

/// January and February count as months 13 and 14 of the previous year.
pub(crate) fn calendar_adjustment(year: i32, month: u32) -> (i32, u32) {
    if month <= 2 {
        (year - 1, month + 12)
    } else {
        (year, month)
    }
}

/// Julian Day for a calendar date and universal time (hours).
///
/// `JD = floor(365.25 (Y + 4716)) + floor(30.6001 (M + 1)) + day + ut/24 + B - 1524.5`
/// with `A = floor(Y / 100)` and `B = 2 - A + floor(A / 4)`. The January and
/// February adjustment is applied internally.
pub fn julian_day(year: i32, month: u32, day: u32, ut: f64) -> f64 {
    let (year, month) = calendar_adjustment(year, month);

    let a = year.div_euclid(100);
    let b = 2 - a + a.div_euclid(4);

    (365.25 * (year + 4716) as f64).floor()
        + (30.6001 * (month + 1) as f64).floor()
        + day as f64
        + ut / 24.0
        + b as f64
        - JULIAN_DAY_OFFSET
}

/// Earth-Sun distance in astronomical units for a Julian Day.
///
/// Fails with [`RadiometryError::EarthSunDistanceOutOfRange`] when the result
/// is outside `[0.983, 1.017]` or not finite.
pub fn jd_to_esd(jd: f64) -> Result<f64> {
    let d = jd - J2000;
    let g = (357.529 + 0.98560028 * d).to_radians();
    let esd = 1.00014 - 0.01671 * g.cos() - 0.00014 * (2.0 * g).cos();

    if (ESD_MIN..=ESD_MAX).contains(&esd) {
        Ok(esd)
    } else {
        Err(RadiometryError::EarthSunDistanceOutOfRange(esd))
    }
}

/// Earth-Sun distance using the day-of-year in place of the Julian Day.
pub fn day_of_year_to_esd(doy: u32) -> Result<f64> {
    if !(1..=365).contains(&doy) {
        return Err(RadiometryError::DayOfYearOutOfRange(doy));
    }
    jd_to_esd(doy as f64)
}

/// Where an Earth-Sun distance came from.
#[derive(Debug, Clone, PartialEq)]
pub enum EsdOrigin {
    Utc(AcquisitionTime),
    DayOfYear(u32),
}

/// Earth-Sun distance resolved for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthSunDistance {
    /// Distance in astronomical units.
    pub au: f64,
    pub origin: EsdOrigin,
}

impl EarthSunDistance {
    /// Resolve from a full UTC acquisition string.
    pub fn from_utc(utc: &str) -> Result<Self> {
        let acquisition = AcquisitionTime::from_utc(utc)?;
        Ok(Self {
            au: acquisition.earth_sun_distance,
            origin: EsdOrigin::Utc(acquisition),
        })
    }

    /// Resolve from a day-of-year (1..=365), bypassing timestamp parsing.
    pub fn from_day_of_year(doy: u32) -> Result<Self> {
        Ok(Self {
            au: day_of_year_to_esd(doy)?,
            origin: EsdOrigin::DayOfYear(doy),
        })
    }

    /// Resolve from whichever metadata the caller has.
    ///
    /// The day-of-year takes precedence when both are supplied.
    pub fn resolve(utc: Option<&str>, day_of_year: Option<u32>) -> Result<Self> {
        match (utc, day_of_year) {
            (utc, Some(doy)) => {
                if utc.is_some() {
                    warn!(doy, "Both UTC and day-of-year supplied, day-of-year overrides UTC");
                }
                warn!(doy, "Using day-of-year to calculate Earth-Sun distance");
                Self::from_day_of_year(doy)
            }
            (Some(utc), None) => Self::from_utc(utc),
            (None, None) => Err(RadiometryError::MissingMetadata),
        }
    }
}
