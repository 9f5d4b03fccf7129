//! Error types for radiometric conversion.

use thiserror::Error;

/// Errors that can occur while resolving acquisition metadata or converting bands.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RadiometryError {
    /// Neither a UTC acquisition string nor a day-of-year was supplied.
    #[error("either the UTC string or the day-of-year is required to compute the Earth-Sun distance")]
    MissingMetadata,

    /// The UTC acquisition string could not be parsed.
    #[error("invalid UTC acquisition string '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// The computed Earth-Sun distance is outside the physically valid range.
    #[error("invalid Earth-Sun distance {0} (expected 0.983..=1.017 AU), review input values")]
    EarthSunDistanceOutOfRange(f64),

    /// Day-of-year outside 1..=365.
    #[error("day of year {0} is outside 1..=365")]
    DayOfYearOutOfRange(u32),

    /// Band identifier not present in the calibration table.
    #[error("unknown spectral band: {0}")]
    UnknownBand(String),

    /// Band was not among the bands requested for this invocation.
    #[error("band '{0}' was not requested for this conversion")]
    BandNotRequested(String),

    /// A calibration table entry has a non-positive or non-finite constant.
    #[error("invalid calibration for band '{band}': {field} = {value} (must be > 0)")]
    InvalidCalibration {
        band: String,
        field: &'static str,
        value: f64,
    },

    /// An invocation parameter is outside its accepted range.
    #[error("invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// Pixel buffer length does not match the declared image shape.
    #[error("image shape {width}x{height} does not match {len} samples")]
    ShapeMismatch {
        width: usize,
        height: usize,
        len: usize,
    },

    /// Processing was cancelled before this band started.
    #[error("conversion cancelled before band '{0}'")]
    Cancelled(String),

    /// Configuration or calibration file error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl RadiometryError {
    /// Create a Parse error.
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidCalibration error.
    pub fn invalid_calibration(band: impl Into<String>, field: &'static str, value: f64) -> Self {
        Self::InvalidCalibration {
            band: band.into(),
            field,
            value,
        }
    }

    /// Whether the error invalidates the whole invocation rather than a single band.
    ///
    /// Acquisition-time errors are global because the Earth-Sun distance is
    /// shared by every band.
    pub fn is_global(&self) -> bool {
        matches!(
            self,
            Self::MissingMetadata
                | Self::Parse { .. }
                | Self::EarthSunDistanceOutOfRange(_)
                | Self::DayOfYearOutOfRange(_)
                | Self::InvalidParameter { .. }
                | Self::ConfigError(_)
        )
    }
}

impl From<std::io::Error> for RadiometryError {
    fn from(err: std::io::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<serde_yaml::Error> for RadiometryError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::ConfigError(format!("YAML error: {}", err))
    }
}

/// Result type for radiometry operations.
pub type Result<T> = std::result::Result<T, RadiometryError>;
