//! Core types for radiometric conversion.

use serde::{Deserialize, Serialize};

use crate::error::{RadiometryError, Result};

/// A 2-D band image (row-major order, top-to-bottom).
#[derive(Debug, Clone, PartialEq)]
pub struct BandImage {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl BandImage {
    /// Create a band image, checking that the buffer matches the shape.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> Result<Self> {
        if data.len() != width * height {
            return Err(RadiometryError::ShapeMismatch {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// An image with every pixel set to `value`.
    pub fn filled(value: f32, width: usize, height: usize) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Get the value at a specific pixel.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Minimum and maximum of the non-NaN pixels.
    pub fn range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Which products to compute for each band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMode {
    /// At-sensor spectral radiance only.
    Radiance,
    /// Radiance followed by top-of-atmosphere reflectance.
    #[default]
    Reflectance,
}

impl ConversionMode {
    pub fn includes_reflectance(&self) -> bool {
        matches!(self, Self::Reflectance)
    }

    /// Default output suffix for this mode.
    pub fn default_suffix(&self) -> &'static str {
        match self {
            Self::Radiance => "rad",
            Self::Reflectance => "toar",
        }
    }
}

impl std::str::FromStr for ConversionMode {
    type Err = RadiometryError;

    /// Parse from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "radiance" | "rad" => Ok(Self::Radiance),
            "reflectance" | "toar" => Ok(Self::Reflectance),
            _ => Err(RadiometryError::invalid_parameter(
                "mode",
                format!("unknown conversion mode '{}'", s),
            )),
        }
    }
}

impl std::fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Radiance => write!(f, "radiance"),
            Self::Reflectance => write!(f, "reflectance"),
        }
    }
}

/// Read-only inputs shared by every band of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionContext {
    /// Earth-Sun distance in astronomical units.
    pub earth_sun_distance: f64,
    /// Solar zenith angle in degrees.
    pub solar_zenith_angle: f64,
    /// Requested band identifiers (bare names). When non-empty, only these
    /// bands may be converted with this context.
    pub bands: Vec<String>,
    pub mode: ConversionMode,
}

impl ConversionContext {
    /// Build a context from a sun elevation angle (degrees, 0..=90).
    ///
    /// The solar zenith angle is `90 - sun_elevation`.
    pub fn new(
        earth_sun_distance: f64,
        sun_elevation: f64,
        bands: Vec<String>,
        mode: ConversionMode,
    ) -> Result<Self> {
        if !(0.0..=90.0).contains(&sun_elevation) {
            return Err(RadiometryError::invalid_parameter(
                "sun_elevation",
                format!("{} is outside 0..=90 degrees", sun_elevation),
            ));
        }
        Ok(Self {
            earth_sun_distance,
            solar_zenith_angle: 90.0 - sun_elevation,
            bands,
            mode,
        })
    }

    /// Whether `band` may be converted with this context.
    pub fn allows(&self, band: &str) -> bool {
        self.bands.is_empty() || self.bands.iter().any(|b| b == band)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_image_shape_check() {
        assert!(BandImage::new(vec![0.0; 6], 3, 2).is_ok());
        assert_eq!(
            BandImage::new(vec![0.0; 5], 3, 2),
            Err(RadiometryError::ShapeMismatch {
                width: 3,
                height: 2,
                len: 5
            })
        );
    }

    #[test]
    fn test_band_image_get_and_range() {
        let image = BandImage::new(vec![1.0, 5.0, f32::NAN, -2.0], 2, 2).unwrap();
        assert_eq!(image.get(1, 0), Some(5.0));
        assert_eq!(image.get(1, 1), Some(-2.0));
        assert_eq!(image.get(2, 0), None);
        assert_eq!(image.range(), Some((-2.0, 5.0)));
        assert_eq!(BandImage::filled(f32::NAN, 2, 1).range(), None);
    }

    #[test]
    fn test_conversion_mode() {
        assert_eq!("Radiance".parse::<ConversionMode>(), Ok(ConversionMode::Radiance));
        assert_eq!("rad".parse::<ConversionMode>(), Ok(ConversionMode::Radiance));
        assert_eq!("toar".parse::<ConversionMode>(), Ok(ConversionMode::Reflectance));
        assert_eq!("REFLECTANCE".parse::<ConversionMode>(), Ok(ConversionMode::Reflectance));
        assert_eq!(ConversionMode::default(), ConversionMode::Reflectance);
        assert_eq!(ConversionMode::Radiance.default_suffix(), "rad");
        assert!(!ConversionMode::Radiance.includes_reflectance());
    }

    #[test]
    fn test_conversion_mode_rejects_unknown() {
        let err = "radiance-only".parse::<ConversionMode>().unwrap_err();
        assert!(matches!(err, RadiometryError::InvalidParameter { ref param, .. } if param == "mode"));
        assert!(err.to_string().contains("'radiance-only'"));
        assert!("".parse::<ConversionMode>().is_err());
    }

    #[test]
    fn test_context_allows_requested_bands() {
        let ctx = ConversionContext::new(
            1.0,
            53.8,
            vec!["Green".into(), "Red".into()],
            ConversionMode::Radiance,
        )
        .unwrap();
        assert!(ctx.allows("Red"));
        assert!(!ctx.allows("NIR1"));

        let open = ConversionContext::new(1.0, 53.8, vec![], ConversionMode::Radiance).unwrap();
        assert!(open.allows("NIR1"));
    }

    #[test]
    fn test_context_zenith_from_elevation() {
        let ctx =
            ConversionContext::new(1.0, 53.8, vec!["Green".into()], ConversionMode::Reflectance)
                .unwrap();
        assert!((ctx.solar_zenith_angle - 36.2).abs() < 1e-9);
    }

    #[test]
    fn test_context_rejects_bad_elevation() {
        assert!(ConversionContext::new(1.0, -1.0, vec![], ConversionMode::Radiance).is_err());
        assert!(ConversionContext::new(1.0, 90.5, vec![], ConversionMode::Radiance).is_err());
        assert!(ConversionContext::new(1.0, f64::NAN, vec![], ConversionMode::Radiance).is_err());
    }
}
