//! Shared test utilities for the wv2-toar workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic DN grid generators
//! - Reference acquisitions with hand-computed expected values
//! - Approximate floating-point assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for relative floating-point equality, e.g. "6 significant digits".
///
/// # Usage
///
/// ```
/// use test_utils::assert_relative_eq;
///
/// assert_relative_eq!(15.417573_f64, 15.4175731_f64, 1e-6);
/// ```
#[macro_export]
macro_rules! assert_relative_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let tolerance: f64 = $tolerance as f64;
        let scale = left.abs().max(right.abs());
        let rel = if scale == 0.0 { 0.0 } else { (left - right).abs() / scale };
        if !(rel <= tolerance) {
            panic!(
                "assertion failed: `(left ≈ right)` (relative)\n  left: `{:?}`,\n right: `{:?}`,\n   rel: `{:?}` > tolerance `{:?}`",
                left, right, rel, tolerance
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_rejects_nan() {
        assert_approx_eq!(f64::NAN, 1.0, 0.001);
    }

    #[test]
    fn test_assert_relative_eq() {
        assert_relative_eq!(1000.0, 1000.0005, 1e-6);
        assert_relative_eq!(0.0, 0.0, 1e-9);
    }

    #[test]
    #[should_panic(expected = "relative")]
    fn test_assert_relative_eq_fails() {
        assert_relative_eq!(1000.0, 1001.0, 1e-6);
    }
}
