//! Error types for raster storage.

use thiserror::Error;

/// Errors that can occur while reading or writing rasters.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No raster with this name exists in the store.
    #[error("raster not found: {0}")]
    NotFound(String),

    /// Raster names must be usable as file stems.
    #[error("invalid raster name '{0}'")]
    InvalidName(String),

    /// The store has no current region and the operation needs one.
    #[error("no current region is set")]
    NoRegion,

    /// Region bounds or dimensions are unusable.
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// Sample buffer does not match the raster region.
    #[error("raster '{name}' has {actual} samples, region expects {expected}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Header or region file could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Storage/IO error.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type for raster storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
