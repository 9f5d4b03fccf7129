//! Raster values, their region and descriptive metadata.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::region::Region;

/// Descriptive metadata attached to a raster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterMetadata {
    pub title: String,
    pub units: String,
    pub description: String,
    pub source1: String,
    pub source2: String,
    pub history: String,
}

/// A single-band f32 raster on a region. NaN marks no-data.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    /// Row-major samples, `region.rows * region.cols` long.
    pub data: Vec<f32>,
    pub region: Region,
    pub metadata: RasterMetadata,
}

impl Raster {
    /// Create a raster, checking the sample count against the region.
    pub fn new(data: Vec<f32>, region: Region) -> Result<Self> {
        if data.len() != region.cells() {
            return Err(StoreError::ShapeMismatch {
                name: String::new(),
                expected: region.cells(),
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            region,
            metadata: RasterMetadata::default(),
        })
    }

    pub fn with_metadata(mut self, metadata: RasterMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn width(&self) -> usize {
        self.region.cols
    }

    pub fn height(&self) -> usize {
        self.region.rows
    }

    /// Get the value at a specific cell.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.region.cols || row >= self.region.rows {
            return None;
        }
        self.data.get(row * self.region.cols + col).copied()
    }

    /// Get the value of the cell containing a point.
    pub fn get_at_coords(&self, x: f64, y: f64) -> Option<f32> {
        let (col, row) = self.region.coords_to_cell(x, y)?;
        self.get(col, row)
    }

    /// Evaluate this raster on another region by nearest-neighbour lookup.
    ///
    /// Target cells whose centre falls outside this raster are NaN.
    /// Metadata is kept.
    pub fn resample(&self, target: &Region) -> Raster {
        if *target == self.region {
            return self.clone();
        }

        let mut data = Vec::with_capacity(target.cells());
        for row in 0..target.rows {
            for col in 0..target.cols {
                let (x, y) = target.cell_to_coords(col, row);
                data.push(self.get_at_coords(x, y).unwrap_or(f32::NAN));
            }
        }

        Raster {
            data,
            region: *target,
            metadata: self.metadata.clone(),
        }
    }
}
