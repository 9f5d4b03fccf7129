//! Processing region: the extent and grid a raster is evaluated on.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// A bounding box in the coordinate units of the imagery (usually metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Extent plus grid dimensions.
///
/// Rows run north to south, columns west to east.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub bbox: BoundingBox,
    pub cols: usize,
    pub rows: usize,
}

impl Region {
    /// Create a region, rejecting empty grids and inverted or non-finite bounds.
    pub fn new(bbox: BoundingBox, cols: usize, rows: usize) -> Result<Self> {
        let region = Self { bbox, cols, rows };
        region.validate()?;
        Ok(region)
    }

    /// Region anchored at the origin with unit cells.
    pub fn with_shape(cols: usize, rows: usize) -> Result<Self> {
        Self::new(BoundingBox::new(0.0, 0.0, cols as f64, rows as f64), cols, rows)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(StoreError::InvalidRegion(format!(
                "empty grid {}x{}",
                self.cols, self.rows
            )));
        }
        let b = &self.bbox;
        let finite = [b.min_x, b.min_y, b.max_x, b.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite || b.width() <= 0.0 || b.height() <= 0.0 {
            return Err(StoreError::InvalidRegion(format!("bad bounds {:?}", b)));
        }
        Ok(())
    }

    /// Number of cells.
    pub fn cells(&self) -> usize {
        self.cols * self.rows
    }

    /// Cell size (east-west, north-south) in coordinate units.
    pub fn resolution(&self) -> (f64, f64) {
        (
            self.bbox.width() / self.cols as f64,
            self.bbox.height() / self.rows as f64,
        )
    }

    /// Coordinates of a cell centre.
    pub fn cell_to_coords(&self, col: usize, row: usize) -> (f64, f64) {
        let (res_x, res_y) = self.resolution();
        let x = self.bbox.min_x + (col as f64 + 0.5) * res_x;
        let y = self.bbox.max_y - (row as f64 + 0.5) * res_y;
        (x, y)
    }

    /// Cell containing a point, if any.
    pub fn coords_to_cell(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !self.bbox.contains_point(x, y) {
            return None;
        }

        let (res_x, res_y) = self.resolution();
        let col = ((x - self.bbox.min_x) / res_x).floor() as usize;
        let row = ((self.bbox.max_y - y) / res_y).floor() as usize;

        if col < self.cols && row < self.rows {
            Some((col, row))
        } else {
            None
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (res_x, res_y) = self.resolution();
        write!(
            f,
            "n={} s={} w={} e={} rows={} cols={} nsres={} ewres={}",
            self.bbox.max_y,
            self.bbox.min_y,
            self.bbox.min_x,
            self.bbox.max_x,
            self.rows,
            self.cols,
            res_y,
            res_x
        )
    }
}
