//! Test data generators for synthetic DN imagery.
//!
//! These generators create predictable, verifiable pixel patterns
//! that can be used across the test suite.

/// Largest DN of an 11-bit WorldView-2 product.
pub const MAX_DN_11BIT: f32 = 2047.0;

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 100 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[0], 0.0);   // col=0, row=0
/// assert_eq!(grid[1], 100.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 100 + row) as f32);
        }
    }
    data
}

/// Creates a DN gradient from 0 (top-left) to `max_dn` (bottom-right).
///
/// Values are whole numbers, as delivered by the sensor.
pub fn create_dn_gradient(width: usize, height: usize, max_dn: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    let span = (width + height).saturating_sub(2).max(1) as f32;
    for row in 0..height {
        for col in 0..width {
            let t = (col + row) as f32 / span;
            data.push((t * max_dn).round());
        }
    }
    data
}

/// Creates a deterministic pseudo-random 11-bit DN scene.
///
/// Uses a simple hash-based approach for reproducibility.
pub fn create_dn_scene(width: usize, height: usize, seed: u32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            data.push((hash % (MAX_DN_11BIT as u32 + 1)) as f32);
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a grid with NaN (no-data) values at specified positions.
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
/// * `value` - Value of the valid cells
/// * `nan_positions` - List of (col, row) positions that should be NaN
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    value: f32,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![value; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}
