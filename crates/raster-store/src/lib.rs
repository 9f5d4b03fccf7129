//! Raster storage for the TOA conversion service.
//!
//! Provides:
//! - [`RasterStore`]: named f32 rasters with metadata and a current region
//! - [`FsRasterStore`]: a directory of JSON headers and f32 sample files
//! - [`MemoryRasterStore`]: an in-memory store for tests and embedding
//! - [`RegionGuard`] / [`TempRasters`]: scoped region restore and temporary cleanup

pub mod error;
pub mod fs;
pub mod guard;
pub mod raster;
pub mod region;
pub mod store;

pub use error::{Result, StoreError};
pub use fs::FsRasterStore;
pub use guard::{RegionGuard, TempRasters};
pub use raster::{Raster, RasterMetadata};
pub use region::{BoundingBox, Region};
pub use store::{validate_name, MemoryRasterStore, RasterStore};
