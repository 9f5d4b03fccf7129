//! The raster store interface and an in-memory implementation.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::raster::{Raster, RasterMetadata};
use crate::region::Region;

/// Named raster storage with a current processing region.
///
/// Rasters are stored on their own region. The current region is store
/// state consulted by [`RasterStore::read_in_current_region`].
pub trait RasterStore {
    /// Read a raster on its native region.
    fn read(&self, name: &str) -> Result<Raster>;

    /// Write a raster, replacing any raster of the same name.
    fn write(&mut self, name: &str, raster: &Raster) -> Result<()>;

    fn exists(&self, name: &str) -> bool;

    /// Rename a raster, replacing `to` if it exists.
    fn rename(&mut self, from: &str, to: &str) -> Result<()>;

    /// Remove a raster. Fails with [`StoreError::NotFound`] if it does not exist.
    fn remove(&mut self, name: &str) -> Result<()>;

    /// Names of all rasters, sorted.
    fn list(&self) -> Result<Vec<String>>;

    /// The current region, if one has been set.
    fn region(&self) -> Result<Option<Region>>;

    /// Set or clear the current region.
    fn set_region(&mut self, region: Option<Region>) -> Result<()>;

    /// Replace the metadata of an existing raster.
    fn set_metadata(&mut self, name: &str, metadata: &RasterMetadata) -> Result<()> {
        let raster = self.read(name)?;
        self.write(name, &raster.with_metadata(metadata.clone()))
    }

    /// Read a raster evaluated on the current region.
    fn read_in_current_region(&self, name: &str) -> Result<Raster> {
        let region = self.region()?.ok_or(StoreError::NoRegion)?;
        let raster = self.read(name)?;
        if raster.region != region {
            debug!(raster = %name, region = %region, "Resampling to current region");
        }
        Ok(raster.resample(&region))
    }
}

/// Reject names that cannot be used as a file stem.
pub fn validate_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '@'])
        || name.chars().any(char::is_whitespace)
        || name == crate::fs::REGION_FILE_STEM;
    if bad {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// A store held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryRasterStore {
    rasters: BTreeMap<String, Raster>,
    region: Option<Region>,
}

impl MemoryRasterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RasterStore for MemoryRasterStore {
    fn read(&self, name: &str) -> Result<Raster> {
        self.rasters
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn write(&mut self, name: &str, raster: &Raster) -> Result<()> {
        validate_name(name)?;
        if raster.data.len() != raster.region.cells() {
            return Err(StoreError::ShapeMismatch {
                name: name.to_string(),
                expected: raster.region.cells(),
                actual: raster.data.len(),
            });
        }
        self.rasters.insert(name.to_string(), raster.clone());
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.rasters.contains_key(name)
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        validate_name(to)?;
        let raster = self
            .rasters
            .remove(from)
            .ok_or_else(|| StoreError::NotFound(from.to_string()))?;
        self.rasters.insert(to.to_string(), raster);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        self.rasters
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.rasters.keys().cloned().collect())
    }

    fn region(&self) -> Result<Option<Region>> {
        Ok(self.region)
    }

    fn set_region(&mut self, region: Option<Region>) -> Result<()> {
        if let Some(r) = &region {
            r.validate()?;
        }
        self.region = region;
        Ok(())
    }
}
