//! Scoped store state: region restoration and temporary raster cleanup.
//!
//! Both guards borrow the store mutably and dereference to it, so they can be
//! nested and the store stays usable through them.

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::error::Result;
use crate::raster::Raster;
use crate::region::Region;
use crate::store::RasterStore;

/// Restores the store's current region when dropped.
pub struct RegionGuard<'a, S: RasterStore + ?Sized> {
    store: &'a mut S,
    saved: Option<Region>,
}

impl<'a, S: RasterStore + ?Sized> RegionGuard<'a, S> {
    /// Remember the current region of `store`.
    pub fn new(store: &'a mut S) -> Result<Self> {
        let saved = store.region()?;
        Ok(Self { store, saved })
    }

    /// The region that will be restored.
    pub fn saved_region(&self) -> Option<&Region> {
        self.saved.as_ref()
    }
}

impl<S: RasterStore + ?Sized> Deref for RegionGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: RasterStore + ?Sized> DerefMut for RegionGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: RasterStore + ?Sized> Drop for RegionGuard<'_, S> {
    fn drop(&mut self) {
        match self.store.set_region(self.saved) {
            Ok(()) => debug!("Restored previous region"),
            Err(e) => warn!(error = %e, "Failed to restore previous region"),
        }
    }
}

/// Tracks temporary rasters and removes the ones still present when dropped.
pub struct TempRasters<'a, S: RasterStore + ?Sized> {
    store: &'a mut S,
    prefix: String,
    names: Vec<String>,
}

impl<'a, S: RasterStore + ?Sized> TempRasters<'a, S> {
    /// Temporaries are named `<prefix>.<band>.<kind>`.
    pub fn new(store: &'a mut S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            names: Vec::new(),
        }
    }

    /// Temporary names of the form `tmp.<pid>` for this process.
    pub fn for_process(store: &'a mut S) -> Self {
        Self::new(store, format!("tmp.{}", std::process::id()))
    }

    pub fn temp_name(&self, band: &str, kind: &str) -> String {
        format!("{}.{}.{}", self.prefix, band, kind)
    }

    /// Write a temporary raster and track it for cleanup.
    pub fn write(&mut self, name: &str, raster: &Raster) -> Result<()> {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
        self.store.write(name, raster)
    }

    /// Rename a temporary raster to its final name; it is no longer tracked.
    pub fn promote(&mut self, name: &str, final_name: &str) -> Result<()> {
        self.store.rename(name, final_name)?;
        self.names.retain(|n| n != name);
        Ok(())
    }

    /// Names still awaiting cleanup.
    pub fn pending(&self) -> &[String] {
        &self.names
    }
}

impl<S: RasterStore + ?Sized> Deref for TempRasters<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: RasterStore + ?Sized> DerefMut for TempRasters<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: RasterStore + ?Sized> Drop for TempRasters<'_, S> {
    fn drop(&mut self) {
        for name in self.names.drain(..) {
            if !self.store.exists(&name) {
                continue;
            }
            match self.store.remove(&name) {
                Ok(()) => debug!(raster = %name, "Removed temporary raster"),
                Err(e) => warn!(raster = %name, error = %e, "Failed to remove temporary raster"),
            }
        }
    }
}
