//! TOA conversion service library.
//!
//! Wires the [`radiometry`] core to a [`raster_store::RasterStore`]:
//! configuration loading, the command-line surface and the per-band
//! pipeline that reads DN rasters, converts them and writes
//! `<band>.<suffix>` products with metadata.

pub mod cli;
pub mod config;
pub mod pipeline;

pub use config::{FailurePolicy, ToarConfig};
pub use pipeline::{run, BandFailure, PipelineError, PipelineReport};
