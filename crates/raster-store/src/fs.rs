//! Filesystem raster store.
//!
//! Layout of a store directory:
//!
//! ```text
//! <root>/<name>.json   region + metadata (serde_json)
//! <root>/<name>.bin    samples, little-endian f32
//! <root>/REGION.json   current region
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Result, StoreError};
use crate::raster::{Raster, RasterMetadata};
use crate::region::Region;
use crate::store::{validate_name, RasterStore};

/// File stem of the current-region file; not usable as a raster name.
pub const REGION_FILE_STEM: &str = "REGION";

const HEADER_EXT: &str = "json";
const DATA_EXT: &str = "bin";

#[derive(Debug, Serialize, Deserialize)]
struct RasterHeader {
    region: Region,
    #[serde(default)]
    metadata: RasterMetadata,
}

/// A raster store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsRasterStore {
    root: PathBuf,
}

impl FsRasterStore {
    /// Open a store, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "Opened raster store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn header_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, HEADER_EXT))
    }

    fn data_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, DATA_EXT))
    }

    fn region_path(&self) -> PathBuf {
        self.root.join(format!("{}.{}", REGION_FILE_STEM, HEADER_EXT))
    }

    fn read_header(&self, name: &str) -> Result<RasterHeader> {
        let path = self.header_path(name);
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_header(&self, name: &str, header: &RasterHeader) -> Result<()> {
        let content = serde_json::to_string_pretty(header)?;
        fs::write(self.header_path(name), content)?;
        Ok(())
    }
}

fn encode_samples(data: &[f32]) -> Vec<u8> {
    if cfg!(target_endian = "little") {
        bytemuck::cast_slice(data).to_vec()
    } else {
        data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

fn decode_samples(bytes: &[u8]) -> Vec<f32> {
    let mut data: Vec<f32> = bytemuck::pod_collect_to_vec(bytes);
    if cfg!(target_endian = "big") {
        for v in &mut data {
            *v = f32::from_bits(u32::from_le(v.to_bits()));
        }
    }
    data
}

impl RasterStore for FsRasterStore {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn read(&self, name: &str) -> Result<Raster> {
        let header = self.read_header(name)?;
        let bytes = fs::read(self.data_path(name))?;

        if bytes.len() % std::mem::size_of::<f32>() != 0 {
            return Err(StoreError::Serialization(format!(
                "{}.{} is {} bytes, not a whole number of f32 samples",
                name,
                DATA_EXT,
                bytes.len()
            )));
        }
        let data = decode_samples(&bytes);
        if data.len() != header.region.cells() {
            return Err(StoreError::ShapeMismatch {
                name: name.to_string(),
                expected: header.region.cells(),
                actual: data.len(),
            });
        }

        debug!(cells = data.len(), "Read raster");
        Ok(Raster {
            data,
            region: header.region,
            metadata: header.metadata,
        })
    }

    #[instrument(skip(self, raster), fields(root = %self.root.display()))]
    fn write(&mut self, name: &str, raster: &Raster) -> Result<()> {
        validate_name(name)?;
        if raster.data.len() != raster.region.cells() {
            return Err(StoreError::ShapeMismatch {
                name: name.to_string(),
                expected: raster.region.cells(),
                actual: raster.data.len(),
            });
        }

        fs::write(self.data_path(name), encode_samples(&raster.data))?;
        self.write_header(
            name,
            &RasterHeader {
                region: raster.region,
                metadata: raster.metadata.clone(),
            },
        )?;

        debug!(cells = raster.data.len(), "Wrote raster");
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.header_path(name).is_file()
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        validate_name(to)?;
        if !self.exists(from) {
            return Err(StoreError::NotFound(from.to_string()));
        }
        fs::rename(self.data_path(from), self.data_path(to))?;
        fs::rename(self.header_path(from), self.header_path(to))?;
        debug!(from = %from, to = %to, "Renamed raster");
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        if !self.exists(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }
        fs::remove_file(self.header_path(name))?;
        let data = self.data_path(name);
        if data.exists() {
            fs::remove_file(data)?;
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(HEADER_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem != REGION_FILE_STEM {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn region(&self) -> Result<Option<Region>> {
        let path = self.region_path();
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn set_region(&mut self, region: Option<Region>) -> Result<()> {
        let path = self.region_path();
        match region {
            Some(region) => {
                region.validate()?;
                fs::write(path, serde_json::to_string_pretty(&region)?)?;
                debug!(region = %region, "Set current region");
            }
            None => {
                if path.exists() {
                    fs::remove_file(path)?;
                }
                debug!("Cleared current region");
            }
        }
        Ok(())
    }

    fn set_metadata(&mut self, name: &str, metadata: &RasterMetadata) -> Result<()> {
        let mut header = self.read_header(name)?;
        header.metadata = metadata.clone();
        self.write_header(name, &header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::BoundingBox;

    #[test]
    fn test_sample_encoding_is_little_endian() {
        let bytes = encode_samples(&[1.0, -2.5]);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..], &(-2.5f32).to_le_bytes());
        assert_eq!(decode_samples(&bytes), vec![1.0, -2.5]);
    }

    #[test]
    fn test_write_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsRasterStore::open(dir.path()).unwrap();
        let region = Region::new(BoundingBox::new(0.0, 0.0, 2.0, 1.0), 2, 1).unwrap();
        let raster = Raster::new(vec![f32::NAN, 7.5], region)
            .unwrap()
            .with_metadata(RasterMetadata {
                title: "t".into(),
                ..Default::default()
            });

        store.write("Blue", &raster).unwrap();
        let back = store.read("Blue").unwrap();
        assert!(back.data[0].is_nan());
        assert_eq!(back.data[1], 7.5);
        assert_eq!(back.region, region);
        assert_eq!(back.metadata.title, "t");
    }

    #[test]
    fn test_list_skips_region_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsRasterStore::open(dir.path()).unwrap();
        let region = Region::with_shape(1, 1).unwrap();
        store.set_region(Some(region)).unwrap();
        store.write("b", &Raster::new(vec![0.0], region).unwrap()).unwrap();
        store.write("a", &Raster::new(vec![0.0], region).unwrap()).unwrap();
        assert_eq!(store.list().unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.region().unwrap(), Some(region));
    }

    #[test]
    fn test_truncated_samples_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsRasterStore::open(dir.path()).unwrap();
        let region = Region::with_shape(2, 1).unwrap();
        store.write("x", &Raster::new(vec![1.0, 2.0], region).unwrap()).unwrap();
        fs::write(dir.path().join("x.bin"), [0u8; 6]).unwrap();
        assert!(matches!(store.read("x"), Err(StoreError::Serialization(_))));
        fs::write(dir.path().join("x.bin"), [0u8; 4]).unwrap();
        assert!(matches!(store.read("x"), Err(StoreError::ShapeMismatch { .. })));
    }
}
