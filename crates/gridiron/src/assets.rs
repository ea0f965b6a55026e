use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

/// A decoded image. Entities keep an `Arc` to one of these and derive
/// their collision footprint from its pixel size at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// RGBA bitmap from decoded pixel data.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Transparent bitmap of the given size. Used as a stand-in where no
    /// real image data is needed, such as in tests.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Source of decoded bitmaps, keyed by the path strings that appear in
/// level documents. Caching is the cache's concern, not the provider's.
pub trait ResourceProvider {
    fn load(&self, path: &str) -> Result<Bitmap, AssetError>;
}

/// Provider that decodes PNG files relative to a root directory.
pub struct DiskProvider {
    root: PathBuf,
}

impl DiskProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceProvider for DiskProvider {
    fn load(&self, path: &str) -> Result<Bitmap, AssetError> {
        let full = self.root.join(path);
        let raw = std::fs::read(&full).map_err(|source| AssetError::Read {
            path: full.clone(),
            source,
        })?;
        let decoded = image::load_from_memory(&raw).map_err(|source| AssetError::Decode {
            path: full,
            source,
        })?;
        let rgba = decoded.to_rgba8();
        Ok(Bitmap::from_rgba(rgba.width(), rgba.height(), rgba.into_raw()))
    }
}

/// Memoized path -> bitmap map over an injected provider. Populated
/// lazily on first reference and cleared wholesale on level clear.
pub struct ImageCache {
    provider: Box<dyn ResourceProvider>,
    images: HashMap<String, Arc<Bitmap>>,
}

impl ImageCache {
    pub fn new(provider: Box<dyn ResourceProvider>) -> Self {
        Self {
            provider,
            images: HashMap::new(),
        }
    }

    pub fn get(&mut self, path: &str) -> Result<Arc<Bitmap>, AssetError> {
        if let Some(bitmap) = self.images.get(path) {
            return Ok(Arc::clone(bitmap));
        }
        let bitmap = Arc::new(self.provider.load(path)?);
        debug!(path, width = bitmap.width(), height = bitmap.height(), "image_cached");
        self.images.insert(path.to_string(), Arc::clone(&bitmap));
        Ok(bitmap)
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("cached", &self.images.len())
            .finish()
    }
}

/// Provider returning blank bitmaps with per-path sizes. Intended for
/// tests and headless runs where image files are unavailable.
pub struct FixedSizeProvider {
    sizes: HashMap<String, (u32, u32)>,
    default_size: (u32, u32),
}

impl FixedSizeProvider {
    pub fn new(default_size: (u32, u32)) -> Self {
        Self {
            sizes: HashMap::new(),
            default_size,
        }
    }

    pub fn with_size(mut self, path: &str, width: u32, height: u32) -> Self {
        self.sizes.insert(path.to_string(), (width, height));
        self
    }
}

impl ResourceProvider for FixedSizeProvider {
    fn load(&self, path: &str) -> Result<Bitmap, AssetError> {
        let (width, height) = self
            .sizes
            .get(path)
            .copied()
            .unwrap_or(self.default_size);
        Ok(Bitmap::blank(width, height))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn cache_memoizes_by_path() {
        let provider = FixedSizeProvider::new((32, 32)).with_size("images/wide.png", 64, 32);
        let mut cache = ImageCache::new(Box::new(provider));

        let first = cache.get("images/wide.png").expect("load");
        let second = cache.get("images/wide.png").expect("load");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.width(), 64);
    }

    #[test]
    fn cache_clear_drops_all_entries() {
        let mut cache = ImageCache::new(Box::new(FixedSizeProvider::new((32, 32))));
        cache.get("a.png").expect("load");
        cache.get("b.png").expect("load");
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn disk_provider_reports_missing_file() {
        let temp = TempDir::new().expect("temp");
        let provider = DiskProvider::new(temp.path());
        let err = provider.load("images/nothing.png").expect_err("err");
        assert!(matches!(err, AssetError::Read { .. }));
    }

    #[test]
    fn disk_provider_reports_undecodable_file() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("bad.png");
        fs::write(&path, b"not a png").expect("write");
        let provider = DiskProvider::new(temp.path());
        let err = provider.load("bad.png").expect_err("err");
        assert!(matches!(err, AssetError::Decode { .. }));
    }
}
