//! Thumbnail caching for TUI rendering.
//!
//! Uses `ratatui-image`'s Picker to detect terminal capabilities and render
//! images with the appropriate graphics protocol (Sixel, Kitty, iTerm2, or
//! halfblocks fallback).
//!
//! ## Architecture
//!
//! - **Picker**: Initialized once after entering alternate screen, detects graphics protocol
//! - **Cache**: LRU-evicted HashMap of render protocols keyed by file path
//! - **Failures**: Files that fail to decode are remembered and not retried every frame

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::{DynamicImage, Rgba, RgbaImage};
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;
use thiserror::Error;
use tracing::debug;

/// Default number of decoded thumbnails kept around
const DEFAULT_MAX_CACHE_SIZE: usize = 64;

/// Errors that can occur during image loading and caching
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    #[error("image not found")]
    NotFound,
    #[error("image support is not initialized")]
    Unavailable,
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("failed: {0}")]
    Failed(String),
}

/// Cached image with metadata
struct CachedImage {
    protocol: StatefulProtocol,
    /// Last access time for LRU eviction
    last_used: Instant,
}

/// Image cache with LRU eviction.
pub struct ImageCache {
    /// Terminal graphics protocol picker (initialized once)
    picker: Option<Picker>,
    loaded_images: HashMap<PathBuf, CachedImage>,
    failed: HashSet<PathBuf>,
    max_cache_size: usize,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCache {
    pub fn new() -> Self {
        Self {
            picker: None,
            loaded_images: HashMap::new(),
            failed: HashSet::new(),
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
        }
    }

    /// Initialize the Picker for graphics protocol detection.
    ///
    /// This should be called once after entering alternate screen mode.
    /// If initialization fails, cards fall back to text placeholders.
    pub fn initialize(&mut self) -> Result<(), ImageError> {
        let picker = Picker::from_query_stdio()
            .map_err(|e| ImageError::Failed(format!("terminal query failed: {}", e)))?;
        self.picker = Some(picker);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.picker.is_some()
    }

    /// Whether `path` failed to load before
    pub fn has_failed(&self, path: &Path) -> bool {
        self.failed.contains(path)
    }

    /// Render protocol for `path`, decoding the file on first use.
    pub fn protocol(&mut self, path: &Path) -> Result<&mut StatefulProtocol, ImageError> {
        if self.failed.contains(path) {
            return Err(ImageError::Failed("previous load failed".to_string()));
        }

        if !self.loaded_images.contains_key(path) {
            let picker = self.picker.as_mut().ok_or(ImageError::Unavailable)?;
            let image = match extract_first_frame(path) {
                Ok(image) => image,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "thumbnail failed to load");
                    self.failed.insert(path.to_path_buf());
                    return Err(e);
                }
            };

            let protocol = picker.new_resize_protocol(image);
            self.loaded_images.insert(
                path.to_path_buf(),
                CachedImage {
                    protocol,
                    last_used: Instant::now(),
                },
            );
            self.evict_lru(path);
        }

        let cached = self
            .loaded_images
            .get_mut(path)
            .ok_or(ImageError::NotFound)?;
        cached.last_used = Instant::now();
        Ok(&mut cached.protocol)
    }

    /// Drop every decoded image and forget past failures.
    pub fn clear(&mut self) {
        self.loaded_images.clear();
        self.failed.clear();
    }

    /// Forget one file, e.g. after it changed on disk
    pub fn invalidate(&mut self, path: &Path) {
        self.loaded_images.remove(path);
        self.failed.remove(path);
    }

    /// Evict least recently used images until the cache fits, never evicting `keep`
    fn evict_lru(&mut self, keep: &Path) {
        while self.loaded_images.len() > self.max_cache_size {
            let Some(oldest) = self
                .loaded_images
                .iter()
                .filter(|(p, _)| p.as_path() != keep)
                .min_by_key(|(_, cached)| cached.last_used)
                .map(|(p, _)| p.clone())
            else {
                break;
            };
            self.loaded_images.remove(&oldest);
        }
    }

    pub fn set_max_cache_size(&mut self, size: usize) {
        self.max_cache_size = size.max(1);
    }

    /// Cache statistics for debugging: (loaded, capacity)
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.loaded_images.len(), self.max_cache_size)
    }
}

/// Decode an image file, taking the first frame of animated GIFs.
///
/// GIF frames are composited onto a transparent canvas of the full logical
/// screen size so offset first frames keep their position.
pub fn extract_first_frame(path: &Path) -> Result<DynamicImage, ImageError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ImageError::NotFound,
        _ => ImageError::Failed(format!("IO error: {}", e)),
    })?;

    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);

    // Not a GIF: use the regular decoders
    let Ok(mut decoder) = options.read_info(BufReader::new(file)) else {
        return decode_regular(path);
    };

    let width = decoder.width() as u32;
    let height = decoder.height() as u32;
    let Ok(Some(frame)) = decoder.read_next_frame() else {
        return decode_regular(path);
    };

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let (frame_width, frame_height) = (frame.width as u32, frame.height as u32);
    let (left, top) = (frame.left as u32, frame.top as u32);

    for y in 0..frame_height {
        for x in 0..frame_width {
            let src = ((y * frame_width + x) * 4) as usize;
            let Some(rgba) = frame.buffer.get(src..src + 4) else {
                continue;
            };
            let (cx, cy) = (left + x, top + y);
            if cx < width && cy < height && rgba[3] > 0 {
                canvas.put_pixel(cx, cy, Rgba([rgba[0], rgba[1], rgba[2], rgba[3]]));
            }
        }
    }

    Ok(DynamicImage::ImageRgba8(canvas))
}

fn decode_regular(path: &Path) -> Result<DynamicImage, ImageError> {
    image::ImageReader::open(path)
        .map_err(|e| ImageError::Failed(format!("IO error: {}", e)))?
        .with_guessed_format()
        .map_err(|e| ImageError::Failed(format!("IO error: {}", e)))?
        .decode()
        .map_err(|e| ImageError::InvalidFormat(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;
    use tempfile::TempDir;

    #[test]
    fn test_create_cache() {
        let cache = ImageCache::new();
        assert_eq!(cache.cache_stats(), (0, DEFAULT_MAX_CACHE_SIZE));
        assert!(!cache.is_initialized());
    }

    #[test]
    fn test_protocol_requires_picker() {
        let mut cache = ImageCache::new();
        let err = cache.protocol(Path::new("/nowhere/x.png")).err();
        assert!(matches!(err, Some(ImageError::Unavailable)));
    }

    #[test]
    fn test_extract_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dot.png");
        RgbaImage::from_pixel(3, 2, Rgba([255, 0, 0, 255]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let image = extract_first_frame(&path).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[test]
    fn test_extract_missing_file() {
        let err = extract_first_frame(Path::new("/nowhere/missing.gif")).unwrap_err();
        assert!(matches!(err, ImageError::NotFound));
    }

    #[test]
    fn test_extract_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(extract_first_frame(&path).is_err());
    }
}
