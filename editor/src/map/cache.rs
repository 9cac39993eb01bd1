//! Memoizing cache for decoded and transformed asset images
//!
//! Entries live for the whole session and are never evicted, so a repeated
//! lookup returns the very same image as the first one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::ImageRenderError;

/// Background behind letterboxed thumbnails
pub const THUMBNAIL_FILL: Rgba<u8> = Rgba([40, 40, 55, 255]);

/// Smallest edge of an overlay render
const MIN_OVERLAY_EDGE: u32 = 4;

/// Identifies one render of one asset
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum RenderKey {
    /// Square tile, rotated in 60° steps without growing
    Tile {
        path: PathBuf,
        size: u32,
        rotation: u8,
    },
    /// Aspect-preserving overlay, rotated in whole degrees with expanded bounds
    Overlay {
        path: PathBuf,
        width: u32,
        rotation: u32,
    },
    /// Letterboxed square thumbnail
    Thumbnail { path: PathBuf, size: u32 },
}

impl RenderKey {
    pub fn tile(path: impl AsRef<Path>, hex_size: f64, rotation_step: u8) -> Self {
        Self::Tile {
            path: path.as_ref().to_path_buf(),
            size: (hex_size * 2.0) as u32,
            rotation: rotation_step % 6,
        }
    }

    pub fn overlay(path: impl AsRef<Path>, hex_size: f64, scale: f64, rotation_deg: f64) -> Self {
        let width = ((hex_size * 2.0 * scale) as u32).max(MIN_OVERLAY_EDGE);
        let rotation = (rotation_deg.round() as i64).rem_euclid(360) as u32;
        Self::Overlay {
            path: path.as_ref().to_path_buf(),
            width,
            rotation,
        }
    }

    pub fn thumbnail(path: impl AsRef<Path>, size: u32) -> Self {
        Self::Thumbnail {
            path: path.as_ref().to_path_buf(),
            size,
        }
    }

    /// Source asset of this render
    pub fn path(&self) -> &Path {
        match self {
            Self::Tile { path, .. } | Self::Overlay { path, .. } | Self::Thumbnail { path, .. } => {
                path
            }
        }
    }
}

/// Image cache shared by the canvas and the catalog sidebar
#[derive(Default)]
pub struct ImageCache {
    sources: HashMap<PathBuf, Arc<RgbaImage>>,
    renders: HashMap<RenderKey, Arc<RgbaImage>>,
    memory: usize,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a render, producing and storing it on first use
    pub fn get(&mut self, key: &RenderKey) -> Result<Arc<RgbaImage>, ImageRenderError> {
        if let Some(image) = self.renders.get(key) {
            return Ok(image.clone());
        }

        let source = self.source(key.path())?;
        let rendered = match key {
            RenderKey::Tile { size, rotation, .. } => render_tile(&source, *size, *rotation),
            RenderKey::Overlay {
                width, rotation, ..
            } => render_overlay(&source, *width, *rotation),
            RenderKey::Thumbnail { size, .. } => render_thumbnail(&source, *size),
        };

        let image = Arc::new(rendered);
        self.memory += image_memory_size(&image);
        self.renders.insert(key.clone(), image.clone());
        Ok(image)
    }

    /// Get a render only if it has been produced already
    pub fn peek(&self, key: &RenderKey) -> Option<Arc<RgbaImage>> {
        self.renders.get(key).cloned()
    }

    pub fn contains(&self, key: &RenderKey) -> bool {
        self.renders.contains_key(key)
    }

    /// Decoded source image, cached per path
    fn source(&mut self, path: &Path) -> Result<Arc<RgbaImage>, ImageRenderError> {
        if let Some(image) = self.sources.get(path) {
            return Ok(image.clone());
        }

        let decoded = image::open(path)
            .map_err(|source| ImageRenderError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        log::debug!(
            "Decoded {:?} ({}x{})",
            path,
            decoded.width(),
            decoded.height()
        );

        let image = Arc::new(decoded);
        self.memory += image_memory_size(&image);
        self.sources.insert(path.to_path_buf(), image.clone());
        Ok(image)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            source_count: self.sources.len(),
            render_count: self.renders.len(),
            memory_used: self.memory,
        }
    }

    /// Get number of cached renders
    pub fn len(&self) -> usize {
        self.renders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renders.is_empty()
    }
}

/// Cache statistics for debugging/UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub source_count: usize,
    pub render_count: usize,
    pub memory_used: usize,
}

/// Calculate memory size for an RGBA8 image
pub fn image_memory_size(image: &RgbaImage) -> usize {
    image.width() as usize * image.height() as usize * 4
}

fn render_tile(source: &RgbaImage, size: u32, rotation_step: u8) -> RgbaImage {
    let size = size.max(1);
    let resized = imageops::resize(source, size, size, FilterType::Lanczos3);
    if rotation_step == 0 {
        return resized;
    }
    rotate(&resized, rotation_step as f64 * 60.0, false, Sampling::Nearest)
}

fn render_overlay(source: &RgbaImage, width: u32, rotation: u32) -> RgbaImage {
    let aspect = source.height() as f64 / source.width().max(1) as f64;
    let height = ((width as f64 * aspect) as u32).max(MIN_OVERLAY_EDGE);
    let resized = imageops::resize(source, width, height, FilterType::Lanczos3);
    if rotation == 0 {
        return resized;
    }
    rotate(&resized, rotation as f64, true, Sampling::Bilinear)
}

fn render_thumbnail(source: &RgbaImage, size: u32) -> RgbaImage {
    let size = size.max(1);
    let (w, h) = source.dimensions();

    // Shrink to fit, never enlarge
    let fitted = if w > size || h > size {
        let scale = (size as f64 / w as f64).min(size as f64 / h as f64);
        let fw = ((w as f64 * scale) as u32).clamp(1, size);
        let fh = ((h as f64 * scale) as u32).clamp(1, size);
        imageops::resize(source, fw, fh, FilterType::Lanczos3)
    } else {
        source.clone()
    };

    let mut canvas = RgbaImage::from_pixel(size, size, THUMBNAIL_FILL);
    let x = (size - fitted.width()) / 2;
    let y = (size - fitted.height()) / 2;
    imageops::overlay(&mut canvas, &fitted, x as i64, y as i64);
    canvas
}

#[derive(Clone, Copy, Debug)]
enum Sampling {
    Nearest,
    Bilinear,
}

/// Rotate clockwise by `degrees` around the image center.
///
/// With `expand` the output grows to hold the whole rotated image, otherwise
/// it keeps the source dimensions and the corners are clipped. Uncovered
/// pixels are transparent.
fn rotate(source: &RgbaImage, degrees: f64, expand: bool, sampling: Sampling) -> RgbaImage {
    let (w, h) = source.dimensions();
    let (sin, cos) = degrees.to_radians().sin_cos();

    let (out_w, out_h) = if expand {
        let fw = w as f64 * cos.abs() + h as f64 * sin.abs();
        let fh = w as f64 * sin.abs() + h as f64 * cos.abs();
        ((fw - 1e-6).ceil().max(1.0) as u32, (fh - 1e-6).ceil().max(1.0) as u32)
    } else {
        (w, h)
    };

    let src_cx = w as f64 / 2.0;
    let src_cy = h as f64 / 2.0;
    let out_cx = out_w as f64 / 2.0;
    let out_cy = out_h as f64 / 2.0;

    let mut out = RgbaImage::new(out_w, out_h);
    for (ox, oy, pixel) in out.enumerate_pixels_mut() {
        let dx = ox as f64 + 0.5 - out_cx;
        let dy = oy as f64 + 0.5 - out_cy;

        // Inverse of a clockwise screen rotation
        let sx = dx * cos + dy * sin + src_cx;
        let sy = -dx * sin + dy * cos + src_cy;

        *pixel = match sampling {
            Sampling::Nearest => sample_nearest(source, sx, sy),
            Sampling::Bilinear => sample_bilinear(source, sx, sy),
        };
    }
    out
}

fn texel(source: &RgbaImage, x: i64, y: i64) -> Rgba<u8> {
    if x < 0 || y < 0 || x >= source.width() as i64 || y >= source.height() as i64 {
        Rgba([0, 0, 0, 0])
    } else {
        *source.get_pixel(x as u32, y as u32)
    }
}

fn sample_nearest(source: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    texel(source, x.floor() as i64, y.floor() as i64)
}

fn sample_bilinear(source: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let x = x - 0.5;
    let y = y - 0.5;
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let taps = [
        (texel(source, x0, y0), (1.0 - fx) * (1.0 - fy)),
        (texel(source, x0 + 1, y0), fx * (1.0 - fy)),
        (texel(source, x0, y0 + 1), (1.0 - fx) * fy),
        (texel(source, x0 + 1, y0 + 1), fx * fy),
    ];

    // Interpolate premultiplied so transparent texels don't darken edges
    let mut acc = [0.0f64; 4];
    for (Rgba([r, g, b, a]), weight) in taps {
        let alpha = a as f64 * weight;
        acc[0] += r as f64 * alpha;
        acc[1] += g as f64 * alpha;
        acc[2] += b as f64 * alpha;
        acc[3] += alpha;
    }

    if acc[3] <= f64::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }
    Rgba([
        (acc[0] / acc[3]).round().clamp(0.0, 255.0) as u8,
        (acc[1] / acc[3]).round().clamp(0.0, 255.0) as u8,
        (acc[2] / acc[3]).round().clamp(0.0, 255.0) as u8,
        acc[3].round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str, width: u32, height: u32) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hexmap-cache-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{name}.png"));
        RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_tile_render_keeps_size_when_rotated() {
        let path = fixture("tile", 50, 50);
        let mut cache = ImageCache::new();

        let key = RenderKey::tile(&path, 60.0, 1);
        assert_eq!(
            key,
            RenderKey::Tile {
                path: path.clone(),
                size: 120,
                rotation: 1
            }
        );
        let image = cache.get(&key).unwrap();
        assert_eq!(image.dimensions(), (120, 120));

        // Center stays opaque, the clipped corner becomes transparent
        assert!(image.get_pixel(60, 60)[3] > 250);
        assert_eq!(image.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_repeat_lookup_returns_same_render() {
        let path = fixture("repeat", 16, 16);
        let mut cache = ImageCache::new();
        let key = RenderKey::tile(&path, 30.0, 0);

        let first = cache.get(&key).unwrap();
        let second = cache.get(&key).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().source_count, 1);
    }

    #[test]
    fn test_overlay_render_preserves_aspect_and_expands() {
        let path = fixture("overlay", 100, 50);
        let mut cache = ImageCache::new();

        // 2 * 60 * 0.5 = 60 wide, half as tall
        let flat = cache.get(&RenderKey::overlay(&path, 60.0, 0.5, 0.0)).unwrap();
        assert_eq!(flat.dimensions(), (60, 30));

        let turned = cache.get(&RenderKey::overlay(&path, 60.0, 0.5, 90.0)).unwrap();
        assert_eq!(turned.dimensions(), (30, 60));

        let diagonal = cache.get(&RenderKey::overlay(&path, 60.0, 0.5, 45.0)).unwrap();
        assert!(diagonal.width() > 60 && diagonal.height() > 30);
    }

    #[test]
    fn test_overlay_key_normalizes_rotation_and_width() {
        let a = RenderKey::overlay("a.png", 60.0, 0.5, 359.6);
        let b = RenderKey::overlay("a.png", 60.0, 0.5, 0.0);
        assert_eq!(a, b);

        match RenderKey::overlay("a.png", 20.0, 0.05, 0.0) {
            RenderKey::Overlay { width, .. } => assert_eq!(width, MIN_OVERLAY_EDGE),
            other => panic!("unexpected key {other:?}"),
        }
    }

    #[test]
    fn test_thumbnail_letterboxes() {
        let path = fixture("thumb", 144, 72);
        let mut cache = ImageCache::new();
        let thumb = cache.get(&RenderKey::thumbnail(&path, 72)).unwrap();

        assert_eq!(thumb.dimensions(), (72, 72));
        assert_eq!(*thumb.get_pixel(36, 0), THUMBNAIL_FILL);
        let center = thumb.get_pixel(36, 36);
        assert!(center[0] > 190 && center[2] < 30);
    }

    #[test]
    fn test_thumbnail_does_not_enlarge() {
        let path = fixture("small", 10, 10);
        let mut cache = ImageCache::new();
        let thumb = cache.get(&RenderKey::thumbnail(&path, 72)).unwrap();

        assert_eq!(*thumb.get_pixel(36, 36), Rgba([200, 10, 10, 255]));
        assert_eq!(*thumb.get_pixel(20, 20), THUMBNAIL_FILL);
    }

    #[test]
    fn test_missing_file_is_not_cached() {
        let mut cache = ImageCache::new();
        let key = RenderKey::tile("/nonexistent/hexmap/missing.png", 60.0, 0);
        let err = cache.get(&key).unwrap_err();
        assert_eq!(err.path(), Path::new("/nonexistent/hexmap/missing.png"));
        assert!(cache.is_empty());
        assert!(cache.peek(&key).is_none());
    }
}
