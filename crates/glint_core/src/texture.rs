//! Texture loading and caching for materials.
//!
//! Provides a texture cache that loads images from disk and stores them
//! as RGB floats in [0, 1] for sampling by material parameters and cube maps.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glint_math::DVec3;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {0} has no pixels")]
    Empty(String),

    #[error("Pixel data does not match {width}x{height}")]
    SizeMismatch { width: u32, height: u32 },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Pixel data in RGB format (0-1 range), row-major, row 0 first
    pub pixels: Vec<[f32; 3]>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<[f32; 3]>,
        path: impl Into<String>,
    ) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(path.into()));
        }
        if pixels.len() != (width as usize) * (height as usize) {
            return Err(TextureError::SizeMismatch { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels,
            path: path.into(),
        })
    }

    /// Create a texture from 8-bit RGB bytes.
    pub fn from_rgb8(width: u32, height: u32, bytes: &[u8], path: impl Into<String>) -> TextureResult<Self> {
        let pixels = bytes
            .chunks_exact(3)
            .map(|p| [p[0] as f32 / 255.0, p[1] as f32 / 255.0, p[2] as f32 / 255.0])
            .collect();
        Self::new(width, height, pixels, path)
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: DVec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![[color.x as f32, color.y as f32, color.z as f32]],
            path: "<solid>".to_string(),
        }
    }

    /// Sample the texture at UV coordinates with bilinear filtering.
    ///
    /// `u` runs along the width and `v` along the height. Coordinates
    /// outside [0, 1] are clamped to the edge texels.
    pub fn sample(&self, u: f64, v: f64) -> DVec3 {
        let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
        let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };

        let x = u * (self.width - 1) as f64;
        let y = v * (self.height - 1) as f64;

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x - x0 as f64;
        let fy = y - y0 as f64;

        let p00 = self.get_pixel(x0, y0);
        let p10 = self.get_pixel(x1, y0);
        let p01 = self.get_pixel(x0, y1);
        let p11 = self.get_pixel(x1, y1);

        let top = p00 * (1.0 - fx) + p10 * fx;
        let bottom = p01 * (1.0 - fx) + p11 * fx;
        top * (1.0 - fy) + bottom * fy
    }

    /// Get pixel at integer coordinates, clamped to the texture edges.
    pub fn get_pixel(&self, x: u32, y: u32) -> DVec3 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = (y * self.width + x) as usize;
        self.pixels
            .get(idx)
            .map(|p| DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64))
            .unwrap_or(DVec3::ZERO)
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 3]>()
    }
}

/// Cache for loaded textures.
///
/// Textures are loaded on-demand and shared between every material that
/// names the same file.
pub struct TextureCache {
    /// Cached textures by file path
    textures: HashMap<String, Arc<Texture>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(load_texture_file(&full_path)?);
        self.textures.insert(path.to_string(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Insert an already decoded texture under a name.
    pub fn insert(&mut self, name: impl Into<String>, texture: Texture) -> Arc<Texture> {
        let texture = Arc::new(texture);
        self.textures.insert(name.into(), texture.clone());
        texture
    }

    /// Get a cached texture without loading.
    pub fn get(&self, path: &str) -> Option<Arc<Texture>> {
        self.textures.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a texture from a file path.
fn load_texture_file(path: &Path) -> TextureResult<Texture> {
    let display = path.to_string_lossy().to_string();
    let img = image::open(path).map_err(|source| TextureError::Load {
        path: display.clone(),
        source,
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Texture::from_rgb8(width, height, rgb.as_raw(), display)
}
