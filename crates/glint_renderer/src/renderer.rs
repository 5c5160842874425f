//! Pixel sampling and whole-image rendering.
//!
//! Implements:
//! - Per-pixel tracing with optional supersampled anti-aliasing
//! - A blocking data-parallel render over rayon
//! - Conversion of linear colors to 8-bit RGB

use glint_math::Interval;
use rayon::prelude::*;

use crate::integrator::trace_ray;
use crate::material::Color;
use crate::recorder::{NoRecorder, TraceRecorder};
use crate::scene::Scene;

/// Supersampling settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AntiAliasing {
    /// Samples per pixel along each axis
    pub samples: u32,
    /// Weight kept by the single primary sample; the supersampled
    /// average gets the rest
    pub threshold: f64,
}

impl Default for AntiAliasing {
    fn default() -> Self {
        Self {
            samples: 3,
            threshold: 0.0,
        }
    }
}

/// Trace configuration.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Maximum recursion depth for reflection and refraction rays
    pub max_depth: u32,
    /// Maximum number of translucent occluders a shadow ray passes through
    pub shadow_depth: u32,
    /// Color of rays that escape the scene when there is no cube map
    pub background: Color,
    /// Spawn reflection rays from hits reached by refraction rays
    pub reflect_inside_refraction: bool,
    pub anti_aliasing: Option<AntiAliasing>,
    /// Worker threads for band-scheduled rendering
    pub threads: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            shadow_depth: 4,
            background: Color::ZERO,
            reflect_inside_refraction: false,
            anti_aliasing: None,
            threads: std::thread::available_parallelism().map_or(4, |n| n.get()),
        }
    }
}

impl TraceConfig {
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_shadow_depth(mut self, shadow_depth: u32) -> Self {
        self.shadow_depth = shadow_depth;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_reflect_inside_refraction(mut self, enabled: bool) -> Self {
        self.reflect_inside_refraction = enabled;
        self
    }

    pub fn with_anti_aliasing(mut self, anti_aliasing: Option<AntiAliasing>) -> Self {
        self.anti_aliasing = anti_aliasing;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f64) -> f64 {
    Interval::UNIT.clamp(x)
}

/// Convert a color to 8-bit RGB.
///
/// Channels are clamped to [0, 1] and truncated; no gamma is applied.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [
        (255.0 * clamp_01(color.x)) as u8,
        (255.0 * clamp_01(color.y)) as u8,
        (255.0 * clamp_01(color.z)) as u8,
    ]
}

/// Trace the primary ray through normalized image point `(x, y)`, clamped.
pub fn trace_sample<R>(scene: &Scene, config: &TraceConfig, x: f64, y: f64, recorder: &mut R) -> Color
where
    R: TraceRecorder + ?Sized,
{
    let ray = scene.camera().ray_through(x, y);
    trace_ray(scene, &ray, 0, config, recorder).clamp(Color::ZERO, Color::ONE)
}

/// Color of pixel `(x, y)` in a `width` by `height` image.
///
/// Row 0 is the bottom of the image. With anti-aliasing enabled the pixel
/// is also sampled on a regular `samples` by `samples` grid and blended with
/// the primary sample by the threshold weight.
pub fn render_pixel<R>(
    scene: &Scene,
    config: &TraceConfig,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    recorder: &mut R,
) -> Color
where
    R: TraceRecorder + ?Sized,
{
    let w = width as f64;
    let h = height as f64;
    let primary = trace_sample(scene, config, x as f64 / w, y as f64 / h, recorder);

    let Some(aa) = config.anti_aliasing.filter(|aa| aa.samples > 1) else {
        return primary;
    };

    // Sub-sample coordinates in f64 so large grids cannot overflow
    let n = aa.samples as f64;
    let sub_w = w * n;
    let sub_h = h * n;
    let mut sum = Color::ZERO;
    for j in 0..aa.samples {
        for i in 0..aa.samples {
            let sx = (x as f64 * n + i as f64) / sub_w;
            let sy = (y as f64 * n + j as f64) / sub_h;
            sum += trace_sample(scene, config, sx, sy, recorder);
        }
    }
    let average = sum / (n * n);

    primary * aa.threshold + average * (1.0 - aa.threshold)
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    /// Row-major, row 0 at the bottom
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width as usize) * (height as usize)],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Convert to RGB bytes, bottom row first.
    pub fn to_rgb(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgb(*c)).collect()
    }
}

/// Render the entire scene, one rayon task per row.
pub fn render(scene: &Scene, config: &TraceConfig, width: u32, height: u32) -> ImageBuffer {
    let start = std::time::Instant::now();
    let mut image = ImageBuffer::new(width, height);
    if width == 0 || height == 0 {
        return image;
    }

    image
        .pixels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = render_pixel(scene, config, x as u32, y as u32, width, height, &mut NoRecorder);
            }
        });

    log::info!("Rendered {}x{} in {:.2?}", width, height, start.elapsed());
    image
}
