//! Band-scheduled background rendering.
//!
//! [`RayTracer::trace_image`] splits the image into horizontal bands, one
//! per worker thread, and returns immediately. Workers write finished
//! pixels into a shared lock-free buffer and report completion; callers
//! poll with [`RayTracer::check_render`] or block with
//! [`RayTracer::wait_render`].

use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::material::Color;
use crate::recorder::{NoRecorder, TraceRecorder};
use crate::renderer::{color_to_rgb, render_pixel, ImageBuffer, TraceConfig};
use crate::scene::Scene;

/// 8-bit RGB pixels packed into atomics so workers can write without locks.
#[derive(Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<AtomicU32>,
}

impl PixelBuffer {
    /// A black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        self.contains(x, y)
            .then(|| (y as usize) * (self.width as usize) + x as usize)
    }

    /// Store a pixel; writes outside the buffer are dropped.
    pub fn set(&self, x: u32, y: u32, color: Color) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let [r, g, b] = color_to_rgb(color);
        let packed = ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
        self.pixels[idx].store(packed, Ordering::Relaxed);
    }

    /// Stored bytes, black outside the buffer.
    pub fn get_rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let Some(idx) = self.index(x, y) else {
            return [0; 3];
        };
        let packed = self.pixels[idx].load(Ordering::Relaxed);
        [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]
    }

    /// Stored color, quantized to 8 bits per channel.
    pub fn get(&self, x: u32, y: u32) -> Color {
        let [r, g, b] = self.get_rgb(x, y);
        Color::new(r as f64, g as f64, b as f64) / 255.0
    }

    /// RGB bytes, bottom row first.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                bytes.extend_from_slice(&self.get_rgb(x, y));
            }
        }
        bytes
    }

    pub fn to_image(&self) -> ImageBuffer {
        let mut image = ImageBuffer::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                image.set(x, y, self.get(x, y));
            }
        }
        image
    }
}

/// Row ranges for `threads` workers; the last band takes the remainder.
pub fn band_rows(height: u32, threads: usize) -> Vec<Range<u32>> {
    let threads = threads.max(1) as u32;
    let rows_per_band = height / threads;
    (0..threads)
        .map(|id| {
            let start = rows_per_band * id;
            let end = if id == threads - 1 { height } else { start + rows_per_band };
            start..end
        })
        .collect()
}

/// Background renderer over a shared scene.
pub struct RayTracer {
    scene: Arc<Scene>,
    config: Arc<TraceConfig>,
    buffer: Arc<PixelBuffer>,
    workers: Vec<JoinHandle<()>>,
    completed: Arc<Mutex<Vec<usize>>>,
    band_count: usize,
    started: Option<Instant>,
}

impl RayTracer {
    pub fn new(scene: Scene, config: TraceConfig) -> Self {
        Self::with_shared_scene(Arc::new(scene), config)
    }

    pub fn with_shared_scene(scene: Arc<Scene>, config: TraceConfig) -> Self {
        Self {
            scene,
            config: Arc::new(config),
            buffer: Arc::new(PixelBuffer::new(0, 0)),
            workers: Vec::new(),
            completed: Arc::new(Mutex::new(Vec::new())),
            band_count: 0,
            started: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Replace the configuration; waits for any render in progress.
    pub fn set_config(&mut self, config: TraceConfig) {
        self.wait_render();
        self.config = Arc::new(config);
    }

    /// Finish any render in progress and allocate a black `width` by `height` buffer.
    pub fn trace_setup(&mut self, width: u32, height: u32) {
        self.wait_render();
        self.buffer = Arc::new(PixelBuffer::new(width, height));
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.band_count = 0;
    }

    /// Start rendering in the background and return immediately.
    pub fn trace_image(&mut self, width: u32, height: u32) -> std::io::Result<()> {
        self.trace_setup(width, height);

        let bands = band_rows(height, self.config.threads);
        self.band_count = bands.len();
        self.started = Some(Instant::now());
        log::info!(
            "Tracing {}x{} on {} threads (depth {})",
            width,
            height,
            bands.len(),
            self.config.max_depth
        );

        for (id, rows) in bands.into_iter().enumerate() {
            let scene = Arc::clone(&self.scene);
            let config = Arc::clone(&self.config);
            let buffer = Arc::clone(&self.buffer);
            let completed = Arc::clone(&self.completed);

            let handle = thread::Builder::new()
                .name(format!("glint-band-{}", id))
                .spawn(move || {
                    for y in rows.clone() {
                        for x in 0..width {
                            let color = render_pixel(&scene, &config, x, y, width, height, &mut NoRecorder);
                            buffer.set(x, y, color);
                        }
                    }
                    completed
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(id);
                    log::debug!("Band {} done (rows {}..{})", id, rows.start, rows.end);
                })?;
            self.workers.push(handle);
        }
        Ok(())
    }

    /// True once every band of the current render has finished.
    pub fn check_render(&self) -> bool {
        let done = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
        done.len() >= self.band_count
    }

    /// Block until every worker has finished.
    ///
    /// A panic in a worker is re-raised on the calling thread.
    pub fn wait_render(&mut self) {
        for handle in self.workers.drain(..) {
            if let Err(payload) = handle.join() {
                std::panic::resume_unwind(payload);
            }
        }
        if let Some(start) = self.started.take() {
            log::info!("Render finished in {:.2?}", start.elapsed());
        }
    }

    /// Color of a finished pixel, quantized to 8 bits; black outside the image.
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        self.buffer.get(x, y)
    }

    /// Trace one pixel of the current buffer on the calling thread and store it.
    pub fn trace_pixel(&self, x: u32, y: u32) -> Color {
        self.trace_pixel_recorded(x, y, &mut NoRecorder)
    }

    /// [`RayTracer::trace_pixel`], reporting every scene query to `recorder`.
    ///
    /// Pixels outside the current buffer are traced against its dimensions
    /// (at least 1 by 1) but not stored.
    pub fn trace_pixel_recorded<R>(&self, x: u32, y: u32, recorder: &mut R) -> Color
    where
        R: TraceRecorder + ?Sized,
    {
        let (width, height) = self.dimensions();
        let color = render_pixel(&self.scene, &self.config, x, y, width.max(1), height.max(1), recorder);
        self.buffer.set(x, y, color);
        color
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.buffer.width(), self.buffer.height())
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }
}

impl Drop for RayTracer {
    fn drop(&mut self) {
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
