//! `glint` - render a JSON scene file to a PNG.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use glint_renderer::{load_scene_builder, render, AntiAliasing, RayTracer, TraceConfig, TraversalOrder};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Recursive ray tracer for JSON scene files", long_about = None)]
struct Args {
    /// Scene description file
    scene: PathBuf,

    #[clap(long, short = 'o', value_name = "FILE", default_value = "out.png")]
    output: PathBuf,

    #[clap(long, short = 'w', value_name = "PIXELS", default_value_t = 512)]
    width: u32,

    /// Defaults to the width divided by the camera aspect ratio
    #[clap(long, short = 'H', value_name = "PIXELS")]
    height: Option<u32>,

    /// Worker threads; defaults to the number of cores
    #[clap(long, short = 't', value_name = "NUM")]
    threads: Option<usize>,

    /// Maximum reflection and refraction depth
    #[clap(long, short = 'd', value_name = "NUM", default_value_t = 5)]
    depth: u32,

    /// Translucent occluders a shadow ray may pass through
    #[clap(long, value_name = "NUM", default_value_t = 4)]
    shadow_depth: u32,

    /// Supersample each pixel on an N by N grid
    #[clap(long, value_name = "N")]
    aa_samples: Option<u32>,

    /// Weight kept by the primary sample when supersampling
    #[clap(long, value_name = "WEIGHT", default_value_t = 0.0)]
    aa_threshold: f64,

    /// Maximum primitives per BVH leaf
    #[clap(long, value_name = "NUM")]
    leaf_size: Option<usize>,

    /// Visit the nearer BVH child first
    #[clap(long)]
    nearest_first: bool,

    /// Spawn reflection rays at hits reached through refraction
    #[clap(long)]
    reflect_inside_refraction: bool,

    /// Render on the rayon pool instead of the band scheduler
    #[clap(long)]
    rayon: bool,
}

impl Args {
    fn trace_config(&self) -> TraceConfig {
        let mut config = TraceConfig::default()
            .with_max_depth(self.depth)
            .with_shadow_depth(self.shadow_depth)
            .with_reflect_inside_refraction(self.reflect_inside_refraction)
            .with_anti_aliasing(self.aa_samples.map(|samples| AntiAliasing {
                samples,
                threshold: self.aa_threshold.clamp(0.0, 1.0),
            }));
        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        config
    }

    fn dimensions(&self, aspect_ratio: f64) -> (u32, u32) {
        let height = self.height.unwrap_or_else(|| {
            if aspect_ratio > 0.0 {
                (self.width as f64 / aspect_ratio).round() as u32
            } else {
                self.width
            }
        });
        (self.width.max(1), height.max(1))
    }
}

/// Write bottom-up RGB rows as a top-down PNG (or any format `image` infers from the extension).
fn save_image(path: &Path, width: u32, height: u32, rgb: Vec<u8>) -> Result<()> {
    let image = image::RgbImage::from_raw(width, height, rgb).context("Pixel buffer does not match image size")?;
    image::imageops::flip_vertical(&image)
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn run(args: &Args) -> Result<()> {
    let mut builder =
        load_scene_builder(&args.scene).with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    if let Some(leaf_size) = args.leaf_size {
        builder = builder.with_leaf_size(leaf_size);
    }
    if args.nearest_first {
        builder = builder.with_traversal(TraversalOrder::NearestFirst);
    }
    let scene = builder.build();

    let config = args.trace_config();
    let (width, height) = args.dimensions(scene.camera().aspect_ratio());

    let rgb = if args.rayon {
        render(&scene, &config, width, height).to_rgb()
    } else {
        let mut tracer = RayTracer::new(scene, config);
        tracer
            .trace_image(width, height)
            .context("Failed to spawn render threads")?;
        while !tracer.check_render() {
            thread::sleep(Duration::from_millis(50));
        }
        tracer.wait_render();
        tracer.buffer().to_rgb()
    };

    save_image(&args.output, width, height, rgb)?;
    log::info!("Wrote {}", args.output.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    run(&args)
}
