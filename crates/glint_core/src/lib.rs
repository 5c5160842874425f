//! Glint Core - scene description and texture support.
//!
//! This crate provides:
//!
//! - **Scene description**: serde types for JSON scene files, validated on load
//! - **Textures**: image loading, caching and bilinear sampling
//!
//! # Example
//!
//! ```ignore
//! use glint_core::SceneDescription;
//!
//! let scene = SceneDescription::from_file("scenes/spheres.json")?;
//! println!("{} objects, {} lights", scene.objects.len(), scene.lights.len());
//! ```

pub mod description;
pub mod texture;

// Re-export commonly used types
pub use description::{
    CameraDescription, CubeMapDescription, LightDescription, MaterialDescription,
    ObjectDescription, ParameterDescription, SceneDescription, SceneError, SceneResult,
    ShapeDescription, TransformDescription, TriangleDescription, TrimeshDescription,
};
pub use texture::{Texture, TextureCache, TextureError, TextureResult};
