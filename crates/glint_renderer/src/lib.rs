//! Glint Renderer - recursive Whitted-style ray tracing
//!
//! Phong direct lighting with shadow rays through translucent occluders,
//! mirror reflection and refraction, accelerated by a bounding volume
//! hierarchy. Images are rendered either on a rayon pool or by a
//! band-scheduled background tracer that can be polled while it works.

mod bvh;
mod camera;
mod cube;
mod cube_map;
mod hittable;
mod integrator;
mod light;
mod loader;
mod material;
mod primitive;
mod recorder;
mod renderer;
mod scene;
mod sphere;
mod tracer;
mod triangle;

pub use bvh::{Bvh, BvhNode, BvhObject, NodeKind, TraversalOrder, DEFAULT_LEAF_SIZE};
pub use camera::Camera;
pub use cube::{Cube, Square};
pub use cube_map::{CubeFace, CubeMap};
pub use hittable::{Hittable, Isect, MISS_DISTANCE, SURFACE_EPSILON, T_MIN};
pub use integrator::{shade, trace_ray, ShadeTerms};
pub use light::Light;
pub use loader::{builder_from_description, load_scene, load_scene_builder};
pub use material::{Color, Material, MaterialParameter};
pub use primitive::{LocalHit, Primitive, Shape, TransformedShape};
pub use recorder::{NoRecorder, RayLog, RecordedHit, TraceRecorder};
pub use renderer::{
    clamp_01, color_to_rgb, render, render_pixel, trace_sample, AntiAliasing, ImageBuffer, TraceConfig,
};
pub use scene::{Scene, SceneBuilder};
pub use sphere::Sphere;
pub use tracer::{band_rows, PixelBuffer, RayTracer};
pub use triangle::{MeshMaterial, Triangle, TriangleMesh};

/// Re-export common math types from glint_math
pub use glint_math::{Aabb, DVec3, Interval, Ray, RayType, Transform};
