//! Hittable trait and Isect record for ray-object intersection.

use std::borrow::Cow;

use glint_math::{Aabb, DVec2, DVec3, Interval, Ray};

use crate::material::{Color, Material};

/// Parametric distance reported by an [`Isect`] that never hit anything.
pub const MISS_DISTANCE: f64 = 1000.0;

/// Nearest parametric distance accepted as a hit.
pub const T_MIN: f64 = 1e-9;

/// Offset applied to secondary ray origins to step off the surface.
pub const SURFACE_EPSILON: f64 = 1e-6;

static DEFAULT_MATERIAL: Material = Material::DEFAULT;

/// Record of a ray-object intersection.
///
/// The material is borrowed from the primitive that was hit, or owned when
/// it had to be interpolated (per-vertex mesh materials).
#[derive(Debug, Clone)]
pub struct Isect<'a> {
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Geometric or interpolated surface normal, unit length, not flipped
    /// towards the ray
    pub normal: DVec3,
    /// Texture coordinates (barycentric for triangles)
    pub uv: DVec2,
    pub material: Cow<'a, Material>,
}

impl Default for Isect<'_> {
    fn default() -> Self {
        Self {
            t: MISS_DISTANCE,
            normal: DVec3::ZERO,
            uv: DVec2::ZERO,
            material: Cow::Borrowed(&DEFAULT_MATERIAL),
        }
    }
}

impl<'a> Isect<'a> {
    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn ka(&self) -> Color {
        self.material.ka(self.uv)
    }

    pub fn kd(&self) -> Color {
        self.material.kd(self.uv)
    }

    pub fn ks(&self) -> Color {
        self.material.ks(self.uv)
    }

    pub fn ke(&self) -> Color {
        self.material.ke(self.uv)
    }

    pub fn kr(&self) -> Color {
        self.material.kr(self.uv)
    }

    pub fn kt(&self) -> Color {
        self.material.kt(self.uv)
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object within the given interval.
    ///
    /// Returns true if hit, and fills in the record. On a miss the record is
    /// left untouched.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, isect: &mut Isect<'a>) -> bool;

    /// Get the world-space axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}
