// Re-export glam for convenience
pub use glam::*;

// Glint math types
mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::{Ray, RayType};
pub use transform::Transform;

/// Reflect `v` about the normal `n`.
#[inline]
pub fn reflect(v: DVec3, n: DVec3) -> DVec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `incident` through a surface with unit normal `n`.
///
/// `eta` is the ratio of indices of refraction (incident over transmitted).
/// Returns `None` on total internal reflection.
#[inline]
pub fn refract(incident: DVec3, n: DVec3, eta: f64) -> Option<DVec3> {
    let cos_i = n.dot(incident);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        None
    } else {
        Some(eta * incident - (eta * cos_i + k.sqrt()) * n)
    }
}
