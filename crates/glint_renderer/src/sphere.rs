//! Unit sphere primitive, intersected in its local frame.

use std::f64::consts::PI;

use glint_math::{Aabb, DVec2, DVec3, Interval, Ray};

use crate::primitive::LocalHit;

/// Sphere of radius 1 centred on the local origin.
///
/// Position, radius and ellipsoidal stretching all come from the owning
/// primitive's transform.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sphere;

impl Sphere {
    pub fn local_bounds(&self) -> Aabb {
        Aabb::new(DVec3::splat(-1.0), DVec3::ONE)
    }

    /// Intersect a local-space ray with a unit direction.
    pub fn intersect_local(&self, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
        let o = ray.origin();
        let d = ray.direction();

        let h = o.dot(d);
        let c = o.length_squared() - 1.0;
        let discriminant = h * h - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = -h - sqrtd;
        if !ray_t.surrounds(root) {
            root = -h + sqrtd;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let normal = ray.at(root).normalize();
        Some(LocalHit {
            t: root,
            normal,
            uv: sphere_uv(normal),
        })
    }
}

/// UV coordinates for a point on the unit sphere.
fn sphere_uv(p: DVec3) -> DVec2 {
    // theta: angle down from +Y
    // phi: angle around Y axis from +X
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;
    DVec2::new(phi / (2.0 * PI), theta / PI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_math::RayType;

    fn ray(origin: DVec3, direction: DVec3) -> Ray {
        Ray::new(origin, direction, RayType::Visibility)
    }

    #[test]
    fn test_sphere_hit_front() {
        let hit = Sphere
            .intersect_local(&ray(DVec3::new(0.0, 0.0, 5.0), -DVec3::Z), Interval::new(0.0, f64::INFINITY))
            .unwrap();
        assert!((hit.t - 4.0).abs() < 1e-12);
        assert!((hit.normal - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let hit = Sphere
            .intersect_local(&ray(DVec3::ZERO, DVec3::X), Interval::new(1e-9, f64::INFINITY))
            .unwrap();
        assert!((hit.t - 1.0).abs() < 1e-12);
        // Outward normal, not flipped towards the ray
        assert!((hit.normal - DVec3::X).length() < 1e-12);
    }

    #[test]
    fn test_sphere_miss() {
        let r = ray(DVec3::new(0.0, 2.0, 5.0), -DVec3::Z);
        assert!(Sphere.intersect_local(&r, Interval::new(0.0, f64::INFINITY)).is_none());

        // Both roots behind the origin
        let r = ray(DVec3::new(0.0, 0.0, 5.0), DVec3::Z);
        assert!(Sphere.intersect_local(&r, Interval::new(0.0, f64::INFINITY)).is_none());
    }

    #[test]
    fn test_sphere_respects_interval() {
        let r = ray(DVec3::new(0.0, 0.0, 5.0), -DVec3::Z);
        // Near root excluded, far root taken
        let hit = Sphere.intersect_local(&r, Interval::new(4.5, 10.0)).unwrap();
        assert!((hit.t - 6.0).abs() < 1e-12);
        assert!(Sphere.intersect_local(&r, Interval::new(0.0, 3.0)).is_none());
    }

    #[test]
    fn test_sphere_uv_range() {
        for p in [DVec3::X, DVec3::Y, -DVec3::Y, DVec3::Z, -DVec3::Z] {
            let uv = sphere_uv(p);
            assert!((0.0..=1.0).contains(&uv.x));
            assert!((0.0..=1.0).contains(&uv.y));
        }
    }
}
