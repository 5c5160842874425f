//! Unit box and unit square primitives, intersected in their local frame.

use glint_math::{Aabb, DVec2, DVec3, Interval, Ray};

use crate::primitive::LocalHit;

const HALF: f64 = 0.5;

/// Axis-aligned cube of side 1 centred on the local origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cube;

impl Cube {
    pub fn local_bounds(&self) -> Aabb {
        Aabb::new(DVec3::splat(-HALF), DVec3::splat(HALF))
    }

    pub fn intersect_local(&self, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
        let (tmin, tmax) = self.local_bounds().intersect(ray)?;

        let t = if ray_t.surrounds(tmin) {
            tmin
        } else if ray_t.surrounds(tmax) {
            tmax
        } else {
            return None;
        };

        let p = ray.at(t);

        // The face hit is the one whose axis the point is pushed furthest along
        let a = p.abs();
        let axis = if a.x >= a.y && a.x >= a.z {
            0
        } else if a.y >= a.z {
            1
        } else {
            2
        };

        let mut normal = DVec3::ZERO;
        normal[axis] = p[axis].signum();

        let (u, v) = match axis {
            0 => (p.z, p.y),
            1 => (p.x, p.z),
            _ => (p.x, p.y),
        };

        Some(LocalHit {
            t,
            normal,
            uv: DVec2::new(u + HALF, v + HALF),
        })
    }
}

/// Square of side 1 in the local z = 0 plane, facing +z.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Square;

impl Square {
    pub fn local_bounds(&self) -> Aabb {
        Aabb::new(DVec3::new(-HALF, -HALF, 0.0), DVec3::new(HALF, HALF, 0.0))
    }

    pub fn intersect_local(&self, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
        let o = ray.origin();
        let d = ray.direction();

        // Parallel to the plane
        if d.z == 0.0 {
            return None;
        }

        let t = -o.z / d.z;
        if !ray_t.surrounds(t) {
            return None;
        }

        let p = ray.at(t);
        if p.x < -HALF || p.x > HALF || p.y < -HALF || p.y > HALF {
            return None;
        }

        Some(LocalHit {
            t,
            normal: DVec3::Z,
            uv: DVec2::new(p.x + HALF, p.y + HALF),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_math::RayType;

    fn ray(origin: DVec3, direction: DVec3) -> Ray {
        Ray::new(origin, direction, RayType::Visibility)
    }

    const ANY: Interval = Interval {
        min: 1e-9,
        max: f64::INFINITY,
    };

    #[test]
    fn test_cube_front_face() {
        let hit = Cube.intersect_local(&ray(DVec3::new(0.0, 0.0, 3.0), -DVec3::Z), ANY).unwrap();
        assert!((hit.t - 2.5).abs() < 1e-12);
        assert_eq!(hit.normal, DVec3::Z);
    }

    #[test]
    fn test_cube_exit_from_inside() {
        let hit = Cube.intersect_local(&ray(DVec3::ZERO, -DVec3::Y), ANY).unwrap();
        assert!((hit.t - 0.5).abs() < 1e-12);
        assert_eq!(hit.normal, -DVec3::Y);
    }

    #[test]
    fn test_cube_miss() {
        assert!(Cube
            .intersect_local(&ray(DVec3::new(2.0, 0.0, 3.0), -DVec3::Z), ANY)
            .is_none());
        assert!(Cube.intersect_local(&ray(DVec3::new(0.0, 0.0, 3.0), DVec3::Z), ANY).is_none());
    }

    #[test]
    fn test_cube_uv_in_unit_range() {
        let hit = Cube
            .intersect_local(&ray(DVec3::new(0.25, -0.25, 3.0), -DVec3::Z), ANY)
            .unwrap();
        assert!((hit.uv - DVec2::new(0.75, 0.25)).length() < 1e-12);
    }

    #[test]
    fn test_square_hit() {
        let hit = Square
            .intersect_local(&ray(DVec3::new(0.1, 0.2, 2.0), -DVec3::Z), ANY)
            .unwrap();
        assert!((hit.t - 2.0).abs() < 1e-12);
        assert_eq!(hit.normal, DVec3::Z);
        assert!((hit.uv - DVec2::new(0.6, 0.7)).length() < 1e-12);
    }

    #[test]
    fn test_square_from_behind_keeps_normal() {
        let hit = Square.intersect_local(&ray(DVec3::new(0.0, 0.0, -1.0), DVec3::Z), ANY).unwrap();
        assert_eq!(hit.normal, DVec3::Z);
    }

    #[test]
    fn test_square_miss() {
        // Parallel
        assert!(Square.intersect_local(&ray(DVec3::new(0.0, 0.0, 1.0), DVec3::X), ANY).is_none());
        // Outside the edges
        assert!(Square
            .intersect_local(&ray(DVec3::new(0.6, 0.0, 1.0), -DVec3::Z), ANY)
            .is_none());
    }
}
