use crate::DVec3;

/// What a ray is being traced for.
///
/// The integrator uses the tag to decide whether a hit is an exit from a
/// medium and whether secondary reflection rays are spawned.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RayType {
    Visibility,
    Shadow,
    Reflection,
    Refraction,
}

/// A ray in 3D space with origin, direction, and a type tag.
///
/// The direction is not required to be normalized; code that needs a unit
/// direction normalizes it locally.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
    pub ray_type: RayType,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: DVec3, direction: DVec3, ray_type: RayType) -> Self {
        Self {
            origin,
            direction,
            ray_type,
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    #[inline]
    pub fn ray_type(&self) -> RayType {
        self.ray_type
    }

    pub fn set_origin(&mut self, origin: DVec3) {
        self.origin = origin;
    }

    pub fn set_direction(&mut self, direction: DVec3) {
        self.direction = direction;
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_creation() {
        let origin = DVec3::new(1.0, 2.0, 3.0);
        let direction = DVec3::new(0.0, 1.0, 0.0);
        let ray = Ray::new(origin, direction, RayType::Shadow);

        assert_eq!(ray.origin, origin);
        assert_eq!(ray.direction, direction);
        assert_eq!(ray.ray_type, RayType::Shadow);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(DVec3::ZERO, DVec3::X, RayType::Visibility);

        assert_eq!(ray.at(0.0), DVec3::ZERO);
        assert_eq!(ray.at(1.0), DVec3::X);
        assert_eq!(ray.at(2.0), DVec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), DVec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_setters() {
        let mut ray = Ray::new(DVec3::ZERO, DVec3::Y, RayType::Reflection);
        ray.set_origin(DVec3::ONE);
        ray.set_direction(DVec3::Z);

        assert_eq!(ray.origin(), DVec3::ONE);
        assert_eq!(ray.direction(), DVec3::Z);
        // Tag is untouched by the setters
        assert_eq!(ray.ray_type(), RayType::Reflection);
    }
}
