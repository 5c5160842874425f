//! Pinhole camera for primary ray generation.

use glint_math::{DVec3, Ray, RayType};

/// Pinhole camera mapping normalized image coordinates to rays.
///
/// Image coordinates run over [0, 1] in both directions with `(0, 0)` at the
/// bottom-left corner of the image plane.
#[derive(Debug, Clone)]
pub struct Camera {
    look_from: DVec3,
    look_at: DVec3,
    vup: DVec3,

    /// Vertical field of view in degrees
    vfov: f64,
    aspect_ratio: f64,

    // Cached basis, kept current by the builder methods
    look: DVec3,
    u: DVec3,
    v: DVec3,
}

impl Camera {
    /// Camera at the origin looking down -z with a 45 degree square view.
    pub fn new() -> Self {
        let mut camera = Self {
            look_from: DVec3::ZERO,
            look_at: DVec3::NEG_Z,
            vup: DVec3::Y,
            vfov: 45.0,
            aspect_ratio: 1.0,
            look: DVec3::NEG_Z,
            u: DVec3::X,
            v: DVec3::Y,
        };
        camera.update();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: DVec3, look_at: DVec3, vup: DVec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.update();
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f64) -> Self {
        self.vfov = vfov;
        self.update();
        self
    }

    /// Set width over height of the image plane.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.update();
        self
    }

    pub fn position(&self) -> DVec3 {
        self.look_from
    }

    pub fn fov(&self) -> f64 {
        self.vfov
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    fn update(&mut self) {
        self.look = (self.look_at - self.look_from).try_normalize().unwrap_or(DVec3::NEG_Z);

        let right = self.look.cross(self.vup).try_normalize().unwrap_or(DVec3::X);
        let up = right.cross(self.look);

        let normalized_height = 2.0 * (self.vfov.to_radians() / 2.0).tan();
        self.v = up * normalized_height;
        self.u = right * normalized_height * self.aspect_ratio;
    }

    /// Ray through the normalized image point `(x, y)`.
    pub fn ray_through(&self, x: f64, y: f64) -> Ray {
        let direction = self.look + (x - 0.5) * self.u + (y - 0.5) * self.v;
        Ray::new(self.look_from, direction.normalize(), RayType::Visibility)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_looks_at_target() {
        let camera = Camera::new().with_position(DVec3::new(0.0, 0.0, 5.0), DVec3::ZERO, DVec3::Y);
        let ray = camera.ray_through(0.5, 0.5);
        assert_eq!(ray.origin, DVec3::new(0.0, 0.0, 5.0));
        assert!((ray.direction - DVec3::NEG_Z).length() < 1e-12);
        assert_eq!(ray.ray_type, RayType::Visibility);
    }

    #[test]
    fn test_bottom_left_is_low() {
        let camera = Camera::new();
        let ray = camera.ray_through(0.0, 0.0);
        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.y < 0.0);
        assert!((ray.direction.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fov_edges() {
        // 90 degrees: the top edge is 45 degrees above the view axis
        let camera = Camera::new().with_fov(90.0);
        let top = camera.ray_through(0.5, 1.0);
        assert!((top.direction.y - top.direction.z.abs()).abs() < 1e-12);
    }

    #[test]
    fn test_aspect_ratio_widens() {
        let square = Camera::new().with_fov(90.0);
        let wide = Camera::new().with_fov(90.0).with_aspect_ratio(2.0);
        assert!(wide.ray_through(1.0, 0.5).direction.x > square.ray_through(1.0, 0.5).direction.x);
        assert_eq!(wide.aspect_ratio(), 2.0);
    }
}
