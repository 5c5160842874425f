//! Scene primitives.
//!
//! The set of primitive kinds is closed, so dispatch is an enum match
//! rather than a trait object per primitive.

use std::borrow::Cow;

use glint_math::{Aabb, DVec2, DVec3, Interval, Ray, Transform};

use crate::cube::{Cube, Square};
use crate::hittable::{Hittable, Isect};
use crate::material::Material;
use crate::sphere::Sphere;
use crate::triangle::Triangle;

/// Hit found by a local-space shape, before mapping back to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalHit {
    /// Distance along the unit local ray direction
    pub t: f64,
    /// Outward local normal
    pub normal: DVec3,
    pub uv: DVec2,
}

/// A unit shape placed in the world by a transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Cube(Cube),
    Square(Square),
}

impl Shape {
    pub fn local_bounds(&self) -> Aabb {
        match self {
            Shape::Sphere(s) => s.local_bounds(),
            Shape::Cube(c) => c.local_bounds(),
            Shape::Square(s) => s.local_bounds(),
        }
    }

    pub fn intersect_local(&self, ray: &Ray, ray_t: Interval) -> Option<LocalHit> {
        match self {
            Shape::Sphere(s) => s.intersect_local(ray, ray_t),
            Shape::Cube(c) => c.intersect_local(ray, ray_t),
            Shape::Square(s) => s.intersect_local(ray, ray_t),
        }
    }
}

/// A transformed unit shape with its material.
#[derive(Debug, Clone)]
pub struct TransformedShape {
    shape: Shape,
    transform: Transform,
    material: Material,
    bbox: Aabb,
}

impl TransformedShape {
    pub fn new(shape: Shape, transform: Transform, material: Material) -> Self {
        let bbox = transform.to_world_aabb(&shape.local_bounds());
        Self {
            shape,
            transform,
            material,
            bbox,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Carry the ray into local space, intersect there, and map the hit back.
    ///
    /// The local direction is normalized, so local distances are divided by
    /// its length to recover the world ray parameter.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, isect: &mut Isect<'a>) -> bool {
        let origin = self.transform.to_local_point(ray.origin());
        let direction = self.transform.to_local_vector(ray.direction());
        let length = direction.length();
        if !(length > 0.0) {
            return false;
        }

        let local_ray = Ray::new(origin, direction / length, ray.ray_type());
        let local_t = Interval::new(ray_t.min * length, ray_t.max * length);
        let Some(hit) = self.shape.intersect_local(&local_ray, local_t) else {
            return false;
        };

        isect.t = hit.t / length;
        isect.normal = self.transform.to_world_normal(hit.normal);
        isect.uv = hit.uv;
        isect.material = Cow::Borrowed(&self.material);
        true
    }
}

#[derive(Debug, Clone)]
pub enum Primitive {
    Shape(TransformedShape),
    Triangle(Triangle),
}

impl Primitive {
    pub fn sphere(transform: Transform, material: Material) -> Self {
        Primitive::Shape(TransformedShape::new(Shape::Sphere(Sphere), transform, material))
    }

    pub fn cube(transform: Transform, material: Material) -> Self {
        Primitive::Shape(TransformedShape::new(Shape::Cube(Cube), transform, material))
    }

    pub fn square(transform: Transform, material: Material) -> Self {
        Primitive::Shape(TransformedShape::new(Shape::Square(Square), transform, material))
    }

    pub fn centroid(&self) -> DVec3 {
        self.bounding_box().centroid()
    }
}

impl Hittable for Primitive {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, isect: &mut Isect<'a>) -> bool {
        match self {
            Primitive::Shape(s) => s.hit(ray, ray_t, isect),
            Primitive::Triangle(t) => t.hit(ray, ray_t, isect),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Shape(s) => s.bbox,
            Primitive::Triangle(t) => t.bounding_box(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_math::{DQuat, RayType};

    const ANY: Interval = Interval {
        min: 1e-9,
        max: f64::INFINITY,
    };

    #[test]
    fn test_scaled_sphere_world_distance() {
        let transform = Transform::from_scale_rotation_translation(
            DVec3::splat(2.0),
            DQuat::IDENTITY,
            DVec3::new(0.0, 0.0, -10.0),
        );
        let sphere = Primitive::sphere(transform, Material::diffuse(DVec3::ONE));
        let ray = Ray::new(DVec3::ZERO, -DVec3::Z, RayType::Visibility);

        let mut isect = Isect::default();
        assert!(sphere.hit(&ray, ANY, &mut isect));
        assert!((isect.t - 8.0).abs() < 1e-9);
        assert!((isect.normal - DVec3::Z).length() < 1e-9);
        assert_eq!(isect.kd(), DVec3::ONE);
    }

    #[test]
    fn test_unnormalized_ray_direction() {
        let sphere = Primitive::sphere(
            Transform::from_translation(DVec3::new(0.0, 0.0, -10.0)),
            Material::default(),
        );
        // Direction of length 2 halves the parameter
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -2.0), RayType::Visibility);
        let mut isect = Isect::default();
        assert!(sphere.hit(&ray, ANY, &mut isect));
        assert!((isect.t - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_interval_upper_bound_respected() {
        let sphere = Primitive::sphere(
            Transform::from_translation(DVec3::new(0.0, 0.0, -10.0)),
            Material::default(),
        );
        let ray = Ray::new(DVec3::ZERO, -DVec3::Z, RayType::Visibility);
        let mut isect = Isect::default();
        assert!(!sphere.hit(&ray, Interval::new(1e-9, 5.0), &mut isect));
    }

    #[test]
    fn test_rotated_square_normal() {
        // Square rotated to lie in the xz plane, facing +y
        let transform = Transform::from_scale_rotation_translation(
            DVec3::splat(4.0),
            DQuat::from_rotation_x(-std::f64::consts::FRAC_PI_2),
            DVec3::ZERO,
        );
        let square = Primitive::square(transform, Material::default());
        let ray = Ray::new(DVec3::new(1.0, 5.0, 1.0), -DVec3::Y, RayType::Visibility);

        let mut isect = Isect::default();
        assert!(square.hit(&ray, ANY, &mut isect));
        assert!((isect.t - 5.0).abs() < 1e-9);
        assert!((isect.normal - DVec3::Y).length() < 1e-9);
    }

    #[test]
    fn test_bounding_box_and_centroid() {
        let cube = Primitive::cube(
            Transform::from_translation(DVec3::new(3.0, 0.0, 0.0)),
            Material::default(),
        );
        let bbox = cube.bounding_box();
        assert!((bbox.min - DVec3::new(2.5, -0.5, -0.5)).length() < 1e-12);
        assert!((cube.centroid() - DVec3::new(3.0, 0.0, 0.0)).length() < 1e-12);
    }
}
