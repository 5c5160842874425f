//! Scene container and closest-hit queries.
//!
//! A scene is assembled with a [`SceneBuilder`]; building it constructs the
//! BVH, after which the scene is immutable and shared across render threads.

use std::sync::Arc;

use glint_math::{Aabb, DVec3, Interval, Ray};

use crate::bvh::{Bvh, TraversalOrder, DEFAULT_LEAF_SIZE};
use crate::camera::Camera;
use crate::cube_map::CubeMap;
use crate::hittable::{Hittable, Isect, MISS_DISTANCE, T_MIN};
use crate::light::Light;
use crate::material::Color;
use crate::primitive::Primitive;
use crate::recorder::{NoRecorder, TraceRecorder};
use crate::triangle::{Triangle, TriangleMesh};

/// Collects primitives and lights before the hierarchy is built.
#[derive(Debug)]
pub struct SceneBuilder {
    camera: Camera,
    ambient: Color,
    primitives: Vec<Primitive>,
    lights: Vec<Light>,
    cube_map: Option<CubeMap>,
    leaf_size: usize,
    traversal: TraversalOrder,
}

impl SceneBuilder {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            ambient: Color::ZERO,
            primitives: Vec::new(),
            lights: Vec::new(),
            cube_map: None,
            leaf_size: DEFAULT_LEAF_SIZE,
            traversal: TraversalOrder::default(),
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_cube_map(mut self, cube_map: CubeMap) -> Self {
        self.cube_map = Some(cube_map);
        self
    }

    /// Maximum primitives per BVH leaf.
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    pub fn with_traversal(mut self, traversal: TraversalOrder) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn add_primitive(mut self, primitive: Primitive) -> Self {
        self.primitives.push(primitive);
        self
    }

    pub fn add_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    /// Add one triangle per face, skipping degenerate faces.
    pub fn add_mesh(mut self, mesh: TriangleMesh, faces: &[[usize; 3]]) -> Self {
        let mesh = Arc::new(mesh);
        let mut skipped = 0;
        for &face in faces {
            match Triangle::new(mesh.clone(), face) {
                Some(triangle) => self.primitives.push(Primitive::Triangle(triangle)),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            log::warn!("Skipped {} degenerate faces of {}", skipped, faces.len());
        }
        self
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Build the BVH and freeze the scene.
    pub fn build(self) -> Scene {
        let start = std::time::Instant::now();
        let bounds: Vec<Aabb> = self.primitives.iter().map(|p| p.bounding_box()).collect();
        let bvh = Bvh::build(&bounds, self.leaf_size);

        log::info!(
            "Built BVH over {} primitives ({} nodes) in {:.2?}",
            self.primitives.len(),
            bvh.nodes().len(),
            start.elapsed()
        );

        Scene {
            camera: self.camera,
            ambient: self.ambient,
            primitives: self.primitives,
            lights: self.lights,
            cube_map: self.cube_map,
            bvh,
            traversal: self.traversal,
        }
    }
}

/// An immutable, traceable scene.
#[derive(Debug)]
pub struct Scene {
    camera: Camera,
    ambient: Color,
    primitives: Vec<Primitive>,
    lights: Vec<Light>,
    cube_map: Option<CubeMap>,
    bvh: Bvh,
    traversal: TraversalOrder,
}

impl Scene {
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn ambient(&self) -> Color {
        self.ambient
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn cube_map(&self) -> Option<&CubeMap> {
        self.cube_map.as_ref()
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn traversal(&self) -> TraversalOrder {
        self.traversal
    }

    /// World bounds of everything in the scene.
    pub fn bounds(&self) -> Aabb {
        self.bvh.bounds()
    }

    /// Closest hit along `ray`.
    ///
    /// On a miss `isect.t` is set to [`MISS_DISTANCE`] and false is returned.
    pub fn intersect<'a>(&'a self, ray: &Ray, isect: &mut Isect<'a>) -> bool {
        self.intersect_recorded(ray, isect, &mut NoRecorder)
    }

    /// [`Scene::intersect`], reporting the query to `recorder`.
    pub fn intersect_recorded<'a, R>(&'a self, ray: &Ray, isect: &mut Isect<'a>, recorder: &mut R) -> bool
    where
        R: TraceRecorder + ?Sized,
    {
        let primitives = &self.primitives;
        let hit = self
            .bvh
            .intersect(ray, Interval::new(T_MIN, f64::INFINITY), self.traversal, &mut |index, ray_t| {
                primitives[index].hit(ray, ray_t, isect).then_some(isect.t)
            })
            .is_some();

        if hit {
            recorder.record(ray, Some(&*isect));
        } else {
            isect.t = MISS_DISTANCE;
            recorder.record(ray, None);
        }
        hit
    }

    /// Closest hit by testing every primitive; the reference the BVH must agree with.
    pub fn intersect_linear<'a>(&'a self, ray: &Ray, isect: &mut Isect<'a>) -> bool {
        let mut hit_anything = false;
        let mut ray_t = Interval::new(T_MIN, f64::INFINITY);

        for primitive in &self.primitives {
            if primitive.hit(ray, ray_t, isect) {
                hit_anything = true;
                ray_t = ray_t.with_max(isect.t);
            }
        }

        if !hit_anything {
            isect.t = MISS_DISTANCE;
        }
        hit_anything
    }

    /// Centre of the scene bounds, or the origin for an empty scene.
    pub fn center(&self) -> DVec3 {
        let bounds = self.bounds();
        if bounds.is_empty() {
            DVec3::ZERO
        } else {
            bounds.centroid()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::triangle::MeshMaterial;
    use glint_math::{DQuat, RayType, Transform};

    fn scattered_scene(traversal: TraversalOrder, leaf_size: usize) -> Scene {
        let mut builder = SceneBuilder::new(Camera::new())
            .with_traversal(traversal)
            .with_leaf_size(leaf_size);

        for i in 0..60 {
            let f = i as f64;
            let center = DVec3::new((f * 2.3).sin() * 10.0, (f * 1.7).cos() * 10.0, (f * 0.9).sin() * 10.0);
            let scale = DVec3::new(0.5 + (i % 4) as f64 * 0.3, 0.4 + (i % 3) as f64 * 0.5, 0.7);
            let transform = Transform::from_scale_rotation_translation(
                scale,
                DQuat::from_rotation_y(f * 0.37),
                center,
            );
            let material = Material::diffuse(DVec3::splat(f / 60.0));
            builder = builder.add_primitive(match i % 3 {
                0 => Primitive::sphere(transform, material),
                1 => Primitive::cube(transform, material),
                _ => Primitive::square(transform, material),
            });
        }

        let mesh = TriangleMesh::new(
            vec![
                DVec3::new(-12.0, -12.0, -3.0),
                DVec3::new(12.0, -12.0, -3.0),
                DVec3::new(0.0, 12.0, 3.0),
                DVec3::new(0.0, 0.0, 0.0),
            ],
            MeshMaterial::Uniform(Material::diffuse(DVec3::ONE)),
        );
        builder.add_mesh(mesh, &[[0, 1, 2], [0, 1, 3], [3, 3, 1]]).build()
    }

    #[test]
    fn test_empty_scene_misses() {
        let scene = SceneBuilder::new(Camera::new()).build();
        let ray = Ray::new(DVec3::ZERO, DVec3::X, RayType::Visibility);
        let mut isect = Isect::default();
        isect.t = 3.0;

        assert!(!scene.intersect(&ray, &mut isect));
        assert_eq!(isect.t, MISS_DISTANCE);
        assert_eq!(scene.center(), DVec3::ZERO);
    }

    #[test]
    fn test_degenerate_faces_skipped() {
        let scene = scattered_scene(TraversalOrder::Unordered, 1);
        // 60 shapes plus two valid faces
        assert_eq!(scene.primitives().len(), 62);
    }

    #[test]
    fn test_bvh_agrees_with_linear_scan() {
        for traversal in [TraversalOrder::Unordered, TraversalOrder::NearestFirst] {
            for leaf_size in [1, 4] {
                let scene = scattered_scene(traversal, leaf_size);

                for i in 0..400 {
                    let f = i as f64;
                    let origin = DVec3::new((f * 0.31).sin() * 30.0, (f * 0.77).cos() * 30.0, 30.0);
                    let target = DVec3::new((f * 1.9).cos() * 12.0, (f * 0.6).sin() * 12.0, (f * 1.3).sin() * 6.0);
                    let ray = Ray::new(origin, target - origin, RayType::Visibility);

                    let mut fast = Isect::default();
                    let mut slow = Isect::default();
                    let hit_fast = scene.intersect(&ray, &mut fast);
                    let hit_slow = scene.intersect_linear(&ray, &mut slow);

                    assert_eq!(hit_fast, hit_slow, "ray {}", i);
                    assert!((fast.t - slow.t).abs() < 1e-9, "ray {}: {} vs {}", i, fast.t, slow.t);
                    if hit_fast {
                        assert_eq!(fast.kd(), slow.kd(), "ray {}", i);
                    }
                }
            }
        }
    }

    #[test]
    fn test_closest_of_stacked_spheres() {
        let scene = SceneBuilder::new(Camera::new())
            .add_primitive(Primitive::sphere(
                Transform::from_translation(DVec3::new(0.0, 0.0, -10.0)),
                Material::diffuse(DVec3::X),
            ))
            .add_primitive(Primitive::sphere(
                Transform::from_translation(DVec3::new(0.0, 0.0, -5.0)),
                Material::diffuse(DVec3::Y),
            ))
            .build();

        let ray = Ray::new(DVec3::ZERO, DVec3::NEG_Z, RayType::Visibility);
        let mut isect = Isect::default();
        assert!(scene.intersect(&ray, &mut isect));
        assert!((isect.t - 4.0).abs() < 1e-9);
        assert_eq!(isect.kd(), DVec3::Y);
    }
}
