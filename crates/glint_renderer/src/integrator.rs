//! Recursive Whitted-style integrator.
//!
//! Each hit is lit with Phong shading from every light, then spawns a
//! mirror reflection ray and a refraction ray when the material has the
//! corresponding coefficient.

use glint_math::{reflect, refract, Ray, RayType};

use crate::hittable::{Isect, SURFACE_EPSILON};
use crate::material::Color;
use crate::recorder::TraceRecorder;
use crate::renderer::TraceConfig;
use crate::scene::Scene;

/// The separate contributions making up a shaded hit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShadeTerms {
    pub ambient: Color,
    pub emissive: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub reflection: Color,
    pub refraction: Color,
}

impl ShadeTerms {
    pub fn total(&self) -> Color {
        self.ambient + self.emissive + self.diffuse + self.specular + self.reflection + self.refraction
    }
}

/// Color seen along `ray` at recursion `depth`.
///
/// Rays deeper than `config.max_depth` contribute black; rays that escape
/// see the cube map if the scene has one, else the background color.
pub fn trace_ray<R>(scene: &Scene, ray: &Ray, depth: u32, config: &TraceConfig, recorder: &mut R) -> Color
where
    R: TraceRecorder + ?Sized,
{
    if depth > config.max_depth {
        return Color::ZERO;
    }

    let mut isect = Isect::default();
    if !scene.intersect_recorded(ray, &mut isect, recorder) {
        return background(scene, ray, config);
    }

    shade(scene, ray, &isect, depth, config, recorder).total()
}

fn background(scene: &Scene, ray: &Ray, config: &TraceConfig) -> Color {
    match scene.cube_map() {
        Some(cube_map) => cube_map.color(ray.direction()),
        None => config.background,
    }
}

/// Shade the hit `isect` found along `ray`.
pub fn shade<R>(
    scene: &Scene,
    ray: &Ray,
    isect: &Isect<'_>,
    depth: u32,
    config: &TraceConfig,
    recorder: &mut R,
) -> ShadeTerms
where
    R: TraceRecorder + ?Sized,
{
    let material = isect.material();
    let hit = ray.at(isect.t);
    let in_dir = ray.direction().normalize();
    let out_dir = -in_dir;

    let mut normal = isect.normal.normalize();
    let mut eta = 1.0 / material.index_of_refraction();
    let mut medium_distance = 1.0;

    // A refraction ray meeting a surface from behind is leaving the medium
    let exiting = ray.ray_type() == RayType::Refraction && in_dir.dot(normal) > 0.0;
    if exiting {
        normal = -normal;
        eta = 1.0 / eta;
        medium_distance = ray.origin().distance(hit);
    }

    let mut terms = ShadeTerms {
        ambient: isect.ka() * scene.ambient(),
        emissive: isect.ke(),
        ..Default::default()
    };

    let kd = isect.kd();
    let ks = isect.ks();
    let shadow_origin = hit + out_dir * SURFACE_EPSILON;

    for light in scene.lights() {
        let arriving = light.shadow_attenuation(scene, shadow_origin, config.shadow_depth, recorder);
        if arriving == Color::ZERO {
            continue;
        }

        let l = light.direction(shadow_origin);
        let n_dot_l = normal.dot(l);
        if n_dot_l <= 0.0 {
            continue;
        }
        terms.diffuse += kd * n_dot_l * arriving;

        let r = reflect(-l, normal);
        let highlight = out_dir.dot(r).max(0.0).powf(material.shininess);
        terms.specular += ks * highlight * arriving;
    }

    let inside_refraction = ray.ray_type() == RayType::Refraction;
    if material.is_reflective() && (!inside_refraction || config.reflect_inside_refraction) {
        let dir = reflect(in_dir, normal);
        // Reflecting off the inside of a medium keeps the ray in it
        let ray_type = if exiting { RayType::Refraction } else { RayType::Reflection };
        let reflected = Ray::new(hit + dir * SURFACE_EPSILON, dir, ray_type);
        terms.reflection = isect.kr() * trace_ray(scene, &reflected, depth + 1, config, recorder);
    }

    if material.is_transmissive() {
        // Total internal reflection sends the ray back into the medium
        let dir = refract(in_dir, normal, eta)
            .unwrap_or_else(|| reflect(in_dir, normal))
            .normalize();
        let refracted = Ray::new(hit + dir * SURFACE_EPSILON, dir, RayType::Refraction);
        let color = trace_ray(scene, &refracted, depth + 1, config, recorder);
        terms.refraction = isect.kt().powf(medium_distance) * color;
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::light::Light;
    use crate::material::Material;
    use crate::primitive::Primitive;
    use crate::recorder::{NoRecorder, RayLog};
    use crate::scene::SceneBuilder;
    use glint_math::{DQuat, DVec3, Transform};

    /// Large square in the y = 0 plane facing +y.
    fn floor(material: Material) -> Primitive {
        Primitive::square(
            Transform::from_scale_rotation_translation(
                DVec3::splat(100.0),
                DQuat::from_rotation_x(-std::f64::consts::FRAC_PI_2),
                DVec3::ZERO,
            ),
            material,
        )
    }

    fn straight_down() -> Ray {
        Ray::new(DVec3::new(0.0, 5.0, 0.0), DVec3::NEG_Y, RayType::Visibility)
    }

    fn hit_of<'a>(scene: &'a Scene, ray: &Ray) -> Isect<'a> {
        let mut isect = Isect::default();
        assert!(scene.intersect(ray, &mut isect));
        isect
    }

    #[test]
    fn test_miss_returns_background() {
        let scene = SceneBuilder::new(Camera::new()).build();
        let config = TraceConfig::default().with_background(DVec3::new(0.1, 0.2, 0.3));
        let c = trace_ray(&scene, &straight_down(), 0, &config, &mut NoRecorder);
        assert_eq!(c, DVec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_point_light_diffuse_over_plane() {
        let kd = DVec3::new(0.8, 0.5, 0.2);
        let color = DVec3::new(1.0, 0.9, 0.7);
        let light = Light::point(DVec3::new(0.0, 10.0, 0.0), color).with_attenuation(1.0, 0.05, 0.0);
        let scene = SceneBuilder::new(Camera::new())
            .add_primitive(floor(Material::diffuse(kd)))
            .add_light(light.clone())
            .build();

        let ray = straight_down();
        let isect = hit_of(&scene, &ray);
        let terms = shade(&scene, &ray, &isect, 0, &TraceConfig::default(), &mut NoRecorder);

        let expected = kd * color * light.distance_attenuation(DVec3::ZERO);
        assert!((terms.diffuse - expected).length() < 1e-6);
        assert_eq!(terms.specular, DVec3::ZERO);
        assert_eq!(terms.reflection, DVec3::ZERO);
    }

    #[test]
    fn test_ambient_and_emissive() {
        let material = Material::diffuse(DVec3::ZERO)
            .with_ambient(DVec3::splat(0.5))
            .with_emissive(DVec3::new(0.1, 0.0, 0.0));
        let scene = SceneBuilder::new(Camera::new())
            .with_ambient(DVec3::splat(0.4))
            .add_primitive(floor(material))
            .build();

        let c = trace_ray(&scene, &straight_down(), 0, &TraceConfig::default(), &mut NoRecorder);
        assert!((c - DVec3::new(0.3, 0.2, 0.2)).length() < 1e-12);
    }

    #[test]
    fn test_light_below_surface_contributes_nothing() {
        let scene = SceneBuilder::new(Camera::new())
            .add_primitive(floor(Material::diffuse(DVec3::ONE).with_specular(DVec3::ONE, 10.0)))
            .add_light(Light::point(DVec3::new(0.0, -10.0, 0.0), DVec3::ONE))
            .build();

        let c = trace_ray(&scene, &straight_down(), 0, &TraceConfig::default(), &mut NoRecorder);
        assert_eq!(c, DVec3::ZERO);
    }

    #[test]
    fn test_specular_highlight_peaks_on_mirror_direction() {
        let scene = SceneBuilder::new(Camera::new())
            .add_primitive(floor(Material::diffuse(DVec3::ZERO).with_specular(DVec3::ONE, 20.0)))
            .add_light(Light::point(DVec3::new(0.0, 10.0, 0.0), DVec3::ONE))
            .build();

        let ray = straight_down();
        let isect = hit_of(&scene, &ray);
        let terms = shade(&scene, &ray, &isect, 0, &TraceConfig::default(), &mut NoRecorder);
        assert!((terms.specular - DVec3::ONE).length() < 1e-6);
    }

    fn mirror_scene() -> Scene {
        // Mirror floor with a white emissive sky sphere enclosing it
        let sky = Primitive::sphere(
            Transform::from_scale_rotation_translation(DVec3::splat(50.0), DQuat::IDENTITY, DVec3::ZERO),
            Material::default().with_emissive(DVec3::ONE),
        );
        SceneBuilder::new(Camera::new())
            .add_primitive(floor(Material::default().with_reflective(DVec3::splat(0.5))))
            .add_primitive(sky)
            .build()
    }

    #[test]
    fn test_reflection_at_max_depth_is_black() {
        let scene = mirror_scene();
        let config = TraceConfig::default().with_max_depth(2);
        let ray = straight_down();
        let isect = hit_of(&scene, &ray);

        let at_limit = shade(&scene, &ray, &isect, 2, &config, &mut NoRecorder);
        assert_eq!(at_limit.reflection, DVec3::ZERO);

        let below_limit = shade(&scene, &ray, &isect, 1, &config, &mut NoRecorder);
        assert!((below_limit.reflection - DVec3::splat(0.5)).length() < 1e-9);
    }

    #[test]
    fn test_trace_beyond_max_depth_is_black() {
        let scene = mirror_scene();
        let config = TraceConfig::default().with_max_depth(1);
        assert_eq!(trace_ray(&scene, &straight_down(), 2, &config, &mut NoRecorder), DVec3::ZERO);
    }

    /// Glass ball of radius 1 at the origin inside an emissive sky.
    fn glass_scene(glass: Material) -> Scene {
        let sky = Primitive::sphere(
            Transform::from_scale_rotation_translation(DVec3::splat(50.0), DQuat::IDENTITY, DVec3::ZERO),
            Material::default().with_emissive(DVec3::ONE),
        );
        SceneBuilder::new(Camera::new())
            .add_primitive(Primitive::sphere(Transform::IDENTITY, glass))
            .add_primitive(sky)
            .build()
    }

    #[test]
    fn test_refraction_through_ball_attenuates_by_path_length() {
        let glass = Material::default().with_transmissive(DVec3::splat(0.5), 1.5);
        let scene = glass_scene(glass);
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z, RayType::Visibility);

        let c = trace_ray(&scene, &ray, 0, &TraceConfig::default(), &mut NoRecorder);
        // Straight through the centre: kt once on entry, then kt^2 over the diameter
        assert!((c - DVec3::splat(0.5 * 0.25)).length() < 1e-6);
    }

    #[test]
    fn test_reflection_inside_refraction_policy() {
        let glass = Material::default()
            .with_transmissive(DVec3::splat(0.5), 1.5)
            .with_reflective(DVec3::splat(0.2));
        let scene = glass_scene(glass);
        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z, RayType::Visibility);

        let suppressed = TraceConfig::default();
        let allowed = TraceConfig::default().with_reflect_inside_refraction(true);

        let mut log_suppressed = RayLog::new();
        let mut log_allowed = RayLog::new();
        let c_suppressed = trace_ray(&scene, &ray, 0, &suppressed, &mut log_suppressed);
        let c_allowed = trace_ray(&scene, &ray, 0, &allowed, &mut log_allowed);

        let reflections = |log: &RayLog| {
            log.entries()
                .iter()
                .filter(|(r, _)| r.ray_type == RayType::Reflection)
                .count()
        };
        // Only the outer surface spawns a plain reflection; inner ones stay in the medium
        assert_eq!(reflections(&log_suppressed), 1);
        assert_eq!(reflections(&log_allowed), 1);
        assert!(log_allowed.len() > log_suppressed.len());
        assert!(c_allowed.x > c_suppressed.x);
    }

    #[test]
    fn test_internal_reflection_exits_through_far_side() {
        let glass = Material::default()
            .with_transmissive(DVec3::splat(0.5), 1.5)
            .with_reflective(DVec3::splat(0.2));
        let scene = glass_scene(glass);
        let config = TraceConfig::default()
            .with_reflect_inside_refraction(true)
            .with_max_depth(2);

        let ray = Ray::new(DVec3::new(0.0, 0.0, -0.5), DVec3::Z, RayType::Refraction);
        let mut log = RayLog::new();
        trace_ray(&scene, &ray, 0, &config, &mut log);

        // Every ray travelling inside the ball is treated as in the medium
        assert!(log
            .entries()
            .iter()
            .filter(|(r, _)| r.origin.length() < 1.0)
            .all(|(r, _)| r.ray_type == RayType::Refraction));

        // The internal reflection leaves through the back of the ball, heading away from it
        assert!(log
            .entries()
            .iter()
            .any(|(r, _)| r.origin.z < -1.0 && (r.direction - DVec3::NEG_Z).length() < 1e-9));
    }

    #[test]
    fn test_total_internal_reflection_stays_inside() {
        // Shallow ray inside a dense slab exits at a grazing angle and reflects
        let glass = Material::default().with_transmissive(DVec3::ONE, 1.5);
        let slab = Primitive::cube(
            Transform::from_scale_rotation_translation(DVec3::new(100.0, 1.0, 100.0), DQuat::IDENTITY, DVec3::ZERO),
            glass,
        );
        let scene = SceneBuilder::new(Camera::new()).add_primitive(slab).build();

        let dir = DVec3::new(1.0, 0.2, 0.0).normalize();
        let ray = Ray::new(DVec3::ZERO, dir, RayType::Refraction);
        let isect = hit_of(&scene, &ray);

        let mut log = RayLog::new();
        shade(&scene, &ray, &isect, 0, &TraceConfig::default().with_max_depth(1), &mut log);

        let (spawned, _) = log.entries()[0];
        assert_eq!(spawned.ray_type, RayType::Refraction);
        // Reflected about the top face, heading back down
        assert!(spawned.direction.y < 0.0);
        assert!((spawned.direction.x - dir.x).abs() < 1e-12);
    }
}
