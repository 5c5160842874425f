//! Directional and point lights with translucent shadowing.

use glint_math::{DVec3, Ray, RayType};

use crate::hittable::{Isect, SURFACE_EPSILON};
use crate::material::Color;
use crate::recorder::TraceRecorder;
use crate::scene::Scene;

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    /// Light arriving from infinitely far along `orientation`
    Directional {
        /// Unit direction the light travels in
        orientation: DVec3,
        color: Color,
    },
    Point {
        position: DVec3,
        color: Color,
        constant: f64,
        linear: f64,
        quadratic: f64,
    },
}

impl Light {
    /// A directional light travelling along `orientation`.
    pub fn directional(orientation: DVec3, color: Color) -> Self {
        Light::Directional {
            orientation: orientation.try_normalize().unwrap_or(DVec3::NEG_Y),
            color,
        }
    }

    /// A point light with no distance falloff.
    pub fn point(position: DVec3, color: Color) -> Self {
        Light::Point {
            position,
            color,
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }

    /// Set the falloff coefficients of a point light; no-op for directional lights.
    pub fn with_attenuation(mut self, c: f64, l: f64, q: f64) -> Self {
        if let Light::Point {
            constant,
            linear,
            quadratic,
            ..
        } = &mut self
        {
            *constant = c;
            *linear = l;
            *quadratic = q;
        }
        self
    }

    pub fn color(&self) -> Color {
        match self {
            Light::Directional { color, .. } | Light::Point { color, .. } => *color,
        }
    }

    /// Unit vector from `p` towards the light.
    ///
    /// Zero when `p` is at a point light's position, so the light adds nothing there.
    pub fn direction(&self, p: DVec3) -> DVec3 {
        match self {
            Light::Directional { orientation, .. } => -*orientation,
            Light::Point { position, .. } => (*position - p).normalize_or_zero(),
        }
    }

    /// Falloff factor in [0, 1] at `p`.
    pub fn distance_attenuation(&self, p: DVec3) -> f64 {
        match self {
            Light::Directional { .. } => 1.0,
            Light::Point {
                position,
                constant,
                linear,
                quadratic,
                ..
            } => {
                let d = position.distance(p);
                let denominator = constant + linear * d + quadratic * d * d;
                if denominator > 0.0 {
                    (1.0 / denominator).min(1.0)
                } else {
                    1.0
                }
            }
        }
    }

    /// Whether a hit at `hit_point`, found travelling from `p`, lies between
    /// `p` and the light.
    fn blocks(&self, p: DVec3, hit_point: DVec3) -> bool {
        match self {
            Light::Directional { .. } => true,
            Light::Point { position, .. } => p.distance_squared(hit_point) < p.distance_squared(*position),
        }
    }

    /// Light arriving at `p`: color times falloff times the fraction that
    /// makes it through occluders.
    ///
    /// Opaque occluders block completely. Translucent ones attenuate by
    /// `kt` raised to the distance travelled inside them, following the
    /// shadow ray through at most `depth` occluders.
    pub fn shadow_attenuation<R>(&self, scene: &Scene, p: DVec3, depth: u32, recorder: &mut R) -> Color
    where
        R: TraceRecorder + ?Sized,
    {
        let transmittance = self.transmittance(scene, p, depth, recorder);
        (self.color() * self.distance_attenuation(p) * transmittance).clamp(DVec3::ZERO, DVec3::ONE)
    }

    fn transmittance<R>(&self, scene: &Scene, p: DVec3, depth: u32, recorder: &mut R) -> Color
    where
        R: TraceRecorder + ?Sized,
    {
        if depth == 0 {
            return DVec3::ZERO;
        }

        let dir = self.direction(p);
        if dir == DVec3::ZERO {
            return DVec3::ONE;
        }
        let shadow_ray = Ray::new(p, dir, RayType::Shadow);
        let mut isect = Isect::default();
        if !scene.intersect_recorded(&shadow_ray, &mut isect, recorder) {
            return DVec3::ONE;
        }

        let entry = shadow_ray.at(isect.t);
        if !self.blocks(p, entry) {
            return DVec3::ONE;
        }
        if !isect.material().is_transmissive() {
            return DVec3::ZERO;
        }

        let kt = isect.kt();
        let inside_ray = Ray::new(entry + dir * SURFACE_EPSILON, dir, RayType::Shadow);
        let mut exit = Isect::default();
        let exit_point = if scene.intersect_recorded(&inside_ray, &mut exit, recorder) {
            Some(inside_ray.at(exit.t)).filter(|&q| self.blocks(inside_ray.origin, q))
        } else {
            None
        };

        // Whatever the ray meets next must let light through too
        if exit_point.is_some() && !exit.material().is_transmissive() {
            return DVec3::ZERO;
        }

        match exit_point {
            Some(exit_point) => {
                let distance = entry.distance(exit_point);
                kt.powf(distance) * self.transmittance(scene, exit_point + dir * SURFACE_EPSILON, depth - 1, recorder)
            }
            // Open surface: a thin filter
            None => kt * self.transmittance(scene, inside_ray.origin, depth - 1, recorder),
        }
    }
}
