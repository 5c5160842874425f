//! Optional per-ray tracing of intersection queries, for debugging a pixel.

use glint_math::{DVec3, Ray};

use crate::hittable::Isect;

/// Receives every ray the scene is queried with, and its hit if any.
pub trait TraceRecorder {
    fn record(&mut self, ray: &Ray, hit: Option<&Isect<'_>>);
}

/// Recorder that drops everything; used for normal rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecorder;

impl TraceRecorder for NoRecorder {
    #[inline(always)]
    fn record(&mut self, _ray: &Ray, _hit: Option<&Isect<'_>>) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedHit {
    pub t: f64,
    pub point: DVec3,
    pub normal: DVec3,
}

/// Recorder that keeps every query in order.
#[derive(Debug, Clone, Default)]
pub struct RayLog {
    entries: Vec<(Ray, Option<RecordedHit>)>,
}

impl RayLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(Ray, Option<RecordedHit>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate the recorded hits, skipping misses.
    pub fn hits(&self) -> impl Iterator<Item = (&Ray, &RecordedHit)> {
        self.entries
            .iter()
            .filter_map(|(ray, hit)| hit.as_ref().map(|h| (ray, h)))
    }
}

impl TraceRecorder for RayLog {
    fn record(&mut self, ray: &Ray, hit: Option<&Isect<'_>>) {
        let hit = hit.map(|isect| RecordedHit {
            t: isect.t,
            point: ray.at(isect.t),
            normal: isect.normal,
        });
        self.entries.push((*ray, hit));
    }
}
