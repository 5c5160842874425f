use crate::{DVec3, Interval, Ray};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// A non-empty box satisfies `min <= max` component-wise. [`Aabb::EMPTY`]
/// is inverted (`min = +inf`, `max = -inf`) so that merging into it yields
/// the other box unchanged.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Create a new AABB from its corners.
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Expand this box to the union of itself and `other`.
    pub fn merge(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Expand this box to include a point.
    pub fn merge_point(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns true if `other` lies entirely within this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        other.is_empty() || (self.min.cmple(other.min).all() && self.max.cmpge(other.max).all())
    }

    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the largest extent.
    ///
    /// Comparisons are strict, so on a tie the earlier axis is kept.
    pub fn longest_axis(&self) -> usize {
        let extent = self.extent();
        let mut axis = 0;
        if extent.y > extent.x {
            axis = 1;
        }
        if extent.z > extent[axis] {
            axis = 2;
        }
        axis
    }

    /// Slab test returning the parametric interval `(tmin, tmax)` where the
    /// ray is inside the box.
    ///
    /// A zero direction component yields infinite reciprocals, which is
    /// valid under IEEE-754; the `0 * inf` NaN produced when the origin sits
    /// exactly on a slab plane is dropped by `f64::min`/`f64::max`.
    /// Returns `None` when the box is entirely behind the origin or the
    /// interval is empty.
    pub fn intersect(&self, r: &Ray) -> Option<(f64, f64)> {
        let mut tmin = f64::NEG_INFINITY;
        let mut tmax = f64::INFINITY;

        for axis in 0..3 {
            let adinv = 1.0 / r.direction[axis];
            let mut t0 = (self.min[axis] - r.origin[axis]) * adinv;
            let mut t1 = (self.max[axis] - r.origin[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            tmin = tmin.max(t0);
            tmax = tmax.min(t1);
        }

        // Entire box behind the ray
        if tmax < 0.0 {
            return None;
        }
        if tmin > tmax {
            return None;
        }
        Some((tmin, tmax))
    }

    /// Test if a ray intersects this AABB within the given interval.
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> bool {
        match self.intersect(r) {
            Some((tmin, tmax)) => tmin <= ray_t.max && tmax >= ray_t.min,
            None => false,
        }
    }

    /// Identity of `merge`
    pub const EMPTY: Aabb = Aabb {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
