// Object-to-world transforms for local-space primitives.
//
// A shape is intersected in its own coordinate frame; the transform carries
// rays in and normals back out.

use glam::{DMat3, DMat4, DQuat, DVec3};

use crate::Aabb;

/// An affine object-to-world transform with its cached inverse.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    local_to_world: DMat4,
    world_to_local: DMat4,
    /// Inverse transpose of the upper 3x3, used to carry normals to world space.
    normal_matrix: DMat3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        local_to_world: DMat4::IDENTITY,
        world_to_local: DMat4::IDENTITY,
        normal_matrix: DMat3::IDENTITY,
    };

    /// Create a transform from an object-to-world matrix.
    pub fn new(local_to_world: DMat4) -> Self {
        let world_to_local = local_to_world.inverse();
        let normal_matrix = DMat3::from_mat4(world_to_local).transpose();
        Self {
            local_to_world,
            world_to_local,
            normal_matrix,
        }
    }

    /// Compose scale, then rotation, then translation.
    pub fn from_scale_rotation_translation(scale: DVec3, rotation: DQuat, translation: DVec3) -> Self {
        Self::new(DMat4::from_scale_rotation_translation(scale, rotation, translation))
    }

    pub fn from_translation(translation: DVec3) -> Self {
        Self::new(DMat4::from_translation(translation))
    }

    pub fn matrix(&self) -> DMat4 {
        self.local_to_world
    }

    pub fn inverse_matrix(&self) -> DMat4 {
        self.world_to_local
    }

    pub fn to_world_point(&self, p: DVec3) -> DVec3 {
        self.local_to_world.transform_point3(p)
    }

    pub fn to_local_point(&self, p: DVec3) -> DVec3 {
        self.world_to_local.transform_point3(p)
    }

    /// Transform a direction into local space (no translation).
    pub fn to_local_vector(&self, v: DVec3) -> DVec3 {
        self.world_to_local.transform_vector3(v)
    }

    /// Carry a local-space normal to a unit world-space normal.
    pub fn to_world_normal(&self, n: DVec3) -> DVec3 {
        (self.normal_matrix * n).normalize()
    }

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    pub fn to_world_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }
        let (lo, hi) = (aabb.min, aabb.max);
        let corners = [
            DVec3::new(lo.x, lo.y, lo.z),
            DVec3::new(hi.x, lo.y, lo.z),
            DVec3::new(lo.x, hi.y, lo.z),
            DVec3::new(hi.x, hi.y, lo.z),
            DVec3::new(lo.x, lo.y, hi.z),
            DVec3::new(hi.x, lo.y, hi.z),
            DVec3::new(lo.x, hi.y, hi.z),
            DVec3::new(hi.x, hi.y, hi.z),
        ];

        let mut result = Aabb::EMPTY;
        for corner in corners {
            result.merge_point(self.to_world_point(corner));
        }
        result
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
