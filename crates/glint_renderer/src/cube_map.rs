//! Environment cube map for rays that escape the scene.

use std::sync::Arc;

use glint_core::Texture;
use glint_math::DVec3;

use crate::material::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Six textures indexed by [`CubeFace`].
#[derive(Debug, Clone)]
pub struct CubeMap {
    faces: [Arc<Texture>; 6],
}

impl CubeMap {
    /// Faces in [`CubeFace::ALL`] order.
    pub fn new(faces: [Arc<Texture>; 6]) -> Self {
        Self { faces }
    }

    pub fn face(&self, face: CubeFace) -> &Texture {
        &self.faces[face.index()]
    }

    /// Face hit by `direction` and the UV on it.
    ///
    /// The dominant axis picks the face (z, then y, on ties) and the other
    /// two components, divided by it, give the position on the face.
    pub fn face_uv(direction: DVec3) -> (CubeFace, f64, f64) {
        let dir = direction.normalize_or_zero();
        let a = dir.abs();

        let (face, major, u, v) = if a.z >= a.x && a.z >= a.y {
            if dir.z < 0.0 {
                (CubeFace::NegativeZ, a.z, dir.x, dir.y)
            } else {
                (CubeFace::PositiveZ, a.z, -dir.x, dir.y)
            }
        } else if a.y >= a.x {
            if dir.y < 0.0 {
                (CubeFace::NegativeY, a.y, dir.x, -dir.z)
            } else {
                (CubeFace::PositiveY, a.y, dir.x, dir.z)
            }
        } else if dir.x < 0.0 {
            (CubeFace::NegativeX, a.x, -dir.z, dir.y)
        } else {
            (CubeFace::PositiveX, a.x, dir.z, dir.y)
        };

        let ma = 0.5 / major;
        (face, u * ma + 0.5, v * ma + 0.5)
    }

    /// Environment color seen along `direction`.
    pub fn color(&self, direction: DVec3) -> Color {
        let (face, u, v) = Self::face_uv(direction);
        self.face(face).sample(u, v)
    }
}
