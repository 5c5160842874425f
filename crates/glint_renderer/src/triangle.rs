//! Triangle meshes.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection. Mesh
//! vertices are stored in world space; each [`Triangle`] is a face index
//! into a shared [`TriangleMesh`].

use std::borrow::Cow;
use std::sync::Arc;

use glint_math::{Aabb, DVec2, DVec3, Interval, Ray};

use crate::hittable::Isect;
use crate::material::Material;

/// Determinants below this are treated as a ray parallel to the face.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Faces with a smaller doubled area are rejected as degenerate.
const DEGENERATE_AREA: f64 = 1e-12;

/// Material assignment for a mesh.
#[derive(Debug, Clone)]
pub enum MeshMaterial {
    Uniform(Material),
    /// One material per vertex, blended barycentrically at the hit
    PerVertex(Vec<Material>),
}

/// Shared vertex data for a set of triangles.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    vertices: Vec<DVec3>,
    normals: Option<Vec<DVec3>>,
    material: MeshMaterial,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<DVec3>, material: MeshMaterial) -> Self {
        Self {
            vertices,
            normals: None,
            material,
        }
    }

    /// Attach per-vertex normals; they must be one per vertex.
    pub fn with_normals(mut self, normals: Vec<DVec3>) -> Self {
        debug_assert_eq!(normals.len(), self.vertices.len());
        self.normals = Some(normals);
        self
    }

    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    pub fn normals(&self) -> Option<&[DVec3]> {
        self.normals.as_deref()
    }

    pub fn material(&self) -> &MeshMaterial {
        &self.material
    }

    /// Average the face normals around each vertex.
    ///
    /// Degenerate faces contribute nothing; vertices touched by no valid face
    /// keep a zero normal and fall back to the face normal when shaded.
    pub fn generate_normals(&mut self, faces: &[[usize; 3]]) {
        let mut sums = vec![DVec3::ZERO; self.vertices.len()];
        let mut counts = vec![0u32; self.vertices.len()];

        for face in faces {
            let [a, b, c] = face.map(|i| self.vertices[i]);
            let Some(n) = (b - a).cross(c - a).try_normalize() else {
                continue;
            };
            for &i in face {
                sums[i] += n;
                counts[i] += 1;
            }
        }

        let normals = sums
            .into_iter()
            .zip(counts)
            .map(|(sum, count)| if count > 0 { sum / count as f64 } else { DVec3::ZERO })
            .collect();
        self.normals = Some(normals);
    }
}

/// A single face of a [`TriangleMesh`].
#[derive(Debug, Clone)]
pub struct Triangle {
    mesh: Arc<TriangleMesh>,
    ids: [usize; 3],
    /// Pre-computed face normal (unit length)
    normal: DVec3,
}

impl Triangle {
    /// Create a face, or `None` if its vertices are collinear or coincident.
    pub fn new(mesh: Arc<TriangleMesh>, ids: [usize; 3]) -> Option<Self> {
        let [a, b, c] = ids.map(|i| mesh.vertices[i]);
        let cross = (b - a).cross(c - a);
        if !(cross.length() > DEGENERATE_AREA) {
            return None;
        }
        Some(Self {
            normal: cross.normalize(),
            mesh,
            ids,
        })
    }

    pub fn ids(&self) -> [usize; 3] {
        self.ids
    }

    pub fn face_normal(&self) -> DVec3 {
        self.normal
    }

    fn vertices(&self) -> [DVec3; 3] {
        self.ids.map(|i| self.mesh.vertices[i])
    }

    pub fn bounding_box(&self) -> Aabb {
        let [a, b, c] = self.vertices();
        let mut bbox = Aabb::from_points(a, b);
        bbox.merge_point(c);
        bbox
    }

    /// Möller-Trumbore intersection.
    pub fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, isect: &mut Isect<'a>) -> bool {
        let [v0, v1, v2] = self.vertices();
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < PARALLEL_EPSILON {
            return false;
        }

        let f = 1.0 / a;
        let s = ray.origin() - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return false;
        }

        let weights = [1.0 - u - v, u, v];

        isect.t = t;
        isect.uv = DVec2::new(u, v);
        isect.normal = self.shading_normal(weights);
        isect.material = match &self.mesh.material {
            MeshMaterial::Uniform(m) => Cow::Borrowed(m),
            MeshMaterial::PerVertex(materials) => {
                let [a, b, c] = self.ids.map(|i| &materials[i]);
                Cow::Owned(Material::blend([a, b, c], weights, isect.uv))
            }
        };
        true
    }

    fn shading_normal(&self, weights: [f64; 3]) -> DVec3 {
        let Some(normals) = &self.mesh.normals else {
            return self.normal;
        };
        let n = self
            .ids
            .iter()
            .zip(weights)
            .fold(DVec3::ZERO, |acc, (&i, w)| acc + normals[i] * w);
        n.try_normalize().unwrap_or(self.normal)
    }
}
