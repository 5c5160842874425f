//! Declarative scene description.
//!
//! A scene file is a JSON document deserialized into [`SceneDescription`].
//! The renderer turns a description into a traceable scene; this module only
//! validates the structure and reports problems as [`SceneError`]s.
//!
//! ```json
//! {
//!   "camera": { "position": [0, 2, 8], "look_at": [0, 0, 0], "fov": 45 },
//!   "ambient": [0.1, 0.1, 0.1],
//!   "lights": [ { "type": "point", "position": [0, 10, 0], "color": [1, 1, 1] } ],
//!   "objects": [
//!     { "type": "sphere", "transform": { "translate": [0, 1, 0] },
//!       "material": { "diffuse": [0.8, 0.2, 0.2] } }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::texture::TextureError;

/// Errors that can occur while loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Couldn't read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Syntax error in scene: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("Texture mapping error: {0}")]
    Texture(#[from] TextureError),

    #[error("Bad trimesh: {0}")]
    InvalidMesh(String),
}

pub type SceneResult<T> = Result<T, SceneError>;

type Vec3Array = [f64; 3];

fn zero3() -> Vec3Array {
    [0.0; 3]
}

fn one3() -> Vec3Array {
    [1.0; 3]
}

fn up() -> Vec3Array {
    [0.0, 1.0, 0.0]
}

fn default_fov() -> f64 {
    45.0
}

fn default_one() -> f64 {
    1.0
}

/// Top-level scene file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDescription {
    pub camera: CameraDescription,
    #[serde(default = "zero3")]
    pub ambient: Vec3Array,
    #[serde(default)]
    pub lights: Vec<LightDescription>,
    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
    #[serde(default)]
    pub cube_map: Option<CubeMapDescription>,
}

impl SceneDescription {
    /// Read and parse a scene file.
    pub fn from_file(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate a scene from JSON text.
    pub fn from_json(text: &str) -> SceneResult<Self> {
        let description: SceneDescription = serde_json::from_str(text)?;
        description.validate()?;
        Ok(description)
    }

    /// Check cross-references serde cannot express.
    pub fn validate(&self) -> SceneResult<()> {
        for object in &self.objects {
            if let ObjectDescription::Trimesh(mesh) = object {
                mesh.validate()?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraDescription {
    pub position: Vec3Array,
    pub look_at: Vec3Array,
    #[serde(default = "up")]
    pub up: Vec3Array,
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov: f64,
    #[serde(default = "default_one")]
    pub aspect_ratio: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightDescription {
    Directional {
        direction: Vec3Array,
        #[serde(default = "one3")]
        color: Vec3Array,
    },
    Point {
        position: Vec3Array,
        #[serde(default = "one3")]
        color: Vec3Array,
        #[serde(default = "default_one")]
        constant_attenuation: f64,
        #[serde(default)]
        linear_attenuation: f64,
        #[serde(default)]
        quadratic_attenuation: f64,
    },
}

/// A material coefficient: either a constant colour or a texture file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParameterDescription {
    Color(Vec3Array),
    Texture { texture: String },
}

impl Default for ParameterDescription {
    fn default() -> Self {
        ParameterDescription::Color([0.0; 3])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaterialDescription {
    pub ambient: ParameterDescription,
    pub diffuse: ParameterDescription,
    pub specular: ParameterDescription,
    pub emissive: ParameterDescription,
    pub reflective: ParameterDescription,
    pub transmissive: ParameterDescription,
    pub shininess: f64,
    /// Index of refraction; 0 is read as 1 (vacuum)
    pub index: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RotationDescription {
    pub axis: Vec3Array,
    pub degrees: f64,
}

/// Scale, then rotate, then translate.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformDescription {
    #[serde(default = "zero3")]
    pub translate: Vec3Array,
    #[serde(default = "one3")]
    pub scale: Vec3Array,
    #[serde(default)]
    pub rotate: Option<RotationDescription>,
}

impl Default for TransformDescription {
    fn default() -> Self {
        Self {
            translate: zero3(),
            scale: one3(),
            rotate: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectDescription {
    Sphere(ShapeDescription),
    /// Unit cube centred on the origin
    Box(ShapeDescription),
    /// Unit square in the local z = 0 plane, facing +z
    Square(ShapeDescription),
    Triangle(TriangleDescription),
    Trimesh(TrimeshDescription),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeDescription {
    #[serde(default)]
    pub transform: TransformDescription,
    #[serde(default)]
    pub material: MaterialDescription,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriangleDescription {
    pub vertices: [Vec3Array; 3],
    #[serde(default)]
    pub material: MaterialDescription,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrimeshDescription {
    #[serde(default)]
    pub transform: TransformDescription,
    pub points: Vec<Vec3Array>,
    pub faces: Vec<[usize; 3]>,
    /// Per-vertex normals; must match `points` in length
    #[serde(default)]
    pub normals: Option<Vec<Vec3Array>>,
    /// Per-vertex materials; must match `points` in length
    #[serde(default)]
    pub materials: Option<Vec<MaterialDescription>>,
    #[serde(default)]
    pub material: MaterialDescription,
    /// Average face normals into per-vertex normals when none are given
    #[serde(default)]
    pub generate_normals: bool,
}

impl TrimeshDescription {
    pub fn validate(&self) -> SceneResult<()> {
        let count = self.points.len();
        if let Some(materials) = &self.materials {
            if materials.len() != count {
                return Err(SceneError::InvalidMesh(format!(
                    "wrong number of materials ({} for {} points)",
                    materials.len(),
                    count
                )));
            }
        }
        if let Some(normals) = &self.normals {
            if normals.len() != count {
                return Err(SceneError::InvalidMesh(format!(
                    "wrong number of normals ({} for {} points)",
                    normals.len(),
                    count
                )));
            }
        }
        for (i, face) in self.faces.iter().enumerate() {
            if face.iter().any(|&v| v >= count) {
                return Err(SceneError::InvalidMesh(format!(
                    "face {} references a missing vertex {:?}",
                    i, face
                )));
            }
        }
        Ok(())
    }
}

/// Six face textures for an environment cube map.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CubeMapDescription {
    pub positive_x: String,
    pub negative_x: String,
    pub positive_y: String,
    pub negative_y: String,
    pub positive_z: String,
    pub negative_z: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{ "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0] } }"#;

    #[test]
    fn test_minimal_scene_defaults() {
        let scene = SceneDescription::from_json(MINIMAL).unwrap();
        assert_eq!(scene.ambient, [0.0; 3]);
        assert_eq!(scene.camera.up, [0.0, 1.0, 0.0]);
        assert_eq!(scene.camera.fov, 45.0);
        assert!(scene.lights.is_empty());
        assert!(scene.objects.is_empty());
    }

    #[test]
    fn test_parse_lights_and_objects() {
        let text = r#"{
            "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0] },
            "lights": [
                { "type": "point", "position": [0, 10, 0], "quadratic_attenuation": 0.01 },
                { "type": "directional", "direction": [0, -1, 0], "color": [0.5, 0.5, 0.5] }
            ],
            "objects": [
                { "type": "sphere", "material": { "diffuse": [1, 0, 0], "index": 1.5 } },
                { "type": "square", "material": { "diffuse": { "texture": "wood.png" } } },
                { "type": "triangle", "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]] }
            ]
        }"#;
        let scene = SceneDescription::from_json(text).unwrap();
        assert_eq!(scene.lights.len(), 2);
        match &scene.lights[0] {
            LightDescription::Point {
                constant_attenuation,
                quadratic_attenuation,
                color,
                ..
            } => {
                assert_eq!(*constant_attenuation, 1.0);
                assert_eq!(*quadratic_attenuation, 0.01);
                assert_eq!(*color, [1.0; 3]);
            }
            other => panic!("expected point light, got {:?}", other),
        }
        match &scene.objects[1] {
            ObjectDescription::Square(shape) => assert_eq!(
                shape.material.diffuse,
                ParameterDescription::Texture {
                    texture: "wood.png".to_string()
                }
            ),
            other => panic!("expected square, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error() {
        let err = SceneDescription::from_json("{ \"camera\": ").unwrap_err();
        assert!(matches!(err, SceneError::Syntax(_)));
        assert!(err.to_string().starts_with("Syntax error"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let text = r#"{ "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0] }, "fog": 1 }"#;
        assert!(SceneDescription::from_json(text).is_err());
    }

    #[test]
    fn test_trimesh_bad_face() {
        let text = r#"{
            "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0] },
            "objects": [ { "type": "trimesh", "points": [[0,0,0],[1,0,0],[0,1,0]], "faces": [[0, 1, 3]] } ]
        }"#;
        let err = SceneDescription::from_json(text).unwrap_err();
        assert!(matches!(err, SceneError::InvalidMesh(_)));
    }

    #[test]
    fn test_trimesh_wrong_material_count() {
        let text = r#"{
            "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0] },
            "objects": [ { "type": "trimesh", "points": [[0,0,0],[1,0,0],[0,1,0]], "faces": [[0, 1, 2]],
                           "materials": [ { "diffuse": [1, 0, 0] } ] } ]
        }"#;
        let err = SceneDescription::from_json(text).unwrap_err();
        assert!(err.to_string().contains("wrong number of materials"));
    }

    #[test]
    fn test_missing_file() {
        let err = SceneDescription::from_file("/nonexistent/scene.json").unwrap_err();
        assert!(matches!(err, SceneError::Io { .. }));
    }
}
