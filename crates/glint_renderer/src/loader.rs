//! Turn a parsed scene description into a traceable scene.

use std::path::Path;

use glint_core::description::{
    CameraDescription, CubeMapDescription, LightDescription, MaterialDescription, ObjectDescription,
    ParameterDescription, SceneDescription, TransformDescription, TrimeshDescription,
};
use glint_core::{SceneResult, TextureCache};
use glint_math::{DQuat, DVec3, Transform};

use crate::camera::Camera;
use crate::cube_map::CubeMap;
use crate::light::Light;
use crate::material::{Material, MaterialParameter};
use crate::primitive::Primitive;
use crate::scene::{Scene, SceneBuilder};
use crate::triangle::{MeshMaterial, TriangleMesh};

/// Load a scene file and build it with default BVH settings.
pub fn load_scene(path: impl AsRef<Path>) -> SceneResult<Scene> {
    Ok(load_scene_builder(path)?.build())
}

/// Load a scene file into a builder, so BVH settings can still be changed.
///
/// Texture paths are resolved relative to the scene file's directory.
pub fn load_scene_builder(path: impl AsRef<Path>) -> SceneResult<SceneBuilder> {
    let path = path.as_ref();
    let description = SceneDescription::from_file(path)?;

    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut textures = TextureCache::with_base_dir(base_dir);

    let builder = builder_from_description(&description, &mut textures)?;
    log::info!(
        "Loaded scene {}: {} primitives, {} lights, {} textures",
        path.display(),
        builder.primitive_count(),
        description.lights.len(),
        textures.len()
    );
    Ok(builder)
}

/// Convert a description, loading any textures it names through `textures`.
pub fn builder_from_description(
    description: &SceneDescription,
    textures: &mut TextureCache,
) -> SceneResult<SceneBuilder> {
    let mut builder =
        SceneBuilder::new(camera(&description.camera)).with_ambient(DVec3::from(description.ambient));

    for light in &description.lights {
        builder = builder.add_light(self::light(light));
    }

    for object in &description.objects {
        builder = match object {
            ObjectDescription::Sphere(shape) => builder.add_primitive(Primitive::sphere(
                transform(&shape.transform),
                material(&shape.material, textures)?,
            )),
            ObjectDescription::Box(shape) => builder.add_primitive(Primitive::cube(
                transform(&shape.transform),
                material(&shape.material, textures)?,
            )),
            ObjectDescription::Square(shape) => builder.add_primitive(Primitive::square(
                transform(&shape.transform),
                material(&shape.material, textures)?,
            )),
            ObjectDescription::Triangle(triangle) => {
                let mesh = TriangleMesh::new(
                    triangle.vertices.iter().map(|&v| DVec3::from(v)).collect(),
                    MeshMaterial::Uniform(material(&triangle.material, textures)?),
                );
                builder.add_mesh(mesh, &[[0, 1, 2]])
            }
            ObjectDescription::Trimesh(trimesh) => {
                trimesh.validate()?;
                builder.add_mesh(mesh(trimesh, textures)?, &trimesh.faces)
            }
        };
    }

    if let Some(cube_map) = &description.cube_map {
        builder = builder.with_cube_map(self::cube_map(cube_map, textures)?);
    }

    Ok(builder)
}

fn camera(description: &CameraDescription) -> Camera {
    Camera::new()
        .with_position(
            DVec3::from(description.position),
            DVec3::from(description.look_at),
            DVec3::from(description.up),
        )
        .with_fov(description.fov)
        .with_aspect_ratio(description.aspect_ratio)
}

fn light(description: &LightDescription) -> Light {
    match description {
        LightDescription::Directional { direction, color } => {
            Light::directional(DVec3::from(*direction), DVec3::from(*color))
        }
        LightDescription::Point {
            position,
            color,
            constant_attenuation,
            linear_attenuation,
            quadratic_attenuation,
        } => Light::point(DVec3::from(*position), DVec3::from(*color)).with_attenuation(
            *constant_attenuation,
            *linear_attenuation,
            *quadratic_attenuation,
        ),
    }
}

fn transform(description: &TransformDescription) -> Transform {
    let rotation = description
        .rotate
        .as_ref()
        .and_then(|r| {
            DVec3::from(r.axis)
                .try_normalize()
                .map(|axis| DQuat::from_axis_angle(axis, r.degrees.to_radians()))
        })
        .unwrap_or(DQuat::IDENTITY);

    Transform::from_scale_rotation_translation(
        DVec3::from(description.scale),
        rotation,
        DVec3::from(description.translate),
    )
}

fn parameter(description: &ParameterDescription, textures: &mut TextureCache) -> SceneResult<MaterialParameter> {
    Ok(match description {
        ParameterDescription::Color(c) => MaterialParameter::Constant(DVec3::from(*c)),
        ParameterDescription::Texture { texture } => MaterialParameter::Texture(textures.load(texture)?),
    })
}

fn material(description: &MaterialDescription, textures: &mut TextureCache) -> SceneResult<Material> {
    Ok(Material {
        ka: parameter(&description.ambient, textures)?,
        kd: parameter(&description.diffuse, textures)?,
        ks: parameter(&description.specular, textures)?,
        ke: parameter(&description.emissive, textures)?,
        kr: parameter(&description.reflective, textures)?,
        kt: parameter(&description.transmissive, textures)?,
        shininess: description.shininess,
        index: if description.index > 0.0 { description.index } else { 1.0 },
    })
}

/// Mesh with its vertices and normals carried into world space.
fn mesh(description: &TrimeshDescription, textures: &mut TextureCache) -> SceneResult<TriangleMesh> {
    let transform = transform(&description.transform);
    let vertices = description
        .points
        .iter()
        .map(|&p| transform.to_world_point(DVec3::from(p)))
        .collect();

    let material = match &description.materials {
        Some(materials) => MeshMaterial::PerVertex(
            materials
                .iter()
                .map(|m| material(m, textures))
                .collect::<SceneResult<Vec<_>>>()?,
        ),
        None => MeshMaterial::Uniform(material(&description.material, textures)?),
    };

    let mut mesh = TriangleMesh::new(vertices, material);
    match &description.normals {
        Some(normals) => {
            let normals = normals
                .iter()
                .map(|&n| transform.to_world_normal(DVec3::from(n)))
                .collect();
            mesh = mesh.with_normals(normals);
        }
        None if description.generate_normals => mesh.generate_normals(&description.faces),
        None => {}
    }
    Ok(mesh)
}

fn cube_map(description: &CubeMapDescription, textures: &mut TextureCache) -> SceneResult<CubeMap> {
    Ok(CubeMap::new([
        textures.load(&description.positive_x)?,
        textures.load(&description.negative_x)?,
        textures.load(&description.positive_y)?,
        textures.load(&description.negative_y)?,
        textures.load(&description.positive_z)?,
        textures.load(&description.negative_z)?,
    ]))
}
