//! Phong surface materials.

use std::sync::Arc;

use glint_core::Texture;
use glint_math::{DVec2, DVec3};

/// Color type alias (RGB values typically 0-1)
pub type Color = DVec3;

/// A material coefficient, constant or looked up in a texture at the hit's UV.
#[derive(Debug, Clone)]
pub enum MaterialParameter {
    Constant(Color),
    Texture(Arc<Texture>),
}

impl MaterialParameter {
    pub const BLACK: MaterialParameter = MaterialParameter::Constant(DVec3::ZERO);

    /// Value at the given UV, clamped to [0, 1] per channel.
    pub fn value(&self, uv: DVec2) -> Color {
        match self {
            MaterialParameter::Constant(c) => *c,
            MaterialParameter::Texture(t) => t.sample(uv.x, uv.y).clamp(DVec3::ZERO, DVec3::ONE),
        }
    }

    /// True for a constant black coefficient, which disables the term.
    pub fn is_zero(&self) -> bool {
        matches!(self, MaterialParameter::Constant(c) if *c == DVec3::ZERO)
    }
}

impl Default for MaterialParameter {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<Color> for MaterialParameter {
    fn from(c: Color) -> Self {
        MaterialParameter::Constant(c)
    }
}

/// Phong material with reflection and transmission coefficients.
#[derive(Debug, Clone)]
pub struct Material {
    /// Ambient
    pub ka: MaterialParameter,
    /// Diffuse
    pub kd: MaterialParameter,
    /// Specular
    pub ks: MaterialParameter,
    /// Emissive
    pub ke: MaterialParameter,
    /// Reflective
    pub kr: MaterialParameter,
    /// Transmissive, also the per-unit-distance transmittance of the medium
    pub kt: MaterialParameter,
    pub shininess: f64,
    /// Index of refraction
    pub index: f64,
}

impl Material {
    /// All-black, opaque, non-reflective material with an index of 1.
    pub const DEFAULT: Material = Material {
        ka: MaterialParameter::BLACK,
        kd: MaterialParameter::BLACK,
        ks: MaterialParameter::BLACK,
        ke: MaterialParameter::BLACK,
        kr: MaterialParameter::BLACK,
        kt: MaterialParameter::BLACK,
        shininess: 0.0,
        index: 1.0,
    };

    /// Create a diffuse-only material.
    pub fn diffuse(kd: Color) -> Self {
        Self {
            kd: kd.into(),
            ..Self::DEFAULT
        }
    }

    pub fn with_ambient(mut self, ka: impl Into<MaterialParameter>) -> Self {
        self.ka = ka.into();
        self
    }

    pub fn with_specular(mut self, ks: impl Into<MaterialParameter>, shininess: f64) -> Self {
        self.ks = ks.into();
        self.shininess = shininess;
        self
    }

    pub fn with_emissive(mut self, ke: impl Into<MaterialParameter>) -> Self {
        self.ke = ke.into();
        self
    }

    pub fn with_reflective(mut self, kr: impl Into<MaterialParameter>) -> Self {
        self.kr = kr.into();
        self
    }

    pub fn with_transmissive(mut self, kt: impl Into<MaterialParameter>, index: f64) -> Self {
        self.kt = kt.into();
        self.index = index;
        self
    }

    pub fn ka(&self, uv: DVec2) -> Color {
        self.ka.value(uv)
    }

    pub fn kd(&self, uv: DVec2) -> Color {
        self.kd.value(uv)
    }

    pub fn ks(&self, uv: DVec2) -> Color {
        self.ks.value(uv)
    }

    pub fn ke(&self, uv: DVec2) -> Color {
        self.ke.value(uv)
    }

    pub fn kr(&self, uv: DVec2) -> Color {
        self.kr.value(uv)
    }

    pub fn kt(&self, uv: DVec2) -> Color {
        self.kt.value(uv)
    }

    pub fn is_reflective(&self) -> bool {
        !self.kr.is_zero()
    }

    pub fn is_transmissive(&self) -> bool {
        !self.kt.is_zero()
    }

    /// Index of refraction, with non-positive values read as 1.
    pub fn index_of_refraction(&self) -> f64 {
        if self.index > 0.0 {
            self.index
        } else {
            1.0
        }
    }

    /// Weighted blend of three materials evaluated at `uv`.
    ///
    /// Used for meshes with per-vertex materials; the weights are the
    /// barycentric coordinates of the hit. Textures are resolved to
    /// constants, no renormalization is applied.
    pub fn blend(materials: [&Material; 3], weights: [f64; 3], uv: DVec2) -> Material {
        let mix = |f: fn(&Material, DVec2) -> Color| -> MaterialParameter {
            let c = materials
                .iter()
                .zip(weights)
                .fold(DVec3::ZERO, |acc, (m, w)| acc + f(m, uv) * w);
            MaterialParameter::Constant(c)
        };
        let scalar = |f: fn(&Material) -> f64| -> f64 {
            materials.iter().zip(weights).map(|(m, w)| f(m) * w).sum()
        };

        Material {
            ka: mix(Material::ka),
            kd: mix(Material::kd),
            ks: mix(Material::ks),
            ke: mix(Material::ke),
            kr: mix(Material::kr),
            kt: mix(Material::kt),
            shininess: scalar(|m| m.shininess),
            index: scalar(|m| m.index_of_refraction()),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::DEFAULT
    }
}
