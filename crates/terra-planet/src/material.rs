//! Blinn-Phong material parameters and the per-body GPU uniform.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use terra_lighting::hex_to_linear_rgb;

/// Shading parameters for one sphere.
#[derive(Clone, Debug, PartialEq)]
pub struct PhongMaterial {
    /// Specular reflectance at normal incidence, linear RGB.
    pub specular: Vec3,
    /// Blinn-Phong exponent.
    pub shininess: f32,
    /// Multiplies the colour map's alpha.
    pub opacity: f32,
    /// Whether the material alpha-blends over what is behind it.
    pub transparent: bool,
    /// Whether specular strength is read from a specular map's red channel.
    pub uses_specular_map: bool,
}

impl PhongMaterial {
    /// Opaque ground: faint specular modulated by the ocean mask.
    pub fn surface(specular_hex: u32, shininess: f32) -> Self {
        Self {
            specular: hex_to_linear_rgb(specular_hex),
            shininess,
            opacity: 1.0,
            transparent: false,
            uses_specular_map: true,
        }
    }

    /// Translucent cloud layer with stock Phong highlights.
    pub fn clouds(opacity: f32) -> Self {
        Self {
            specular: hex_to_linear_rgb(0x111111),
            shininess: 30.0,
            opacity: opacity.clamp(0.0, 1.0),
            transparent: true,
            uses_specular_map: false,
        }
    }
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self::surface(0x333333, 5.0)
    }
}

/// GPU-side body data, bound next to the scene lights in group 1.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BodyUniform {
    /// Model matrix; rotation only, so it doubles as the normal matrix.
    pub model: [[f32; 4]; 4],
    /// xyz = specular colour, w = shininess.
    pub specular_shininess: [f32; 4],
    /// x = opacity, y = 1 when the specular map applies, zw = padding.
    pub params: [f32; 4],
}

impl BodyUniform {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(model: Mat4, material: &PhongMaterial) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            specular_shininess: material.specular.extend(material.shininess).to_array(),
            params: [
                material.opacity,
                if material.uses_specular_map { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        }
    }
}
