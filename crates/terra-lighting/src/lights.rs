//! Ambient light and the combined GPU lighting uniform.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::sun::SunLight;

/// Uniform light added to every lit surface regardless of orientation.
#[derive(Clone, Debug, PartialEq)]
pub struct AmbientLight {
    /// Linear RGB.
    pub color: Vec3,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: crate::color::hex_to_linear_rgb(0x333333),
        }
    }
}

/// GPU-side lighting, 48 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct SceneLightsUniform {
    /// xyz = ambient colour, w = padding.
    pub ambient: [f32; 4],
    /// xyz = unit vector toward the sun, w = intensity.
    pub sun_direction_intensity: [f32; 4],
    /// xyz = sun colour, w = padding.
    pub sun_color: [f32; 4],
}

impl SceneLightsUniform {
    pub fn new(ambient: &AmbientLight, sun: &SunLight) -> Self {
        let dir = sun.direction_to_light();
        Self {
            ambient: ambient.color.extend(0.0).to_array(),
            sun_direction_intensity: dir.extend(sun.intensity).to_array(),
            sun_color: sun.color.extend(0.0).to_array(),
        }
    }
}
