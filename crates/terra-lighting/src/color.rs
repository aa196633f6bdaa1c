//! Colour conversions for config-supplied hex colours.

use glam::Vec3;

/// Convert one sRGB-encoded channel in `[0, 1]` to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Interpret `0xRRGGBB` as sRGB and return linear RGB. Bits above 24 are ignored.
pub fn hex_to_linear_rgb(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}
