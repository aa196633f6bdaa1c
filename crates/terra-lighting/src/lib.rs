//! Scene lighting: a constant ambient term and a sun that circles the planet.

pub mod color;
pub mod lights;
pub mod sun;

pub use color::{hex_to_linear_rgb, srgb_to_linear};
pub use lights::{AmbientLight, SceneLightsUniform};
pub use sun::{SunLight, SunOrbit};
