//! The background starfield: deterministic point placement and an instanced
//! billboard renderer.

pub mod renderer;
pub mod starfield;

pub use renderer::{StarInstance, StarUniforms, StarfieldRenderer};
pub use starfield::{DEFAULT_HALF_EXTENT, DEFAULT_STAR_COUNT, StarfieldGenerator};
