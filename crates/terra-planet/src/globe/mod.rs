//! GPU rendering of the surface sphere and cloud shell.

mod renderer;
mod slot;

pub use renderer::{GLOBE_SHADER_SOURCE, GlobeDescriptor, GlobeRenderer};
pub use slot::TextureSlot;
