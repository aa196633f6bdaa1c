//! The planet: a textured surface sphere and a translucent cloud shell that spin
//! together about the world Y axis.

pub mod globe;
pub mod group;
pub mod material;
pub mod mesh;

pub use globe::{GlobeDescriptor, GlobeRenderer, TextureSlot};
pub use group::PlanetGroup;
pub use material::{BodyUniform, PhongMaterial};
pub use mesh::{MAX_SEGMENTS, SphereMesh, generate_uv_sphere};
