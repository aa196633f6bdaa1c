//! Mouse input tracking and the orbit camera controls driven by it.

pub mod mouse;
pub mod orbit;

pub use mouse::MouseState;
pub use orbit::{OrbitControls, OrbitSettings};
