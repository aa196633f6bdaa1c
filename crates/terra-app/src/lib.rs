//! Terra application framework: scene state, frame pacing, rendering and the
//! winit event loop that ties them together.

pub mod context;
pub mod frame_clock;
pub mod platform;
pub mod renderer;
pub mod window;

pub use context::{SceneContext, epoch_millis};
pub use frame_clock::{FrameClock, FrameStats};
pub use platform::{PlatformDirs, PlatformError};
pub use renderer::SceneRenderer;
pub use window::{AppState, run};
