//! Configuration system for the Terra viewer.
//!
//! Settings persist to disk as a RON file, can be overridden from the command
//! line, and tolerate missing or unknown fields so older files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CameraConfig, Config, ControlsConfig, DEFAULT_TEXTURE_BASE_URL, DebugConfig, MAX_SPHERE_SEGMENTS,
    MIN_SPHERE_SEGMENTS, RenderConfig,
    SceneConfig, TextureConfig, WindowConfig,
};
pub use error::ConfigError;
