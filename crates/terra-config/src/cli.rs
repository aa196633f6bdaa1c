//! Command-line argument parsing for the Terra viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Terra command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terra", about = "Rotating Earth viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Enable vsync.
    #[arg(long)]
    pub vsync: Option<bool>,

    /// Starfield seed (random when omitted).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hold the globe back until all textures have loaded.
    #[arg(long)]
    pub wait_for_textures: Option<bool>,

    /// Load the texture set from this directory instead of the network.
    #[arg(long)]
    pub texture_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(vsync) = args.vsync {
            self.window.vsync = vsync;
        }
        if let Some(seed) = args.seed {
            self.scene.star_seed = Some(seed);
        }
        if let Some(wait) = args.wait_for_textures {
            self.scene.wait_for_textures = wait;
        }
        if let Some(ref dir) = args.texture_dir {
            self.textures.rebase_to_dir(dir);
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
