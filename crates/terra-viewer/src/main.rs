//! Terra: a textured Earth turning under a moving sun, inside a starfield.
//!
//! Run with: `cargo run -p terra-viewer -- --seed 42`

use std::process::ExitCode;

use clap::Parser;
use terra_app::PlatformDirs;
use terra_config::{CliArgs, Config};
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match &args.config {
        Some(dir) => Ok(PlatformDirs {
            config_dir: dir.clone(),
            cache_dir: dir.join("cache"),
            log_dir: dir.join("logs"),
        }),
        None => PlatformDirs::resolve(),
    };
    let dirs = dirs.and_then(|d| d.create_dirs().map(|()| d));

    // Load before logging starts so the configured level applies; report
    // any problems once the subscriber is up.
    let mut load_error = None;
    let mut config = match &dirs {
        Ok(d) => Config::load_or_create(&d.config_dir).unwrap_or_else(|e| {
            load_error = Some(e.to_string());
            Config::default()
        }),
        Err(_) => Config::default(),
    };
    config.apply_cli_overrides(&args);

    let log_dir = dirs.as_ref().ok().map(|d| d.log_dir.as_path());
    terra_log::init_logging(log_dir, cfg!(debug_assertions), Some(&config));

    match &dirs {
        Ok(d) => info!("Config directory: {}", d.config_dir.display()),
        Err(e) => warn!("No app directories ({e}), using defaults without logs on disk"),
    }
    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {e}");
    }
    let corrected = config.validate();
    if corrected > 0 {
        warn!("Corrected {corrected} invalid config value(s)");
    }
    info!(
        "Window: {}x{} | stars: {} | wait for textures: {}",
        config.window.width,
        config.window.height,
        config.scene.star_count,
        config.scene.wait_for_textures
    );

    match terra_app::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Event loop failed: {e}");
            ExitCode::FAILURE
        }
    }
}
