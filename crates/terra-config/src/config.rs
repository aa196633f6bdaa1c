//! Configuration structs with scene defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Base URL the default texture set is fetched from.
/// Bounds for `scene.sphere_segments`; the upper one keeps vertex indices
/// and buffer sizes well inside `u32`.
pub const MIN_SPHERE_SEGMENTS: u32 = 3;
pub const MAX_SPHERE_SEGMENTS: u32 = 1024;

pub const DEFAULT_TEXTURE_BASE_URL: &str = "https://threejs.org/examples/textures/planets/";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Output settings.
    pub render: RenderConfig,
    /// Perspective camera settings.
    pub camera: CameraConfig,
    /// Orbit control tuning.
    pub controls: ControlsConfig,
    /// Scene composition and animation rates.
    pub scene: SceneConfig,
    /// Texture sources for the globe.
    pub textures: TextureConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// MSAA sample count (1 disables antialiasing, 4 enables it).
    pub msaa_samples: u32,
    /// Background clear color, linear RGBA.
    pub clear_color: [f64; 4],
}

/// Perspective camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
    /// Starting distance from the globe along +Z.
    pub start_distance: f32,
}

/// Orbit control configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Smooth input with inertia.
    pub enable_damping: bool,
    /// Fraction of pending motion applied per frame when damping.
    pub damping_factor: f32,
    /// Closest allowed orbit distance.
    pub min_distance: f32,
    /// Farthest allowed orbit distance.
    pub max_distance: f32,
    /// Rotation speed multiplier.
    pub rotate_speed: f32,
    /// Zoom speed multiplier.
    pub zoom_speed: f32,
    /// Pan speed multiplier.
    pub pan_speed: f32,
    /// Allow right-drag panning.
    pub enable_pan: bool,
    /// Pan in screen space instead of along the ground plane.
    pub screen_space_panning: bool,
}

/// Scene composition and animation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Number of stars in the backdrop.
    pub star_count: u32,
    /// Stars are placed in `[-star_extent, star_extent]` on each axis.
    pub star_extent: f32,
    /// Star point size in world units (size-attenuated).
    pub star_size: f32,
    /// Starfield seed. `None` picks a fresh seed each run.
    pub star_seed: Option<u64>,
    /// Globe surface radius.
    pub planet_radius: f32,
    /// Cloud shell radius.
    pub cloud_radius: f32,
    /// Sphere tessellation (width and height segments).
    pub sphere_segments: u32,
    /// Surface rotation per tick in radians.
    pub surface_spin: f32,
    /// Cloud rotation per tick in radians.
    pub cloud_spin: f32,
    /// Surface specular tint (0xRRGGBB).
    pub surface_specular: u32,
    /// Surface Phong shininess.
    pub surface_shininess: f32,
    /// Cloud shell opacity.
    pub cloud_opacity: f32,
    /// Ambient light color (0xRRGGBB).
    pub ambient_color: u32,
    /// Sun color (0xRRGGBB).
    pub sun_color: u32,
    /// Sun intensity.
    pub sun_intensity: f32,
    /// Radius of the sun's horizontal orbit.
    pub sun_orbit_radius: f32,
    /// Fixed sun height.
    pub sun_height: f32,
    /// Sun angle in radians per wall-clock millisecond.
    pub sun_time_scale: f64,
    /// Hold the globe back until every texture has finished loading.
    pub wait_for_textures: bool,
    /// Fixed animation tick rate in Hz. 0 ticks once per redraw.
    pub tick_rate_hz: u32,
}

/// Texture sources. Each entry is an `http(s)://` URL or a file path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextureConfig {
    /// Surface color map.
    pub color_map: String,
    /// Surface specular map.
    pub specular_map: String,
    /// Cloud map with alpha.
    pub cloud_map: String,
    /// HTTP timeout in seconds for remote sources.
    pub fetch_timeout_secs: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Seconds between frame-rate log lines. 0 disables them.
    pub frame_stats_interval_secs: u32,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Terra".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            msaa_samples: 4,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            start_distance: 250.0,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            min_distance: 150.0,
            max_distance: 500.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            enable_pan: true,
            screen_space_panning: false,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            star_count: 10_000,
            star_extent: 1000.0,
            star_size: 1.2,
            star_seed: None,
            planet_radius: 100.0,
            cloud_radius: 101.0,
            sphere_segments: 64,
            surface_spin: 0.001,
            cloud_spin: 0.0015,
            surface_specular: 0x333333,
            surface_shininess: 5.0,
            cloud_opacity: 0.8,
            ambient_color: 0x333333,
            sun_color: 0xffffff,
            sun_intensity: 1.0,
            sun_orbit_radius: 300.0,
            sun_height: 100.0,
            sun_time_scale: 0.0001,
            wait_for_textures: false,
            tick_rate_hz: 0,
        }
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            color_map: format!("{DEFAULT_TEXTURE_BASE_URL}earth_atmos_2048.jpg"),
            specular_map: format!("{DEFAULT_TEXTURE_BASE_URL}earth_specular_2048.jpg"),
            cloud_map: format!("{DEFAULT_TEXTURE_BASE_URL}earth_clouds_1024.png"),
            fetch_timeout_secs: 30,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            frame_stats_interval_secs: 0,
        }
    }
}

impl TextureConfig {
    /// Point every texture at the file of the same name inside `dir`.
    pub fn rebase_to_dir(&mut self, dir: &Path) {
        for source in [
            &mut self.color_map,
            &mut self.specular_map,
            &mut self.cloud_map,
        ] {
            let file_name = source.rsplit(['/', '\\']).next().unwrap_or(source.as_str());
            *source = dir.join(file_name).to_string_lossy().into_owned();
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Replace out-of-range values with safe ones, logging each change.
    ///
    /// Run after loading and CLI overrides; the rest of the viewer assumes an
    /// ordered distance range, a damping factor in `(0, 1]` and a bounded
    /// sphere resolution. Returns the number of fields corrected.
    pub fn validate(&mut self) -> usize {
        let mut fixed = 0;
        let defaults = ControlsConfig::default();
        let controls = &mut self.controls;

        if !(controls.min_distance.is_finite() && controls.min_distance >= 0.0) {
            log::warn!(
                "controls.min_distance {} is invalid, using {}",
                controls.min_distance,
                defaults.min_distance
            );
            controls.min_distance = defaults.min_distance;
            fixed += 1;
        }
        if !(controls.max_distance.is_finite() && controls.max_distance > 0.0) {
            log::warn!(
                "controls.max_distance {} is invalid, using {}",
                controls.max_distance,
                defaults.max_distance
            );
            controls.max_distance = defaults.max_distance;
            fixed += 1;
        }
        if controls.min_distance > controls.max_distance {
            log::warn!(
                "controls.min_distance {} exceeds max_distance {}, swapping",
                controls.min_distance,
                controls.max_distance
            );
            std::mem::swap(&mut controls.min_distance, &mut controls.max_distance);
            fixed += 1;
        }
        if !(controls.damping_factor > 0.0 && controls.damping_factor <= 1.0) {
            log::warn!(
                "controls.damping_factor {} is outside (0, 1], using {}",
                controls.damping_factor,
                defaults.damping_factor
            );
            controls.damping_factor = defaults.damping_factor;
            fixed += 1;
        }

        let scene = &mut self.scene;
        let segments = scene
            .sphere_segments
            .clamp(MIN_SPHERE_SEGMENTS, MAX_SPHERE_SEGMENTS);
        if segments != scene.sphere_segments {
            log::warn!(
                "scene.sphere_segments {} out of range, using {segments}",
                scene.sphere_segments
            );
            scene.sphere_segments = segments;
            fixed += 1;
        }
        if !(0.0..=1.0).contains(&scene.cloud_opacity) {
            let opacity = if scene.cloud_opacity.is_nan() {
                SceneConfig::default().cloud_opacity
            } else {
                scene.cloud_opacity.clamp(0.0, 1.0)
            };
            log::warn!(
                "scene.cloud_opacity {} out of range, using {opacity}",
                scene.cloud_opacity
            );
            scene.cloud_opacity = opacity;
            fixed += 1;
        }

        let camera = &mut self.camera;
        if !(camera.near > 0.0 && camera.far > camera.near) {
            let d = CameraConfig::default();
            log::warn!(
                "camera near/far {}/{} are invalid, using {}/{}",
                camera.near,
                camera.far,
                d.near,
                d.far
            );
            camera.near = d.near;
            camera.far = d.far;
            fixed += 1;
        }

        fixed
    }

    /// Re-read `config.ron`; `Some(new_config)` if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let mut new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate();

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_keeps_defaults() {
        let mut config = Config::default();
        assert_eq!(config.validate(), 0);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_orders_inverted_distance_range() {
        let mut config = Config::default();
        config.controls.min_distance = 600.0;
        config.controls.max_distance = 500.0;
        assert_eq!(config.validate(), 1);
        assert_eq!(config.controls.min_distance, 500.0);
        assert_eq!(config.controls.max_distance, 600.0);
    }

    #[test]
    fn test_validate_replaces_nan_distances() {
        let mut config = Config::default();
        config.controls.min_distance = f32::NAN;
        config.controls.max_distance = f32::INFINITY;
        config.validate();
        assert_eq!(config.controls.min_distance, 150.0);
        assert_eq!(config.controls.max_distance, 500.0);
    }

    #[test]
    fn test_validate_damping_factor() {
        for bad in [0.0, -0.5, 1.5, f32::NAN] {
            let mut config = Config::default();
            config.controls.damping_factor = bad;
            assert_eq!(config.validate(), 1, "damping {bad}");
            assert_eq!(config.controls.damping_factor, 0.05);
        }
        let mut config = Config::default();
        config.controls.damping_factor = 1.0;
        assert_eq!(config.validate(), 0);
    }

    #[test]
    fn test_validate_bounds_sphere_segments_and_opacity() {
        let mut config = Config::default();
        config.scene.sphere_segments = 30_000;
        config.scene.cloud_opacity = 3.0;
        assert_eq!(config.validate(), 2);
        assert_eq!(config.scene.sphere_segments, MAX_SPHERE_SEGMENTS);
        assert_eq!(config.scene.cloud_opacity, 1.0);

        config.scene.sphere_segments = 0;
        config.validate();
        assert_eq!(config.scene.sphere_segments, MIN_SPHERE_SEGMENTS);
    }

    #[test]
    fn test_validate_camera_planes() {
        let mut config = Config::default();
        config.camera.near = 10.0;
        config.camera.far = 1.0;
        assert_eq!(config.validate(), 1);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.camera.far, 1000.0);
    }

    #[test]
    fn test_reload_validates() {
        let tmp = tempfile::tempdir().unwrap();
        let mut edited = Config::default();
        edited.controls.min_distance = 700.0;
        edited.controls.max_distance = 200.0;
        edited.save(tmp.path()).unwrap();

        let reloaded = Config::default()
            .reload(tmp.path())
            .unwrap()
            .expect("changed");
        assert_eq!(reloaded.controls.min_distance, 200.0);
        assert_eq!(reloaded.controls.max_distance, 700.0);
    }

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("star_count: 10000"));
        assert!(ron_str.contains("earth_atmos_2048.jpg"));
    }

    #[test]
    fn test_scene_defaults() {
        let scene = SceneConfig::default();
        assert_eq!(scene.star_count, 10_000);
        assert_eq!(scene.star_extent, 1000.0);
        assert_eq!(scene.surface_spin, 0.001);
        assert_eq!(scene.cloud_spin, 0.0015);
        assert_eq!(scene.ambient_color, 0x333333);
        assert_eq!(scene.sun_time_scale, 0.0001);
        assert!(!scene.wait_for_textures);
    }

    #[test]
    fn test_camera_and_controls_defaults() {
        let camera = CameraConfig::default();
        assert_eq!(camera.fov_y_degrees, 45.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert_eq!(camera.start_distance, 250.0);

        let controls = ControlsConfig::default();
        assert!(controls.enable_damping);
        assert_eq!(controls.damping_factor, 0.05);
        assert_eq!(controls.min_distance, 150.0);
        assert_eq!(controls.max_distance, 500.0);
        assert!(!controls.screen_space_panning);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.scene.star_seed = Some(42);
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        // No `controls` section at all.
        let ron_str = "(window: (), camera: (fov_y_degrees: 60.0), scene: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.controls, ControlsConfig::default());
        assert_eq!(config.camera.fov_y_degrees, 60.0);
        assert_eq!(config.camera.far, 1000.0);
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_rebase_textures_to_dir() {
        let mut textures = TextureConfig::default();
        textures.rebase_to_dir(Path::new("/tmp/planets"));
        assert_eq!(
            Path::new(&textures.color_map),
            Path::new("/tmp/planets/earth_atmos_2048.jpg")
        );
        assert_eq!(
            Path::new(&textures.cloud_map),
            Path::new("/tmp/planets/earth_clouds_1024.png")
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.window.height = 1080;
        config.scene.wait_for_textures = true;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.controls.max_distance = 800.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().controls.max_distance, 800.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_ron_comments_accepted() {
        let ron_str = "// viewer settings\n(\n  // nothing overridden\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config, Config::default());
    }
}
