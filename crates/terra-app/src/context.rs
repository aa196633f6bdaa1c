//! Everything the viewer simulates, gathered into one value that is owned by
//! the event loop and passed explicitly to input, update and render code.
//!
//! Nothing here touches the GPU, so the whole per-tick behavior is testable
//! without a window.

use std::time::{SystemTime, UNIX_EPOCH};

use glam::{Vec2, Vec3};
use terra_assets::LoadState;
use terra_config::{Config, ControlsConfig};
use terra_input::{MouseState, OrbitControls, OrbitSettings};
use terra_lighting::{AmbientLight, SceneLightsUniform, SunLight, SunOrbit, hex_to_linear_rgb};
use terra_planet::{PlanetGroup, TextureSlot};
use terra_render::Camera;
use terra_space::StarfieldGenerator;
use tracing::{debug, info};

/// Scene state: the rotating planet, the stars, the lights, the camera and
/// what is known about each texture.
pub struct SceneContext {
    pub planet: PlanetGroup,
    /// Star positions; fixed after construction.
    pub stars: Vec<Vec3>,
    pub star_seed: u64,
    pub ambient: AmbientLight,
    pub sun: SunLight,
    pub sun_orbit: SunOrbit,
    pub camera: Camera,
    pub controls: OrbitControls,
    textures: [LoadState; 3],
    wait_for_textures: bool,
    viewport: (u32, u32),
}

impl SceneContext {
    /// Build the initial scene for a drawable of `viewport` physical pixels.
    ///
    /// The star seed comes from the config when set, otherwise it is drawn at
    /// random and logged so a run can be reproduced.
    pub fn from_config(config: &Config, viewport: (u32, u32)) -> Self {
        let scene = &config.scene;
        let viewport = (viewport.0.max(1), viewport.1.max(1));

        let star_seed = scene.star_seed.unwrap_or_else(rand::random);
        let stars =
            StarfieldGenerator::new(star_seed, scene.star_count, scene.star_extent).generate();
        info!("Generated {} stars (seed {star_seed})", stars.len());

        let mut camera = Camera::perspective(
            config.camera.fov_y_degrees,
            viewport.0 as f32 / viewport.1 as f32,
            config.camera.near,
            config.camera.far,
        );
        camera.position = Vec3::new(0.0, 0.0, config.camera.start_distance);
        camera.look_at(Vec3::ZERO, Vec3::Y);

        Self {
            planet: PlanetGroup::new(f64::from(scene.surface_spin), f64::from(scene.cloud_spin)),
            stars,
            star_seed,
            ambient: AmbientLight {
                color: hex_to_linear_rgb(scene.ambient_color),
            },
            sun: SunLight::initial(hex_to_linear_rgb(scene.sun_color), scene.sun_intensity),
            sun_orbit: SunOrbit {
                radius: scene.sun_orbit_radius,
                height: scene.sun_height,
                time_scale: scene.sun_time_scale,
            },
            camera,
            controls: OrbitControls::new(orbit_settings(&config.controls)),
            textures: Default::default(),
            wait_for_textures: scene.wait_for_textures,
            viewport,
        }
    }

    /// Feed this frame's mouse deltas and scroll to the orbit controls.
    pub fn apply_input(&mut self, mouse: &MouseState) {
        self.controls
            .handle_mouse(mouse, &self.camera, self.viewport.1 as f32);
    }

    /// One animation step: spin the planet, settle the camera, move the sun
    /// to where it is at `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        self.planet.tick();
        self.controls.update(&mut self.camera);
        self.sun.follow(&self.sun_orbit, now_ms);
    }

    /// Run `n` ticks. The sun position depends only on `now_ms`, so it is
    /// placed once, and camera updates stop early once the controls settle.
    /// With `n == 0` nothing moves.
    pub fn advance(&mut self, n: u64, now_ms: f64) {
        if n == 0 {
            return;
        }
        self.planet.advance(n);
        self.controls.update(&mut self.camera);
        for _ in 1..n {
            if !self.controls.is_settling() {
                break;
            }
            self.controls.update(&mut self.camera);
        }
        self.sun.follow(&self.sun_orbit, now_ms);
    }

    /// Track a new drawable size. Zero dimensions are raised to one.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (w, h) = (width.max(1), height.max(1));
        self.camera.set_aspect_ratio(w as f32, h as f32);
        self.viewport = (w, h);
        debug!("Scene viewport {w}x{h}, aspect {:.4}", self.camera.aspect_ratio);
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn texture_state(&self, slot: TextureSlot) -> &LoadState {
        &self.textures[slot.index()]
    }

    pub fn set_texture_state(&mut self, slot: TextureSlot, state: LoadState) {
        self.textures[slot.index()] = state;
    }

    /// `true` once every texture has either arrived or failed.
    pub fn textures_settled(&self) -> bool {
        self.textures.iter().all(LoadState::is_settled)
    }

    /// Whether the globe is drawn this frame. Stars always are.
    pub fn should_draw_globe(&self) -> bool {
        !self.wait_for_textures || self.textures_settled()
    }

    pub fn lights_uniform(&self) -> SceneLightsUniform {
        SceneLightsUniform::new(&self.ambient, &self.sun)
    }

    /// Distance from the camera to the orbit target.
    pub fn camera_distance(&self) -> f32 {
        self.controls.distance(&self.camera)
    }

    /// Mouse-free rotate for tests and scripted views.
    pub fn orbit_by(&mut self, drag: Vec2) {
        self.controls
            .rotate(drag.x, drag.y, self.viewport.1 as f32);
    }
}

fn orbit_settings(controls: &ControlsConfig) -> OrbitSettings {
    OrbitSettings {
        enable_damping: controls.enable_damping,
        damping_factor: controls.damping_factor,
        min_distance: controls.min_distance,
        max_distance: controls.max_distance,
        rotate_speed: controls.rotate_speed,
        zoom_speed: controls.zoom_speed,
        pan_speed: controls.pan_speed,
        enable_pan: controls.enable_pan,
        screen_space_panning: controls.screen_space_panning,
        ..OrbitSettings::default()
    }
}

/// Wall-clock time in milliseconds since the Unix epoch.
pub fn epoch_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
