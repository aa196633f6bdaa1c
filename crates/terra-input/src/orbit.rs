//! Damped orbit camera controls: rotate, zoom and pan around a target.
//!
//! Input adds to pending spherical and pan deltas. Each [`OrbitControls::update`]
//! applies a fraction (`damping_factor`) of what is pending, decays the rest,
//! clamps polar angle and distance, and writes the camera position and
//! orientation. Zoom is applied in full on the next update.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use terra_render::Camera;
use winit::event::MouseButton;

use crate::MouseState;

/// Keeps the polar angle away from the poles where look-at degenerates.
const POLAR_EPSILON: f32 = 1e-6;

/// Movement below this is treated as settled.
const SETTLE_EPSILON: f32 = 1e-6;

/// Per-notch zoom factor at `zoom_speed == 1`.
const ZOOM_STEP: f32 = 0.95;

/// Orbit control tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitSettings {
    pub enable_damping: bool,
    /// Fraction of pending motion applied per update when damping.
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits in radians, measured from +Y.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_pan: bool,
    /// When false, vertical pan moves the target along the horizontal plane.
    pub screen_space_panning: bool,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            min_distance: 150.0,
            max_distance: 500.0,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            enable_pan: true,
            screen_space_panning: false,
        }
    }
}

/// Orbit camera controller around a movable target.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub settings: OrbitSettings,
    target: Vec3,
    /// Pending (azimuth, polar) change in radians.
    spherical_delta: Vec2,
    /// Pending target translation.
    pan_offset: Vec3,
    /// Distance multiplier for the next update.
    scale: f32,
}

impl OrbitControls {
    /// Controls orbiting the origin.
    pub fn new(settings: OrbitSettings) -> Self {
        Self {
            settings,
            target: Vec3::ZERO,
            spherical_delta: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Distance from the camera to the orbit target.
    pub fn distance(&self, camera: &Camera) -> f32 {
        camera.position.distance(self.target)
    }

    /// Whether any input is still being applied.
    pub fn is_settling(&self) -> bool {
        self.spherical_delta.abs().max_element() > SETTLE_EPSILON
            || self.pan_offset.abs().max_element() > SETTLE_EPSILON
            || (self.scale - 1.0).abs() > SETTLE_EPSILON
    }

    /// Feed one frame of mouse input: left drag rotates, right drag pans,
    /// the wheel zooms. `viewport_height` is in the same pixels as the deltas.
    pub fn handle_mouse(&mut self, mouse: &MouseState, camera: &Camera, viewport_height: f32) {
        let delta = mouse.delta();
        if delta != Vec2::ZERO {
            if mouse.is_button_pressed(MouseButton::Left) {
                self.rotate(delta.x, delta.y, viewport_height);
            } else if self.settings.enable_pan && mouse.is_button_pressed(MouseButton::Right) {
                self.pan(delta.x, delta.y, camera, viewport_height);
            }
        }
        let scroll = mouse.scroll();
        if scroll != 0.0 {
            self.zoom(scroll);
        }
    }

    /// Queue a rotation from a drag of `(dx, dy)` pixels; a drag across the
    /// full viewport height is one full turn.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.spherical_delta.x -= TAU * dx / height * self.settings.rotate_speed;
        self.spherical_delta.y -= TAU * dy / height * self.settings.rotate_speed;
    }

    /// Queue a zoom of `notches` wheel steps; positive moves closer.
    pub fn zoom(&mut self, notches: f32) {
        self.scale *= ZOOM_STEP.powf(self.settings.zoom_speed * notches);
    }

    /// Queue a pan from a drag of `(dx, dy)` pixels, scaled so the point under
    /// the cursor at target depth follows it.
    pub fn pan(&mut self, dx: f32, dy: f32, camera: &Camera, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        let target_distance = self.distance(camera) * (camera.fov_y * 0.5).tan();
        let left = 2.0 * dx * target_distance / height * self.settings.pan_speed;
        let up = 2.0 * dy * target_distance / height * self.settings.pan_speed;

        let right = camera.right();
        self.pan_offset -= right * left;

        let up_axis = if self.settings.screen_space_panning {
            camera.up()
        } else {
            Vec3::Y.cross(right)
        };
        self.pan_offset += up_axis * up;
    }

    /// Advance one frame and write the camera transform. Returns `true` if the
    /// camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let settings = &self.settings;
        let offset = camera.position - self.target;
        let radius = offset.length();

        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI * 0.5)
        };

        let step = damping_step(settings);

        theta += self.spherical_delta.x * step;
        phi += self.spherical_delta.y * step;
        let (min_polar, max_polar) = ordered(settings.min_polar_angle, settings.max_polar_angle);
        phi = phi
            .clamp(min_polar, max_polar)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        if phi.is_nan() {
            phi = PI * 0.5;
        }

        let radius = clamp_distance(radius * self.scale, settings);

        self.target += self.pan_offset * step;

        let sin_phi_radius = phi.sin() * radius;
        let new_offset = Vec3::new(
            sin_phi_radius * theta.sin(),
            phi.cos() * radius,
            sin_phi_radius * theta.cos(),
        );

        let old_position = camera.position;
        camera.position = self.target + new_offset;
        camera.look_at(self.target, Vec3::Y);

        if step < 1.0 {
            self.spherical_delta *= 1.0 - step;
            self.pan_offset *= 1.0 - step;
        } else {
            self.spherical_delta = Vec2::ZERO;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        camera.position.distance_squared(old_position) > SETTLE_EPSILON
    }
}

/// Fraction of pending motion applied this update, always in `(0, 1]`.
/// Damping factors outside that range fall back to applying everything.
fn damping_step(settings: &OrbitSettings) -> f32 {
    let factor = settings.damping_factor;
    if settings.enable_damping && factor > 0.0 && factor <= 1.0 {
        factor
    } else {
        1.0
    }
}

/// `(lo, hi)` with NaN bounds dropped and an inverted pair swapped.
fn ordered(a: f32, b: f32) -> (f32, f32) {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => (f32::MIN, f32::MAX),
        (true, false) => (f32::MIN, b),
        (false, true) => (a, f32::MAX),
        (false, false) => (a.min(b), a.max(b)),
    }
}

/// Clamp an orbit radius into the configured range, treating NaN as the
/// lower bound.
fn clamp_distance(radius: f32, settings: &OrbitSettings) -> f32 {
    let (lo, hi) = ordered(settings.min_distance, settings.max_distance);
    let lo = lo.max(0.0);
    let hi = hi.max(lo);
    if radius.is_nan() {
        return lo;
    }
    radius.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::ElementState;

    fn start_camera() -> Camera {
        let mut camera = Camera::perspective(45.0, 16.0 / 9.0, 0.1, 1000.0);
        camera.position = Vec3::new(0.0, 0.0, 250.0);
        camera
    }

    #[test]
    fn test_defaults() {
        let settings = OrbitSettings::default();
        assert!(settings.enable_damping);
        assert_eq!(settings.damping_factor, 0.05);
        assert_eq!(settings.min_distance, 150.0);
        assert_eq!(settings.max_distance, 500.0);
        assert!(!settings.screen_space_panning);
    }

    #[test]
    fn test_inverted_distance_range_is_ordered() {
        let mut controls = OrbitControls::new(OrbitSettings {
            min_distance: 600.0,
            max_distance: 500.0,
            ..OrbitSettings::default()
        });
        let mut camera = start_camera();
        controls.update(&mut camera);
        let d = controls.distance(&camera);
        assert!((d - 500.0).abs() < 1e-2, "distance {d}");

        controls.zoom(-50.0);
        controls.update(&mut camera);
        let d = controls.distance(&camera);
        assert!((d - 600.0).abs() < 1e-2, "distance {d}");
    }

    #[test]
    fn test_nan_distance_bounds_do_not_panic() {
        let mut controls = OrbitControls::new(OrbitSettings {
            min_distance: f32::NAN,
            max_distance: f32::NAN,
            ..OrbitSettings::default()
        });
        let mut camera = start_camera();
        controls.update(&mut camera);
        assert!(camera.position.is_finite());
    }

    #[test]
    fn test_out_of_range_damping_does_not_diverge() {
        for factor in [-1.0, 0.0, 3.0, f32::NAN] {
            let mut controls = OrbitControls::new(OrbitSettings {
                damping_factor: factor,
                ..OrbitSettings::default()
            });
            let mut camera = start_camera();
            controls.rotate(100.0, 0.0, 600.0);
            for _ in 0..50 {
                controls.update(&mut camera);
            }
            assert!(camera.position.is_finite(), "damping {factor}");
            assert!(!controls.is_settling(), "damping {factor} left motion pending");
        }
    }

    #[test]
    fn test_idle_update_keeps_camera() {
        let mut controls = OrbitControls::new(OrbitSettings::default());
        let mut camera = start_camera();
        let moved = controls.update(&mut camera);
        assert!(!moved);
        assert!((camera.position - Vec3::new(0.0, 0.0, 250.0)).length() < 1e-3);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_zoom_clamped_for_any_input() {
        let mut controls = OrbitControls::new(OrbitSettings::default());
        let mut camera = start_camera();

        for notches in [1.0, 5.0, 100.0, 1e6, -1.0, -30.0, -1e6, f32::MAX, f32::MIN] {
            controls.zoom(notches);
            controls.update(&mut camera);
            let distance = camera.position.length();
            assert!(
                (150.0 - 1e-3..=500.0 + 1e-3).contains(&distance),
                "distance {distance} after {notches} notches"
            );
        }
    }

    #[test]
    fn test_zoom_in_reaches_min_distance() {
        let mut controls = OrbitControls::new(OrbitSettings::default());
        let mut camera = start_camera();
        controls.zoom(1000.0);
        controls.update(&mut camera);
        assert!((controls.distance(&camera) - 150.0).abs() < 1e-3);

        controls.zoom(-1000.0);
        controls.update(&mut camera);
        assert!((controls.distance(&camera) - 500.0).abs() < 1e-2);
    }

    #[test]
    fn test_zoom_one_notch() {
        let mut controls = OrbitControls::new(OrbitSettings::default());
        let mut camera = start_camera();
        controls.zoom(1.0);
        controls.update(&mut camera);
        assert!((controls.distance(&camera) - 237.5).abs() < 1e-2);
    }

    #[test]
    fn test_distance_clamped_while_rotating() {
        let mut controls = OrbitControls::new(OrbitSettings::default());
        let mut camera = start_camera();
        for i in 0..300 {
            controls.rotate(37.0, -21.0 * (i % 3) as f32, 720.0);
            controls.zoom(if i % 2 == 0 { 3.0 } else { -7.0 });
            controls.update(&mut camera);
            let distance = camera.position.length();
            assert!((150.0 - 1e-2..=500.0 + 1e-2).contains(&distance));
        }
    }

    #[test]
    fn test_out_of_range_start_is_clamped() {
        let mut controls = OrbitControls::new(OrbitSettings::default());
        let mut camera = start_camera();
        camera.position = Vec3::new(0.0, 0.0, 900.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 500.0).abs() < 1e-2);
    }

    #[test]
    fn test_damping_applies_fraction_then_converges() {
        let mut controls = OrbitControls::new(OrbitSettings::default());
        let mut camera = start_camera();

        // A drag of a quarter viewport height is a quarter turn of azimuth.
        controls.rotate(-180.0, 0.0, 720.0);
        controls.update(&mut camera);
        let theta = camera.position.x.atan2(camera.position.z);
        assert!((theta - 0.05 * std::f32::consts::FRAC_PI_2).abs() < 1e-4);

        for _ in 0..600 {
            controls.update(&mut camera);
        }
        let theta = camera.position.x.atan2(camera.position.z);
        assert!((theta - std::f32::consts::FRAC_PI_2).abs() < 1e-3);
        assert!(!controls.is_settling());
    }

    #[test]
    fn test_without_damping_applies_immediately() {
        let settings = OrbitSettings {
            enable_damping: false,
            ..OrbitSettings::default()
        };
        let mut controls = OrbitControls::new(settings);
        let mut camera = start_camera();
        controls.rotate(-180.0, 0.0, 720.0);
        assert!(controls.update(&mut camera));
        assert!((camera.position - Vec3::new(250.0, 0.0, 0.0)).length() < 1e-2);
        assert!(!controls.is_settling());
    }

    #[test]
    fn test_polar_angle_never_flips() {
        let settings = OrbitSettings {
            enable_damping: false,
            ..OrbitSettings::default()
        };
        let mut controls = OrbitControls::new(settings);
        let mut camera = start_camera();
        controls.rotate(0.0, 10_000.0, 720.0);
        controls.update(&mut camera);
        assert!(camera.position.y > 249.9);
        assert!(camera.position.is_finite());
        assert!(camera.rotation.is_finite());
    }

    #[test]
    fn test_ground_plane_pan_keeps_height() {
        let settings = OrbitSettings {
            enable_damping: false,
            ..OrbitSettings::default()
        };
        let mut controls = OrbitControls::new(settings);
        let mut camera = start_camera();
        controls.pan(40.0, 60.0, &camera, 720.0);
        controls.update(&mut camera);

        let target = controls.target();
        assert!(target.y.abs() < 1e-4);
        assert!(target.x < 0.0, "dragging right moves the target left");
        assert!(target.z < 0.0, "dragging down moves the target forward");
        assert!((controls.distance(&camera) - 250.0).abs() < 1e-2);
    }

    #[test]
    fn test_screen_space_pan_moves_vertically() {
        let settings = OrbitSettings {
            enable_damping: false,
            screen_space_panning: true,
            ..OrbitSettings::default()
        };
        let mut controls = OrbitControls::new(settings);
        let mut camera = start_camera();
        controls.pan(0.0, 60.0, &camera, 720.0);
        controls.update(&mut camera);
        assert!(controls.target().y > 0.0);
        assert!(controls.target().z.abs() < 1e-4);
    }

    #[test]
    fn test_handle_mouse_routes_buttons() {
        let mut controls = OrbitControls::new(OrbitSettings {
            enable_damping: false,
            enable_pan: false,
            ..OrbitSettings::default()
        });
        let mut camera = start_camera();
        let mut mouse = MouseState::new();
        mouse.on_cursor_moved(100.0, 100.0);
        mouse.on_button(MouseButton::Right, ElementState::Pressed);
        mouse.on_cursor_moved(160.0, 100.0);

        controls.handle_mouse(&mouse, &camera, 720.0);
        controls.update(&mut camera);
        assert_eq!(controls.target(), Vec3::ZERO, "pan disabled");

        mouse.clear_transients();
        mouse.on_button(MouseButton::Right, ElementState::Released);
        mouse.on_button(MouseButton::Left, ElementState::Pressed);
        mouse.on_cursor_moved(220.0, 100.0);
        controls.handle_mouse(&mouse, &camera, 720.0);
        assert!(controls.update(&mut camera));
    }
}
