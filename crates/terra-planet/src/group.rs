//! Spin state of the planet group.
//!
//! The surface and the cloud shell share a centre and rotate about +Y at
//! different fixed rates per tick, so the clouds drift slowly eastward over
//! the ground.

use std::f64::consts::TAU;

use glam::{Mat4, Quat};

/// Rotation angles of the surface and cloud shell.
///
/// Angles are kept in `f64` and wrapped to `[0, 2π)` each tick, so long runs do
/// not lose precision.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetGroup {
    surface_angle: f64,
    cloud_angle: f64,
    surface_spin: f64,
    cloud_spin: f64,
    ticks: u64,
}

impl PlanetGroup {
    /// Default surface spin in radians per tick.
    pub const SURFACE_SPIN: f64 = 0.001;
    /// Default cloud spin in radians per tick.
    pub const CLOUD_SPIN: f64 = 0.0015;

    pub fn new(surface_spin: f64, cloud_spin: f64) -> Self {
        Self {
            surface_angle: 0.0,
            cloud_angle: 0.0,
            surface_spin,
            cloud_spin,
            ticks: 0,
        }
    }

    /// Advance one tick.
    pub fn tick(&mut self) {
        self.advance(1);
    }

    /// Advance `n` ticks at once.
    pub fn advance(&mut self, n: u64) {
        if n == 0 {
            return;
        }
        let steps = n as f64;
        self.surface_angle = (self.surface_angle + self.surface_spin * steps).rem_euclid(TAU);
        self.cloud_angle = (self.cloud_angle + self.cloud_spin * steps).rem_euclid(TAU);
        self.ticks = self.ticks.saturating_add(n);
    }

    /// Surface rotation about +Y, radians in `[0, 2π)`.
    pub fn surface_angle(&self) -> f64 {
        self.surface_angle
    }

    /// Cloud shell rotation about +Y, radians in `[0, 2π)`.
    pub fn cloud_angle(&self) -> f64 {
        self.cloud_angle
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn surface_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.surface_angle as f32)
    }

    pub fn cloud_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.cloud_angle as f32)
    }

    pub fn surface_model_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.surface_rotation())
    }

    pub fn cloud_model_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.cloud_rotation())
    }
}

impl Default for PlanetGroup {
    fn default() -> Self {
        Self::new(Self::SURFACE_SPIN, Self::CLOUD_SPIN)
    }
}
