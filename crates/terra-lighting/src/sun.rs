//! The sun: a directional light whose position circles the planet over
//! wall-clock time.

use glam::Vec3;

/// Horizontal circle the sun travels on.
///
/// At time `ms` the sun sits at `(r·sin t, h, r·cos t)` with
/// `t = ms · time_scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunOrbit {
    pub radius: f32,
    pub height: f32,
    /// Radians per millisecond.
    pub time_scale: f64,
}

impl Default for SunOrbit {
    fn default() -> Self {
        Self {
            radius: 300.0,
            height: 100.0,
            time_scale: 0.0001,
        }
    }
}

impl SunOrbit {
    /// Sun position for a timestamp in milliseconds.
    ///
    /// The angle is reduced in `f64`; Unix-epoch timestamps are far beyond the
    /// range where `f32` keeps sub-radian precision.
    pub fn position_at(&self, ms: f64) -> Vec3 {
        let t = (ms * self.time_scale).rem_euclid(std::f64::consts::TAU);
        let r = f64::from(self.radius);
        Vec3::new(
            (t.sin() * r) as f32,
            self.height,
            (t.cos() * r) as f32,
        )
    }
}

/// A directional light positioned in world space.
///
/// Light travels from `position` toward the origin, so only the direction of
/// `position` matters for shading.
#[derive(Clone, Debug, PartialEq)]
pub struct SunLight {
    pub position: Vec3,
    /// Linear RGB, not premultiplied by intensity.
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for SunLight {
    fn default() -> Self {
        Self::initial(Vec3::ONE, 1.0)
    }
}

impl SunLight {
    /// Position before the first tick.
    pub const INITIAL_POSITION: Vec3 = Vec3::new(300.0, 100.0, 200.0);

    pub fn initial(color: Vec3, intensity: f32) -> Self {
        Self {
            position: Self::INITIAL_POSITION,
            color,
            intensity,
        }
    }

    /// Move the light along `orbit` to its position at `ms`.
    pub fn follow(&mut self, orbit: &SunOrbit, ms: f64) {
        self.position = orbit.position_at(ms);
    }

    /// Unit vector from the origin toward the light.
    pub fn direction_to_light(&self) -> Vec3 {
        self.position.try_normalize().unwrap_or(Vec3::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3, eps: f32) {
        assert!((a - b).length() < eps, "expected {b}, got {a}");
    }

    #[test]
    fn test_position_at_zero() {
        let orbit = SunOrbit::default();
        assert_close(orbit.position_at(0.0), Vec3::new(0.0, 100.0, 300.0), 1e-4);
    }

    #[test]
    fn test_position_after_ten_seconds_is_one_radian() {
        let orbit = SunOrbit::default();
        let expected = Vec3::new(300.0 * 1f32.sin(), 100.0, 300.0 * 1f32.cos());
        let p = orbit.position_at(10_000.0);
        assert_close(p, expected, 1e-3);
        assert_close(p, Vec3::new(252.44, 100.0, 162.09), 0.01);
    }

    #[test]
    fn test_position_stays_on_circle_for_epoch_timestamps() {
        let orbit = SunOrbit::default();
        for ms in [1.7e12, 1.700_000_000_123e12, 2.5e12] {
            let p = orbit.position_at(ms);
            let horizontal = (p.x * p.x + p.z * p.z).sqrt();
            assert!((horizontal - 300.0).abs() < 1e-2, "radius {horizontal}");
            assert_eq!(p.y, 100.0);
        }
    }

    #[test]
    fn test_full_period_returns_to_start() {
        let orbit = SunOrbit::default();
        let period_ms = std::f64::consts::TAU / orbit.time_scale;
        assert_close(orbit.position_at(period_ms), orbit.position_at(0.0), 1e-2);
    }

    #[test]
    fn test_initial_sun() {
        let sun = SunLight::default();
        assert_eq!(sun.position, Vec3::new(300.0, 100.0, 200.0));
        assert_eq!(sun.color, Vec3::ONE);
        assert_eq!(sun.intensity, 1.0);
    }

    #[test]
    fn test_follow_moves_only_position() {
        let mut sun = SunLight::initial(Vec3::new(1.0, 0.5, 0.25), 2.0);
        sun.follow(&SunOrbit::default(), 0.0);
        assert_close(sun.position, Vec3::new(0.0, 100.0, 300.0), 1e-4);
        assert_eq!(sun.intensity, 2.0);
        assert_eq!(sun.color, Vec3::new(1.0, 0.5, 0.25));
    }

    #[test]
    fn test_direction_to_light_is_unit() {
        let sun = SunLight::default();
        let d = sun.direction_to_light();
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!(d.x > 0.0 && d.y > 0.0 && d.z > 0.0);

        let degenerate = SunLight {
            position: Vec3::ZERO,
            ..SunLight::default()
        };
        assert_eq!(degenerate.direction_to_light(), Vec3::Y);
    }
}
