//! Procedural starfield: points scattered uniformly through an axis-aligned cube
//! centred on the origin.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Number of stars in the default field.
pub const DEFAULT_STAR_COUNT: u32 = 10_000;

/// Default half side of the cube the stars fill.
pub const DEFAULT_HALF_EXTENT: f32 = 1000.0;

/// Generates a deterministic star cloud from a seed.
#[derive(Debug, Clone)]
pub struct StarfieldGenerator {
    seed: u64,
    star_count: u32,
    half_extent: f32,
}

impl StarfieldGenerator {
    /// Create a generator placing `star_count` stars with every coordinate
    /// in `[-half_extent, half_extent]`.
    pub fn new(seed: u64, star_count: u32, half_extent: f32) -> Self {
        Self {
            seed,
            star_count,
            half_extent: half_extent.abs(),
        }
    }

    pub fn star_count(&self) -> u32 {
        self.star_count
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    /// Generate the star positions. Deterministic for a given seed.
    pub fn generate(&self) -> Vec<Vec3> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let extent = self.half_extent;
        // `random::<f32>()` is in [0, 1), so the result never exceeds the extent.
        let mut coord = move || (rng.random::<f32>() * 2.0 - 1.0) * extent;

        (0..self.star_count)
            .map(|_| {
                let x = coord();
                let y = coord();
                let z = coord();
                Vec3::new(x, y, z)
            })
            .collect()
    }
}

impl Default for StarfieldGenerator {
    fn default() -> Self {
        Self::new(0, DEFAULT_STAR_COUNT, DEFAULT_HALF_EXTENT)
    }
}
