//! Height field sampling
//!
//! Provides the trait the world uses to assign a height to every Voronoi vertex,
//! and a noise-driven default implementation.

mod perlin;

pub use perlin::octave_noise;

use glam::DVec2;

/// Trait for sampling terrain height at positions in the plane
///
/// Implementations must be pure: the same position always yields the same
/// height, whichever chunk asks.
pub trait HeightSampler {
    /// Height at `position`, roughly in [0, 1]
    fn height(&self, position: DVec2) -> f64;
}

impl<F> HeightSampler for F
where
    F: Fn(DVec2) -> f64,
{
    fn height(&self, position: DVec2) -> f64 {
        self(position)
    }
}

/// Default height field built from several octave noise layers
///
/// Three low-frequency "group" masks decide how much each detail layer
/// contributes at a position. Masks are clamped to be non-negative and
/// normalized by their sum, which is floored at 0.2 to keep the division
/// stable where every mask is close to zero.
///
/// | layer | octaves | frequency | persistence |
/// |-------|---------|-----------|-------------|
/// | A     | 5       | 0.003     | 0.5         |
/// | B     | 3       | 0.0025    | noise driven, 0.5..0.8 |
/// | C     | 3       | 0.00002   | 0.5         |
///
/// With the default weights only group A is active, which gives rolling
/// continents with a sea level around 0.3.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseHeightSampler {
    /// Seed for noise generation
    pub seed: u32,
    /// Scale of each group mask (default: [2.0, 0.0, 0.0])
    pub group_weights: [f64; 3],
}

impl Default for NoiseHeightSampler {
    fn default() -> Self {
        Self {
            seed: 0,
            group_weights: [2.0, 0.0, 0.0],
        }
    }
}

impl NoiseHeightSampler {
    /// Create a new sampler with the given seed
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Low-frequency mask for group `layer`, on its own noise layer
    fn group(&self, position: DVec2, layer: usize) -> f64 {
        let z = layer as f64 * 1000.0;
        let raw = octave_noise(1, 0.0003, 0.5, position.x, position.y, z, self.seed) + 1.0;
        (raw * self.group_weights[layer]).max(0.0)
    }
}

impl HeightSampler for NoiseHeightSampler {
    fn height(&self, position: DVec2) -> f64 {
        let (x, y) = (position.x, position.y);

        let group_a = self.group(position, 0);
        let group_b = self.group(position, 1);
        let group_c = self.group(position, 2);
        let multiplier = 1.0 / (group_a + group_b + group_c).max(0.2);

        let persistence_b = (octave_noise(1, 0.0003, 0.5, x, y, 2000.0, self.seed) + 1.0) * 0.15 + 0.5;

        let height_a = octave_noise(5, 0.003, 0.5, x, y, 0.0, self.seed) + 0.5;
        let height_b = octave_noise(3, 0.0025, persistence_b, x, y, 0.0, self.seed) + 0.25;
        let height_c = octave_noise(3, 0.00002, 0.5, x, y, 0.0, self.seed) + 0.5;

        (height_a * group_a + height_b * group_b + height_c * group_c) * multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_height_determinism() {
        let sampler = NoiseHeightSampler::new(1284);
        let position = DVec2::new(123.5, -456.25);

        assert_eq!(sampler.height(position), sampler.height(position));
    }

    #[test]
    fn test_single_group_is_detail_layer() {
        // Group A alone: the normalization cancels its weight whenever it's above the floor
        let sampler = NoiseHeightSampler::new(7);
        for i in 0..50 {
            let position = DVec2::new(i as f64 * 97.0, i as f64 * -31.0);
            let group = sampler.group(position, 0);
            if group >= 0.2 {
                let expected = octave_noise(5, 0.003, 0.5, position.x, position.y, 0.0, 7) + 0.5;
                assert_relative_eq!(sampler.height(position), expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_height_range() {
        let sampler = NoiseHeightSampler::new(42);
        for i in 0..200 {
            let position = DVec2::new(i as f64 * 41.0 - 4000.0, i as f64 * 13.0);
            let height = sampler.height(position);
            assert!(height.is_finite());
            assert!((-1.0..=2.0).contains(&height), "height {} out of range", height);
        }
    }

    #[test]
    fn test_zero_weights_stay_finite() {
        let sampler = NoiseHeightSampler {
            seed: 3,
            group_weights: [0.0, 0.0, 0.0],
        };
        assert_eq!(sampler.height(DVec2::new(10.0, 10.0)), 0.0);
    }

    #[test]
    fn test_closure_sampler() {
        let flat = |_: DVec2| 0.5;
        assert_eq!(flat.height(DVec2::new(1.0, 2.0)), 0.5);
    }
}
