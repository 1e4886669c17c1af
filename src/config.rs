//! World Configuration and Builder
//!
//! This module provides configuration types for deterministic chunked world generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{LandmassError, Result};

/// Relaxation passes used by [`FillerKind::relaxed_random`]
pub const DEFAULT_LLOYD_ITERATIONS: usize = 2;

/// Upper bound on relaxation passes accepted by the builder
pub const MAX_LLOYD_ITERATIONS: usize = 20;

/// Seed point placement policy used for every chunk
///
/// All policies are pure functions of chunk coordinates, chunk size and seed,
/// so a chunk's points can be regenerated at any time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillerKind {
    /// Uniformly random integer points
    Random {
        /// Points generated per chunk (before duplicates are removed)
        count: usize,
    },
    /// Random points smoothed by Lloyd relaxation, then clipped to the chunk
    RelaxedRandom {
        /// Points generated per chunk
        count: usize,
        /// Maximum number of relaxation passes
        iterations: usize,
    },
    /// Axis-aligned square grid
    Grid {
        /// Distance between neighbouring points
        spacing: u32,
    },
    /// Hexagonal grid, every other row shifted by half a spacing
    Hex {
        /// Distance between neighbouring points
        spacing: u32,
    },
    /// Hexagonal grid with a bounded random offset per point
    ///
    /// Keeps cells roughly equal in size while still looking organic.
    JitteredHex {
        /// Distance between neighbouring points
        spacing: u32,
    },
}

impl FillerKind {
    /// Relaxed random filler with [`DEFAULT_LLOYD_ITERATIONS`] passes
    pub fn relaxed_random(count: usize) -> Self {
        FillerKind::RelaxedRandom {
            count,
            iterations: DEFAULT_LLOYD_ITERATIONS,
        }
    }

    /// Get a human-readable name for this filler
    pub fn name(self) -> &'static str {
        match self {
            FillerKind::Random { .. } => "Random",
            FillerKind::RelaxedRandom { .. } => "RelaxedRandom",
            FillerKind::Grid { .. } => "Grid",
            FillerKind::Hex { .. } => "Hex",
            FillerKind::JitteredHex { .. } => "JitteredHex",
        }
    }
}

impl Default for FillerKind {
    fn default() -> Self {
        FillerKind::JitteredHex { spacing: 20 }
    }
}

/// Configuration for deterministic world generation
///
/// The same configuration always produces the identical world, chunk by chunk,
/// regardless of the order in which chunks are requested.
///
/// # Example
///
/// ```rust
/// use voronoi_landmass::*;
///
/// let config = WorldConfigBuilder::new()
///     .seed(1284)
///     .filler(FillerKind::Hex { spacing: 25 })
///     .build()
///     .unwrap();
///
/// assert_eq!(config.chunk_size, 400);
///
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: WorldConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    /// Random seed for seed point placement
    pub seed: u32,

    /// Random seed for the height field (separate from point placement)
    ///
    /// This allows the same cell layout with different terrain.
    pub terrain_seed: u32,

    /// Side length of a chunk in world units
    pub chunk_size: u32,

    /// Seed point placement policy
    pub filler: FillerKind,

    /// How far (as a fraction of `chunk_size`) neighbour seed points are pulled in
    /// around a chunk when building its diagram
    ///
    /// Must be large enough that every cell owned by the chunk is closed.
    pub border_margin: f64,

    /// Sea components of at most this many vertices become lakes
    pub lake_size: usize,

    /// Early exit threshold for Lloyd relaxation (fraction of chunk size)
    ///
    /// - 0.0: run every iteration
    /// - 0.001: default, stop when no point moves more than 0.1% of a chunk
    pub lloyd_convergence: f64,
}

impl WorldConfig {
    /// Chunk size as a float, for geometry
    #[inline]
    pub fn size(&self) -> f64 {
        self.chunk_size as f64
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            terrain_seed: 0,
            chunk_size: 400,
            filler: FillerKind::default(),
            border_margin: 0.3,
            lake_size: 200,
            lloyd_convergence: 0.001,
        }
    }
}

/// Builder for creating WorldConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_landmass::*;
///
/// // Use defaults
/// let config = WorldConfigBuilder::new().build().unwrap();
///
/// // Customize
/// let config = WorldConfigBuilder::new()
///     .seed(12345)
///     .chunk_size(200)
///     .unwrap()
///     .filler(FillerKind::RelaxedRandom { count: 300, iterations: 3 })
///     .terrain_seed(67890)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct WorldConfigBuilder {
    seed: Option<u32>,
    terrain_seed: Option<u32>,
    chunk_size: u32,
    filler: FillerKind,
    border_margin: f64,
    lake_size: usize,
    lloyd_convergence: f64,
}

impl WorldConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - terrain_seed: Same as seed
    /// - chunk_size: 400
    /// - filler: JitteredHex with spacing 20
    /// - border_margin: 0.3
    /// - lake_size: 200
    /// - lloyd_convergence: 0.001
    pub fn new() -> Self {
        let defaults = WorldConfig::default();
        Self {
            seed: None,
            terrain_seed: None,
            chunk_size: defaults.chunk_size,
            filler: defaults.filler,
            border_margin: defaults.border_margin,
            lake_size: defaults.lake_size,
            lloyd_convergence: defaults.lloyd_convergence,
        }
    }

    /// Set the random seed for point placement
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set a separate terrain seed
    ///
    /// If not set, the terrain seed will match the world seed.
    pub fn terrain_seed(mut self, seed: u32) -> Self {
        self.terrain_seed = Some(seed);
        self
    }

    /// Set the chunk side length
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if size is 0
    pub fn chunk_size(mut self, size: u32) -> Result<Self> {
        if size == 0 {
            return Err(LandmassError::InvalidConfig(
                "chunk size must be positive".to_string(),
            ));
        }
        self.chunk_size = size;
        Ok(self)
    }

    /// Set the seed point placement policy
    ///
    /// The policy is validated against the chunk size in `build()`.
    pub fn filler(mut self, filler: FillerKind) -> Self {
        self.filler = filler;
        self
    }

    /// Set the neighbour margin as a fraction of the chunk size
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if margin is not in (0, 1]. Only the 8 direct
    /// neighbours contribute points, so a margin above 1 would be meaningless.
    pub fn border_margin(mut self, margin: f64) -> Result<Self> {
        if !(margin > 0.0 && margin <= 1.0) {
            return Err(LandmassError::InvalidConfig(format!(
                "border margin must be in (0, 1] (got {})",
                margin
            )));
        }
        self.border_margin = margin;
        Ok(self)
    }

    /// Set the largest sea component size reclassified as lake
    pub fn lake_size(mut self, size: usize) -> Self {
        self.lake_size = size;
        self
    }

    /// Set the convergence threshold for Lloyd's relaxation
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if threshold is negative
    pub fn lloyd_convergence(mut self, threshold: f64) -> Result<Self> {
        if !(threshold >= 0.0) {
            return Err(LandmassError::InvalidConfig(format!(
                "Lloyd convergence threshold must be >= 0 (got {})",
                threshold
            )));
        }
        self.lloyd_convergence = threshold;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the filler doesn't fit the chunk size: a zero
    /// point count, a spacing of 0 or larger than a chunk, more than
    /// [`MAX_LLOYD_ITERATIONS`] passes, or points too sparse for the border margin.
    ///
    /// Neighbour points are only pulled in within `border_margin * chunk_size`
    /// of a chunk, so the gap between points has to stay well below that reach.
    /// Lattices may be at most half the reach apart. Random points cluster and
    /// leave larger holes, so their mean spacing is held to a quarter of it.
    pub fn build(self) -> Result<WorldConfig> {
        validate_filler(self.filler, self.chunk_size, self.border_margin)?;

        let seed = self.seed.unwrap_or_else(rand::random);
        let terrain_seed = self.terrain_seed.unwrap_or(seed);

        Ok(WorldConfig {
            seed,
            terrain_seed,
            chunk_size: self.chunk_size,
            filler: self.filler,
            border_margin: self.border_margin,
            lake_size: self.lake_size,
            lloyd_convergence: self.lloyd_convergence,
        })
    }
}

impl Default for WorldConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_filler(filler: FillerKind, chunk_size: u32, border_margin: f64) -> Result<()> {
    let reach = border_margin * chunk_size as f64;
    match filler {
        FillerKind::Random { count } | FillerKind::RelaxedRandom { count, .. } if count == 0 => {
            Err(LandmassError::InvalidConfig(format!(
                "{} filler needs at least one point",
                filler.name()
            )))
        }
        FillerKind::RelaxedRandom { iterations, .. } if iterations > MAX_LLOYD_ITERATIONS => {
            Err(LandmassError::InvalidConfig(format!(
                "Lloyd iterations must be <= {} (got {})",
                MAX_LLOYD_ITERATIONS, iterations
            )))
        }
        FillerKind::Random { count } | FillerKind::RelaxedRandom { count, .. } => {
            let mean_spacing = chunk_size as f64 / (count as f64).sqrt();
            if mean_spacing * 4.0 > reach {
                let needed = (4.0 * chunk_size as f64 / reach).powi(2).ceil();
                return Err(LandmassError::InvalidConfig(format!(
                    "{} filler needs at least {} points per chunk for a border reach of {} (got {})",
                    filler.name(),
                    needed,
                    reach,
                    count
                )));
            }
            Ok(())
        }
        FillerKind::Grid { spacing }
        | FillerKind::Hex { spacing }
        | FillerKind::JitteredHex { spacing } => {
            if spacing == 0 || spacing > chunk_size {
                return Err(LandmassError::InvalidConfig(format!(
                    "{} spacing must be in 1..={} (got {})",
                    filler.name(),
                    chunk_size,
                    spacing
                )));
            }
            if spacing as f64 * 2.0 > reach {
                return Err(LandmassError::InvalidConfig(format!(
                    "{} spacing {} is too coarse for a border reach of {}",
                    filler.name(),
                    spacing,
                    reach
                )));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = WorldConfigBuilder::new().build().unwrap();
        assert_eq!(config.chunk_size, 400);
        assert_eq!(config.filler, FillerKind::JitteredHex { spacing: 20 });
        assert_eq!(config.border_margin, 0.3);
        assert_eq!(config.lake_size, 200);
        assert_eq!(config.terrain_seed, config.seed);
    }

    #[test]
    fn test_builder_custom() {
        let config = WorldConfigBuilder::new()
            .seed(42)
            .terrain_seed(99)
            .chunk_size(250)
            .unwrap()
            .filler(FillerKind::Grid { spacing: 25 })
            .lake_size(50)
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.terrain_seed, 99);
        assert_eq!(config.chunk_size, 250);
        assert_eq!(config.size(), 250.0);
        assert_eq!(config.filler, FillerKind::Grid { spacing: 25 });
        assert_eq!(config.lake_size, 50);
    }

    #[test]
    fn test_terrain_seed_defaults_to_seed() {
        let config = WorldConfigBuilder::new().seed(42).build().unwrap();
        assert_eq!(config.terrain_seed, 42);
    }

    #[test]
    fn test_invalid_chunk_size() {
        assert!(WorldConfigBuilder::new().chunk_size(0).is_err());
    }

    #[test]
    fn test_invalid_border_margin() {
        assert!(WorldConfigBuilder::new().border_margin(0.0).is_err());
        assert!(WorldConfigBuilder::new().border_margin(1.5).is_err());
        assert!(WorldConfigBuilder::new().border_margin(f64::NAN).is_err());
        assert!(WorldConfigBuilder::new().border_margin(0.5).is_ok());
    }

    #[test]
    fn test_invalid_lloyd_convergence() {
        assert!(WorldConfigBuilder::new().lloyd_convergence(-0.1).is_err());
        assert!(WorldConfigBuilder::new().lloyd_convergence(0.0).is_ok());
    }

    #[test]
    fn test_filler_validation() {
        let build = |filler| WorldConfigBuilder::new().seed(1).filler(filler).build();

        assert!(build(FillerKind::Random { count: 0 }).is_err());
        assert!(build(FillerKind::RelaxedRandom { count: 400, iterations: 21 }).is_err());
        assert!(build(FillerKind::Grid { spacing: 0 }).is_err());
        assert!(build(FillerKind::Hex { spacing: 401 }).is_err());
        assert!(build(FillerKind::JitteredHex { spacing: 60 }).is_ok());
        assert!(build(FillerKind::RelaxedRandom { count: 400, iterations: 20 }).is_ok());
    }

    #[test]
    fn test_sparse_fillers_rejected() {
        let build = |filler| WorldConfigBuilder::new().seed(1).filler(filler).build();

        // Default reach is 0.3 * 400 = 120
        assert!(build(FillerKind::JitteredHex { spacing: 100 }).is_err());
        assert!(build(FillerKind::JitteredHex { spacing: 200 }).is_err());
        assert!(build(FillerKind::JitteredHex { spacing: 400 }).is_err());
        assert!(build(FillerKind::Hex { spacing: 150 }).is_err());
        assert!(build(FillerKind::Grid { spacing: 150 }).is_err());
        assert!(build(FillerKind::Grid { spacing: 61 }).is_err());
        assert!(build(FillerKind::Random { count: 10 }).is_err());
        assert!(build(FillerKind::Random { count: 177 }).is_err());
        assert!(build(FillerKind::relaxed_random(100)).is_err());

        assert!(build(FillerKind::Grid { spacing: 60 }).is_ok());
        assert!(build(FillerKind::Random { count: 178 }).is_ok());
    }

    #[test]
    fn test_density_follows_border_margin() {
        let build = |margin, filler| {
            WorldConfigBuilder::new()
                .seed(1)
                .border_margin(margin)
                .unwrap()
                .filler(filler)
                .build()
        };

        assert!(build(0.3, FillerKind::Hex { spacing: 100 }).is_err());
        assert!(build(0.5, FillerKind::Hex { spacing: 100 }).is_ok());
        assert!(build(0.1, FillerKind::Hex { spacing: 25 }).is_err());
        assert!(build(0.5, FillerKind::Random { count: 64 }).is_ok());
    }

    #[test]
    fn test_relaxed_random_default_iterations() {
        assert_eq!(
            FillerKind::relaxed_random(300),
            FillerKind::RelaxedRandom {
                count: 300,
                iterations: DEFAULT_LLOYD_ITERATIONS
            }
        );
        assert!(DEFAULT_LLOYD_ITERATIONS <= MAX_LLOYD_ITERATIONS);
    }

    #[test]
    fn test_filler_names() {
        assert_eq!(FillerKind::default().name(), "JitteredHex");
        assert_eq!(FillerKind::Random { count: 1 }.name(), "Random");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = WorldConfigBuilder::new()
            .seed(12345)
            .filler(FillerKind::relaxed_random(400))
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: WorldConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}
