//! Seed point fillers
//!
//! A filler places the Voronoi sites of one chunk. Fillers are pure functions
//! of chunk coordinates, chunk size and seed: any chunk's points can be
//! regenerated at any time without a global table.

use std::collections::HashSet;

use glam::DVec2;
use log::trace;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::lloyd::{lloyd_relaxation_with_options, LloydOptions};
use crate::config::{FillerKind, WorldConfig};
use crate::error::Result;
use crate::geometry::ChunkCoord;

/// Places the seed points of a chunk
pub trait Filler {
    /// Seed points for `chunk`
    ///
    /// Must return the same points for the same arguments.
    fn fill(&self, chunk: ChunkCoord, chunk_size: u32, seed: u32) -> Result<Vec<DVec2>>;
}

/// Build the filler a configuration asks for
pub fn filler_for(config: &WorldConfig) -> Box<dyn Filler> {
    match config.filler {
        FillerKind::Random { count } => Box::new(RandomFiller { count }),
        FillerKind::RelaxedRandom { count, iterations } => Box::new(RelaxedRandomFiller {
            count,
            options: LloydOptions {
                max_iterations: iterations,
                convergence_threshold: config.lloyd_convergence,
            },
        }),
        FillerKind::Grid { spacing } => Box::new(GridFiller { spacing }),
        FillerKind::Hex { spacing } => Box::new(HexFiller { spacing }),
        FillerKind::JitteredHex { spacing } => Box::new(JitteredHexFiller { spacing }),
    }
}

/// Random generator keyed by chunk coordinates and world seed
pub fn chunk_rng(chunk: ChunkCoord, seed: u32) -> ChaCha8Rng {
    let coords = ((chunk.x as u32 as u64) << 32) | chunk.y as u32 as u64;
    ChaCha8Rng::seed_from_u64(splitmix64(coords ^ splitmix64(seed as u64)))
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

#[inline]
fn chunk_origin(chunk: ChunkCoord, chunk_size: u32) -> (i64, i64) {
    (
        chunk.x as i64 * chunk_size as i64,
        chunk.y as i64 * chunk_size as i64,
    )
}

/// Uniformly random integer points inside the chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomFiller {
    pub count: usize,
}

impl Filler for RandomFiller {
    fn fill(&self, chunk: ChunkCoord, chunk_size: u32, seed: u32) -> Result<Vec<DVec2>> {
        let (ox, oy) = chunk_origin(chunk, chunk_size);
        let mut rng = chunk_rng(chunk, seed);
        let mut seen = HashSet::with_capacity(self.count);
        let mut points = Vec::with_capacity(self.count);

        for _ in 0..self.count {
            let x = rng.gen_range(0..chunk_size as i64);
            let y = rng.gen_range(0..chunk_size as i64);
            if seen.insert((x, y)) {
                points.push(DVec2::new((ox + x) as f64, (oy + y) as f64));
            }
        }

        if points.len() < self.count {
            trace!(
                "random filler: {} duplicate points dropped in chunk {}",
                self.count - points.len(),
                chunk
            );
        }
        Ok(points)
    }
}

/// Random points smoothed by Lloyd relaxation
///
/// Relaxation pushes border points outwards; points that leave the chunk are dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxedRandomFiller {
    pub count: usize,
    pub options: LloydOptions,
}

impl Filler for RelaxedRandomFiller {
    fn fill(&self, chunk: ChunkCoord, chunk_size: u32, seed: u32) -> Result<Vec<DVec2>> {
        let points = RandomFiller { count: self.count }.fill(chunk, chunk_size, seed)?;
        let size = chunk_size as f64;
        let relaxed = lloyd_relaxation_with_options(points, size, self.options)?;

        Ok(relaxed
            .into_iter()
            .filter(|p| chunk.contains(*p, chunk_size))
            .collect())
    }
}

/// Square grid covering the chunk's half-open square
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridFiller {
    pub spacing: u32,
}

impl Filler for GridFiller {
    fn fill(&self, chunk: ChunkCoord, chunk_size: u32, _seed: u32) -> Result<Vec<DVec2>> {
        let (ox, oy) = chunk_origin(chunk, chunk_size);
        let step = self.spacing.max(1) as usize;
        let mut points = Vec::new();

        for y in (0..chunk_size as i64).step_by(step) {
            for x in (0..chunk_size as i64).step_by(step) {
                points.push(DVec2::new((ox + x) as f64, (oy + y) as f64));
            }
        }
        Ok(points)
    }
}

/// Hexagonal grid: even rows are shifted right by half a spacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexFiller {
    pub spacing: u32,
}

impl Filler for HexFiller {
    fn fill(&self, chunk: ChunkCoord, chunk_size: u32, _seed: u32) -> Result<Vec<DVec2>> {
        Ok(hex_points(chunk, chunk_size, self.spacing, |_| (0, 0)))
    }
}

/// Hexagonal grid with every point pushed away from its slot by
/// `spacing / 8` to `spacing / 4` on each axis, in a random direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitteredHexFiller {
    pub spacing: u32,
}

impl Filler for JitteredHexFiller {
    fn fill(&self, chunk: ChunkCoord, chunk_size: u32, seed: u32) -> Result<Vec<DVec2>> {
        let mut rng = chunk_rng(chunk, seed);
        let half_max = self.spacing as f64 / 8.0;
        let spread = half_max as i64;

        let mut jitter = move || -> i64 {
            let away = half_max + rng.gen_range(0..=spread) as f64;
            if rng.gen_bool(0.5) {
                away as i64
            } else {
                -(away as i64)
            }
        };

        Ok(hex_points(chunk, chunk_size, self.spacing, |_| {
            let dx = jitter();
            let dy = jitter();
            (dx, dy)
        }))
    }
}

fn hex_points(
    chunk: ChunkCoord,
    chunk_size: u32,
    spacing: u32,
    mut offset: impl FnMut((i64, i64)) -> (i64, i64),
) -> Vec<DVec2> {
    let (ox, oy) = chunk_origin(chunk, chunk_size);
    let spacing = spacing.max(1) as i64;
    let steps = chunk_size as i64 / spacing;
    let mut points = Vec::with_capacity((steps * steps) as usize);

    for row in 0..steps {
        let shift = if row % 2 == 0 { spacing / 2 } else { 0 };
        for col in 0..steps {
            let slot = (col * spacing + shift, row * spacing);
            let (dx, dy) = offset(slot);
            points.push(DVec2::new(
                (ox + slot.0 + dx) as f64,
                (oy + slot.1 + dy) as f64,
            ));
        }
    }
    points
}
