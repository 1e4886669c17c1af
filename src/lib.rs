//! Infinite, chunked Voronoi world maps
//!
//! The plane is cut into square chunks that are generated lazily and
//! independently, yet agree exactly on every vertex and edge they share.
//! On top of the stitched geometry each chunk gets heights, sea and lakes,
//! rivers, moisture and a biome per cell.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_landmass::*;
//!
//! let config = WorldConfigBuilder::new()
//!     .seed(1284)
//!     .chunk_size(400).unwrap()
//!     .filler(FillerKind::JitteredHex { spacing: 20 })
//!     .build().unwrap();
//!
//! let mut world = VoronoiWorld::new(config);
//! let chunk = world.build_chunk(ChunkCoord::new(0, 0)).unwrap();
//!
//! let beaches = chunk.cell_metas().iter().filter(|m| m.biome == Biome::Beach).count();
//! println!("{} cells, {} beaches", chunk.cell_count(), beaches);
//! ```
//!
//! Chunks only ever move forward through [`ChunkStage`]s. Asking for a stage
//! pulls whatever it needs from the chunk itself and its neighbours, so any
//! chunk can be requested in any order.
//!
//! # Features
//!
//! - `spatial-index` (default): KD-tree lookups when resolving vertices across chunk borders
//! - `serde`: Serialization support for configuration and metadata

// Modules
pub mod chunk;
pub mod config;
pub mod error;
pub mod generation;
pub mod geometry;
pub mod spatial;
pub mod terrain;
pub mod world;

// Re-export core types for convenience
pub use chunk::{Biome, CellMeta, Chunk, ChunkStage, EdgeMeta, VertexMeta, WaterType};
pub use config::{
    FillerKind, WorldConfig, WorldConfigBuilder, DEFAULT_LLOYD_ITERATIONS, MAX_LLOYD_ITERATIONS,
};
pub use error::{LandmassError, Result};
pub use generation::{Filler, LloydOptions};
pub use geometry::{ChunkCoord, ChunkOffset, Edge, EdgeId, EdgeRef, VertexId, VertexRef};
pub use spatial::VertexLookup;
pub use terrain::{octave_noise, HeightSampler, NoiseHeightSampler};
pub use world::{ChunkStore, VoronoiWorld};

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
