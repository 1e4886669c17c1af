//! Lazily generated, unbounded Voronoi world
//!
//! [`VoronoiWorld`] owns every chunk and drives them through the stage
//! pipeline on demand. Each `ensure_*` call is memoized on the chunk's stage:
//! asking for a stage a chunk already reached does no work, which is what keeps
//! the mutual neighbour pulls between stages from looping.
//!
//! ```text
//! Nothing → Points → Vertices → Edges → ConnectedEdges        (geometry)
//!         → VertexMeta → Rivers → Moisture → MoistureNeighbors → Biomes
//! ```
//!
//! Geometric stages pull the previous stage on the 8 neighbours too. Feature
//! stages only pull themselves, except where a walk (river, moisture) or a
//! cell boundary crosses into a neighbour.

mod features;
mod stages;
mod store;

pub use features::biomes::aggregate_cell;
pub use features::heights::{mark_lakes, SEA_LEVEL};
pub use features::moisture::{diffuse_moisture, MoistureGraph, MOISTURE_DECAY, MOISTURE_FLOOR};
pub use features::rivers::{select_river_sources, RIVER_SOURCE_BAND, RIVER_SOURCE_SPACING};
pub use store::ChunkStore;

use std::fmt;

use glam::DVec2;
use log::debug;

use crate::chunk::{Chunk, ChunkStage, EdgeMeta, VertexMeta};
use crate::config::WorldConfig;
use crate::error::{LandmassError, Result};
use crate::generation::{filler_for, Filler};
use crate::geometry::{ChunkCoord, EdgeId, VertexId};
use crate::terrain::{HeightSampler, NoiseHeightSampler};

/// An infinite world of chunks, generated on demand
///
/// # Example
///
/// ```no_run
/// use voronoi_landmass::*;
///
/// let config = WorldConfigBuilder::new().seed(1284).build().unwrap();
/// let mut world = VoronoiWorld::new(config);
///
/// let chunk = world.build_chunk(ChunkCoord::new(0, 0)).unwrap();
/// for (cell, meta) in chunk.cell_metas().iter().enumerate() {
///     println!("cell {} is {:?}", cell, meta.biome);
/// }
/// ```
pub struct VoronoiWorld {
    config: WorldConfig,
    store: ChunkStore,
    filler: Box<dyn Filler>,
    heights: Box<dyn HeightSampler>,
}

impl VoronoiWorld {
    /// Create a world using the configured filler and the default noise height field
    pub fn new(config: WorldConfig) -> Self {
        let filler = filler_for(&config);
        let heights = Box::new(NoiseHeightSampler::new(config.terrain_seed));
        Self::with_parts(config, filler, heights)
    }

    /// Create a world with a custom filler and height field
    ///
    /// `config.filler` is ignored in favour of `filler`.
    pub fn with_parts(
        config: WorldConfig,
        filler: Box<dyn Filler>,
        heights: Box<dyn HeightSampler>,
    ) -> Self {
        Self {
            config,
            store: ChunkStore::new(),
            filler,
            heights,
        }
    }

    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// The chunk at `coord`, if it was ever touched
    #[inline]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.store.get(coord)
    }

    /// The chunk at `coord`, created empty if needed
    pub fn get_chunk(&mut self, coord: ChunkCoord) -> &Chunk {
        self.store.get_or_create(coord)
    }

    /// Stage reached by the chunk at `coord` (`Nothing` if it doesn't exist)
    pub fn stage(&self, coord: ChunkCoord) -> ChunkStage {
        self.store
            .get(coord)
            .map(|chunk| chunk.stage)
            .unwrap_or_default()
    }

    /// Build the chunk at `coord` all the way to biomes and return it
    pub fn build_chunk(&mut self, coord: ChunkCoord) -> Result<&Chunk> {
        self.ensure_biomes(coord)?;
        self.chunk_at(coord, ChunkStage::Biomes)
    }

    /// Bring the chunk at `coord` to at least `stage`
    pub fn ensure(&mut self, coord: ChunkCoord, stage: ChunkStage) -> Result<()> {
        match stage {
            ChunkStage::Nothing => {
                self.store.get_or_create(coord);
                Ok(())
            }
            ChunkStage::Points => self.ensure_points(coord),
            ChunkStage::Vertices => self.ensure_vertices(coord),
            ChunkStage::Edges => self.ensure_edges(coord),
            ChunkStage::ConnectedEdges => self.ensure_connected_edges(coord),
            ChunkStage::VertexMeta => self.ensure_vertex_meta(coord),
            ChunkStage::Rivers => self.ensure_rivers(coord),
            ChunkStage::Moisture => self.ensure_moisture(coord),
            ChunkStage::MoistureNeighbors => self.ensure_moisture_neighbors(coord),
            ChunkStage::Biomes => self.ensure_biomes(coord),
        }
    }

    pub fn ensure_points(&mut self, coord: ChunkCoord) -> Result<()> {
        if self.stage(coord) >= ChunkStage::Points {
            return Ok(());
        }
        self.build_points(coord)?;
        self.finish(coord, ChunkStage::Points);
        Ok(())
    }

    pub fn ensure_vertices(&mut self, coord: ChunkCoord) -> Result<()> {
        if self.stage(coord) >= ChunkStage::Vertices {
            return Ok(());
        }
        self.ensure_points(coord)?;
        for neighbor in self.store.neighbors(coord) {
            self.ensure_points(neighbor)?;
        }
        self.build_vertices(coord)?;
        self.finish(coord, ChunkStage::Vertices);
        Ok(())
    }

    pub fn ensure_edges(&mut self, coord: ChunkCoord) -> Result<()> {
        if self.stage(coord) >= ChunkStage::Edges {
            return Ok(());
        }
        self.ensure_vertices(coord)?;
        for neighbor in self.store.neighbors(coord) {
            self.ensure_vertices(neighbor)?;
        }
        self.build_edges(coord)?;
        self.finish(coord, ChunkStage::Edges);
        Ok(())
    }

    pub fn ensure_connected_edges(&mut self, coord: ChunkCoord) -> Result<()> {
        if self.stage(coord) >= ChunkStage::ConnectedEdges {
            return Ok(());
        }
        self.ensure_edges(coord)?;
        for neighbor in self.store.neighbors(coord) {
            self.ensure_edges(neighbor)?;
        }
        self.connect_edges(coord)?;
        self.finish(coord, ChunkStage::ConnectedEdges);
        Ok(())
    }

    pub fn ensure_vertex_meta(&mut self, coord: ChunkCoord) -> Result<()> {
        if self.stage(coord) >= ChunkStage::VertexMeta {
            return Ok(());
        }
        self.ensure_connected_edges(coord)?;
        self.build_vertex_meta(coord)?;
        self.finish(coord, ChunkStage::VertexMeta);
        Ok(())
    }

    pub fn ensure_rivers(&mut self, coord: ChunkCoord) -> Result<()> {
        if self.stage(coord) >= ChunkStage::Rivers {
            return Ok(());
        }
        self.ensure_vertex_meta(coord)?;
        self.build_rivers(coord)?;
        self.finish(coord, ChunkStage::Rivers);
        Ok(())
    }

    pub fn ensure_moisture(&mut self, coord: ChunkCoord) -> Result<()> {
        if self.stage(coord) >= ChunkStage::Moisture {
            return Ok(());
        }
        self.ensure_rivers(coord)?;
        self.build_moisture(coord)?;
        self.finish(coord, ChunkStage::Moisture);
        Ok(())
    }

    pub fn ensure_moisture_neighbors(&mut self, coord: ChunkCoord) -> Result<()> {
        if self.stage(coord) >= ChunkStage::MoistureNeighbors {
            return Ok(());
        }
        self.ensure_moisture(coord)?;
        for neighbor in self.store.neighbors(coord) {
            self.ensure_moisture(neighbor)?;
        }
        self.finish(coord, ChunkStage::MoistureNeighbors);
        Ok(())
    }

    pub fn ensure_biomes(&mut self, coord: ChunkCoord) -> Result<()> {
        if self.stage(coord) >= ChunkStage::Biomes {
            return Ok(());
        }
        self.ensure_moisture_neighbors(coord)?;
        self.build_biomes(coord)?;
        self.finish(coord, ChunkStage::Biomes);
        Ok(())
    }

    fn finish(&mut self, coord: ChunkCoord, stage: ChunkStage) {
        let chunk = self.store.get_or_create(coord);
        debug_assert!(chunk.stage < stage);
        chunk.stage = stage;
        debug!("chunk {} reached {:?}", coord, stage);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The chunk at `coord`, provided it reached `stage`
    pub(crate) fn chunk_at(&self, coord: ChunkCoord, stage: ChunkStage) -> Result<&Chunk> {
        self.store
            .get(coord)
            .filter(|chunk| chunk.stage >= stage)
            .ok_or(LandmassError::ChunkNotReady { chunk: coord, stage })
    }

    pub(crate) fn chunk_at_mut(
        &mut self,
        coord: ChunkCoord,
        stage: ChunkStage,
    ) -> Result<&mut Chunk> {
        self.store
            .get_mut(coord)
            .filter(|chunk| chunk.stage >= stage)
            .ok_or(LandmassError::ChunkNotReady { chunk: coord, stage })
    }

    /// Coordinates of a vertex (its chunk must have reached `Vertices`)
    pub fn vertex_position(&self, id: VertexId) -> Result<DVec2> {
        let chunk = self.chunk_at(id.chunk, ChunkStage::Vertices)?;
        chunk
            .vertices
            .get(id.index)
            .copied()
            .ok_or(out_of_range(id.chunk, "vertex", id.index))
    }

    /// Metadata of a vertex (its chunk must have reached `VertexMeta`)
    pub fn vertex_meta(&self, id: VertexId) -> Result<VertexMeta> {
        let chunk = self.chunk_at(id.chunk, ChunkStage::VertexMeta)?;
        chunk
            .vertex_metas
            .get(id.index)
            .copied()
            .ok_or(out_of_range(id.chunk, "vertex", id.index))
    }

    pub(crate) fn vertex_meta_mut(&mut self, id: VertexId) -> Result<&mut VertexMeta> {
        let chunk = self.chunk_at_mut(id.chunk, ChunkStage::VertexMeta)?;
        chunk
            .vertex_metas
            .get_mut(id.index)
            .ok_or(out_of_range(id.chunk, "vertex", id.index))
    }

    /// Both endpoints of an edge (its chunk must have reached `Edges`)
    pub fn edge_endpoints(&self, id: EdgeId) -> Result<(VertexId, VertexId)> {
        let chunk = self.chunk_at(id.chunk, ChunkStage::Edges)?;
        let edge = chunk
            .edges
            .get(id.index)
            .ok_or(out_of_range(id.chunk, "edge", id.index))?;
        Ok((edge.a.resolve(id.chunk), edge.b.resolve(id.chunk)))
    }

    /// Endpoint coordinates of an edge
    pub fn edge_positions(&self, id: EdgeId) -> Result<(DVec2, DVec2)> {
        let (a, b) = self.edge_endpoints(id)?;
        Ok((self.vertex_position(a)?, self.vertex_position(b)?))
    }

    pub fn edge_meta(&self, id: EdgeId) -> Result<EdgeMeta> {
        let chunk = self.chunk_at(id.chunk, ChunkStage::Edges)?;
        chunk
            .edge_metas
            .get(id.index)
            .copied()
            .ok_or(out_of_range(id.chunk, "edge", id.index))
    }

    pub(crate) fn edge_meta_mut(&mut self, id: EdgeId) -> Result<&mut EdgeMeta> {
        let chunk = self.chunk_at_mut(id.chunk, ChunkStage::Edges)?;
        chunk
            .edge_metas
            .get_mut(id.index)
            .ok_or(out_of_range(id.chunk, "edge", id.index))
    }

    /// Incident edges of a vertex with the vertex at their other end, in
    /// counter-clockwise order (its chunk must have reached `ConnectedEdges`)
    pub fn vertex_neighbors(&self, id: VertexId) -> Result<Vec<(EdgeId, VertexId)>> {
        let chunk = self.chunk_at(id.chunk, ChunkStage::ConnectedEdges)?;
        let refs = chunk
            .vertex_edges
            .get(id.index)
            .ok_or(out_of_range(id.chunk, "vertex", id.index))?;

        refs.iter()
            .map(|edge_ref| {
                let edge = edge_ref.resolve(id.chunk);
                let (a, b) = self.edge_endpoints(edge)?;
                Ok((edge, if a == id { b } else { a }))
            })
            .collect()
    }

    /// Boundary vertices of a cell in counter-clockwise order
    ///
    /// Vertex `k` is the one shared by boundary edges `k` and `k + 1`. The chunk
    /// must have reached `ConnectedEdges`.
    ///
    /// # Errors
    ///
    /// `OpenCell` if two consecutive edges don't share a vertex.
    pub fn cell_vertices(&self, coord: ChunkCoord, cell: usize) -> Result<Vec<VertexId>> {
        let chunk = self.chunk_at(coord, ChunkStage::ConnectedEdges)?;
        let refs = chunk
            .cell_edges
            .get(cell)
            .ok_or(out_of_range(coord, "cell", cell))?;
        if refs.is_empty() {
            return Ok(Vec::new());
        }
        if refs.len() < 3 {
            return Err(LandmassError::OpenCell { chunk: coord, cell });
        }

        let ends = refs
            .iter()
            .map(|edge_ref| self.edge_endpoints(edge_ref.resolve(coord)))
            .collect::<Result<Vec<_>>>()?;

        let mut polygon = Vec::with_capacity(ends.len());
        for (k, &(a, b)) in ends.iter().enumerate() {
            let (c, d) = ends[(k + 1) % ends.len()];
            let shared = if a == c || a == d {
                a
            } else if b == c || b == d {
                b
            } else {
                return Err(LandmassError::OpenCell { chunk: coord, cell });
            };
            polygon.push(shared);
        }
        Ok(polygon)
    }

    /// Boundary polygon of a cell, for rendering
    pub fn cell_polygon(&self, coord: ChunkCoord, cell: usize) -> Result<Vec<DVec2>> {
        self.cell_vertices(coord, cell)?
            .into_iter()
            .map(|vertex| self.vertex_position(vertex))
            .collect()
    }
}

impl fmt::Debug for VoronoiWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoronoiWorld")
            .field("config", &self.config)
            .field("chunks", &self.store.len())
            .finish_non_exhaustive()
    }
}

#[inline]
fn out_of_range(chunk: ChunkCoord, what: &'static str, index: usize) -> LandmassError {
    LandmassError::IndexOutOfRange { chunk, what, index }
}
