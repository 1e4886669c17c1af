//! Chunk data and per-element metadata
//!
//! A [`Chunk`] is one square of the infinite plane. It owns the Voronoi
//! vertices inside its square, the edges it won the ownership tie-break for,
//! and one cell per seed point. Everything that crosses into a neighbour is a
//! [`VertexRef`]/[`EdgeRef`], never a copy.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::generation::Diagram;
use crate::geometry::{ChunkCoord, ChunkOffset, Edge, EdgeRef};
use crate::spatial::VertexLookup;

/// Pipeline stage a chunk has reached
///
/// Stages only move forward. The first four are geometric, the rest attach
/// terrain features on top of the stitched geometry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ChunkStage {
    /// Created, nothing computed
    #[default]
    Nothing,
    /// Seed points placed
    Points,
    /// Owned Voronoi vertices extracted
    Vertices,
    /// Owned edges and per-vertex/per-cell edge lists built (with placeholders)
    Edges,
    /// Placeholders resolved against neighbours
    ConnectedEdges,
    /// Heights, sea/land classification and lakes
    VertexMeta,
    /// Rivers traced from this chunk's sources
    Rivers,
    /// Moisture diffused from this chunk's water
    Moisture,
    /// Moisture forced on every neighbour
    MoistureNeighbors,
    /// Per-cell averages and biomes
    Biomes,
}

impl ChunkStage {
    /// Every stage in pipeline order
    pub const ALL: [ChunkStage; 10] = [
        ChunkStage::Nothing,
        ChunkStage::Points,
        ChunkStage::Vertices,
        ChunkStage::Edges,
        ChunkStage::ConnectedEdges,
        ChunkStage::VertexMeta,
        ChunkStage::Rivers,
        ChunkStage::Moisture,
        ChunkStage::MoistureNeighbors,
        ChunkStage::Biomes,
    ];

    /// The stage that has to be complete before this one runs
    pub fn previous(self) -> Option<ChunkStage> {
        let index = ChunkStage::ALL.iter().position(|s| *s == self)?;
        index.checked_sub(1).map(|i| ChunkStage::ALL[i])
    }
}

/// Water classification of a vertex
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaterType {
    #[default]
    Land,
    Sea,
    Lake,
    River,
}

impl WaterType {
    /// Lakes and rivers feed moisture diffusion
    #[inline]
    pub fn is_fresh_water(self) -> bool {
        matches!(self, WaterType::Lake | WaterType::River)
    }
}

/// Biome of a cell
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Biome {
    Sea,
    Lake,
    Beach,
    #[default]
    Land,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VertexMeta {
    pub height: f64,
    pub water: WaterType,
    /// 0..=1, 1 at fresh water and sea
    pub moisture: f64,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellMeta {
    /// Mean height of the boundary vertices
    pub average_height: f64,
    /// Mean moisture of the boundary vertices
    pub average_moisture: f64,
    pub biome: Biome,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeMeta {
    pub is_river: bool,
}

/// An edge seen during EDGES whose owner is a neighbour, waiting for its index there
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PendingEdge {
    pub a: DVec2,
    pub b: DVec2,
    /// Slot in the vertex's or cell's edge list holding the placeholder
    pub position: usize,
    pub owner: ChunkOffset,
}

/// One square of the world
///
/// Read access is public; only the world's stage machinery mutates a chunk.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    pub(crate) coord: ChunkCoord,
    pub(crate) stage: ChunkStage,

    pub(crate) seed_points: Vec<DVec2>,
    pub(crate) vertices: Vec<DVec2>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) cell_edges: Vec<Vec<EdgeRef>>,
    pub(crate) vertex_edges: Vec<Vec<EdgeRef>>,

    pub(crate) vertex_metas: Vec<VertexMeta>,
    pub(crate) cell_metas: Vec<CellMeta>,
    pub(crate) edge_metas: Vec<EdgeMeta>,

    /// Owned edges with an endpoint in a neighbour, searched first when a
    /// neighbour resolves a placeholder
    pub(crate) connect_candidates: Vec<usize>,
    pub(crate) lookup: VertexLookup,

    // Scratch, dropped once edges are connected
    pub(crate) diagram: Option<Diagram>,
    pub(crate) pending_vertex_edges: Vec<Vec<PendingEdge>>,
    pub(crate) pending_cell_edges: Vec<Vec<PendingEdge>>,
}

impl Chunk {
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            ..Default::default()
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn stage(&self) -> ChunkStage {
        self.stage
    }

    /// Voronoi sites; cell `i` belongs to `seed_points()[i]`
    #[inline]
    pub fn seed_points(&self) -> &[DVec2] {
        &self.seed_points
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.seed_points.len()
    }

    /// Vertices owned by this chunk (all inside its square)
    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    /// Edges owned by this chunk
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Boundary edges of every cell, in counter-clockwise order
    #[inline]
    pub fn cell_edges(&self) -> &[Vec<EdgeRef>] {
        &self.cell_edges
    }

    /// Incident edges of every owned vertex, in counter-clockwise order
    #[inline]
    pub fn vertex_edges(&self) -> &[Vec<EdgeRef>] {
        &self.vertex_edges
    }

    #[inline]
    pub fn vertex_metas(&self) -> &[VertexMeta] {
        &self.vertex_metas
    }

    #[inline]
    pub fn cell_metas(&self) -> &[CellMeta] {
        &self.cell_metas
    }

    #[inline]
    pub fn edge_metas(&self) -> &[EdgeMeta] {
        &self.edge_metas
    }

    /// Local index of the owned vertex at `position` (epsilon equality)
    pub fn find_vertex(&self, position: DVec2) -> Option<usize> {
        self.lookup.find(&self.vertices, position)
    }

    /// Drop the diagram and placeholder lists
    pub(crate) fn release_scratch(&mut self) {
        self.diagram = None;
        self.pending_vertex_edges = Vec::new();
        self.pending_cell_edges = Vec::new();
    }
}
