//! Geometric stages: points, vertices, edges and edge connection
//!
//! Each chunk triangulates its own seed points together with the neighbour
//! points inside its padded square. Vertices and edges are then split between
//! chunks with two deterministic rules:
//!
//! - a vertex belongs to the chunk whose half-open square contains it
//! - an edge belongs to the chunk owning its lexicographically smaller endpoint
//!
//! An edge seen by a chunk that doesn't own it is left as a placeholder during
//! `Edges` and resolved against the owner during `ConnectedEdges`.

use glam::DVec2;
use log::{debug, trace, warn};

use super::VoronoiWorld;
use crate::chunk::{ChunkStage, EdgeMeta, PendingEdge};
use crate::error::{LandmassError, Result};
use crate::generation::Diagram;
use crate::geometry::{
    lexicographic_min, points_equal, ChunkCoord, ChunkOffset, Edge, EdgeRef, VertexRef,
};
use crate::spatial::VertexLookup;

/// Where an edge seen from this chunk ends up
enum Slot {
    Own(usize),
    Pending { owner: ChunkOffset, a: DVec2, b: DVec2 },
}

impl Slot {
    fn pending(owner: ChunkOffset, a: DVec2, b: DVec2) -> Self {
        Slot::Pending { owner, a, b }
    }
}

impl VoronoiWorld {
    pub(super) fn build_points(&mut self, coord: ChunkCoord) -> Result<()> {
        let points = self
            .filler
            .fill(coord, self.config.chunk_size, self.config.seed)?;
        debug!("chunk {}: {} seed points", coord, points.len());

        self.store.get_or_create(coord).seed_points = points;
        Ok(())
    }

    pub(super) fn build_vertices(&mut self, coord: ChunkCoord) -> Result<()> {
        let mut diagram = self.combined_diagram(coord)?;
        let vertices = tag_owned_vertices(&mut diagram, coord, self.config.chunk_size);
        debug!(
            "chunk {}: {} of {} diagram vertices owned",
            coord,
            vertices.len(),
            diagram.vertex_count()
        );

        let chunk = self.store.get_or_create(coord);
        chunk.lookup = VertexLookup::new(&vertices);
        chunk.vertices = vertices;
        chunk.diagram = Some(diagram);
        Ok(())
    }

    pub(super) fn build_edges(&mut self, coord: ChunkCoord) -> Result<()> {
        let retained = self
            .store
            .get_mut(coord)
            .and_then(|chunk| chunk.diagram.take());
        let mut diagram = match retained {
            Some(diagram) => diagram,
            None => {
                let mut diagram = self.combined_diagram(coord)?;
                tag_owned_vertices(&mut diagram, coord, self.config.chunk_size);
                diagram
            }
        };

        let chunk = self.chunk_at(coord, ChunkStage::Vertices)?;
        let vertex_count = chunk.vertices.len();
        let cell_count = chunk.seed_points.len();

        let mut pass = EdgePass {
            world: self,
            coord,
            edges: Vec::new(),
            candidates: Vec::new(),
        };

        // Rotation around every owned vertex
        let mut vertex_edges: Vec<Vec<EdgeRef>> = vec![Vec::new(); vertex_count];
        let mut pending_vertex_edges: Vec<Vec<PendingEdge>> = vec![Vec::new(); vertex_count];
        for vertex in 0..diagram.vertex_count() {
            let tag = diagram.vertex_tag(vertex);
            if tag == 0 {
                continue;
            }
            let local = tag as usize - 1;
            let around = diagram.vertex_edges(vertex).to_vec();
            for half_edge in around {
                if !diagram.half_edge(half_edge).is_finite() {
                    warn!(
                        "chunk {}: vertex {} has an unbounded edge, border margin too small?",
                        coord, local
                    );
                    continue;
                }
                let position = vertex_edges[local].len() + pending_vertex_edges[local].len();
                match pass.classify(&mut diagram, half_edge)? {
                    Slot::Own(index) => {
                        vertex_edges[local].push(EdgeRef::new(ChunkOffset::Center, index))
                    }
                    Slot::Pending { owner, a, b } => pending_vertex_edges[local].push(PendingEdge {
                        a,
                        b,
                        position,
                        owner,
                    }),
                }
            }
        }

        // Boundary of every cell seeded by this chunk; own seeds come first in the diagram
        let mut cell_edges: Vec<Vec<EdgeRef>> = vec![Vec::new(); cell_count];
        let mut pending_cell_edges: Vec<Vec<PendingEdge>> = vec![Vec::new(); cell_count];
        for cell in 0..cell_count {
            let boundary = diagram.cell_edges(cell).to_vec();
            if boundary.is_empty() {
                warn!("chunk {}: cell {} has no boundary (duplicate seed)", coord, cell);
                continue;
            }
            if boundary.iter().any(|h| !diagram.half_edge(*h).is_finite()) {
                return Err(LandmassError::OpenCell { chunk: coord, cell });
            }
            for (position, half_edge) in boundary.into_iter().enumerate() {
                match pass.classify(&mut diagram, half_edge)? {
                    Slot::Own(index) => {
                        cell_edges[cell].push(EdgeRef::new(ChunkOffset::Center, index))
                    }
                    Slot::Pending { owner, a, b } => pending_cell_edges[cell].push(PendingEdge {
                        a,
                        b,
                        position,
                        owner,
                    }),
                }
            }
        }

        let EdgePass {
            edges, candidates, ..
        } = pass;
        debug!(
            "chunk {}: {} edges owned, {} cross the border",
            coord,
            edges.len(),
            candidates.len()
        );

        let chunk = self.store.get_or_create(coord);
        chunk.edge_metas = vec![EdgeMeta::default(); edges.len()];
        chunk.edges = edges;
        chunk.connect_candidates = candidates;
        chunk.vertex_edges = vertex_edges;
        chunk.cell_edges = cell_edges;
        chunk.pending_vertex_edges = pending_vertex_edges;
        chunk.pending_cell_edges = pending_cell_edges;
        Ok(())
    }

    pub(super) fn connect_edges(&mut self, coord: ChunkCoord) -> Result<()> {
        let chunk = self.chunk_at(coord, ChunkStage::Edges)?;

        let mut vertex_splices = Vec::new();
        for (local, pendings) in chunk.pending_vertex_edges.iter().enumerate() {
            for edge in pendings {
                vertex_splices.push((local, edge.position, self.resolve_pending(coord, edge)?));
            }
        }
        let mut cell_splices = Vec::new();
        for (cell, pendings) in chunk.pending_cell_edges.iter().enumerate() {
            for edge in pendings {
                cell_splices.push((cell, edge.position, self.resolve_pending(coord, edge)?));
            }
        }
        trace!(
            "chunk {}: connected {} vertex and {} cell placeholders",
            coord,
            vertex_splices.len(),
            cell_splices.len()
        );

        // Placeholders were recorded in ascending position per list
        let chunk = self.chunk_at_mut(coord, ChunkStage::Edges)?;
        for (local, position, edge_ref) in vertex_splices {
            chunk.vertex_edges[local].insert(position, edge_ref);
        }
        for (cell, position, edge_ref) in cell_splices {
            chunk.cell_edges[cell].insert(position, edge_ref);
        }
        chunk.release_scratch();
        Ok(())
    }

    /// Own seed points followed by every neighbour point inside the padded square
    fn combined_diagram(&self, coord: ChunkCoord) -> Result<Diagram> {
        let size = self.config.chunk_size;
        let margin = self.config.border_margin;

        let mut sites = self.chunk_at(coord, ChunkStage::Points)?.seed_points.clone();
        for neighbor in coord.neighbors() {
            let chunk = self.chunk_at(neighbor, ChunkStage::Points)?;
            sites.extend(
                chunk
                    .seed_points
                    .iter()
                    .filter(|p| coord.contains_padded(**p, size, margin)),
            );
        }
        trace!("chunk {}: diagram over {} sites", coord, sites.len());

        Diagram::build(sites)
    }

    /// Index of the edge `a`-`b` (either direction) owned by `owner`
    fn find_edge(&self, owner: ChunkCoord, a: DVec2, b: DVec2) -> Result<usize> {
        let chunk = self.chunk_at(owner, ChunkStage::Edges)?;
        let matches = |index: usize| -> Result<bool> {
            let edge = chunk.edges[index];
            let ea = self.vertex_position(edge.a.resolve(owner))?;
            let eb = self.vertex_position(edge.b.resolve(owner))?;
            Ok((points_equal(ea, a) && points_equal(eb, b))
                || (points_equal(ea, b) && points_equal(eb, a)))
        };

        for &index in &chunk.connect_candidates {
            if matches(index)? {
                return Ok(index);
            }
        }
        for index in 0..chunk.edges.len() {
            if matches(index)? {
                return Ok(index);
            }
        }

        Err(LandmassError::EdgeNotFound {
            chunk: owner,
            stage: ChunkStage::ConnectedEdges,
            a: (a.x, a.y),
            b: (b.x, b.y),
        })
    }

    fn resolve_pending(&self, coord: ChunkCoord, edge: &PendingEdge) -> Result<EdgeRef> {
        let index = self.find_edge(coord.offset(edge.owner), edge.a, edge.b)?;
        Ok(EdgeRef::new(edge.owner, index))
    }
}

/// Copy the vertices inside `coord` out of the diagram, tagging each with its
/// 1-based local index
fn tag_owned_vertices(diagram: &mut Diagram, coord: ChunkCoord, chunk_size: u32) -> Vec<DVec2> {
    let mut vertices = Vec::new();
    for vertex in 0..diagram.vertex_count() {
        let position = diagram.vertex(vertex);
        if coord.contains(position, chunk_size) {
            vertices.push(position);
            diagram.set_vertex_tag(vertex, vertices.len() as u32);
        }
    }
    vertices
}

/// Edge ownership pass over one chunk's diagram
///
/// Edge tags: 0 unseen, 1 owned by a neighbour, `2 + i` own edge `i`.
struct EdgePass<'a> {
    world: &'a VoronoiWorld,
    coord: ChunkCoord,
    edges: Vec<Edge>,
    candidates: Vec<usize>,
}

impl EdgePass<'_> {
    fn locate(&self, p: DVec2) -> Result<ChunkOffset> {
        self.coord
            .locate(p, self.world.config.chunk_size)
            .ok_or(LandmassError::NoAdjacentChunk {
                chunk: self.coord,
                x: p.x,
                y: p.y,
            })
    }

    fn endpoints(&self, diagram: &Diagram, half_edge: usize) -> Result<(DVec2, DVec2)> {
        diagram
            .endpoints(half_edge)
            .ok_or(LandmassError::OpenCell {
                chunk: self.coord,
                cell: diagram.half_edge(half_edge).cell,
            })
    }

    /// Decide ownership of a finite half-edge, creating the edge if this chunk owns it
    fn classify(&mut self, diagram: &mut Diagram, half_edge: usize) -> Result<Slot> {
        let (pa, pb) = self.endpoints(diagram, half_edge)?;
        match diagram.edge_tag(half_edge) {
            0 => {}
            1 => {
                let owner = self.locate(lexicographic_min(pa, pb))?;
                return Ok(Slot::pending(owner, pa, pb));
            }
            tag => return Ok(Slot::Own(tag as usize - 2)),
        }

        let decider = self.locate(lexicographic_min(pa, pb))?;
        if !decider.is_center() {
            diagram.set_edge_tag(half_edge, 1);
            return Ok(Slot::pending(decider, pa, pb));
        }

        let edge = diagram.half_edge(half_edge);
        let (origin, target) = (edge.origin, edge.target);
        let offset_a = self.locate(pa)?;
        let offset_b = self.locate(pb)?;
        let a = self.vertex_ref(diagram, origin, pa, offset_a)?;
        let b = self.vertex_ref(diagram, target, pb, offset_b)?;

        let index = self.edges.len();
        if !(offset_a.is_center() && offset_b.is_center()) {
            self.candidates.push(index);
        }
        self.edges.push(Edge { a, b });
        diagram.set_edge_tag(half_edge, index as u32 + 2);
        Ok(Slot::Own(index))
    }

    fn vertex_ref(
        &self,
        diagram: &Diagram,
        vertex: Option<usize>,
        position: DVec2,
        offset: ChunkOffset,
    ) -> Result<VertexRef> {
        if offset.is_center() {
            if let Some(tag) = vertex.map(|v| diagram.vertex_tag(v)).filter(|t| *t > 0) {
                return Ok(VertexRef::new(ChunkOffset::Center, tag as usize - 1));
            }
        }

        let owner = self.coord.offset(offset);
        let chunk = self.world.chunk_at(owner, ChunkStage::Vertices)?;
        let index = chunk
            .find_vertex(position)
            .ok_or(LandmassError::VertexNotFound {
                chunk: owner,
                stage: ChunkStage::Edges,
                x: position.x,
                y: position.y,
            })?;
        Ok(VertexRef::new(offset, index))
    }
}
