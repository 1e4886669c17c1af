//! Moisture diffusion from lakes and rivers

use log::debug;

use crate::chunk::ChunkStage;
use crate::error::Result;
use crate::geometry::{ChunkCoord, VertexId};
use crate::world::VoronoiWorld;

/// Moisture kept per hop away from the source
pub const MOISTURE_DECAY: f64 = 0.9;

/// Propagation stops once moisture would drop to this value or below
pub const MOISTURE_FLOOR: f64 = 0.05;

/// A graph moisture can spread over
pub trait MoistureGraph {
    type Node: Copy;

    fn moisture(&self, node: Self::Node) -> Result<f64>;

    fn set_moisture(&mut self, node: Self::Node, moisture: f64) -> Result<()>;

    /// Adjacent nodes; may have to generate data before answering
    fn neighbors(&mut self, node: Self::Node) -> Result<Vec<Self::Node>>;
}

/// Spread moisture outward from `sources`
///
/// Every hop multiplies moisture by [`MOISTURE_DECAY`]. A neighbour is updated
/// (and expanded in turn) only if the new value beats its current one and
/// stays above [`MOISTURE_FLOOR`], so the walk always terminates. Returns the
/// number of updates.
pub fn diffuse_moisture<G: MoistureGraph>(
    graph: &mut G,
    sources: impl IntoIterator<Item = G::Node>,
) -> Result<usize> {
    let mut stack: Vec<G::Node> = sources.into_iter().collect();
    let mut updates = 0;

    while let Some(node) = stack.pop() {
        let moisture = graph.moisture(node)? * MOISTURE_DECAY;
        if moisture <= MOISTURE_FLOOR {
            continue;
        }
        for next in graph.neighbors(node)? {
            if moisture > graph.moisture(next)? {
                graph.set_moisture(next, moisture)?;
                stack.push(next);
                updates += 1;
            }
        }
    }
    Ok(updates)
}

/// The world's vertex graph, pulling rivers into every chunk it enters
struct WorldMoisture<'a> {
    world: &'a mut VoronoiWorld,
}

impl MoistureGraph for WorldMoisture<'_> {
    type Node = VertexId;

    fn moisture(&self, node: VertexId) -> Result<f64> {
        Ok(self.world.vertex_meta(node)?.moisture)
    }

    fn set_moisture(&mut self, node: VertexId, moisture: f64) -> Result<()> {
        self.world.vertex_meta_mut(node)?.moisture = moisture;
        Ok(())
    }

    fn neighbors(&mut self, node: VertexId) -> Result<Vec<VertexId>> {
        let neighbors = self.world.vertex_neighbors(node)?;
        let mut nodes = Vec::with_capacity(neighbors.len());
        for (_, other) in neighbors {
            self.world.ensure_rivers(other.chunk)?;
            nodes.push(other);
        }
        Ok(nodes)
    }
}

impl VoronoiWorld {
    pub(in crate::world) fn build_moisture(&mut self, coord: ChunkCoord) -> Result<()> {
        let chunk = self.chunk_at(coord, ChunkStage::Rivers)?;
        let sources: Vec<VertexId> = chunk
            .vertex_metas
            .iter()
            .enumerate()
            .filter(|(_, meta)| meta.water.is_fresh_water())
            .map(|(index, _)| VertexId { chunk: coord, index })
            .collect();
        let source_count = sources.len();

        let updates = diffuse_moisture(&mut WorldMoisture { world: self }, sources)?;
        debug!(
            "chunk {}: moisture from {} sources, {} updates",
            coord, source_count, updates
        );
        Ok(())
    }
}
