//! Vertex heights, sea/land classification and lake detection

use log::debug;

use crate::chunk::{ChunkStage, VertexMeta, WaterType};
use crate::error::Result;
use crate::geometry::{ChunkCoord, VertexId};
use crate::world::VoronoiWorld;

/// Vertices below this height are sea
pub const SEA_LEVEL: f64 = 0.3;

impl VoronoiWorld {
    pub(in crate::world) fn build_vertex_meta(&mut self, coord: ChunkCoord) -> Result<()> {
        let chunk = self.chunk_at(coord, ChunkStage::ConnectedEdges)?;
        let mut metas: Vec<VertexMeta> = chunk
            .vertices
            .iter()
            .map(|v| classify(self.heights.height(*v)))
            .collect();

        let adjacency = self.local_adjacency(coord)?;
        let lakes = mark_lakes(&mut metas, &adjacency, self.config.lake_size);
        debug!("chunk {}: {} lakes", coord, lakes);

        self.store.get_or_create(coord).vertex_metas = metas;
        Ok(())
    }

    /// Neighbours of every vertex of `coord` that are owned by `coord` too
    fn local_adjacency(&self, coord: ChunkCoord) -> Result<Vec<Vec<usize>>> {
        let count = self.chunk_at(coord, ChunkStage::ConnectedEdges)?.vertices.len();
        (0..count)
            .map(|index| {
                let neighbors = self.vertex_neighbors(VertexId { chunk: coord, index })?;
                Ok(neighbors
                    .into_iter()
                    .filter(|(_, other)| other.chunk == coord)
                    .map(|(_, other)| other.index)
                    .collect())
            })
            .collect()
    }
}

fn classify(height: f64) -> VertexMeta {
    if height < SEA_LEVEL {
        VertexMeta {
            height,
            water: WaterType::Sea,
            moisture: 1.0,
        }
    } else {
        VertexMeta {
            height,
            water: WaterType::Land,
            moisture: 0.0,
        }
    }
}

/// Reclassify every connected sea component of at most `lake_size` vertices as lake
///
/// `adjacency[i]` lists the neighbours of vertex `i`. Components are found with
/// an explicit stack, so large oceans can't overflow the call stack. Returns
/// the number of lakes created.
pub fn mark_lakes(metas: &mut [VertexMeta], adjacency: &[Vec<usize>], lake_size: usize) -> usize {
    let mut visited = vec![false; metas.len()];
    let mut lakes = 0;

    for start in 0..metas.len() {
        if visited[start] || metas[start].water != WaterType::Sea {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start];
        visited[start] = true;
        while let Some(vertex) = stack.pop() {
            component.push(vertex);
            for &next in &adjacency[vertex] {
                if !visited[next] && metas[next].water == WaterType::Sea {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }

        if component.len() <= lake_size {
            for vertex in component {
                metas[vertex].water = WaterType::Lake;
            }
            lakes += 1;
        }
    }
    lakes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sea() -> VertexMeta {
        classify(0.1)
    }

    fn land() -> VertexMeta {
        classify(0.6)
    }

    /// Undirected adjacency from an edge list
    fn adjacency(count: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); count];
        for &(a, b) in edges {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        adjacency
    }

    #[test]
    fn test_classify() {
        assert_eq!(sea().water, WaterType::Sea);
        assert_eq!(sea().moisture, 1.0);
        assert_eq!(land().water, WaterType::Land);
        assert_eq!(land().moisture, 0.0);
        assert_eq!(classify(SEA_LEVEL).water, WaterType::Land);
    }

    #[test]
    fn test_ring_with_center_becomes_lake() {
        // Vertex 0 in the middle of a ring 1..=8, everything surrounded by land 9..
        let mut metas = vec![sea(); 9];
        metas.extend(vec![land(); 8]);
        let mut edges: Vec<(usize, usize)> = (1..=8).map(|i| (0, i)).collect();
        edges.extend((1..=8).map(|i| (i, i % 8 + 1)));
        edges.extend((1..=8).map(|i| (i, i + 8)));
        let adjacency = adjacency(metas.len(), &edges);

        assert_eq!(mark_lakes(&mut metas, &adjacency, 200), 1);
        for meta in &metas[..9] {
            assert_eq!(meta.water, WaterType::Lake);
            assert_eq!(meta.moisture, 1.0);
        }
        for meta in &metas[9..] {
            assert_eq!(meta.water, WaterType::Land);
        }
    }

    #[test]
    fn test_large_component_stays_sea() {
        let count = 201;
        let mut metas = vec![sea(); count];
        let edges: Vec<(usize, usize)> = (0..count - 1).map(|i| (i, i + 1)).collect();
        let adjacency = adjacency(count, &edges);

        assert_eq!(mark_lakes(&mut metas, &adjacency, 200), 0);
        assert!(metas.iter().all(|m| m.water == WaterType::Sea));
    }

    #[test]
    fn test_component_at_threshold_is_lake() {
        let count = 200;
        let mut metas = vec![sea(); count];
        let edges: Vec<(usize, usize)> = (0..count - 1).map(|i| (i, i + 1)).collect();
        let adjacency = adjacency(count, &edges);

        assert_eq!(mark_lakes(&mut metas, &adjacency, 200), 1);
        assert!(metas.iter().all(|m| m.water == WaterType::Lake));
    }

    #[test]
    fn test_separate_pools() {
        // Two sea pairs separated by land
        let mut metas = vec![sea(), sea(), land(), sea(), sea()];
        let adjacency = adjacency(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);

        assert_eq!(mark_lakes(&mut metas, &adjacency, 1), 0);
        assert_eq!(mark_lakes(&mut metas, &adjacency, 2), 2);
        assert_eq!(metas[0].water, WaterType::Lake);
        assert_eq!(metas[2].water, WaterType::Land);
        assert_eq!(metas[4].water, WaterType::Lake);
    }
}
