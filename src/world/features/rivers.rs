//! River tracing by steepest descent

use std::ops::Range;

use glam::DVec2;
use log::{debug, trace};

use crate::chunk::{ChunkStage, VertexMeta, WaterType};
use crate::error::Result;
use crate::geometry::{ChunkCoord, VertexId};
use crate::world::VoronoiWorld;

/// Heights (exclusive on both ends) a river can start at
pub const RIVER_SOURCE_BAND: Range<f64> = 0.8..0.9;

/// Sources closer than this on both axes to an earlier source are skipped
pub const RIVER_SOURCE_SPACING: f64 = 100.0;

impl VoronoiWorld {
    pub(in crate::world) fn build_rivers(&mut self, coord: ChunkCoord) -> Result<()> {
        let chunk = self.chunk_at(coord, ChunkStage::VertexMeta)?;
        let sources = select_river_sources(&chunk.vertices, &chunk.vertex_metas);

        let mut length = 0;
        for &index in &sources {
            length += self.run_river(VertexId { chunk: coord, index })?;
        }
        debug!(
            "chunk {}: {} rivers, {} edges",
            coord,
            sources.len(),
            length
        );
        Ok(())
    }

    /// Walk downhill from `source`, marking edges and vertices as river
    ///
    /// Each step moves to the strictly lowest neighbour. The walk stops at a
    /// local minimum, when it reaches water, or when the next edge is already a
    /// river (joining an earlier river). Returns the number of edges marked.
    pub fn run_river(&mut self, source: VertexId) -> Result<usize> {
        self.ensure_vertex_meta(source.chunk)?;

        let mut current = source;
        let mut marked = 0;
        loop {
            let mut best_height = self.vertex_meta(current)?.height;
            let mut best = None;
            for (edge, other) in self.vertex_neighbors(current)? {
                self.ensure_vertex_meta(other.chunk)?;
                let height = self.vertex_meta(other)?.height;
                if height < best_height {
                    best_height = height;
                    best = Some((edge, other));
                }
            }

            let Some((edge, next)) = best else {
                break;
            };
            if self.edge_meta(edge)?.is_river {
                break;
            }
            self.edge_meta_mut(edge)?.is_river = true;
            marked += 1;

            let next_is_land = self.vertex_meta(next)?.water == WaterType::Land;
            wet(self.vertex_meta_mut(current)?);
            wet(self.vertex_meta_mut(next)?);
            if !next_is_land {
                break;
            }
            current = next;
        }

        trace!("river from {:?}: {} edges", source, marked);
        Ok(marked)
    }
}

/// Land under a river becomes river water
fn wet(meta: &mut VertexMeta) {
    if meta.water == WaterType::Land {
        meta.water = WaterType::River;
        meta.moisture = 1.0;
    }
}

/// Indices of the vertices rivers start from
///
/// Candidates have a height strictly inside [`RIVER_SOURCE_BAND`]. A candidate
/// within [`RIVER_SOURCE_SPACING`] on both axes of an already selected source
/// is skipped.
pub fn select_river_sources(vertices: &[DVec2], metas: &[VertexMeta]) -> Vec<usize> {
    let mut selected: Vec<usize> = Vec::new();
    for (index, (position, meta)) in vertices.iter().zip(metas).enumerate() {
        if meta.height <= RIVER_SOURCE_BAND.start || meta.height >= RIVER_SOURCE_BAND.end {
            continue;
        }
        let crowded = selected.iter().any(|&other| {
            let other = vertices[other];
            (position.x - other.x).abs() <= RIVER_SOURCE_SPACING
                && (position.y - other.y).abs() <= RIVER_SOURCE_SPACING
        });
        if !crowded {
            selected.push(index);
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(height: f64) -> VertexMeta {
        VertexMeta {
            height,
            water: WaterType::Land,
            moisture: 0.0,
        }
    }

    #[test]
    fn test_source_band_is_open() {
        let vertices = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(500.0, 0.0),
            DVec2::new(1000.0, 0.0),
            DVec2::new(1500.0, 0.0),
        ];
        let metas = vec![meta(0.8), meta(0.85), meta(0.9), meta(0.81)];

        assert_eq!(select_river_sources(&vertices, &metas), vec![1, 3]);
    }

    #[test]
    fn test_sources_use_box_spacing() {
        let vertices = vec![
            DVec2::new(0.0, 0.0),
            // Inside the box (a circle of radius 100 would exclude it)
            DVec2::new(90.0, 90.0),
            DVec2::new(101.0, 0.0),
            DVec2::new(0.0, -100.0),
        ];
        let metas = vec![meta(0.85); 4];

        assert_eq!(select_river_sources(&vertices, &metas), vec![0, 2]);
    }

    #[test]
    fn test_wet() {
        let mut land = meta(0.5);
        wet(&mut land);
        assert_eq!(land.water, WaterType::River);
        assert_eq!(land.moisture, 1.0);

        let mut sea = VertexMeta {
            height: 0.1,
            water: WaterType::Sea,
            moisture: 1.0,
        };
        wet(&mut sea);
        assert_eq!(sea.water, WaterType::Sea);
    }
}
