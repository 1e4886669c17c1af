//! Per-cell averages and biome classification

use log::debug;

use crate::chunk::{Biome, CellMeta, ChunkStage, VertexMeta, WaterType};
use crate::error::Result;
use crate::geometry::ChunkCoord;
use crate::world::VoronoiWorld;

impl VoronoiWorld {
    pub(in crate::world) fn build_biomes(&mut self, coord: ChunkCoord) -> Result<()> {
        let cell_count = self.chunk_at(coord, ChunkStage::MoistureNeighbors)?.cell_count();

        let mut metas = Vec::with_capacity(cell_count);
        let mut samples = Vec::new();
        for cell in 0..cell_count {
            samples.clear();
            for vertex in self.cell_vertices(coord, cell)? {
                self.ensure_moisture(vertex.chunk)?;
                samples.push(self.vertex_meta(vertex)?);
            }
            metas.push(aggregate_cell(&samples));
        }

        debug!(
            "chunk {}: {} cells, {} beach",
            coord,
            metas.len(),
            metas.iter().filter(|m| m.biome == Biome::Beach).count()
        );
        self.chunk_at_mut(coord, ChunkStage::MoistureNeighbors)?.cell_metas = metas;
        Ok(())
    }
}

/// Average the boundary vertices of a cell and pick its biome
///
/// All sea is [`Biome::Sea`], all lake is [`Biome::Lake`], more than one sea
/// vertex makes a [`Biome::Beach`] and anything else is [`Biome::Land`]. River
/// vertices count as land. A cell without vertices counts as all sea.
pub fn aggregate_cell(samples: &[VertexMeta]) -> CellMeta {
    let count = samples.len();
    let sea = samples.iter().filter(|m| m.water == WaterType::Sea).count();
    let lake = samples.iter().filter(|m| m.water == WaterType::Lake).count();

    let biome = if sea == count {
        Biome::Sea
    } else if lake == count {
        Biome::Lake
    } else if sea > 1 {
        Biome::Beach
    } else {
        Biome::Land
    };

    if count == 0 {
        return CellMeta {
            biome,
            ..Default::default()
        };
    }
    let n = count as f64;
    CellMeta {
        average_height: samples.iter().map(|m| m.height).sum::<f64>() / n,
        average_moisture: samples.iter().map(|m| m.moisture).sum::<f64>() / n,
        biome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertex(water: WaterType, height: f64) -> VertexMeta {
        let moisture = if water == WaterType::Land { 0.2 } else { 1.0 };
        VertexMeta {
            height,
            water,
            moisture,
        }
    }

    #[test]
    fn test_all_sea() {
        let samples = vec![vertex(WaterType::Sea, 0.1); 5];
        assert_eq!(aggregate_cell(&samples).biome, Biome::Sea);
    }

    #[test]
    fn test_all_lake() {
        let samples = vec![vertex(WaterType::Lake, 0.2); 6];
        assert_eq!(aggregate_cell(&samples).biome, Biome::Lake);
    }

    #[test]
    fn test_beach_needs_two_sea_vertices() {
        let mut samples = vec![vertex(WaterType::Land, 0.4); 4];
        samples.push(vertex(WaterType::Sea, 0.2));
        assert_eq!(aggregate_cell(&samples).biome, Biome::Land);

        samples.push(vertex(WaterType::Sea, 0.2));
        assert_eq!(aggregate_cell(&samples).biome, Biome::Beach);
    }

    #[test]
    fn test_rivers_count_as_land() {
        let samples = vec![
            vertex(WaterType::River, 0.5),
            vertex(WaterType::Lake, 0.3),
            vertex(WaterType::Lake, 0.3),
        ];
        assert_eq!(aggregate_cell(&samples).biome, Biome::Land);
    }

    #[test]
    fn test_averages() {
        let samples = vec![
            vertex(WaterType::Land, 0.4),
            vertex(WaterType::Land, 0.6),
            vertex(WaterType::River, 0.8),
            vertex(WaterType::Land, 1.0),
        ];
        let meta = aggregate_cell(&samples);
        assert_relative_eq!(meta.average_height, 0.7, epsilon = 1e-12);
        assert_relative_eq!(meta.average_moisture, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_cell() {
        let meta = aggregate_cell(&[]);
        assert_eq!(meta.biome, Biome::Sea);
        assert_eq!(meta.average_height, 0.0);
        assert_eq!(meta.average_moisture, 0.0);
    }
}
