//! Complete workflow demonstration: build one chunk to biomes

use std::collections::HashMap;

use voronoi_landmass::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== voronoi_landmass Chunk Demo ===\n");

    // Step 1: Configure world
    println!("Step 1: Configuring world...");
    let config = WorldConfigBuilder::new()
        .seed(1284)
        .chunk_size(400)?
        .filler(FillerKind::JitteredHex { spacing: 20 })
        .build()?;

    println!("  Seed: {}", config.seed);
    println!("  Chunk size: {}", config.chunk_size);
    println!("  Filler: {}", config.filler.name());

    // Step 2: Generate chunk
    println!("\nStep 2: Generating chunk (0, 0)...");
    let origin = ChunkCoord::new(0, 0);
    let mut world = VoronoiWorld::new(config);
    let chunk = world.build_chunk(origin)?;
    println!("  Cells: {}", chunk.cell_count());
    println!("  Vertices: {}", chunk.vertices().len());
    println!("  Edges: {}", chunk.edges().len());
    let rivers = chunk.edge_metas().iter().filter(|m| m.is_river).count();
    println!("  River edges: {}", rivers);

    // Step 3: Biome distribution
    println!("\nStep 3: Biome distribution:");
    let mut counts: HashMap<Biome, usize> = HashMap::new();
    for meta in chunk.cell_metas() {
        *counts.entry(meta.biome).or_insert(0) += 1;
    }
    let cells = chunk.cell_count().max(1);
    for biome in [Biome::Sea, Biome::Lake, Biome::Beach, Biome::Land] {
        let count = counts.get(&biome).copied().unwrap_or(0);
        let pct = (count as f64 / cells as f64) * 100.0;
        println!("  {:?}: {} ({:.1}%)", biome, count, pct);
    }

    // Step 4: Neighbourhood
    println!("\nStep 4: Chunks touched:");
    for stage in ChunkStage::ALL {
        let count = world.store().iter().filter(|(_, c)| c.stage() == stage).count();
        if count > 0 {
            println!("  {:?}: {}", stage, count);
        }
    }

    // Step 5: A sample polygon
    if let Some(cell) = (0..world.chunk(origin).map_or(0, |c| c.cell_count()))
        .find(|&cell| world.cell_polygon(origin, cell).map_or(false, |p| !p.is_empty()))
    {
        println!("\nStep 5: Cell {} polygon:", cell);
        for point in world.cell_polygon(origin, cell)? {
            println!("  ({:.2}, {:.2})", point.x, point.y);
        }
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
