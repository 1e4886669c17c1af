//! Whole-pipeline properties: determinism, memoization and the reference scenario

mod common;

use std::cell::Cell;
use std::rc::Rc;

use voronoi_landmass::generation::JitteredHexFiller;
use voronoi_landmass::*;

use common::{block, config, init_logging};

#[test]
fn scenario_seed_1284() {
    init_logging();
    let mut world = VoronoiWorld::new(config(1284, 20));
    let chunk = world.build_chunk(ChunkCoord::new(0, 0)).unwrap();

    assert!(chunk.cell_count() > 0);
    assert_eq!(chunk.cell_metas().len(), chunk.cell_count());
    assert_eq!(chunk.vertex_metas().len(), chunk.vertices().len());
    assert_eq!(chunk.edge_metas().len(), chunk.edges().len());
    for meta in chunk.cell_metas() {
        assert!(matches!(
            meta.biome,
            Biome::Sea | Biome::Lake | Biome::Beach | Biome::Land
        ));
        assert!((0.0..=1.0).contains(&meta.average_moisture));
    }
}

#[test]
fn generation_is_deterministic() {
    init_logging();
    let coord = ChunkCoord::new(-1, 2);

    let mut first = VoronoiWorld::new(config(99, 40));
    let mut second = VoronoiWorld::new(config(99, 40));
    let a = first.build_chunk(coord).unwrap().clone();
    let b = second.build_chunk(coord).unwrap();

    assert_eq!(a.seed_points(), b.seed_points());
    assert_eq!(a.vertices(), b.vertices());
    assert_eq!(a.edges(), b.edges());
    assert_eq!(a.cell_edges(), b.cell_edges());
    assert_eq!(a.vertex_edges(), b.vertex_edges());
    assert_eq!(a.edge_metas(), b.edge_metas());

    for (x, y) in a.vertex_metas().iter().zip(b.vertex_metas()) {
        assert_eq!(x.height.to_bits(), y.height.to_bits());
        assert_eq!(x.moisture.to_bits(), y.moisture.to_bits());
        assert_eq!(x.water, y.water);
    }
    for (x, y) in a.cell_metas().iter().zip(b.cell_metas()) {
        assert_eq!(x.average_height.to_bits(), y.average_height.to_bits());
        assert_eq!(x.average_moisture.to_bits(), y.average_moisture.to_bits());
        assert_eq!(x.biome, y.biome);
    }
}

#[test]
fn different_seeds_differ() {
    init_logging();
    let coord = ChunkCoord::new(0, 0);
    let mut first = VoronoiWorld::new(config(1, 40));
    let mut second = VoronoiWorld::new(config(2, 40));
    first.ensure_points(coord).unwrap();
    second.ensure_points(coord).unwrap();

    assert_ne!(
        first.chunk(coord).unwrap().seed_points(),
        second.chunk(coord).unwrap().seed_points()
    );
}

struct CountingFiller {
    inner: JitteredHexFiller,
    calls: Rc<Cell<usize>>,
}

impl Filler for CountingFiller {
    fn fill(&self, chunk: ChunkCoord, chunk_size: u32, seed: u32) -> Result<Vec<DVec2>> {
        self.calls.set(self.calls.get() + 1);
        self.inner.fill(chunk, chunk_size, seed)
    }
}

struct CountingHeights {
    inner: NoiseHeightSampler,
    calls: Rc<Cell<usize>>,
}

impl HeightSampler for CountingHeights {
    fn height(&self, position: DVec2) -> f64 {
        self.calls.set(self.calls.get() + 1);
        self.inner.height(position)
    }
}

fn counting_world() -> (VoronoiWorld, Rc<Cell<usize>>, Rc<Cell<usize>>) {
    init_logging();
    let config = config(7, 40);
    let fills = Rc::new(Cell::new(0));
    let samples = Rc::new(Cell::new(0));
    let world = VoronoiWorld::with_parts(
        config,
        Box::new(CountingFiller {
            inner: JitteredHexFiller { spacing: 40 },
            calls: fills.clone(),
        }),
        Box::new(CountingHeights {
            inner: NoiseHeightSampler::new(config.terrain_seed),
            calls: samples.clone(),
        }),
    );
    (world, fills, samples)
}

#[test]
fn stages_run_once() {
    let (mut world, fills, samples) = counting_world();
    let origin = ChunkCoord::new(0, 0);
    world.ensure_biomes(origin).unwrap();

    let filled = world
        .store()
        .iter()
        .filter(|(_, c)| c.stage() >= ChunkStage::Points)
        .count();
    let sampled: usize = world
        .store()
        .iter()
        .filter(|(_, c)| c.stage() >= ChunkStage::VertexMeta)
        .map(|(_, c)| c.vertices().len())
        .sum();
    assert_eq!(fills.get(), filled);
    assert_eq!(samples.get(), sampled);

    // Every stage is already reached: nothing is recomputed
    for stage in ChunkStage::ALL {
        world.ensure(origin, stage).unwrap();
    }
    world.build_chunk(origin).unwrap();
    assert_eq!(fills.get(), filled);
    assert_eq!(samples.get(), sampled);
    assert_eq!(world.stage(origin), ChunkStage::Biomes);
}

#[test]
fn stages_never_regress() {
    let (mut world, _, _) = counting_world();
    let center = ChunkCoord::new(3, -2);

    let mut previous = vec![ChunkStage::Nothing; 9];
    for stage in ChunkStage::ALL {
        world.ensure(center, stage).unwrap();
        assert_eq!(world.stage(center), stage);

        for (coord, before) in block(center).into_iter().zip(previous.iter_mut()) {
            let now = world.stage(coord);
            assert!(now >= *before, "{} went from {:?} to {:?}", coord, before, now);
            *before = now;
        }
    }
}

#[test]
fn neighbours_are_pulled_to_the_previous_stage() {
    let (mut world, _, _) = counting_world();
    let center = ChunkCoord::new(0, 0);

    for (stage, pulled) in [
        (ChunkStage::Vertices, ChunkStage::Points),
        (ChunkStage::Edges, ChunkStage::Vertices),
        (ChunkStage::ConnectedEdges, ChunkStage::Edges),
    ] {
        world.ensure(center, stage).unwrap();
        for neighbor in center.neighbors() {
            assert!(world.stage(neighbor) >= pulled);
        }
    }

    world.ensure_moisture_neighbors(center).unwrap();
    for neighbor in center.neighbors() {
        assert!(world.stage(neighbor) >= ChunkStage::Moisture);
    }
}

#[test]
fn invalid_config_is_rejected() {
    assert!(matches!(
        WorldConfigBuilder::new().chunk_size(0),
        Err(LandmassError::InvalidConfig(_))
    ));
    assert!(WorldConfigBuilder::new()
        .filler(FillerKind::Grid { spacing: 0 })
        .build()
        .is_err());
}
