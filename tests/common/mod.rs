#![allow(dead_code)]

use voronoi_landmass::*;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn config(seed: u32, spacing: u32) -> WorldConfig {
    WorldConfigBuilder::new()
        .seed(seed)
        .chunk_size(400)
        .unwrap()
        .filler(FillerKind::JitteredHex { spacing })
        .build()
        .unwrap()
}

/// The 3x3 block of chunks around `center`, center first
pub fn block(center: ChunkCoord) -> Vec<ChunkCoord> {
    let mut coords = vec![center];
    coords.extend(center.neighbors());
    coords
}

pub fn bits(p: DVec2) -> (u64, u64) {
    (p.x.to_bits(), p.y.to_bits())
}
