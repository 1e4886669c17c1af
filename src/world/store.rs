//! Coordinate-keyed chunk storage

use std::collections::HashMap;

use crate::chunk::Chunk;
use crate::geometry::ChunkCoord;

/// All chunks created so far, keyed by grid coordinates
///
/// Chunks are created empty on first access and never removed.
#[derive(Debug, Default)]
pub struct ChunkStore {
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The chunk at `coord`, created in stage `Nothing` if it doesn't exist yet
    pub fn get_or_create(&mut self, coord: ChunkCoord) -> &mut Chunk {
        self.chunks
            .entry(coord)
            .or_insert_with(|| Chunk::new(coord))
    }

    #[inline]
    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    /// Coordinates of the 8 neighbours of `coord`, creating any that are missing
    pub fn neighbors(&mut self, coord: ChunkCoord) -> [ChunkCoord; 8] {
        let neighbors = coord.neighbors();
        for neighbor in neighbors {
            self.get_or_create(neighbor);
        }
        neighbors
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &Chunk)> {
        self.chunks.iter()
    }
}
