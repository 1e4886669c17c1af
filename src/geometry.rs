//! Geometric primitives and chunk-relative references
//!
//! Points are plain `glam::DVec2` values. Everything that has to agree across
//! independently built chunk diagrams (equality, ordering, circumcenters) goes
//! through the helpers in this module.

use std::cmp::Ordering;
use std::fmt;

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance used when two diagrams reconstruct the "same" vertex
pub const EPSILON: f64 = 1e-9;

/// Epsilon equality on both axes
#[inline]
pub fn points_equal(a: DVec2, b: DVec2) -> bool {
    (a.x - b.x).abs() <= EPSILON && (a.y - b.y).abs() <= EPSILON
}

/// Total order on points: by `x`, then by `y`
#[inline]
pub fn lexicographic_cmp(a: DVec2, b: DVec2) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

/// The smaller of two points under [`lexicographic_cmp`]
///
/// This is the "deciding" endpoint of an edge: the edge belongs to the chunk
/// that owns this point.
#[inline]
pub fn lexicographic_min(a: DVec2, b: DVec2) -> DVec2 {
    if lexicographic_cmp(a, b) == Ordering::Greater {
        b
    } else {
        a
    }
}

/// Circumcenter of a triangle, independent of the order of its corners
///
/// The corners are sorted before evaluating the formula so that the same three
/// sites always produce a bit-identical result, whichever diagram they come from.
/// Returns `None` for collinear input.
pub fn circumcenter(a: DVec2, b: DVec2, c: DVec2) -> Option<DVec2> {
    let mut corners = [a, b, c];
    corners.sort_by(|p, q| lexicographic_cmp(*p, *q));
    let [a, b, c] = corners;

    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.perp_dot(ac);
    if d == 0.0 {
        return None;
    }

    let ab_sq = ab.length_squared();
    let ac_sq = ac.length_squared();
    let ux = (ac.y * ab_sq - ab.y * ac_sq) / d;
    let uy = (ab.x * ac_sq - ac.x * ab_sq) / d;
    Some(a + DVec2::new(ux, uy))
}

/// Integer grid coordinates of a chunk
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The chunk at `offset` from this one
    #[inline]
    pub fn offset(self, offset: ChunkOffset) -> ChunkCoord {
        let (dx, dy) = offset.delta();
        ChunkCoord::new(self.x + dx, self.y + dy)
    }

    /// The 8 Moore neighbours, in [`ChunkOffset::NEIGHBORS`] order
    pub fn neighbors(self) -> [ChunkCoord; 8] {
        ChunkOffset::NEIGHBORS.map(|offset| self.offset(offset))
    }

    /// Lower-left corner of the chunk square in world units
    #[inline]
    pub fn origin(self, chunk_size: u32) -> DVec2 {
        let size = chunk_size as f64;
        DVec2::new(self.x as f64 * size, self.y as f64 * size)
    }

    /// Half-open ownership test: `[x*size, (x+1)*size)` on both axes
    #[inline]
    pub fn contains(self, p: DVec2, chunk_size: u32) -> bool {
        let size = chunk_size as f64;
        let min = self.origin(chunk_size);
        p.x >= min.x && p.x < min.x + size && p.y >= min.y && p.y < min.y + size
    }

    /// Ownership test against the chunk square inflated by `margin * size` on every side
    #[inline]
    pub fn contains_padded(self, p: DVec2, chunk_size: u32, margin: f64) -> bool {
        let size = chunk_size as f64;
        let x = self.x as f64;
        let y = self.y as f64;
        p.x >= (x - margin) * size
            && p.x < (x + 1.0 + margin) * size
            && p.y >= (y - margin) * size
            && p.y < (y + 1.0 + margin) * size
    }

    /// Which of the 9 surrounding squares (self included) owns `p`
    ///
    /// Every candidate is tested, so a point sitting exactly on a corner is
    /// attributed to the diagonal neighbour the half-open rule assigns it to.
    pub fn locate(self, p: DVec2, chunk_size: u32) -> Option<ChunkOffset> {
        ChunkOffset::ALL
            .into_iter()
            .find(|offset| self.offset(*offset).contains(p, chunk_size))
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Position of a chunk relative to another: itself or one of its 8 neighbours
///
/// `y` grows towards the north.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChunkOffset {
    SouthWest,
    South,
    SouthEast,
    West,
    #[default]
    Center,
    East,
    NorthWest,
    North,
    NorthEast,
}

impl ChunkOffset {
    /// All 9 positions, row by row from the south-west corner
    pub const ALL: [ChunkOffset; 9] = [
        ChunkOffset::SouthWest,
        ChunkOffset::South,
        ChunkOffset::SouthEast,
        ChunkOffset::West,
        ChunkOffset::Center,
        ChunkOffset::East,
        ChunkOffset::NorthWest,
        ChunkOffset::North,
        ChunkOffset::NorthEast,
    ];

    /// The 8 neighbour positions (no `Center`)
    pub const NEIGHBORS: [ChunkOffset; 8] = [
        ChunkOffset::SouthWest,
        ChunkOffset::South,
        ChunkOffset::SouthEast,
        ChunkOffset::West,
        ChunkOffset::East,
        ChunkOffset::NorthWest,
        ChunkOffset::North,
        ChunkOffset::NorthEast,
    ];

    /// `(dx, dy)` in chunk units
    pub const fn delta(self) -> (i32, i32) {
        match self {
            ChunkOffset::SouthWest => (-1, -1),
            ChunkOffset::South => (0, -1),
            ChunkOffset::SouthEast => (1, -1),
            ChunkOffset::West => (-1, 0),
            ChunkOffset::Center => (0, 0),
            ChunkOffset::East => (1, 0),
            ChunkOffset::NorthWest => (-1, 1),
            ChunkOffset::North => (0, 1),
            ChunkOffset::NorthEast => (1, 1),
        }
    }

    #[inline]
    pub fn is_center(self) -> bool {
        self == ChunkOffset::Center
    }
}

/// Reference to a vertex owned by the chunk at `offset` from the referencing chunk
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexRef {
    pub offset: ChunkOffset,
    pub index: u32,
}

impl VertexRef {
    pub fn new(offset: ChunkOffset, index: usize) -> Self {
        Self {
            offset,
            index: index as u32,
        }
    }

    /// Absolute id, as seen from the chunk holding this reference
    #[inline]
    pub fn resolve(self, from: ChunkCoord) -> VertexId {
        VertexId {
            chunk: from.offset(self.offset),
            index: self.index as usize,
        }
    }
}

/// Reference to an edge owned by the chunk at `offset` from the referencing chunk
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRef {
    pub offset: ChunkOffset,
    pub index: u32,
}

impl EdgeRef {
    pub fn new(offset: ChunkOffset, index: usize) -> Self {
        Self {
            offset,
            index: index as u32,
        }
    }

    #[inline]
    pub fn resolve(self, from: ChunkCoord) -> EdgeId {
        EdgeId {
            chunk: from.offset(self.offset),
            index: self.index as usize,
        }
    }
}

/// A Voronoi edge between two vertices, possibly owned by different chunks
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub a: VertexRef,
    pub b: VertexRef,
}

/// World-wide vertex identity: owning chunk + local index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId {
    pub chunk: ChunkCoord,
    pub index: usize,
}

/// World-wide edge identity: owning chunk + local index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId {
    pub chunk: ChunkCoord,
    pub index: usize,
}
