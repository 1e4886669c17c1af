//! Spatial indexing for coordinate-to-vertex lookups
//!
//! Resolving a vertex by coordinates is the hot path of edge stitching. With the
//! `spatial-index` feature a KD-tree answers the query; without it a linear scan
//! does. Both apply the same epsilon equality.

#[cfg(feature = "spatial-index")]
use kiddo::immutable::float::kdtree::ImmutableKdTree;
#[cfg(feature = "spatial-index")]
use kiddo::SquaredEuclidean;

use glam::DVec2;

use crate::geometry::points_equal;

/// Coordinate lookup over one chunk's vertex list
///
/// The lookup doesn't own the vertices; callers pass the same slice it was
/// built from to `find`.
///
/// # Performance
///
/// - Construction: O(n log n)
/// - Query: O(log n) with the KD-tree, O(n) otherwise
#[derive(Clone, Default)]
pub struct VertexLookup {
    #[cfg(feature = "spatial-index")]
    tree: Option<ImmutableKdTree<f64, usize, 2, 32>>,
}

impl VertexLookup {
    /// Build a lookup over `vertices`
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_landmass::*;
    /// use glam::DVec2;
    ///
    /// let vertices = vec![DVec2::new(1.0, 2.0), DVec2::new(5.0, 5.0)];
    /// let lookup = VertexLookup::new(&vertices);
    ///
    /// assert_eq!(lookup.find(&vertices, DVec2::new(5.0, 5.0)), Some(1));
    /// assert_eq!(lookup.find(&vertices, DVec2::new(5.1, 5.0)), None);
    /// ```
    #[cfg(feature = "spatial-index")]
    pub fn new(vertices: &[DVec2]) -> Self {
        if vertices.is_empty() {
            return Self { tree: None };
        }
        let points: Vec<[f64; 2]> = vertices.iter().map(|v| [v.x, v.y]).collect();

        Self {
            tree: Some(ImmutableKdTree::new_from_slice(&points)),
        }
    }

    #[cfg(not(feature = "spatial-index"))]
    pub fn new(_vertices: &[DVec2]) -> Self {
        Self {}
    }

    /// Index of the vertex equal (within epsilon) to `position`
    ///
    /// Vertices closer than epsilon are merged when the diagram is built, so the
    /// nearest vertex is the only candidate.
    #[cfg(feature = "spatial-index")]
    pub fn find(&self, vertices: &[DVec2], position: DVec2) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        let nearest = tree.nearest_one::<SquaredEuclidean>(&[position.x, position.y]);
        let index = nearest.item as usize;
        vertices
            .get(index)
            .filter(|v| points_equal(**v, position))
            .map(|_| index)
    }

    #[cfg(not(feature = "spatial-index"))]
    pub fn find(&self, vertices: &[DVec2], position: DVec2) -> Option<usize> {
        vertices.iter().position(|v| points_equal(*v, position))
    }
}

impl std::fmt::Debug for VertexLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexLookup").finish_non_exhaustive()
    }
}
