//! Planar Voronoi diagram built on top of spade's Delaunay triangulation
//!
//! The diagram is the dual of the triangulation: each inner Delaunay face is a
//! Voronoi vertex and each Delaunay edge is a pair of Voronoi half-edges.
//! Two details make diagrams of neighbouring chunks agree:
//!
//! - Vertex positions are computed from a canonical (sorted) site triple, so the
//!   same sites give bit-identical coordinates in every diagram.
//! - Co-circular sites (regular grids) produce several Delaunay faces with the
//!   same circumcenter. Those faces are merged into one Voronoi vertex and the
//!   zero-length edges between them are dropped, like a Fortune-style builder does.
//!
//! Every vertex and half-edge carries a `u32` tag, free for the caller to use as
//! scratch space while walking the diagram.

use std::collections::HashSet;

use glam::DVec2;
use log::{trace, warn};
use spade::{DelaunayTriangulation, Point2, Triangulation};

use crate::error::{LandmassError, Result};
use crate::geometry::{circumcenter, lexicographic_cmp, points_equal};

/// One direction of a Voronoi edge, running along the boundary of `cell`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Start vertex, `None` if the edge is unbounded on this side
    pub origin: Option<usize>,
    /// End vertex, `None` if the edge is unbounded on this side
    pub target: Option<usize>,
    /// Source index of the site whose cell this half-edge bounds
    pub cell: usize,
    /// The opposite half-edge, bounding the neighbouring cell
    pub twin: usize,
}

impl HalfEdge {
    /// Both endpoints exist
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.origin.is_some() && self.target.is_some()
    }
}

/// A Voronoi diagram over a list of 2D sites
#[derive(Debug, Clone)]
pub struct Diagram {
    sites: Vec<DVec2>,
    vertices: Vec<DVec2>,
    vertex_edges: Vec<Vec<usize>>,
    half_edges: Vec<HalfEdge>,
    cell_edges: Vec<Vec<usize>>,
    vertex_tags: Vec<u32>,
    edge_tags: Vec<u32>,
}

impl Diagram {
    /// Build the diagram of `sites`
    ///
    /// Cells are indexed by position in `sites`. Exact duplicates are dropped
    /// before triangulation; the first occurrence keeps the cell and later ones
    /// end up with an empty boundary.
    pub fn build(sites: Vec<DVec2>) -> Result<Self> {
        let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
        let mut seen = HashSet::with_capacity(sites.len());
        let mut site_of_vertex: Vec<usize> = Vec::with_capacity(sites.len());

        for (source, site) in sites.iter().enumerate() {
            if !seen.insert((site.x.to_bits(), site.y.to_bits())) {
                trace!("dropping duplicate site #{} at ({}, {})", source, site.x, site.y);
                continue;
            }
            let handle = triangulation
                .insert(Point2::new(site.x, site.y))
                .map_err(|e| {
                    LandmassError::Triangulation(format!(
                        "cannot insert site ({}, {}): {:?}",
                        site.x, site.y, e
                    ))
                })?;
            let index = handle.index();
            if site_of_vertex.len() <= index {
                site_of_vertex.resize(index + 1, usize::MAX);
            }
            site_of_vertex[index] = source;
        }

        // Circumcenter of every inner face
        let face_count = triangulation.num_all_faces();
        let mut face_centers: Vec<Option<DVec2>> = vec![None; face_count];
        for face in triangulation.inner_faces() {
            let [a, b, c] = face.vertices().map(|v| to_dvec(v.position()));
            let center = circumcenter(a, b, c).ok_or_else(|| {
                LandmassError::Triangulation(format!(
                    "degenerate triangle ({:?}, {:?}, {:?})",
                    a, b, c
                ))
            })?;
            face_centers[face.fix().index()] = Some(center);
        }

        // Faces sharing a circumcenter collapse into one Voronoi vertex
        let mut groups = DisjointSet::new(face_count);
        for edge in triangulation.directed_edges() {
            let left = edge.face().fix().index();
            let right = edge.rev().face().fix().index();
            if let (Some(l), Some(r)) = (face_centers[left], face_centers[right]) {
                if points_equal(l, r) {
                    groups.union(left, right);
                }
            }
        }

        let mut vertex_of_face: Vec<Option<usize>> = vec![None; face_count];
        let mut group_faces: Vec<Vec<usize>> = Vec::new();
        let mut vertex_of_root: Vec<Option<usize>> = vec![None; face_count];
        for face in triangulation.inner_faces() {
            let index = face.fix().index();
            let root = groups.find(index);
            let vertex = match vertex_of_root[root] {
                Some(vertex) => vertex,
                None => {
                    let vertex = group_faces.len();
                    group_faces.push(Vec::new());
                    vertex_of_root[root] = Some(vertex);
                    vertex
                }
            };
            group_faces[vertex].push(index);
            vertex_of_face[index] = Some(vertex);
        }

        let mut vertices = Vec::with_capacity(group_faces.len());
        for faces in &group_faces {
            let position = if faces.len() == 1 {
                face_centers[faces[0]]
            } else {
                let mut corners: Vec<DVec2> = triangulation
                    .inner_faces()
                    .filter(|face| faces.contains(&face.fix().index()))
                    .flat_map(|face| face.vertices().map(|v| to_dvec(v.position())))
                    .collect();
                corners.sort_by(|a, b| lexicographic_cmp(*a, *b));
                corners.dedup();
                if corners.len() >= 3 {
                    circumcenter(corners[0], corners[1], corners[2])
                } else {
                    face_centers[faces[0]]
                }
            };
            match position {
                Some(position) => vertices.push(position),
                None => {
                    return Err(LandmassError::Triangulation(
                        "merged vertex without a circumcenter".to_string(),
                    ))
                }
            }
        }

        // One half-edge per directed Delaunay edge, unless both sides collapsed into the same vertex
        let mut half_edge_of: Vec<Option<usize>> = vec![None; triangulation.num_directed_edges()];
        let mut half_edges: Vec<HalfEdge> = Vec::new();
        for edge in triangulation.directed_edges() {
            let origin = vertex_of_face[edge.rev().face().fix().index()];
            let target = vertex_of_face[edge.face().fix().index()];
            if origin.is_some() && origin == target {
                continue;
            }
            half_edge_of[edge.fix().index()] = Some(half_edges.len());
            half_edges.push(HalfEdge {
                origin,
                target,
                cell: site_of_vertex[edge.from().fix().index()],
                twin: usize::MAX,
            });
        }
        for edge in triangulation.directed_edges() {
            if let (Some(half_edge), Some(twin)) = (
                half_edge_of[edge.fix().index()],
                half_edge_of[edge.rev().fix().index()],
            ) {
                half_edges[half_edge].twin = twin;
            }
        }

        // Cell boundaries: counter-clockwise around each site
        let mut cell_edges: Vec<Vec<usize>> = vec![Vec::new(); sites.len()];
        for vertex in triangulation.vertices() {
            let source = site_of_vertex[vertex.fix().index()];
            let center = to_dvec(vertex.position());
            let mut around: Vec<(f64, usize)> = vertex
                .out_edges()
                .filter_map(|edge| {
                    let half_edge = half_edge_of[edge.fix().index()]?;
                    let to = to_dvec(edge.to().position()) - center;
                    Some((to.y.atan2(to.x), half_edge))
                })
                .collect();
            around.sort_by(|a, b| a.0.total_cmp(&b.0));
            cell_edges[source] = around.into_iter().map(|(_, half_edge)| half_edge).collect();
        }

        // Vertex rotation: outgoing half-edges, counter-clockwise by direction
        let mut around_vertex: Vec<Vec<(f64, usize)>> = vec![Vec::new(); vertices.len()];
        for edge in triangulation.directed_edges() {
            let Some(half_edge) = half_edge_of[edge.fix().index()] else {
                continue;
            };
            let Some(origin) = half_edges[half_edge].origin else {
                continue;
            };
            let direction =
                (to_dvec(edge.to().position()) - to_dvec(edge.from().position())).perp();
            around_vertex[origin].push((direction.y.atan2(direction.x), half_edge));
        }
        let vertex_edges: Vec<Vec<usize>> = around_vertex
            .into_iter()
            .map(|mut around| {
                around.sort_by(|a, b| a.0.total_cmp(&b.0));
                around.into_iter().map(|(_, half_edge)| half_edge).collect()
            })
            .collect();

        if vertices.is_empty() && sites.len() >= 3 {
            warn!("diagram of {} sites has no vertices (collinear input?)", sites.len());
        }

        let vertex_tags = vec![0; vertices.len()];
        let edge_tags = vec![0; half_edges.len()];
        Ok(Self {
            sites,
            vertices,
            vertex_edges,
            half_edges,
            cell_edges,
            vertex_tags,
            edge_tags,
        })
    }

    #[inline]
    pub fn sites(&self) -> &[DVec2] {
        &self.sites
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    #[inline]
    pub fn vertex(&self, vertex: usize) -> DVec2 {
        self.vertices[vertex]
    }

    /// Outgoing half-edges of a vertex in counter-clockwise order
    #[inline]
    pub fn vertex_edges(&self, vertex: usize) -> &[usize] {
        &self.vertex_edges[vertex]
    }

    /// Boundary half-edges of the cell of `source` in counter-clockwise order
    ///
    /// Consecutive half-edges share a vertex: the target of one is the origin
    /// of the next. Empty for dropped duplicate sites.
    #[inline]
    pub fn cell_edges(&self, source: usize) -> &[usize] {
        &self.cell_edges[source]
    }

    #[inline]
    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    #[inline]
    pub fn half_edge(&self, half_edge: usize) -> &HalfEdge {
        &self.half_edges[half_edge]
    }

    /// Endpoint coordinates of a finite half-edge
    pub fn endpoints(&self, half_edge: usize) -> Option<(DVec2, DVec2)> {
        let edge = &self.half_edges[half_edge];
        Some((self.vertices[edge.origin?], self.vertices[edge.target?]))
    }

    /// Endpoints of any half-edge, with unbounded ends replaced by a point one
    /// site-distance along the bisector
    pub fn clipped_endpoints(&self, half_edge: usize) -> (DVec2, DVec2) {
        let edge = &self.half_edges[half_edge];
        let p1 = self.sites[edge.cell];
        let p2 = self.sites[self.half_edges[edge.twin].cell];
        let origin = (p1 + p2) * 0.5;
        let direction = DVec2::new(p1.y - p2.y, p2.x - p1.x);

        let start = edge
            .origin
            .map(|v| self.vertices[v])
            .unwrap_or(origin - direction);
        let end = edge
            .target
            .map(|v| self.vertices[v])
            .unwrap_or(origin + direction);
        (start, end)
    }

    #[inline]
    pub fn vertex_tag(&self, vertex: usize) -> u32 {
        self.vertex_tags[vertex]
    }

    #[inline]
    pub fn set_vertex_tag(&mut self, vertex: usize, tag: u32) {
        self.vertex_tags[vertex] = tag;
    }

    #[inline]
    pub fn edge_tag(&self, half_edge: usize) -> u32 {
        self.edge_tags[half_edge]
    }

    /// Tag a half-edge and its twin
    pub fn set_edge_tag(&mut self, half_edge: usize, tag: u32) {
        let twin = self.half_edges[half_edge].twin;
        self.edge_tags[half_edge] = tag;
        if twin != usize::MAX {
            self.edge_tags[twin] = tag;
        }
    }
}

#[inline]
fn to_dvec(p: Point2<f64>) -> DVec2 {
    DVec2::new(p.x, p.y)
}

/// Union-find over face indices
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// The smaller root wins so the result doesn't depend on edge order
    fn union(&mut self, a: usize, b: usize) {
        let a = self.find(a);
        let b = self.find(b);
        if a < b {
            self.parent[b] = a;
        } else if b < a {
            self.parent[a] = b;
        }
    }
}
