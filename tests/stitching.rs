//! Chunks agree on every vertex and edge along their borders

mod common;

use std::collections::HashSet;

use voronoi_landmass::geometry::lexicographic_min;
use voronoi_landmass::*;

use common::{bits, block, config, init_logging};

fn connected_block(seed: u32) -> VoronoiWorld {
    init_logging();
    let mut world = VoronoiWorld::new(config(seed, 40));
    for coord in block(ChunkCoord::new(0, 0)) {
        world.ensure_connected_edges(coord).unwrap();
    }
    world
}

#[test]
fn vertices_are_partitioned_between_chunks() {
    let world = connected_block(11);

    let mut seen = HashSet::new();
    for coord in block(ChunkCoord::new(0, 0)) {
        let chunk = world.chunk(coord).unwrap();
        assert!(!chunk.vertices().is_empty());
        for v in chunk.vertices() {
            assert!(coord.contains(*v, 400), "{:?} outside {}", v, coord);
            assert!(seen.insert(bits(*v)), "{:?} owned twice", v);
        }
    }
}

#[test]
fn edges_are_partitioned_between_chunks() {
    let world = connected_block(12);

    let mut seen = HashSet::new();
    for coord in block(ChunkCoord::new(0, 0)) {
        let chunk = world.chunk(coord).unwrap();
        for index in 0..chunk.edges().len() {
            let (a, b) = world.edge_positions(EdgeId { chunk: coord, index }).unwrap();
            assert!(coord.contains(lexicographic_min(a, b), 400));

            let key = if bits(a) < bits(b) {
                (bits(a), bits(b))
            } else {
                (bits(b), bits(a))
            };
            assert!(seen.insert(key), "edge {:?}-{:?} owned twice", a, b);
        }
    }
}

#[test]
fn border_vertices_resolve_to_their_owner() {
    let world = connected_block(16);
    let center = ChunkCoord::new(0, 0);

    let chunk = world.chunk(center).unwrap();
    let mut foreign = 0;
    for edge in chunk.edges() {
        for end in [edge.a, edge.b] {
            let id = end.resolve(center);
            let position = world.vertex_position(id).unwrap();
            let owner = world.chunk(id.chunk).unwrap();

            assert!(id.chunk.contains(position, 400));
            assert_eq!(owner.find_vertex(position), Some(id.index));
            if id.chunk != center {
                foreign += 1;
                assert!(chunk.find_vertex(position).is_none());
            }
        }
    }
    assert!(foreign > 0);
}

#[test]
fn adjacency_is_symmetric_across_borders() {
    let world = connected_block(13);
    let center = ChunkCoord::new(0, 0);

    let chunk = world.chunk(center).unwrap();
    let mut crossings = 0;
    for index in 0..chunk.vertices().len() {
        let vertex = VertexId { chunk: center, index };
        for (edge, other) in world.vertex_neighbors(vertex).unwrap() {
            if other.chunk != center {
                crossings += 1;
            }
            let back = world.vertex_neighbors(other).unwrap();
            assert!(
                back.iter().any(|(e, v)| *e == edge && *v == vertex),
                "{:?} doesn't lead back to {:?}",
                other,
                vertex
            );
        }
    }
    assert!(crossings > 0);
}

#[test]
fn cell_polygons_are_closed_and_counter_clockwise() {
    let world = connected_block(14);
    let center = ChunkCoord::new(0, 0);

    let chunk = world.chunk(center).unwrap();
    for cell in 0..chunk.cell_count() {
        let polygon = world.cell_vertices(center, cell).unwrap();
        assert!(polygon.len() >= 3, "cell {} has {} vertices", cell, polygon.len());

        // Consecutive polygon vertices are joined by an edge
        for (k, vertex) in polygon.iter().enumerate() {
            let next = polygon[(k + 1) % polygon.len()];
            let neighbors = world.vertex_neighbors(*vertex).unwrap();
            assert!(neighbors.iter().any(|(_, v)| *v == next));
        }

        let points = world.cell_polygon(center, cell).unwrap();
        let mut area = 0.0;
        for (k, p) in points.iter().enumerate() {
            let q = points[(k + 1) % points.len()];
            area += p.perp_dot(q);
        }
        assert!(area > 0.0, "cell {} winds clockwise", cell);

        // The site lies left of every boundary edge
        let site = chunk.seed_points()[cell];
        for (k, p) in points.iter().enumerate() {
            let q = points[(k + 1) % points.len()];
            assert!((q - *p).perp_dot(site - *p) > 0.0);
        }
    }
}

#[test]
fn build_order_does_not_matter() {
    init_logging();
    let target = ChunkCoord::new(1, 1);

    let mut direct = VoronoiWorld::new(config(15, 40));
    direct.ensure_connected_edges(target).unwrap();

    let mut detour = VoronoiWorld::new(config(15, 40));
    detour.ensure_connected_edges(ChunkCoord::new(2, 2)).unwrap();
    detour.ensure_connected_edges(ChunkCoord::new(0, 1)).unwrap();
    detour.ensure_connected_edges(target).unwrap();

    let a = direct.chunk(target).unwrap();
    let b = detour.chunk(target).unwrap();
    assert_eq!(a.vertices(), b.vertices());
    assert_eq!(a.edges(), b.edges());
    assert_eq!(a.cell_edges(), b.cell_edges());
    assert_eq!(a.vertex_edges(), b.vertex_edges());
}
