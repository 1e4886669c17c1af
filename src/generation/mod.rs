//! Point placement and planar Voronoi construction
//!
//! Fillers place each chunk's seed points (optionally relaxed with Lloyd's
//! algorithm) and the diagram adapter turns any point set into a navigable
//! Voronoi diagram.

mod fillers;
mod lloyd;
mod voronoi;

pub use fillers::{
    chunk_rng, filler_for, Filler, GridFiller, HexFiller, JitteredHexFiller, RandomFiller,
    RelaxedRandomFiller,
};
pub use lloyd::{lloyd_relaxation, lloyd_relaxation_with_options, LloydOptions};
pub use voronoi::{Diagram, HalfEdge};
