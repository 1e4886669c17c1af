//! Lloyd's Relaxation for uniform point distribution
//!
//! Lloyd's Relaxation iteratively improves the uniformity of a point set by
//! moving each point to the centroid of its Voronoi cell.

use std::time::Instant;

use glam::DVec2;
use log::{debug, trace};

use super::voronoi::Diagram;
use crate::error::Result;

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LloydOptions {
    /// Maximum number of iterations to run
    pub max_iterations: usize,
    /// Convergence threshold - stop when max displacement < this value (relative to scale)
    /// Set to 0.0 to disable early termination
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            convergence_threshold: 0.001,
        }
    }
}

/// Apply Lloyd's Relaxation with a fixed number of iterations
///
/// # Arguments
///
/// * `points` - Initial point distribution
/// * `iterations` - Number of relaxation iterations
pub fn lloyd_relaxation(points: Vec<DVec2>, iterations: usize) -> Result<Vec<DVec2>> {
    let options = LloydOptions {
        max_iterations: iterations,
        convergence_threshold: 0.0,
    };
    lloyd_relaxation_with_options(points, 1.0, options)
}

/// Apply Lloyd's Relaxation with custom options
///
/// # Algorithm
///
/// For each iteration:
/// 1. Build the Voronoi diagram of the current points
/// 2. For each point: average the start points of its cell's boundary edges
///    (unbounded edges are cut one site-distance along their bisector)
/// 3. Move the point to that average
///
/// # Arguments
///
/// * `points` - Initial point distribution
/// * `scale` - Length the convergence threshold is relative to (usually the chunk size)
/// * `options` - Relaxation options (max iterations, convergence threshold)
///
/// # Returns
///
/// Relaxed points, in input order
pub fn lloyd_relaxation_with_options(
    mut points: Vec<DVec2>,
    scale: f64,
    options: LloydOptions,
) -> Result<Vec<DVec2>> {
    let convergence_threshold = options.convergence_threshold * scale;
    let total_start = Instant::now();

    debug!(
        "lloyd: {} points, max {} iterations, threshold {:.4} (abs: {:.4})",
        points.len(),
        options.max_iterations,
        options.convergence_threshold,
        convergence_threshold
    );

    let mut iterations_run = 0;
    let mut converged = false;

    for iteration in 0..options.max_iterations {
        let diagram = Diagram::build(points)?;
        let (new_points, max_displacement) = compute_new_points(&diagram);
        points = new_points;
        iterations_run = iteration + 1;

        trace!("lloyd: iteration {}, max displacement {:.4}", iteration + 1, max_displacement);

        if convergence_threshold > 0.0 && max_displacement < convergence_threshold {
            converged = true;
            break;
        }
    }

    debug!(
        "lloyd: finished {} iterations (of max {}), converged={}, total={:?}",
        iterations_run,
        options.max_iterations,
        converged,
        total_start.elapsed()
    );

    Ok(points)
}

/// Compute new point positions and track maximum displacement
fn compute_new_points(diagram: &Diagram) -> (Vec<DVec2>, f64) {
    let mut max_displacement: f64 = 0.0;

    let new_points = diagram
        .sites()
        .iter()
        .enumerate()
        .map(|(source, &old)| {
            let edges = diagram.cell_edges(source);
            if edges.is_empty() {
                return old;
            }

            let sum: DVec2 = edges
                .iter()
                .map(|&h| diagram.clipped_endpoints(h).0)
                .sum();
            let centroid = sum / edges.len() as f64;

            max_displacement = max_displacement.max(centroid.distance(old));
            centroid
        })
        .collect();

    (new_points, max_displacement)
}
