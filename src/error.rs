//! Error types for chunked landmass generation

use thiserror::Error;

use crate::chunk::ChunkStage;
use crate::geometry::ChunkCoord;

/// Errors that can occur while configuring or generating chunks
///
/// Apart from `InvalidConfig`, every variant describes a geometric inconsistency
/// between independently built diagrams. Generation is a pure function of the
/// configuration, so retrying the same request reproduces the same failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandmassError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The triangulation backend rejected the input points
    #[error("triangulation failed: {0}")]
    Triangulation(String),

    /// A vertex expected in a chunk could not be found by coordinate search
    #[error("vertex ({x}, {y}) wasn't in chunk {chunk} during {stage:?}")]
    VertexNotFound {
        chunk: ChunkCoord,
        stage: ChunkStage,
        x: f64,
        y: f64,
    },

    /// An edge expected in a chunk could not be found by its endpoints
    #[error("edge {a:?} - {b:?} wasn't in chunk {chunk} during {stage:?}")]
    EdgeNotFound {
        chunk: ChunkCoord,
        stage: ChunkStage,
        a: (f64, f64),
        b: (f64, f64),
    },

    /// A point claimed to be near a chunk is not inside any of its 9 surrounding squares
    #[error("point ({x}, {y}) isn't in chunk {chunk} or any adjacent chunk")]
    NoAdjacentChunk { chunk: ChunkCoord, x: f64, y: f64 },

    /// A chunk-owned cell has an unbounded boundary (border margin too small)
    #[error("cell {cell} of chunk {chunk} is not closed")]
    OpenCell { chunk: ChunkCoord, cell: usize },

    /// A referenced chunk hasn't been built far enough to answer the query
    #[error("chunk {chunk} hasn't reached {stage:?}")]
    ChunkNotReady { chunk: ChunkCoord, stage: ChunkStage },

    /// A stored reference points past the end of its target list
    #[error("{what} index {index} out of range in chunk {chunk}")]
    IndexOutOfRange {
        chunk: ChunkCoord,
        what: &'static str,
        index: usize,
    },
}

/// Result type alias for landmass operations
pub type Result<T> = std::result::Result<T, LandmassError>;
