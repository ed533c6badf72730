//! Error types for algoviz-trace.

use thiserror::Error;

use crate::{Algorithm, InputKind};

/// Result type for trace generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur before a trace is generated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The raw input was rejected by the validator.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The algorithm cannot run on this kind of input.
    #[error("{algorithm} expects {expected} input, got {actual}")]
    InputMismatch {
        algorithm: Algorithm,
        expected: InputKind,
        actual: InputKind,
    },
}

/// Malformed input, reported before any generation work happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A token in a sequence could not be parsed as an integer.
    #[error("token {position} ({token:?}) is not a number")]
    NotANumber { position: usize, token: String },

    /// An empty token between separators, e.g. `"1,,2"`.
    #[error("token {position} is empty")]
    EmptyToken { position: usize },

    /// More elements than the animation supports.
    #[error("sequence has {len} elements, at most {max} are supported")]
    SequenceTooLong { len: usize, max: usize },

    /// Node count outside the supported range.
    #[error("node count {count} is outside [{min}, {max}]")]
    NodeCount { count: usize, min: usize, max: usize },

    /// An edge token that is not of the form `from-to`.
    #[error("edge {position} ({token:?}) is not of the form from-to")]
    MalformedEdge { position: usize, token: String },

    /// An edge endpoint outside `[0, node_count)`.
    #[error("edge {from}-{to} references node {node}, valid nodes are 0..{node_count}")]
    EndpointOutOfRange {
        from: usize,
        to: usize,
        node: usize,
        node_count: usize,
    },

    /// An edge from a node to itself.
    #[error("self-loop on node {node}")]
    SelfLoop { node: usize },

    /// Traversal start outside `[0, node_count)`.
    #[error("start node {start} is outside 0..{node_count}")]
    StartOutOfRange { start: usize, node_count: usize },
}

/// Raised when a traversal hits its dequeue bound.
///
/// This is not returned as an `Err`: the truncated trace is still handed back
/// and carries this value so callers can tell the run did not finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("generation stopped after {limit} dequeue iterations")]
pub struct GenerationLimitExceeded {
    pub limit: usize,
}
