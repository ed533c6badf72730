//! Input parsing and validation.
//!
//! Everything the generators consume passes through here first. Raw text is
//! parsed into an [`Input`] and rejected with a [`ValidationError`] before any
//! step is recorded, so a trace is never produced from half-valid input.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::ValidationError;

/// Longest sequence the sort generators accept.
pub const MAX_SEQUENCE_LEN: usize = 64;

/// Smallest graph accepted.
pub const MIN_NODES: usize = 1;

/// Largest graph accepted.
pub const MAX_NODES: usize = 20;

/// The two shapes of input an algorithm can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InputKind {
    /// A list of integers
    Sequence,
    /// A node/edge list
    Graph,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Sequence => f.write_str("sequence"),
            InputKind::Graph => f.write_str("graph"),
        }
    }
}

/// Validated algorithm input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Input {
    /// Values to sort
    Sequence { values: Vec<i64> },
    /// Graph to traverse
    Graph(Graph),
}

impl Input {
    /// Parse comma-separated integers into a sequence input.
    pub fn parse_sequence(text: &str) -> Result<Self, ValidationError> {
        parse_sequence(text).map(|values| Input::Sequence { values })
    }

    /// Wrap already-parsed values, applying the same length bound as parsing.
    pub fn sequence(values: Vec<i64>) -> Result<Self, ValidationError> {
        check_sequence_len(values.len())?;
        Ok(Input::Sequence { values })
    }

    /// Which shape this input has.
    pub fn kind(&self) -> InputKind {
        match self {
            Input::Sequence { .. } => InputKind::Sequence,
            Input::Graph(_) => InputKind::Graph,
        }
    }

    /// Number of elements (sequence) or nodes (graph).
    pub fn domain_size(&self) -> usize {
        match self {
            Input::Sequence { values } => values.len(),
            Input::Graph(graph) => graph.node_count(),
        }
    }
}

impl From<Graph> for Input {
    fn from(graph: Graph) -> Self {
        Input::Graph(graph)
    }
}

/// Parse comma-separated integers.
///
/// Whitespace around tokens is ignored. A blank string is an empty sequence;
/// an empty token between commas is an error.
pub fn parse_sequence(text: &str) -> Result<Vec<i64>, ValidationError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let values = text
        .split(',')
        .enumerate()
        .map(|(position, raw)| {
            let token = raw.trim();
            if token.is_empty() {
                return Err(ValidationError::EmptyToken { position });
            }
            token.parse::<i64>().map_err(|_| ValidationError::NotANumber {
                position,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    check_sequence_len(values.len())?;
    Ok(values)
}

fn check_sequence_len(len: usize) -> Result<(), ValidationError> {
    if len > MAX_SEQUENCE_LEN {
        return Err(ValidationError::SequenceTooLong {
            len,
            max: MAX_SEQUENCE_LEN,
        });
    }
    Ok(())
}

/// A single edge as given by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Edge {
    pub from: usize,
    pub to: usize,
}

/// A validated graph with a traversal start node.
///
/// Adjacency is kept in ordered sets so neighbor iteration, and therefore
/// every trace built from the graph, is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Graph {
    node_count: usize,
    directed: bool,
    start: usize,
    edges: Vec<Edge>,
    #[cfg_attr(feature = "serde", serde(skip))]
    adjacency: Vec<BTreeSet<usize>>,
}

impl Graph {
    /// Build a graph from explicit edge pairs.
    ///
    /// Duplicate edges collapse into one. In an undirected graph `a-b` and
    /// `b-a` are the same edge.
    pub fn new(
        node_count: usize,
        edges: &[(usize, usize)],
        directed: bool,
        start: usize,
    ) -> Result<Self, ValidationError> {
        if !(MIN_NODES..=MAX_NODES).contains(&node_count) {
            return Err(ValidationError::NodeCount {
                count: node_count,
                min: MIN_NODES,
                max: MAX_NODES,
            });
        }
        if start >= node_count {
            return Err(ValidationError::StartOutOfRange { start, node_count });
        }

        let mut adjacency = vec![BTreeSet::new(); node_count];
        let mut kept = Vec::with_capacity(edges.len());

        for &(from, to) in edges {
            for node in [from, to] {
                if node >= node_count {
                    return Err(ValidationError::EndpointOutOfRange {
                        from,
                        to,
                        node,
                        node_count,
                    });
                }
            }
            if from == to {
                return Err(ValidationError::SelfLoop { node: from });
            }

            let fresh = adjacency[from].insert(to);
            if !directed {
                adjacency[to].insert(from);
            }
            if fresh {
                kept.push(Edge { from, to });
            }
        }

        Ok(Self {
            node_count,
            directed,
            start,
            edges: kept,
            adjacency,
        })
    }

    /// Parse comma-separated `from-to` pairs, e.g. `"0-1, 1-2"`.
    pub fn parse(
        node_count: usize,
        edges: &str,
        directed: bool,
        start: usize,
    ) -> Result<Self, ValidationError> {
        let pairs = parse_edges(edges)?;
        Self::new(node_count, &pairs, directed, start)
    }

    /// The built-in demo graph: two branches from node 0 meeting again at 5,
    /// plus an isolated node 6.
    ///
    /// Goes through the same validation as caller-supplied graphs.
    pub fn sample() -> Result<Self, ValidationError> {
        Self::new(
            7,
            &[(0, 1), (0, 2), (1, 3), (2, 4), (3, 5), (4, 5)],
            false,
            0,
        )
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Whether edges are one-way.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Traversal start node.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Edges as given (deduplicated).
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Outgoing neighbors of `node` in ascending order.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[node].iter().copied()
    }
}

fn parse_edges(text: &str) -> Result<Vec<(usize, usize)>, ValidationError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    text.split(',')
        .enumerate()
        .map(|(position, raw)| {
            let token = raw.trim();
            let malformed = || ValidationError::MalformedEdge {
                position,
                token: token.to_string(),
            };
            let (from, to) = token.split_once('-').ok_or_else(malformed)?;
            let from = from.trim().parse::<usize>().map_err(|_| malformed())?;
            let to = to.trim().parse::<usize>().map_err(|_| malformed())?;
            Ok((from, to))
        })
        .collect()
}
