//! Algorithms and the traces they produce.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::GenerationLimitExceeded;
use crate::input::InputKind;
use crate::step::{SourceMarker, Step};

/// Default bound on traversal dequeue iterations.
pub const DEFAULT_MAX_DEQUEUES: usize = 50;

/// Algorithms the generator can trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Algorithm {
    BubbleSort,
    SelectionSort,
    BreadthFirst,
}

impl Algorithm {
    /// Every supported algorithm.
    pub const ALL: [Algorithm; 3] = [
        Algorithm::BubbleSort,
        Algorithm::SelectionSort,
        Algorithm::BreadthFirst,
    ];

    /// Kind of input this algorithm consumes.
    pub fn input_kind(self) -> InputKind {
        match self {
            Algorithm::BubbleSort | Algorithm::SelectionSort => InputKind::Sequence,
            Algorithm::BreadthFirst => InputKind::Graph,
        }
    }

    /// Identifier used on the command line and over the wire.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::BubbleSort => "bubble_sort",
            Algorithm::SelectionSort => "selection_sort",
            Algorithm::BreadthFirst => "breadth_first",
        }
    }

    /// Pseudocode shown next to the animation.
    pub fn pseudocode(self) -> &'static [&'static str] {
        match self {
            Algorithm::BubbleSort => &[
                "for i in 0..n-1:",
                "  for j in 0..n-1-i:",
                "    if a[j] > a[j+1]:",
                "      swap(a[j], a[j+1])",
                "  mark a[n-1-i] sorted",
                "done",
            ],
            Algorithm::SelectionSort => &[
                "for i in 0..n-1:",
                "  min = i",
                "  for j in i+1..n:",
                "    if a[j] < a[min]: min = j",
                "  swap(a[i], a[min])",
                "  mark a[i] sorted",
                "done",
            ],
            Algorithm::BreadthFirst => &[
                "queue = [start]; dist[start] = 0",
                "while queue not empty:",
                "  node = queue.pop_front()",
                "  if node not visited: mark visited",
                "  for each unvisited, unqueued neighbor:",
                "    dist[n] = dist[node] + 1; queue.push(n)",
                "done",
            ],
        }
    }

    /// Pseudocode line (0-based) a marker corresponds to for this algorithm.
    pub fn line_of(self, marker: SourceMarker) -> Option<usize> {
        use SourceMarker::*;
        match (self, marker) {
            (Algorithm::BubbleSort, Compare) => Some(2),
            (Algorithm::BubbleSort, Swap) => Some(3),
            (Algorithm::BubbleSort, PassComplete) => Some(4),
            (Algorithm::BubbleSort, Complete) => Some(5),
            (Algorithm::SelectionSort, Compare) => Some(3),
            (Algorithm::SelectionSort, Swap) => Some(4),
            (Algorithm::SelectionSort, PassComplete) => Some(5),
            (Algorithm::SelectionSort, Complete) => Some(6),
            (Algorithm::BreadthFirst, Initialize) => Some(0),
            (Algorithm::BreadthFirst, QueueCheck) => Some(1),
            (Algorithm::BreadthFirst, Dequeue) => Some(2),
            (Algorithm::BreadthFirst, Visit) => Some(3),
            (Algorithm::BreadthFirst, Enqueue) => Some(5),
            (Algorithm::BreadthFirst, Complete) => Some(6),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An algorithm name that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown algorithm {0:?}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "bubble_sort" | "bubble" => Ok(Algorithm::BubbleSort),
            "selection_sort" | "selection" => Ok(Algorithm::SelectionSort),
            "breadth_first" | "bfs" => Ok(Algorithm::BreadthFirst),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Knobs for trace generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Traversal stops after this many dequeues and flags the trace.
    pub max_dequeues: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_dequeues: DEFAULT_MAX_DEQUEUES,
        }
    }
}

/// The full recorded run of one algorithm over one input.
///
/// Always holds at least one step, and the last step is the only terminal one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Trace {
    algorithm: Algorithm,
    steps: Vec<Step>,
    limit_exceeded: Option<GenerationLimitExceeded>,
}

impl Trace {
    pub(crate) fn new(
        algorithm: Algorithm,
        steps: Vec<Step>,
        limit_exceeded: Option<GenerationLimitExceeded>,
    ) -> Self {
        assert!(
            steps.last().is_some_and(|s| s.terminal),
            "trace must end in a terminal step"
        );
        Self {
            algorithm,
            steps,
            limit_exceeded,
        }
    }

    /// Algorithm that produced this trace.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// All steps in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps (never zero).
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Never true for a generated trace.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`.
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Index of the terminal step.
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// The terminal step.
    pub fn terminal(&self) -> &Step {
        &self.steps[self.last_index()]
    }

    /// Set when generation hit its safety bound and the trace is incomplete.
    pub fn limit_exceeded(&self) -> Option<&GenerationLimitExceeded> {
        self.limit_exceeded.as_ref()
    }

    pub fn is_truncated(&self) -> bool {
        self.limit_exceeded.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_names_round_trip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.name().parse::<Algorithm>().unwrap(), algorithm);
        }
        assert_eq!("BFS".parse::<Algorithm>().unwrap(), Algorithm::BreadthFirst);
        assert_eq!(
            "bubble-sort".parse::<Algorithm>().unwrap(),
            Algorithm::BubbleSort
        );
        assert!("quick".parse::<Algorithm>().is_err());
    }

    #[test]
    fn markers_map_to_pseudocode_lines() {
        for algorithm in Algorithm::ALL {
            let lines = algorithm.pseudocode().len();
            let line = algorithm.line_of(SourceMarker::Complete).unwrap();
            assert_eq!(line, lines - 1);
        }
        assert_eq!(Algorithm::BubbleSort.line_of(SourceMarker::Dequeue), None);
    }

    #[test]
    #[should_panic(expected = "terminal step")]
    fn trace_without_terminal_step_panics() {
        Trace::new(Algorithm::BubbleSort, Vec::new(), None);
    }
}
