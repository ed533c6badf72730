//! Step snapshots recorded during algorithm execution.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Named running totals carried on every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CounterKind {
    /// Element comparisons (sorts)
    Comparisons,
    /// Element swaps (sorts)
    Swaps,
    /// Enqueue plus dequeue operations (traversals)
    QueueOperations,
    /// Nodes marked visited (traversals)
    Visits,
}

/// Counter values as of one step.
///
/// Counters only ever grow during a run; a counter that was never bumped
/// reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Counters(BTreeMap<CounterKind, u64>);

impl Counters {
    /// Current value of a counter.
    pub fn get(&self, kind: CounterKind) -> u64 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    /// Iterate over counters that have been touched.
    pub fn iter(&self) -> impl Iterator<Item = (CounterKind, u64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// True if no counter here is lower than in `earlier`.
    pub fn dominates(&self, earlier: &Counters) -> bool {
        earlier.iter().all(|(kind, value)| self.get(kind) >= value)
    }

    pub(crate) fn track(&mut self, kind: CounterKind) {
        self.0.entry(kind).or_insert(0);
    }

    pub(crate) fn bump(&mut self, kind: CounterKind) {
        *self.0.entry(kind).or_insert(0) += 1;
    }
}

/// The conceptual operation that produced a step.
///
/// Only used to line steps up with displayed pseudocode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SourceMarker {
    /// Two elements are about to be compared
    Compare,
    /// Two elements were exchanged
    Swap,
    /// An outer pass settled one more position
    PassComplete,
    /// Traversal seeded with the start node
    Initialize,
    /// Loop condition: is the queue non-empty
    QueueCheck,
    /// Front of the queue removed
    Dequeue,
    /// Node marked visited
    Visit,
    /// Neighbors pushed onto the queue
    Enqueue,
    /// Run finished
    Complete,
}

/// Distance from the traversal start.
///
/// `Unreached` is an explicit sentinel; it never compares equal to a finite
/// distance and sorts after every finite one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Distance {
    Finite(u32),
    Unreached,
}

impl Distance {
    /// The finite value, if reached.
    pub fn finite(self) -> Option<u32> {
        match self {
            Distance::Finite(d) => Some(d),
            Distance::Unreached => None,
        }
    }

    pub fn is_reached(self) -> bool {
        matches!(self, Distance::Finite(_))
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(d) => write!(f, "{d}"),
            Distance::Unreached => f.write_str("∞"),
        }
    }
}

/// Traversal state captured alongside a graph step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphState {
    /// Queue contents, front first
    pub queue: Vec<usize>,
    /// Node most recently dequeued
    pub current: Option<usize>,
    /// Distance per node id
    pub distances: Vec<Distance>,
    /// Nodes in the order they were visited
    pub visit_order: Vec<usize>,
}

impl GraphState {
    pub(crate) fn new(node_count: usize) -> Self {
        Self {
            queue: Vec::new(),
            current: None,
            distances: vec![Distance::Unreached; node_count],
            visit_order: Vec::new(),
        }
    }
}

/// One immutable snapshot of algorithm state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    /// Array arrangement at capture time (empty for graph traces)
    pub sequence: Vec<i64>,
    /// Indices or node ids being compared/visited
    pub highlighted: BTreeSet<usize>,
    /// Indices or node ids that were just written
    pub mutated: BTreeSet<usize>,
    /// Indices or node ids whose position/status is settled
    pub finalized: BTreeSet<usize>,
    pub counters: Counters,
    pub marker: SourceMarker,
    /// Set on the last step of a trace only
    pub terminal: bool,
    /// Traversal state (graph traces only)
    pub graph: Option<GraphState>,
}

impl Step {
    /// Start a step produced by `marker`. Counters and the terminal flag are
    /// filled in by the recorder.
    pub(crate) fn at(marker: SourceMarker) -> Self {
        Self {
            sequence: Vec::new(),
            highlighted: BTreeSet::new(),
            mutated: BTreeSet::new(),
            finalized: BTreeSet::new(),
            counters: Counters::default(),
            marker,
            terminal: false,
            graph: None,
        }
    }

    pub(crate) fn sequence(mut self, values: &[i64]) -> Self {
        self.sequence = values.to_vec();
        self
    }

    pub(crate) fn highlight(mut self, ids: impl IntoIterator<Item = usize>) -> Self {
        self.highlighted.extend(ids);
        self
    }

    pub(crate) fn mutate(mut self, ids: impl IntoIterator<Item = usize>) -> Self {
        self.mutated.extend(ids);
        self
    }

    pub(crate) fn finalized(mut self, ids: &BTreeSet<usize>) -> Self {
        self.finalized = ids.clone();
        self
    }

    pub(crate) fn graph(mut self, state: &GraphState) -> Self {
        self.graph = Some(state.clone());
        self
    }

    /// Distance of `node` in this step, if this is a graph step.
    pub fn distance(&self, node: usize) -> Option<Distance> {
        self.graph.as_ref()?.distances.get(node).copied()
    }
}

/// Accumulates steps while a generator runs.
pub(crate) struct Recorder {
    steps: Vec<Step>,
    counters: Counters,
}

impl Recorder {
    pub(crate) fn new(tracked: &[CounterKind]) -> Self {
        let mut counters = Counters::default();
        for &kind in tracked {
            counters.track(kind);
        }
        Self {
            steps: Vec::new(),
            counters,
        }
    }

    pub(crate) fn bump(&mut self, kind: CounterKind) {
        self.counters.bump(kind);
    }

    pub(crate) fn push(&mut self, mut step: Step) {
        step.counters = self.counters.clone();
        self.steps.push(step);
    }

    /// Record the terminal step and hand back the sequence.
    pub(crate) fn finish(mut self, mut step: Step) -> Vec<Step> {
        step.counters = self.counters.clone();
        step.terminal = true;
        self.steps.push(step);
        self.steps
    }
}
