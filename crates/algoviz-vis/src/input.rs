//! Raw input descriptions as they arrive from the command line or the API.

use algoviz_trace::{Algorithm, Graph, Input, InputKind, ValidationError};
use serde::{Deserialize, Serialize};

/// Unparsed input, turned into a validated [`Input`] by [`InputSpec::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputSpec {
    /// Comma-separated integers
    Sequence { values: String },
    /// Node count plus comma-separated `from-to` pairs
    Graph {
        node_count: usize,
        #[serde(default)]
        edges: String,
        #[serde(default)]
        directed: bool,
        #[serde(default)]
        start: usize,
    },
    /// The built-in demo graph
    SampleGraph,
}

impl InputSpec {
    /// Kind of input this spec describes.
    pub fn kind(&self) -> InputKind {
        match self {
            InputSpec::Sequence { .. } => InputKind::Sequence,
            InputSpec::Graph { .. } | InputSpec::SampleGraph => InputKind::Graph,
        }
    }

    /// Parse and validate.
    pub fn build(&self) -> Result<Input, ValidationError> {
        match self {
            InputSpec::Sequence { values } => Input::parse_sequence(values),
            InputSpec::Graph {
                node_count,
                edges,
                directed,
                start,
            } => Graph::parse(*node_count, edges, *directed, *start).map(Input::from),
            InputSpec::SampleGraph => Graph::sample().map(Input::from),
        }
    }
}

/// Algorithm to pair with an input when the caller didn't name one.
///
/// Keeps `current` when it fits the input, otherwise picks the first
/// algorithm for that kind of input.
pub fn algorithm_for(kind: InputKind, current: Algorithm) -> Algorithm {
    if current.input_kind() == kind {
        return current;
    }
    Algorithm::ALL
        .into_iter()
        .find(|a| a.input_kind() == kind)
        .unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_spec_builds() {
        let spec = InputSpec::Sequence {
            values: "4, 2".into(),
        };
        assert_eq!(spec.build().unwrap(), Input::Sequence { values: vec![4, 2] });
    }

    #[test]
    fn graph_spec_validates() {
        let spec = InputSpec::Graph {
            node_count: 3,
            edges: "0-0".into(),
            directed: false,
            start: 0,
        };
        assert_eq!(spec.build().unwrap_err(), ValidationError::SelfLoop { node: 0 });
    }

    #[test]
    fn spec_deserializes_with_defaults() {
        let spec: InputSpec =
            serde_json::from_str(r#"{"kind":"graph","node_count":2,"edges":"0-1"}"#).unwrap();
        let input = spec.build().unwrap();
        assert_eq!(input.kind(), InputKind::Graph);

        let spec: InputSpec = serde_json::from_str(r#"{"kind":"sample_graph"}"#).unwrap();
        assert_eq!(spec.kind(), InputKind::Graph);
    }

    #[test]
    fn picks_algorithm_for_kind() {
        assert_eq!(
            algorithm_for(InputKind::Sequence, Algorithm::SelectionSort),
            Algorithm::SelectionSort
        );
        assert_eq!(
            algorithm_for(InputKind::Graph, Algorithm::SelectionSort),
            Algorithm::BreadthFirst
        );
        assert_eq!(
            algorithm_for(InputKind::Sequence, Algorithm::BreadthFirst),
            Algorithm::BubbleSort
        );
    }
}
