//! Algoviz Trace Generation
//!
//! Runs a sorting or graph traversal algorithm to completion and records every
//! intermediate state as an immutable [`Step`]. The resulting [`Trace`] is what
//! a player scrubs through; nothing here knows about timers or rendering.
//!
//! # Pipeline
//!
//! 1. Raw text is parsed and validated into an [`Input`]
//! 2. [`generate_trace`] runs the chosen [`Algorithm`] on a private copy
//! 3. Each step carries a value copy of the data, highlight sets, counters
//!    and a [`SourceMarker`] for pseudocode alignment
//!
//! # Guarantees
//!
//! - Generation is deterministic: the same input and algorithm give the same steps
//! - Counters never decrease from one step to the next
//! - Exactly the last step is terminal, and it finalizes the whole input domain
//! - Invalid input is rejected before any step is recorded
//!
//! # Usage
//!
//! ```
//! use algoviz_trace::{generate_trace, Algorithm, Input};
//!
//! let input = Input::parse_sequence("3,1,2").unwrap();
//! let trace = generate_trace(&input, Algorithm::BubbleSort).unwrap();
//! assert_eq!(trace.terminal().sequence, vec![1, 2, 3]);
//! ```

mod bfs;
mod error;
mod input;
mod sort;
mod step;
mod trace;

pub use error::{Error, GenerationLimitExceeded, Result, ValidationError};
pub use input::{parse_sequence, Edge, Graph, Input, InputKind, MAX_NODES, MAX_SEQUENCE_LEN, MIN_NODES};
pub use step::{CounterKind, Counters, Distance, GraphState, SourceMarker, Step};
pub use trace::{Algorithm, GenerationOptions, Trace, UnknownAlgorithm, DEFAULT_MAX_DEQUEUES};

/// Generate the trace of `algorithm` over `input` with default options.
pub fn generate_trace(input: &Input, algorithm: Algorithm) -> Result<Trace> {
    generate_trace_with(input, algorithm, &GenerationOptions::default())
}

/// Generate the trace of `algorithm` over `input`.
///
/// The caller's input is never modified. A traversal that hits
/// `options.max_dequeues` still returns `Ok`, with the trace flagged via
/// [`Trace::limit_exceeded`].
pub fn generate_trace_with(
    input: &Input,
    algorithm: Algorithm,
    options: &GenerationOptions,
) -> Result<Trace> {
    let trace = match (algorithm, input) {
        (Algorithm::BubbleSort, Input::Sequence { values }) => {
            Trace::new(algorithm, sort::bubble_sort(values), None)
        }
        (Algorithm::SelectionSort, Input::Sequence { values }) => {
            Trace::new(algorithm, sort::selection_sort(values), None)
        }
        (Algorithm::BreadthFirst, Input::Graph(graph)) => {
            let (steps, exceeded) = bfs::breadth_first(graph, options.max_dequeues);
            Trace::new(algorithm, steps, exceeded)
        }
        _ => {
            return Err(Error::InputMismatch {
                algorithm,
                expected: algorithm.input_kind(),
                actual: input.kind(),
            })
        }
    };

    tracing::debug!(
        %algorithm,
        domain = input.domain_size(),
        steps = trace.len(),
        truncated = trace.is_truncated(),
        "generated trace"
    );
    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn sorts_three_elements() {
        let input = Input::parse_sequence("3,1,2").unwrap();
        let trace = generate_trace(&input, Algorithm::BubbleSort).unwrap();

        let last = trace.terminal();
        assert_eq!(last.sequence, vec![1, 2, 3]);
        assert_eq!(last.finalized, BTreeSet::from([0, 1, 2]));
        assert!(last.counters.get(CounterKind::Swaps) >= 1);
        assert_eq!(trace.algorithm(), Algorithm::BubbleSort);
    }

    #[test]
    fn empty_array_gives_single_terminal_step() {
        let input = Input::parse_sequence("").unwrap();
        for algorithm in [Algorithm::BubbleSort, Algorithm::SelectionSort] {
            let trace = generate_trace(&input, algorithm).unwrap();
            assert_eq!(trace.len(), 1);
            assert!(trace.terminal().terminal);
            assert!(trace.terminal().finalized.is_empty());
        }
    }

    #[test]
    fn path_graph_terminal_distances() {
        let graph = Graph::parse(4, "0-1,1-2,2-3", false, 0).unwrap();
        let trace = generate_trace(&graph.into(), Algorithm::BreadthFirst).unwrap();

        let last = trace.terminal();
        for node in 0..4 {
            assert_eq!(last.distance(node), Some(Distance::Finite(node as u32)));
        }
        assert!(!trace.is_truncated());
    }

    #[test]
    fn mismatched_input_is_rejected() {
        let input = Input::parse_sequence("1,2").unwrap();
        let err = generate_trace(&input, Algorithm::BreadthFirst).unwrap_err();
        assert_eq!(
            err,
            Error::InputMismatch {
                algorithm: Algorithm::BreadthFirst,
                expected: InputKind::Graph,
                actual: InputKind::Sequence,
            }
        );

        let graph: Input = Graph::sample().unwrap().into();
        assert!(generate_trace(&graph, Algorithm::SelectionSort).is_err());
    }

    #[test]
    fn truncation_is_reported() {
        let graph: Input = Graph::parse(4, "0-1,1-2,2-3", false, 0).unwrap().into();
        let options = GenerationOptions { max_dequeues: 1 };
        let trace = generate_trace_with(&graph, Algorithm::BreadthFirst, &options).unwrap();

        assert!(trace.is_truncated());
        assert_eq!(trace.limit_exceeded().unwrap().limit, 1);
        assert!(trace.terminal().terminal);
    }

    #[test]
    fn caller_input_is_untouched() {
        let input = Input::sequence(vec![5, 4, 3]).unwrap();
        let before = input.clone();
        generate_trace(&input, Algorithm::BubbleSort).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn validation_error_converts() {
        let err: Error = parse_sequence("1,a").unwrap_err().into();
        assert!(matches!(err, Error::Validation(ValidationError::NotANumber { .. })));
        assert!(err.to_string().starts_with("invalid input"));
    }
}
