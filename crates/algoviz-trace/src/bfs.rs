//! Breadth-first traversal generator.

use std::collections::{BTreeSet, VecDeque};

use crate::error::GenerationLimitExceeded;
use crate::input::Graph;
use crate::step::{CounterKind, Distance, GraphState, Recorder, SourceMarker, Step};

/// Record a breadth-first traversal of `graph` from its start node.
///
/// Stops early after `max_dequeues` dequeues; the returned steps still end in
/// a terminal step, and the limit is reported alongside them.
pub(crate) fn breadth_first(
    graph: &Graph,
    max_dequeues: usize,
) -> (Vec<Step>, Option<GenerationLimitExceeded>) {
    let n = graph.node_count();
    let start = graph.start();

    let mut state = GraphState::new(n);
    let mut queue = VecDeque::new();
    let mut visited = BTreeSet::new();
    let mut rec = Recorder::new(&[CounterKind::QueueOperations, CounterKind::Visits]);

    queue.push_back(start);
    state.distances[start] = Distance::Finite(0);
    state.queue = queue.iter().copied().collect();
    rec.bump(CounterKind::QueueOperations);
    rec.push(
        Step::at(SourceMarker::Initialize)
            .highlight([start])
            .graph(&state),
    );

    let mut dequeues = 0;
    let mut exceeded = None;

    while !queue.is_empty() {
        if dequeues >= max_dequeues {
            tracing::warn!(limit = max_dequeues, "traversal hit dequeue limit, truncating trace");
            exceeded = Some(GenerationLimitExceeded {
                limit: max_dequeues,
            });
            break;
        }

        rec.push(
            Step::at(SourceMarker::QueueCheck)
                .finalized(&visited)
                .graph(&state),
        );

        let Some(node) = queue.pop_front() else {
            break;
        };
        dequeues += 1;
        rec.bump(CounterKind::QueueOperations);
        state.current = Some(node);
        state.queue = queue.iter().copied().collect();
        rec.push(
            Step::at(SourceMarker::Dequeue)
                .highlight([node])
                .finalized(&visited)
                .graph(&state),
        );

        if !visited.insert(node) {
            continue;
        }
        rec.bump(CounterKind::Visits);
        state.visit_order.push(node);
        rec.push(
            Step::at(SourceMarker::Visit)
                .highlight([node])
                .finalized(&visited)
                .graph(&state),
        );

        // Every queued node was given a distance when it was enqueued.
        let Some(here) = state.distances[node].finite() else {
            continue;
        };

        let mut added = Vec::new();
        for next in graph.neighbors(node) {
            if visited.contains(&next) || queue.contains(&next) {
                continue;
            }
            if !state.distances[next].is_reached() {
                state.distances[next] = Distance::Finite(here + 1);
            }
            queue.push_back(next);
            rec.bump(CounterKind::QueueOperations);
            added.push(next);
        }

        state.queue = queue.iter().copied().collect();
        rec.push(
            Step::at(SourceMarker::Enqueue)
                .highlight([node])
                .mutate(added)
                .finalized(&visited)
                .graph(&state),
        );
    }

    let all: BTreeSet<usize> = (0..n).collect();
    let steps = rec.finish(
        Step::at(SourceMarker::Complete)
            .finalized(&all)
            .graph(&state),
    );
    (steps, exceeded)
}
