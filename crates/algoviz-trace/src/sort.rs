//! Comparison sort generators.
//!
//! Both sorts work on a private copy of the caller's values and record a
//! step before every comparison, after every swap, and after every outer
//! pass. The terminal step always finalizes the whole range.

use std::collections::BTreeSet;

use crate::step::{CounterKind, Recorder, SourceMarker, Step};

const SORT_COUNTERS: [CounterKind; 2] = [CounterKind::Comparisons, CounterKind::Swaps];

/// Record a bubble sort over `values`.
pub(crate) fn bubble_sort(values: &[i64]) -> Vec<Step> {
    let mut work = values.to_vec();
    let n = work.len();
    let mut done = BTreeSet::new();
    let mut rec = Recorder::new(&SORT_COUNTERS);

    for i in 0..n.saturating_sub(1) {
        for j in 0..n - 1 - i {
            rec.bump(CounterKind::Comparisons);
            rec.push(
                Step::at(SourceMarker::Compare)
                    .sequence(&work)
                    .highlight([j, j + 1])
                    .finalized(&done),
            );

            if work[j] > work[j + 1] {
                work.swap(j, j + 1);
                rec.bump(CounterKind::Swaps);
                rec.push(
                    Step::at(SourceMarker::Swap)
                        .sequence(&work)
                        .mutate([j, j + 1])
                        .finalized(&done),
                );
            }
        }

        done.insert(n - 1 - i);
        rec.push(
            Step::at(SourceMarker::PassComplete)
                .sequence(&work)
                .finalized(&done),
        );
    }

    let all: BTreeSet<usize> = (0..n).collect();
    rec.finish(Step::at(SourceMarker::Complete).sequence(&work).finalized(&all))
}

/// Record a selection sort over `values`.
pub(crate) fn selection_sort(values: &[i64]) -> Vec<Step> {
    let mut work = values.to_vec();
    let n = work.len();
    let mut done = BTreeSet::new();
    let mut rec = Recorder::new(&SORT_COUNTERS);

    for i in 0..n.saturating_sub(1) {
        let mut min = i;
        for j in i + 1..n {
            rec.bump(CounterKind::Comparisons);
            rec.push(
                Step::at(SourceMarker::Compare)
                    .sequence(&work)
                    .highlight([min, j])
                    .finalized(&done),
            );
            if work[j] < work[min] {
                min = j;
            }
        }

        if min != i {
            work.swap(i, min);
            rec.bump(CounterKind::Swaps);
            rec.push(
                Step::at(SourceMarker::Swap)
                    .sequence(&work)
                    .mutate([i, min])
                    .finalized(&done),
            );
        }

        done.insert(i);
        rec.push(
            Step::at(SourceMarker::PassComplete)
                .sequence(&work)
                .finalized(&done),
        );
    }

    let all: BTreeSet<usize> = (0..n).collect();
    rec.finish(Step::at(SourceMarker::Complete).sequence(&work).finalized(&all))
}
