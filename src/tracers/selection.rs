//! Selection sort tracer.

use crate::error::VizResult;
use crate::trace::{Algorithm, Step, StepStream, TraceInput, Tracer};

use super::{array_step, SortCounters};

/// Selection sort: find the minimum of the unsorted suffix, swap it forward.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionSort;

impl Tracer for SelectionSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::SelectionSort
    }

    fn validate(&self, input: &TraceInput) -> VizResult<()> {
        input.expect_kind(self.algorithm())
    }

    fn trace(&self, input: &TraceInput) -> VizResult<StepStream> {
        match input {
            TraceInput::Values(values) => Ok(Box::new(SelectionSortTrace::new(values))),
            other => Err(other.kind_mismatch(self.algorithm())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Scan,
    NewMin,
    Swap,
    Done,
    Finished,
}

/// Lazy selection sort trace.
#[derive(Debug, Clone)]
pub struct SelectionSortTrace {
    values: Vec<i64>,
    /// Slot being filled.
    slot: usize,
    /// Running minimum index for the current pass.
    min: usize,
    /// Next index to compare against the minimum.
    scan: usize,
    counters: SortCounters,
    phase: Phase,
}

impl SelectionSortTrace {
    /// Start a trace over a copy of `values`.
    #[must_use]
    pub fn new(values: &[i64]) -> Self {
        Self {
            values: values.to_vec(),
            slot: 0,
            min: 0,
            scan: 1,
            counters: SortCounters::default(),
            phase: Phase::Start,
        }
    }

    fn next_pass(&mut self) {
        self.slot += 1;
        self.min = self.slot;
        self.scan = self.slot + 1;
        self.phase = Phase::Scan;
    }
}

impl Iterator for SelectionSortTrace {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let n = self.values.len();
        loop {
            match self.phase {
                Phase::Start => {
                    self.phase = Phase::Scan;
                    return Some(array_step(&self.values, vec![], "start", self.counters));
                }
                Phase::Scan => {
                    if self.slot >= n {
                        self.phase = Phase::Done;
                        continue;
                    }
                    if self.scan >= n {
                        if self.min == self.slot {
                            self.next_pass();
                        } else {
                            self.phase = Phase::Swap;
                        }
                        continue;
                    }

                    let (min, scan) = (self.min, self.scan);
                    self.counters.comparisons += 1;
                    if self.values[scan] < self.values[min] {
                        self.phase = Phase::NewMin;
                    } else {
                        self.scan += 1;
                    }
                    return Some(array_step(
                        &self.values,
                        vec![min, scan],
                        format!("compare {min} and {scan}"),
                        self.counters,
                    ));
                }
                Phase::NewMin => {
                    self.min = self.scan;
                    self.scan += 1;
                    self.phase = Phase::Scan;
                    return Some(array_step(
                        &self.values,
                        vec![self.min],
                        format!("new min {}", self.min),
                        self.counters,
                    ));
                }
                Phase::Swap => {
                    let (slot, min) = (self.slot, self.min);
                    self.values.swap(slot, min);
                    self.counters.swaps += 1;
                    self.next_pass();
                    return Some(array_step(
                        &self.values,
                        vec![slot, min],
                        format!("swapped {slot} & {min}"),
                        self.counters,
                    ));
                }
                Phase::Done => {
                    self.phase = Phase::Finished;
                    return Some(
                        array_step(&self.values, vec![], "done", self.counters).into_terminal(),
                    );
                }
                Phase::Finished => return None,
            }
        }
    }
}

impl std::iter::FusedIterator for SelectionSortTrace {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::metric;
    use crate::tracers::testing::{assert_protocol, sorted};
    use proptest::prelude::*;

    fn run(values: &[i64]) -> Vec<Step> {
        SelectionSortTrace::new(values).collect()
    }

    #[test]
    fn test_sorts_reference_input() {
        let steps = run(&[5, 2, 4, 1, 3]);
        assert_protocol(&steps);
        let last = steps.last().unwrap();
        assert_eq!(last.subject().as_array(), Some(&[1, 2, 3, 4, 5][..]));
        assert_eq!(last.metric(metric::COMPARISONS), 10);
    }

    #[test]
    fn test_new_min_and_swap_steps() {
        let steps = run(&[3, 1]);
        let labels: Vec<&str> = steps.iter().map(Step::label).collect();
        assert_eq!(
            labels,
            vec!["start", "compare 0 and 1", "new min 1", "swapped 0 & 1", "done"]
        );
        assert_eq!(steps[2].highlight().indices(), &[1]);
        assert_eq!(steps[3].highlight().indices(), &[0, 1]);
    }

    #[test]
    fn test_swap_only_when_minimum_moved() {
        let last = run(&[1, 2, 3]).pop().unwrap();
        assert_eq!(last.metric(metric::SWAPS), 0);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(run(&[]).len(), 2);
        assert_eq!(run(&[9]).len(), 2);
    }

    proptest! {
        #[test]
        fn prop_sorts_and_preserves_multiset(values in prop::collection::vec(-50i64..50, 0..30)) {
            let steps = run(&values);
            assert_protocol(&steps);
            let expected = sorted(&values);
            for step in &steps {
                prop_assert_eq!(sorted(step.subject().as_array().unwrap()), expected.clone());
            }
            prop_assert_eq!(steps.last().unwrap().subject().as_array().unwrap(), &expected[..]);
        }
    }
}
