//! Bubble sort tracer.

use crate::error::VizResult;
use crate::trace::{Algorithm, Step, StepStream, TraceInput, Tracer};

use super::{array_step, SortCounters};

/// Bubble sort: repeated passes of adjacent compare and swap.
#[derive(Debug, Clone, Copy, Default)]
pub struct BubbleSort;

impl Tracer for BubbleSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::BubbleSort
    }

    fn validate(&self, input: &TraceInput) -> VizResult<()> {
        input.expect_kind(self.algorithm())
    }

    fn trace(&self, input: &TraceInput) -> VizResult<StepStream> {
        match input {
            TraceInput::Values(values) => Ok(Box::new(BubbleSortTrace::new(values))),
            other => Err(other.kind_mismatch(self.algorithm())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Compare,
    Swap,
    Done,
    Finished,
}

/// Lazy bubble sort trace.
#[derive(Debug, Clone)]
pub struct BubbleSortTrace {
    values: Vec<i64>,
    pass: usize,
    j: usize,
    counters: SortCounters,
    phase: Phase,
}

impl BubbleSortTrace {
    /// Start a trace over a copy of `values`.
    #[must_use]
    pub fn new(values: &[i64]) -> Self {
        Self {
            values: values.to_vec(),
            pass: 0,
            j: 0,
            counters: SortCounters::default(),
            phase: Phase::Start,
        }
    }
}

impl Iterator for BubbleSortTrace {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let n = self.values.len();
        loop {
            match self.phase {
                Phase::Start => {
                    self.phase = Phase::Compare;
                    return Some(array_step(&self.values, vec![], "start", self.counters));
                }
                Phase::Compare => {
                    if self.pass >= n {
                        self.phase = Phase::Done;
                        continue;
                    }
                    let j = self.j;
                    if j + 1 >= n - self.pass {
                        self.pass += 1;
                        self.j = 0;
                        continue;
                    }

                    self.counters.comparisons += 1;
                    if self.values[j] > self.values[j + 1] {
                        self.phase = Phase::Swap;
                    } else {
                        self.j += 1;
                    }
                    return Some(array_step(
                        &self.values,
                        vec![j, j + 1],
                        format!("compare {j} and {}", j + 1),
                        self.counters,
                    ));
                }
                Phase::Swap => {
                    let j = self.j;
                    self.values.swap(j, j + 1);
                    self.counters.swaps += 1;
                    self.j += 1;
                    self.phase = Phase::Compare;
                    return Some(array_step(
                        &self.values,
                        vec![j, j + 1],
                        format!("swapped {j} & {}", j + 1),
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

impl std::iter::FusedIterator for BubbleSortTrace {}
