//! Insertion sort tracer.
//!
//! The key is moved left by adjacent exchanges rather than by copying the
//! shifted element over it, so every Step holds a permutation of the input.

use crate::error::VizResult;
use crate::trace::{Algorithm, Step, StepStream, TraceInput, Tracer};

use super::{array_step, SortCounters};

/// Insertion sort: grow a sorted prefix one key at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertionSort;

impl Tracer for InsertionSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::InsertionSort
    }

    fn validate(&self, input: &TraceInput) -> VizResult<()> {
        input.expect_kind(self.algorithm())
    }

    fn trace(&self, input: &TraceInput) -> VizResult<StepStream> {
        match input {
            TraceInput::Values(values) => Ok(Box::new(InsertionSortTrace::new(values))),
            other => Err(other.kind_mismatch(self.algorithm())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Take,
    Compare,
    Shift,
    Place,
    Done,
    Finished,
}

/// Lazy insertion sort trace.
#[derive(Debug, Clone)]
pub struct InsertionSortTrace {
    values: Vec<i64>,
    /// Index of the key currently being inserted.
    key: usize,
    /// Current position of that key.
    pos: usize,
    counters: SortCounters,
    phase: Phase,
}

impl InsertionSortTrace {
    /// Start a trace over a copy of `values`.
    #[must_use]
    pub fn new(values: &[i64]) -> Self {
        Self {
            values: values.to_vec(),
            key: 1,
            pos: 1,
            counters: SortCounters::default(),
            phase: Phase::Start,
        }
    }
}

impl Iterator for InsertionSortTrace {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        loop {
            match self.phase {
                Phase::Start => {
                    self.phase = Phase::Take;
                    return Some(array_step(&self.values, vec![], "start", self.counters));
                }
                Phase::Take => {
                    if self.key >= self.values.len() {
                        self.phase = Phase::Done;
                        continue;
                    }
                    self.pos = self.key;
                    self.phase = Phase::Compare;
                    return Some(array_step(
                        &self.values,
                        vec![self.key],
                        format!("take {}", self.key),
                        self.counters,
                    ));
                }
                Phase::Compare => {
                    let pos = self.pos;
                    if pos == 0 {
                        self.phase = Phase::Place;
                        continue;
                    }
                    self.counters.comparisons += 1;
                    self.phase = if self.values[pos - 1] > self.values[pos] {
                        Phase::Shift
                    } else {
                        Phase::Place
                    };
                    return Some(array_step(
                        &self.values,
                        vec![pos - 1, pos],
                        format!("compare {} and {pos}", pos - 1),
                        self.counters,
                    ));
                }
                Phase::Shift => {
                    let pos = self.pos;
                    self.values.swap(pos - 1, pos);
                    self.counters.swaps += 1;
                    self.pos -= 1;
                    self.phase = Phase::Compare;
                    return Some(array_step(
                        &self.values,
                        vec![pos - 1, pos],
                        "shift",
                        self.counters,
                    ));
                }
                Phase::Place => {
                    let pos = self.pos;
                    self.key += 1;
                    self.phase = Phase::Take;
                    return Some(array_step(
                        &self.values,
                        vec![pos],
                        format!("placed at {pos}"),
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

impl std::iter::FusedIterator for InsertionSortTrace {}
