//! Binary search tracer.
//!
//! The input must already be sorted ascending; sorting belongs to input
//! preparation, not to the tracer. `comparisons` counts midpoint checks.

use std::cmp::Ordering;

use crate::error::{VizError, VizResult};
use crate::trace::{metric, Algorithm, Highlight, Metrics, Step, StepStream, Subject, TraceInput, Tracer};

/// Binary search over ascending values.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinarySearch;

impl BinarySearch {
    fn check_sorted(values: &[i64]) -> VizResult<()> {
        match values.windows(2).position(|w| w[0] > w[1]) {
            None => Ok(()),
            Some(i) => Err(VizError::invalid_input(format!(
                "binary search requires ascending input (index {} > index {})",
                i,
                i + 1
            ))),
        }
    }
}

impl Tracer for BinarySearch {
    fn algorithm(&self) -> Algorithm {
        Algorithm::BinarySearch
    }

    fn validate(&self, input: &TraceInput) -> VizResult<()> {
        match input {
            TraceInput::Search { values, .. } => Self::check_sorted(values),
            other => Err(other.kind_mismatch(self.algorithm())),
        }
    }

    fn trace(&self, input: &TraceInput) -> VizResult<StepStream> {
        match input {
            TraceInput::Search { values, target } => {
                Self::check_sorted(values)?;
                Ok(Box::new(BinarySearchTrace::new(values, *target)))
            }
            other => Err(other.kind_mismatch(self.algorithm())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Probe,
    Narrow(&'static str),
    Found(usize),
    Finished,
}

/// Lazy binary search trace.
///
/// The live range is half-open, `lo..end`; labels and highlights use the
/// inclusive bounds `lo` and `end - 1`.
#[derive(Debug, Clone)]
pub struct BinarySearchTrace {
    values: Vec<i64>,
    target: i64,
    lo: usize,
    end: usize,
    comparisons: u64,
    phase: Phase,
}

impl BinarySearchTrace {
    /// Start a trace for `target` over a copy of ascending `values`.
    #[must_use]
    pub fn new(values: &[i64], target: i64) -> Self {
        Self {
            values: values.to_vec(),
            target,
            lo: 0,
            end: values.len(),
            comparisons: 0,
            phase: Phase::Start,
        }
    }

    /// Endpoints of the live range; empty once the range is exhausted.
    fn range_highlight(&self) -> Vec<usize> {
        match self.end.checked_sub(1) {
            Some(hi) if self.lo < hi => vec![self.lo, hi],
            Some(hi) if self.lo == hi => vec![self.lo],
            _ => vec![],
        }
    }

    fn step(&self, highlight: Vec<usize>, label: impl Into<String>) -> Step {
        Step::new(
            Subject::Array(self.values.clone()),
            Highlight::Indices(highlight),
            label,
            Metrics::new().with(metric::COMPARISONS, self.comparisons),
        )
    }
}

impl Iterator for BinarySearchTrace {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        match self.phase {
            Phase::Start => {
                self.phase = Phase::Probe;
                Some(self.step(self.range_highlight(), "start"))
            }
            Phase::Probe => {
                if self.lo >= self.end {
                    self.phase = Phase::Finished;
                    return Some(self.step(vec![], "not found").into_terminal());
                }
                let mid = self.lo + (self.end - 1 - self.lo) / 2;
                self.comparisons += 1;
                self.phase = match self.values[mid].cmp(&self.target) {
                    Ordering::Equal => Phase::Found(mid),
                    Ordering::Less => {
                        self.lo = mid + 1;
                        Phase::Narrow("move right")
                    }
                    Ordering::Greater => {
                        self.end = mid;
                        Phase::Narrow("move left")
                    }
                };
                Some(self.step(vec![mid], format!("check {mid}")))
            }
            Phase::Narrow(label) => {
                self.phase = Phase::Probe;
                Some(self.step(self.range_highlight(), label))
            }
            Phase::Found(mid) => {
                self.phase = Phase::Finished;
                Some(self.step(vec![mid], "found").into_terminal())
            }
            Phase::Finished => None,
        }
    }
}

impl std::iter::FusedIterator for BinarySearchTrace {}
