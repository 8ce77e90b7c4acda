//! Instrumented algorithms.
//!
//! Each tracer is a unit struct implementing [`Tracer`](crate::trace::Tracer)
//! plus a concrete iterator holding the algorithm's explicit state. The
//! iterator owns a private copy of the input and computes one Step per
//! `next()` call.
//!
//! 1. [`bubble`] - adjacent compare/swap passes
//! 2. [`insertion`] - key lifted and moved left by adjacent exchanges
//! 3. [`selection`] - running minimum, one exchange per pass
//! 4. [`binary_search`] - midpoint checks over a sorted range
//! 5. [`bfs`] - breadth-first path finding on a 4-connected grid

pub mod bfs;
pub mod binary_search;
pub mod bubble;
pub mod insertion;
pub mod selection;

pub use bfs::{BfsPathfinding, BfsTrace};
pub use binary_search::{BinarySearch, BinarySearchTrace};
pub use bubble::{BubbleSort, BubbleSortTrace};
pub use insertion::{InsertionSort, InsertionSortTrace};
pub use selection::{SelectionSort, SelectionSortTrace};

use crate::trace::{metric, Highlight, Metrics, Step, Subject};

/// Counters shared by the comparison sorts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SortCounters {
    pub comparisons: u64,
    pub swaps: u64,
}

impl SortCounters {
    fn metrics(self) -> Metrics {
        Metrics::new()
            .with(metric::COMPARISONS, self.comparisons)
            .with(metric::SWAPS, self.swaps)
    }
}

/// Snapshot an array with the given highlight.
pub(crate) fn array_step(
    values: &[i64],
    highlight: Vec<usize>,
    label: impl Into<String>,
    counters: SortCounters,
) -> Step {
    Step::new(
        Subject::Array(values.to_vec()),
        Highlight::Indices(highlight),
        label,
        counters.metrics(),
    )
}

#[cfg(test)]
pub(crate) mod testing {
    //! Assertions shared by the tracer test modules.

    use crate::trace::Step;

    /// Check the protocol shape every trace must have.
    pub fn assert_protocol(steps: &[Step]) {
        assert!(steps.len() >= 2, "trace must have start and terminal steps");
        assert!(steps[0].metrics().is_zero(), "start metrics must be zero");
        assert!(steps.last().is_some_and(Step::is_terminal), "last step must be terminal");
        assert_eq!(
            steps.iter().filter(|s| s.is_terminal()).count(),
            1,
            "exactly one terminal step"
        );
        for pair in steps.windows(2) {
            assert_eq!(pair[1].metrics().first_decrease(pair[0].metrics()), None);
        }
        for step in steps {
            assert!(step.highlight().fits(step.subject()), "highlight out of bounds");
        }
    }

    /// Sorted copy of a slice.
    pub fn sorted(values: &[i64]) -> Vec<i64> {
        let mut v = values.to_vec();
        v.sort_unstable();
        v
    }
}
