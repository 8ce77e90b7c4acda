//! Instrumented-algorithm trace protocol.
//!
//! Every algorithm implements [`Tracer`]: given an input it produces a lazy,
//! finite, restartable sequence of [`Step`]s. Lazy means each Step is computed
//! on `Iterator::next`; restartable means tracing the same input again yields
//! an identical sequence (no seeds, no shared state between invocations).
//!
//! ```rust
//! use algoscope::trace::{Algorithm, TraceInput};
//!
//! let tracer = Algorithm::BubbleSort.tracer();
//! let steps: Vec<_> = tracer
//!     .trace(&TraceInput::Values(vec![3, 1, 2]))
//!     .unwrap()
//!     .collect();
//! assert!(steps.last().unwrap().is_terminal());
//! ```

pub mod step;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{VizError, VizResult};
use crate::tracers::{BfsPathfinding, BinarySearch, BubbleSort, InsertionSort, SelectionSort};

pub use step::{metric, Cell, Grid, Highlight, Metrics, Step, Subject};

/// A lazily produced run of Steps.
pub type StepStream = Box<dyn Iterator<Item = Step> + Send>;

/// Capability shared by every instrumented algorithm.
pub trait Tracer: Send + Sync {
    /// Which algorithm this tracer instruments.
    fn algorithm(&self) -> Algorithm;

    /// Check the tracer's preconditions without producing any Step.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the input has the wrong shape for this
    /// algorithm or violates one of its preconditions.
    fn validate(&self, input: &TraceInput) -> VizResult<()>;

    /// Start a fresh lazy trace over a private copy of `input`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Tracer::validate`].
    fn trace(&self, input: &TraceInput) -> VizResult<StepStream>;
}

/// Shape of input an algorithm consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Unordered integers.
    Values,
    /// Ascending integers plus a target.
    Search,
    /// Grid plus start and goal cells.
    Grid,
}

/// Validated input handed to a tracer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "input", rename_all = "snake_case")]
pub enum TraceInput {
    /// Integers for a comparison sort.
    Values(Vec<i64>),
    /// Ascending integers and the value to look for.
    Search {
        /// Sorted values.
        values: Vec<i64>,
        /// Target value.
        target: i64,
    },
    /// Grid with start and goal cells.
    Grid {
        /// The grid to search.
        grid: Grid,
        /// Start cell.
        start: Cell,
        /// Goal cell.
        goal: Cell,
    },
}

impl TraceInput {
    /// The input's shape.
    #[must_use]
    pub const fn kind(&self) -> InputKind {
        match self {
            Self::Values(_) => InputKind::Values,
            Self::Search { .. } => InputKind::Search,
            Self::Grid { .. } => InputKind::Grid,
        }
    }

    /// Number of elements (arrays) or cells (grids).
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Values(values) | Self::Search { values, .. } => values.len(),
            Self::Grid { grid, .. } => grid.len(),
        }
    }

    /// Reject input of the wrong shape for `algorithm`.
    pub(crate) fn expect_kind(&self, algorithm: Algorithm) -> VizResult<()> {
        if self.kind() == algorithm.input_kind() {
            Ok(())
        } else {
            Err(self.kind_mismatch(algorithm))
        }
    }

    pub(crate) fn kind_mismatch(&self, algorithm: Algorithm) -> VizError {
        VizError::invalid_input(format!(
            "{} expects {:?} input, got {:?}",
            algorithm.display_name(),
            algorithm.input_kind(),
            self.kind()
        ))
    }
}

/// Supported algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Bubble sort.
    BubbleSort,
    /// Insertion sort.
    InsertionSort,
    /// Selection sort.
    SelectionSort,
    /// Binary search over sorted values.
    BinarySearch,
    /// Breadth-first path finding on a grid.
    BfsPathfinding,
}

static BUBBLE_SORT: BubbleSort = BubbleSort;
static INSERTION_SORT: InsertionSort = InsertionSort;
static SELECTION_SORT: SelectionSort = SelectionSort;
static BINARY_SEARCH: BinarySearch = BinarySearch;
static BFS_PATHFINDING: BfsPathfinding = BfsPathfinding;

impl Algorithm {
    /// Every algorithm, in menu order.
    pub const ALL: [Self; 5] = [
        Self::BubbleSort,
        Self::InsertionSort,
        Self::SelectionSort,
        Self::BinarySearch,
        Self::BfsPathfinding,
    ];

    /// The tracer instrumenting this algorithm.
    #[must_use]
    pub fn tracer(self) -> &'static dyn Tracer {
        match self {
            Self::BubbleSort => &BUBBLE_SORT,
            Self::InsertionSort => &INSERTION_SORT,
            Self::SelectionSort => &SELECTION_SORT,
            Self::BinarySearch => &BINARY_SEARCH,
            Self::BfsPathfinding => &BFS_PATHFINDING,
        }
    }

    /// Short command-line name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BubbleSort => "bubble",
            Self::InsertionSort => "insertion",
            Self::SelectionSort => "selection",
            Self::BinarySearch => "binary-search",
            Self::BfsPathfinding => "bfs",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::BubbleSort => "Bubble Sort",
            Self::InsertionSort => "Insertion Sort",
            Self::SelectionSort => "Selection Sort",
            Self::BinarySearch => "Binary Search",
            Self::BfsPathfinding => "BFS Pathfinding",
        }
    }

    /// Input shape this algorithm consumes.
    #[must_use]
    pub const fn input_kind(self) -> InputKind {
        match self {
            Self::BubbleSort | Self::InsertionSort | Self::SelectionSort => InputKind::Values,
            Self::BinarySearch => InputKind::Search,
            Self::BfsPathfinding => InputKind::Grid,
        }
    }

    /// Next algorithm in menu order, wrapping around.
    #[must_use]
    pub fn cycle(self) -> Self {
        let i = Self::ALL.iter().position(|&a| a == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Algorithm {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "bubble" | "bubble-sort" => Ok(Self::BubbleSort),
            "insertion" | "insertion-sort" => Ok(Self::InsertionSort),
            "selection" | "selection-sort" => Ok(Self::SelectionSort),
            "binary" | "binary-search" => Ok(Self::BinarySearch),
            "bfs" | "bfs-pathfinding" | "pathfinding" => Ok(Self::BfsPathfinding),
            _ => Err(VizError::UnknownAlgorithm(s.to_string())),
        }
    }
}
