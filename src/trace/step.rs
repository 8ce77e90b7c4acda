//! Step data model.
//!
//! A [`Step`] is one observable instant of an algorithm's execution. It owns a
//! snapshot of the data structure, so later mutation of the live algorithm
//! state can never retroactively alter a Step that was already emitted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{VizError, VizResult};

/// Well-known metric names.
pub mod metric {
    /// Element comparisons (sorts) or midpoint checks (binary search).
    pub const COMPARISONS: &str = "comparisons";
    /// Swaps, shifts and exchanges performed by a sort.
    pub const SWAPS: &str = "swaps";
    /// Cells dequeued by a grid search.
    pub const STEPS: &str = "steps";
}

/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
}

impl Cell {
    /// Create a new cell coordinate.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another cell.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Whether `other` is one 4-directional move away.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// Rectangular grid of cells: `0` is open, anything else is blocked.
///
/// Construction guarantees at least one row, at least one column and equal
/// row lengths. Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Build a grid from row vectors.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the grid has no rows, no columns, or rows of
    /// differing length.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> VizResult<Self> {
        let Some(first) = rows.first() else {
            return Err(VizError::invalid_input("grid has no rows"));
        };
        let cols = first.len();
        if cols == 0 {
            return Err(VizError::invalid_input("grid has no columns"));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(VizError::invalid_input(format!(
                "grid is not rectangular: row {i} has {} cells, expected {cols}",
                row.len()
            )));
        }

        let n_rows = rows.len();
        Ok(Self {
            rows: n_rows,
            cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// An all-open grid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if either dimension is zero.
    pub fn open(rows: usize, cols: usize) -> VizResult<Self> {
        Self::from_rows(vec![vec![0; cols]; rows])
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Whether the grid has no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Raw value at a cell.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<u8> {
        self.index_of(cell).map(|i| self.cells[i])
    }

    /// Whether the cell is inside the grid and open.
    #[must_use]
    pub fn is_open(&self, cell: Cell) -> bool {
        self.get(cell) == Some(0)
    }

    /// Row-major index of a cell.
    #[must_use]
    pub const fn index_of(&self, cell: Cell) -> Option<usize> {
        if self.contains(cell) {
            Some(cell.row * self.cols + cell.col)
        } else {
            None
        }
    }

    /// Open 4-directional neighbours in down, up, right, left order.
    pub fn open_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        let down = Some(Cell::new(cell.row + 1, cell.col));
        let up = cell.row.checked_sub(1).map(|r| Cell::new(r, cell.col));
        let right = Some(Cell::new(cell.row, cell.col + 1));
        let left = cell.col.checked_sub(1).map(|c| Cell::new(cell.row, c));

        [down, up, right, left]
            .into_iter()
            .flatten()
            .filter(|&n| self.is_open(n))
    }

    /// Copy the grid back into row vectors.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells.chunks(self.cols).map(<[u8]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<u8>>> for Grid {
    type Error = VizError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<u8>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

/// The data structure snapshot carried by a Step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Subject {
    /// Ordered sequence of integers.
    Array(Vec<i64>),
    /// 2D grid of open/blocked cells.
    Grid(Grid),
}

impl Subject {
    /// Array values, if this is an array snapshot.
    #[must_use]
    pub fn as_array(&self) -> Option<&[i64]> {
        match self {
            Self::Array(values) => Some(values),
            Self::Grid(_) => None,
        }
    }

    /// Grid, if this is a grid snapshot.
    #[must_use]
    pub const fn as_grid(&self) -> Option<&Grid> {
        match self {
            Self::Grid(grid) => Some(grid),
            Self::Array(_) => None,
        }
    }

    /// Number of addressable positions.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Array(values) => values.len(),
            Self::Grid(grid) => grid.len(),
        }
    }

    /// Whether the snapshot has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Positions relevant to one instant, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum Highlight {
    /// Array indices.
    Indices(Vec<usize>),
    /// Grid cells (a path for grid searches).
    Cells(Vec<Cell>),
}

impl Highlight {
    /// Empty array highlight.
    #[must_use]
    pub const fn none() -> Self {
        Self::Indices(Vec::new())
    }

    /// Number of highlighted positions.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Indices(i) => i.len(),
            Self::Cells(c) => c.len(),
        }
    }

    /// Whether nothing is highlighted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highlighted indices; empty for cell highlights.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        match self {
            Self::Indices(i) => i,
            Self::Cells(_) => &[],
        }
    }

    /// Highlighted cells; empty for index highlights.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        match self {
            Self::Cells(c) => c,
            Self::Indices(_) => &[],
        }
    }

    /// Whether every highlighted position is valid within `subject`.
    ///
    /// An empty highlight fits any subject.
    #[must_use]
    pub fn fits(&self, subject: &Subject) -> bool {
        if self.is_empty() {
            return true;
        }
        match (self, subject) {
            (Self::Indices(idx), Subject::Array(values)) => idx.iter().all(|&i| i < values.len()),
            (Self::Cells(cells), Subject::Grid(grid)) => cells.iter().all(|&c| grid.contains(c)),
            _ => false,
        }
    }
}

impl Default for Highlight {
    fn default() -> Self {
        Self::none()
    }
}

/// Named counters attached to a Step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metrics(BTreeMap<String, u64>);

impl Metrics {
    /// Empty metric set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: &str, value: u64) -> Self {
        self.0.insert(name.to_string(), value);
        self
    }

    /// Value of a counter, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u64> {
        self.0.get(name).copied()
    }

    /// Iterate counters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Whether every counter is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.values().all(|&v| v == 0)
    }

    /// First counter that went down relative to `previous`.
    ///
    /// A counter missing from `self` but present in `previous` counts as a
    /// decrease to zero.
    #[must_use]
    pub fn first_decrease<'a>(&self, previous: &'a Self) -> Option<&'a str> {
        previous
            .0
            .iter()
            .find(|(name, &before)| self.get(name).unwrap_or(0) < before)
            .map(|(name, _)| name.as_str())
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// One immutable observable instant of an algorithm's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    subject: Subject,
    highlight: Highlight,
    label: String,
    metrics: Metrics,
    terminal: bool,
}

impl Step {
    /// Create a non-terminal step.
    #[must_use]
    pub fn new(
        subject: Subject,
        highlight: Highlight,
        label: impl Into<String>,
        metrics: Metrics,
    ) -> Self {
        Self {
            subject,
            highlight,
            label: label.into(),
            metrics,
            terminal: false,
        }
    }

    /// Mark this step as the final step of its run.
    #[must_use]
    pub fn into_terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    /// Data structure snapshot.
    #[must_use]
    pub const fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Highlighted positions.
    #[must_use]
    pub const fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    /// Human-readable description.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Counters at this instant.
    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Shortcut for a single counter, zero when absent.
    #[must_use]
    pub fn metric(&self, name: &str) -> u64 {
        self.metrics.get(name).unwrap_or(0)
    }

    /// Whether this is the final step of its run.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.terminal
    }
}
