//! Breadth-first path finding on a grid.
//!
//! Cells are `0` (open) or non-zero (blocked); moves are 4-directional.
//! A cell is marked visited when it is enqueued, so no cell enters the queue
//! twice and `steps` never exceeds the number of cells.

use std::collections::VecDeque;

use crate::error::{VizError, VizResult};
use crate::trace::{
    metric, Algorithm, Cell, Grid, Highlight, Metrics, Step, StepStream, Subject, TraceInput,
    Tracer,
};

/// BFS path finding from a start cell to a goal cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsPathfinding;

impl BfsPathfinding {
    fn check_endpoints(grid: &Grid, start: Cell, goal: Cell) -> VizResult<()> {
        for (name, cell) in [("start", start), ("goal", goal)] {
            if !grid.contains(cell) {
                return Err(VizError::invalid_input(format!(
                    "{name} {cell} is outside the {}x{} grid",
                    grid.rows(),
                    grid.cols()
                )));
            }
            if !grid.is_open(cell) {
                return Err(VizError::invalid_input(format!("{name} {cell} is blocked")));
            }
        }
        Ok(())
    }
}

impl Tracer for BfsPathfinding {
    fn algorithm(&self) -> Algorithm {
        Algorithm::BfsPathfinding
    }

    fn validate(&self, input: &TraceInput) -> VizResult<()> {
        match input {
            TraceInput::Grid { grid, start, goal } => Self::check_endpoints(grid, *start, *goal),
            other => Err(other.kind_mismatch(self.algorithm())),
        }
    }

    fn trace(&self, input: &TraceInput) -> VizResult<StepStream> {
        match input {
            TraceInput::Grid { grid, start, goal } => {
                Self::check_endpoints(grid, *start, *goal)?;
                Ok(Box::new(BfsTrace::new(grid.clone(), *start, *goal)))
            }
            other => Err(other.kind_mismatch(self.algorithm())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Search,
    Finished,
}

/// Lazy BFS trace.
///
/// Paths are rebuilt from a parent table on each visit instead of being
/// carried in the queue.
#[derive(Debug, Clone)]
pub struct BfsTrace {
    grid: Grid,
    start: Cell,
    goal: Cell,
    queue: VecDeque<Cell>,
    visited: Vec<bool>,
    parent: Vec<Option<Cell>>,
    steps: u64,
    phase: Phase,
}

impl BfsTrace {
    /// Start a trace. `start` and `goal` must be open cells inside `grid`.
    #[must_use]
    pub fn new(grid: Grid, start: Cell, goal: Cell) -> Self {
        let len = grid.len();
        Self {
            grid,
            start,
            goal,
            queue: VecDeque::new(),
            visited: vec![false; len],
            parent: vec![None; len],
            steps: 0,
            phase: Phase::Start,
        }
    }

    fn mark(&mut self, cell: Cell, parent: Option<Cell>) -> bool {
        match self.grid.index_of(cell) {
            Some(i) if !self.visited[i] => {
                self.visited[i] = true;
                self.parent[i] = parent;
                true
            }
            _ => false,
        }
    }

    fn path_to(&self, cell: Cell) -> Vec<Cell> {
        let mut path = vec![cell];
        let mut current = cell;
        while let Some(prev) = self.grid.index_of(current).and_then(|i| self.parent[i]) {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        path
    }

    fn step(&self, path: Vec<Cell>, label: impl Into<String>) -> Step {
        Step::new(
            Subject::Grid(self.grid.clone()),
            Highlight::Cells(path),
            label,
            Metrics::new().with(metric::STEPS, self.steps),
        )
    }
}

impl Iterator for BfsTrace {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        match self.phase {
            Phase::Start => {
                if self.mark(self.start, None) {
                    self.queue.push_back(self.start);
                }
                self.phase = Phase::Search;
                Some(self.step(vec![self.start], "start"))
            }
            Phase::Search => {
                let Some(cell) = self.queue.pop_front() else {
                    self.phase = Phase::Finished;
                    return Some(self.step(vec![], "not found").into_terminal());
                };
                self.steps += 1;
                let path = self.path_to(cell);

                if cell == self.goal {
                    self.phase = Phase::Finished;
                    return Some(self.step(path, "goal").into_terminal());
                }

                let neighbors: Vec<Cell> = self.grid.open_neighbors(cell).collect();
                for next in neighbors {
                    if self.mark(next, Some(cell)) {
                        self.queue.push_back(next);
                    }
                }
                Some(self.step(path, format!("visit {cell}")))
            }
            Phase::Finished => None,
        }
    }
}

impl std::iter::FusedIterator for BfsTrace {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracers::testing::assert_protocol;
    use proptest::prelude::*;

    fn run(rows: Vec<Vec<u8>>, start: Cell, goal: Cell) -> Vec<Step> {
        BfsTrace::new(Grid::from_rows(rows).unwrap(), start, goal).collect()
    }

    fn assert_connected_path(path: &[Cell], start: Cell, goal: Cell) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_open_grid_reaches_goal() {
        let start = Cell::new(0, 0);
        let goal = Cell::new(2, 3);
        let steps = run(vec![vec![0; 4]; 3], start, goal);
        assert_protocol(&steps);

        assert_eq!(steps[0].highlight().cells(), &[start]);
        assert_eq!(steps[0].metric(metric::STEPS), 0);

        let last = steps.last().unwrap();
        assert_eq!(last.label(), "goal");
        let path = last.highlight().cells();
        assert_connected_path(path, start, goal);
        assert!(path.len() >= start.manhattan(goal) + 1);
    }

    #[test]
    fn test_wall_blocks_goal() {
        let grid = vec![vec![0, 1, 0], vec![0, 1, 0], vec![0, 1, 0]];
        let steps = run(grid, Cell::new(0, 0), Cell::new(2, 2));
        assert_protocol(&steps);
        let last = steps.last().unwrap();
        assert_eq!(last.label(), "not found");
        assert!(last.highlight().is_empty());
        assert_eq!(last.metric(metric::STEPS), 3);
    }

    #[test]
    fn test_start_equals_goal() {
        let cell = Cell::new(1, 1);
        let steps = run(vec![vec![0; 3]; 3], cell, cell);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].label(), "goal");
        assert!(steps[1].is_terminal());
        assert_eq!(steps[1].highlight().cells(), &[cell]);
    }

    #[test]
    fn test_visit_labels_and_paths() {
        let steps = run(vec![vec![0, 0]], Cell::new(0, 0), Cell::new(0, 1));
        let labels: Vec<&str> = steps.iter().map(Step::label).collect();
        assert_eq!(labels, vec!["start", "visit 0,0", "goal"]);
        assert_eq!(steps[1].highlight().cells(), &[Cell::new(0, 0)]);
    }

    #[test]
    fn test_subject_is_grid_snapshot() {
        let rows = vec![vec![0, 1], vec![0, 0]];
        let steps = run(rows.clone(), Cell::new(0, 0), Cell::new(1, 1));
        for step in &steps {
            assert_eq!(step.subject().as_grid().unwrap().to_rows(), rows);
        }
    }

    #[test]
    fn test_rejects_blocked_or_outside_endpoints() {
        let grid = Grid::from_rows(vec![vec![0, 1]]).unwrap();
        let blocked = TraceInput::Grid {
            grid: grid.clone(),
            start: Cell::new(0, 0),
            goal: Cell::new(0, 1),
        };
        let outside = TraceInput::Grid {
            grid,
            start: Cell::new(3, 0),
            goal: Cell::new(0, 0),
        };
        assert!(BfsPathfinding.validate(&blocked).is_err());
        assert!(BfsPathfinding.validate(&outside).is_err());
        assert!(BfsPathfinding.trace(&outside).is_err());
    }

    proptest! {
        #[test]
        fn prop_open_grid_shortest_path(
            rows in 1usize..8,
            cols in 1usize..8,
            sr in 0usize..8, sc in 0usize..8, gr in 0usize..8, gc in 0usize..8,
        ) {
            let start = Cell::new(sr % rows, sc % cols);
            let goal = Cell::new(gr % rows, gc % cols);
            let steps = run(vec![vec![0; cols]; rows], start, goal);
            assert_protocol(&steps);
            let last = steps.last().unwrap();
            prop_assert_eq!(last.label(), "goal");
            let path = last.highlight().cells();
            assert_connected_path(path, start, goal);
            prop_assert_eq!(path.len(), start.manhattan(goal) + 1);
        }

        #[test]
        fn prop_steps_bounded_by_cells(
            cells in prop::collection::vec(prop::bool::weighted(0.3), 36),
        ) {
            let rows: Vec<Vec<u8>> = cells
                .chunks(6)
                .map(|r| r.iter().map(|&b| u8::from(b)).collect())
                .collect();
            let mut rows = rows;
            rows[0][0] = 0;
            rows[5][5] = 0;
            let steps = run(rows, Cell::new(0, 0), Cell::new(5, 5));
            assert_protocol(&steps);
            prop_assert!(steps.last().unwrap().metric(metric::STEPS) <= 36);
        }
    }
}
