//! Text rendering of Steps.
//!
//! Renderers consume one [`Step`] at a time and never see playback state
//! beyond the frame label passed in. Highlights are always in bounds, so a
//! renderer only has to look them up.
//!
//! ```text
//!   0 |     5 ##########
//!   1 |     2 @@@@ <
//!   2 |     4 @@@@@@@@ <
//! ```

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::trace::{Cell, Grid, Step, Subject};

/// Draws Steps for a display surface.
pub trait Renderer {
    /// Draw the Step's subject with its highlight.
    fn render_step(&self, step: &Step) -> String;

    /// One-line summary: `Step k/n · label · metrics`.
    fn status_line(&self, step: &Step, frame: &str) -> String {
        if step.metrics().iter().next().is_none() {
            format!("Step {frame} · {}", step.label())
        } else {
            format!("Step {frame} · {} · {}", step.label(), step.metrics())
        }
    }

    /// Status line followed by the drawing.
    fn render_frame(&self, step: &Step, frame: &str) -> String {
        format!("{}\n{}", self.status_line(step, frame), self.render_step(step))
    }
}

/// Plain-text renderer: horizontal bars for arrays, a glyph map for grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRenderer {
    width: usize,
}

/// Glyph for an ordinary bar.
pub const BAR: char = '#';
/// Glyph for a highlighted bar.
pub const HIGHLIGHT_BAR: char = '@';
/// Blocked grid cell.
pub const BLOCKED: char = '#';
/// Highlighted grid cell.
pub const PATH: char = '*';
/// Open grid cell.
pub const OPEN: char = '.';

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(40)
    }
}

impl TextRenderer {
    /// Renderer whose longest bar is `width` characters (at least 1).
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    /// Bar width in characters.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    fn render_array(&self, values: &[i64], highlight: &[usize]) -> String {
        if values.is_empty() {
            return "(empty)".to_string();
        }
        let max = values.iter().map(|v| v.unsigned_abs()).max().unwrap_or(0).max(1);
        let marked: HashSet<usize> = highlight.iter().copied().collect();

        let mut out = String::new();
        for (i, &v) in values.iter().enumerate() {
            let glyph = if marked.contains(&i) { HIGHLIGHT_BAR } else { BAR };
            let len = bar_len(v.unsigned_abs(), max, self.width);
            let sign = if v < 0 { "-" } else { "" };
            let bar: String = std::iter::repeat(glyph).take(len).collect();
            let _ = write!(out, "{i:>3} | {v:>5} {sign}{bar}");
            if marked.contains(&i) {
                out.push_str(" <");
            }
            out.push('\n');
        }
        out.pop();
        out
    }

    fn render_grid(grid: &Grid, highlight: &[Cell]) -> String {
        let marked: HashSet<Cell> = highlight.iter().copied().collect();
        let mut out = String::with_capacity(grid.len() + grid.rows());
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let cell = Cell::new(row, col);
                out.push(if marked.contains(&cell) {
                    PATH
                } else if grid.is_open(cell) {
                    OPEN
                } else {
                    BLOCKED
                });
            }
            out.push('\n');
        }
        out.pop();
        out
    }
}

impl Renderer for TextRenderer {
    fn render_step(&self, step: &Step) -> String {
        match step.subject() {
            Subject::Array(values) => self.render_array(values, step.highlight().indices()),
            Subject::Grid(grid) => Self::render_grid(grid, step.highlight().cells()),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn bar_len(value: u64, max: u64, width: usize) -> usize {
    if value == 0 {
        return 0;
    }
    let scaled = u128::from(value) * width as u128 / u128::from(max);
    (scaled as usize).max(1)
}
