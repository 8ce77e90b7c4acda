//! Input preparation.
//!
//! Turns user text (or a seed) into a [`TraceInput`] a tracer accepts.
//! Malformed text is rejected with `InvalidInput`; nothing here panics.
//!
//! Random generation uses PCG so that the same seed reproduces the same
//! input on every platform.

use std::str::FromStr;

use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::TraceBuffer;
use crate::config::LimitsConfig;
use crate::error::{VizError, VizResult};
use crate::trace::{Algorithm, Cell, Grid, InputKind, TraceInput};

/// Values used when no input is given.
pub const DEFAULT_VALUES: [i64; 5] = [5, 2, 4, 1, 3];

/// Target used when binary search gets no target.
pub const DEFAULT_TARGET: i64 = 5;

/// Random values are drawn from this range.
const RANDOM_VALUE_RANGE: std::ops::RangeInclusive<i64> = 1..=99;

/// Dimensions of a generated grid when none is given.
const DEFAULT_GRID: (usize, usize) = (10, 16);

/// Fraction of blocked cells in a generated grid.
const DEFAULT_DENSITY: f64 = 0.25;

/// Parse comma-separated integers; blank entries are skipped.
///
/// # Errors
///
/// - `InvalidInput` if no number is given or an entry is not an integer
/// - `InputTooLarge` if more than `limit` numbers are given
pub fn parse_values(text: &str, limit: usize) -> VizResult<Vec<i64>> {
    let values = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| VizError::invalid_input(format!("'{s}' is not an integer")))
        })
        .collect::<VizResult<Vec<_>>>()?;

    if values.is_empty() {
        return Err(VizError::invalid_input("enter at least one number"));
    }
    if values.len() > limit {
        return Err(VizError::InputTooLarge {
            len: values.len(),
            limit,
        });
    }
    Ok(values)
}

/// Sort values for binary search and pair them with the target.
#[must_use]
pub fn prepare_search(mut values: Vec<i64>, target: i64) -> TraceInput {
    values.sort_unstable();
    TraceInput::Search { values, target }
}

/// Parse a grid: rows separated by `;` or newlines, one digit per cell.
///
/// `0` is open, any other digit is blocked. Whitespace inside a row is
/// ignored.
///
/// # Errors
///
/// Returns `InvalidInput` for a non-digit cell, an empty grid or ragged rows.
pub fn parse_grid(text: &str) -> VizResult<Grid> {
    let rows = text
        .split([';', '\n'])
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .enumerate()
        .map(|(r, row)| {
            row.chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| {
                    c.to_digit(10)
                        .and_then(|d| u8::try_from(d).ok())
                        .ok_or_else(|| {
                            VizError::invalid_input(format!("row {r}: '{c}' is not a digit"))
                        })
                })
                .collect::<VizResult<Vec<u8>>>()
        })
        .collect::<VizResult<Vec<_>>>()?;
    Grid::from_rows(rows)
}

/// Parse a cell written as `row,col`.
///
/// # Errors
///
/// Returns `InvalidInput` if the text is not two non-negative integers.
pub fn parse_cell(text: &str) -> VizResult<Cell> {
    let bad = || VizError::invalid_input(format!("'{text}' is not a cell (expected row,col)"));
    let (row, col) = text.split_once(',').ok_or_else(bad)?;
    let row = row.trim().parse().map_err(|_| bad())?;
    let col = col.trim().parse().map_err(|_| bad())?;
    Ok(Cell::new(row, col))
}

/// Parse the value of a numeric flag such as `--target 7`.
///
/// # Errors
///
/// Returns `InvalidInput` naming the flag if `text` does not parse.
pub fn parse_number<T: FromStr>(flag: &str, text: &str) -> VizResult<T> {
    text.trim()
        .parse()
        .map_err(|_| VizError::invalid_input(format!("{flag}: '{text}' is not a valid number")))
}

/// `n` values in `1..=99` from a seeded PCG stream.
#[must_use]
pub fn random_values(n: usize, seed: u64) -> Vec<i64> {
    let mut rng = Pcg64::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(RANDOM_VALUE_RANGE)).collect()
}

/// A grid with roughly `density` of its cells blocked.
///
/// The top-left and bottom-right corners are always open so they can serve
/// as start and goal.
///
/// # Errors
///
/// Returns `InvalidInput` if a dimension is zero.
pub fn random_grid(rows: usize, cols: usize, density: f64, seed: u64) -> VizResult<Grid> {
    let density = if density.is_finite() {
        density.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut cells: Vec<Vec<u8>> = (0..rows)
        .map(|_| (0..cols).map(|_| u8::from(rng.gen_bool(density))).collect())
        .collect();

    if let Some(first) = cells.first_mut().and_then(|row| row.first_mut()) {
        *first = 0;
    }
    if let Some(last) = cells.last_mut().and_then(|row| row.last_mut()) {
        *last = 0;
    }
    Grid::from_rows(cells)
}

/// An algorithm paired with input prepared for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRequest {
    /// Algorithm to run.
    pub algorithm: Algorithm,
    /// Prepared input.
    pub input: TraceInput,
}

impl TraceRequest {
    /// Pair an algorithm with input.
    #[must_use]
    pub const fn new(algorithm: Algorithm, input: TraceInput) -> Self {
        Self { algorithm, input }
    }

    /// Materialize the trace for this request.
    ///
    /// # Errors
    ///
    /// See [`TraceBuffer::materialize`].
    pub fn materialize(&self, limits: &LimitsConfig) -> VizResult<TraceBuffer> {
        TraceBuffer::materialize(self.algorithm.tracer(), &self.input, limits)
    }
}

/// Raw user input, as given on the command line or in the viewer.
///
/// Every field holds flag text as typed; nothing is parsed until
/// [`RawInput::prepare`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInput {
    /// Comma-separated values.
    pub values: Option<String>,
    /// Generate this many random values instead.
    pub random: Option<String>,
    /// Seed for generated values or grids. Defaults to 0.
    pub seed: Option<String>,
    /// Binary search target.
    pub target: Option<String>,
    /// Grid rows.
    pub grid: Option<String>,
    /// Start cell as `row,col`.
    pub start: Option<String>,
    /// Goal cell as `row,col`.
    pub goal: Option<String>,
}

impl RawInput {
    /// Prepare input for `algorithm`.
    ///
    /// Array algorithms take `values`, else `random`, else the default
    /// values. Grid search takes `grid`, else a generated grid; start and
    /// goal default to opposite corners.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` or `InputTooLarge` for unusable input.
    pub fn prepare(&self, algorithm: Algorithm, limits: &LimitsConfig) -> VizResult<TraceRequest> {
        let input = match algorithm.input_kind() {
            InputKind::Values => TraceInput::Values(self.array(limits)?),
            InputKind::Search => {
                let target = match &self.target {
                    Some(text) => parse_number("--target", text)?,
                    None => DEFAULT_TARGET,
                };
                prepare_search(self.array(limits)?, target)
            }
            InputKind::Grid => self.grid_input(limits)?,
        };
        debug!(%algorithm, size = input.size(), "input prepared");
        Ok(TraceRequest::new(algorithm, input))
    }

    /// The parsed seed, 0 when none was given.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the seed text is not an unsigned integer.
    pub fn seed(&self) -> VizResult<u64> {
        self.seed
            .as_deref()
            .map_or(Ok(0), |text| parse_number("--seed", text))
    }

    /// Replace the seed.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = Some(seed.to_string());
    }

    fn array(&self, limits: &LimitsConfig) -> VizResult<Vec<i64>> {
        let limit = limits.max_array_len;
        if let Some(text) = &self.values {
            return parse_values(text, limit);
        }
        let Some(text) = &self.random else {
            return Ok(DEFAULT_VALUES.to_vec());
        };
        match parse_number::<usize>("--random", text)? {
            0 => Err(VizError::invalid_input("enter at least one number")),
            n if n > limit => Err(VizError::InputTooLarge { len: n, limit }),
            n => Ok(random_values(n, self.seed()?)),
        }
    }

    fn grid_input(&self, limits: &LimitsConfig) -> VizResult<TraceInput> {
        let grid = match &self.grid {
            Some(text) => parse_grid(text)?,
            None => random_grid(DEFAULT_GRID.0, DEFAULT_GRID.1, DEFAULT_DENSITY, self.seed()?)?,
        };
        if grid.len() > limits.max_grid_cells {
            return Err(VizError::InputTooLarge {
                len: grid.len(),
                limit: limits.max_grid_cells,
            });
        }
        let start = match &self.start {
            Some(text) => parse_cell(text)?,
            None => Cell::new(0, 0),
        };
        let goal = match &self.goal {
            Some(text) => parse_cell(text)?,
            None => Cell::new(grid.rows() - 1, grid.cols() - 1),
        };
        Ok(TraceInput::Grid { grid, start, goal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values() {
        assert_eq!(parse_values("5,2,4,1,3", 50).unwrap(), vec![5, 2, 4, 1, 3]);
        assert_eq!(parse_values(" 7 , ,-3,", 50).unwrap(), vec![7, -3]);
    }

    #[test]
    fn test_parse_values_rejects_bad_input() {
        assert!(matches!(
            parse_values("", 50),
            Err(VizError::InvalidInput { .. })
        ));
        assert!(matches!(
            parse_values(" , ,", 50),
            Err(VizError::InvalidInput { .. })
        ));
        let err = parse_values("1,two,3", 50).unwrap_err();
        assert!(err.to_string().contains("two"));
        assert!(matches!(
            parse_values("1,2,3", 2),
            Err(VizError::InputTooLarge { len: 3, limit: 2 })
        ));
    }

    #[test]
    fn test_prepare_search_sorts() {
        let input = prepare_search(vec![3, 1, 2], 2);
        assert_eq!(
            input,
            TraceInput::Search {
                values: vec![1, 2, 3],
                target: 2
            }
        );
    }

    #[test]
    fn test_parse_grid() {
        let grid = parse_grid("0010;0000\n0 1 0 0").unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        assert!(!grid.is_open(Cell::new(0, 2)));
        assert!(!grid.is_open(Cell::new(2, 1)));
        assert!(grid.is_open(Cell::new(1, 3)));
    }

    #[test]
    fn test_parse_grid_rejects_bad_input() {
        assert!(parse_grid("").is_err());
        assert!(parse_grid("00;000").is_err());
        assert!(parse_grid("0x0").is_err());
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("2,3").unwrap(), Cell::new(2, 3));
        assert_eq!(parse_cell(" 0 , 1 ").unwrap(), Cell::new(0, 1));
        assert!(parse_cell("2").is_err());
        assert!(parse_cell("-1,0").is_err());
        assert!(parse_cell("a,b").is_err());
    }

    #[test]
    fn test_random_values_deterministic() {
        let a = random_values(20, 42);
        assert_eq!(a, random_values(20, 42));
        assert_ne!(a, random_values(20, 43));
        assert!(a.iter().all(|v| RANDOM_VALUE_RANGE.contains(v)));
    }

    #[test]
    fn test_random_grid_corners_open() {
        let grid = random_grid(6, 7, 1.0, 9).unwrap();
        assert!(grid.is_open(Cell::new(0, 0)));
        assert!(grid.is_open(Cell::new(5, 6)));
        assert!(!grid.is_open(Cell::new(3, 3)));
        assert_eq!(grid, random_grid(6, 7, 1.0, 9).unwrap());
        assert!(random_grid(0, 4, 0.2, 1).is_err());
    }

    #[test]
    fn test_raw_input_defaults() {
        let limits = LimitsConfig::default();
        let raw = RawInput::default();

        let req = raw.prepare(Algorithm::BubbleSort, &limits).unwrap();
        assert_eq!(req.input, TraceInput::Values(DEFAULT_VALUES.to_vec()));

        let req = raw.prepare(Algorithm::BinarySearch, &limits).unwrap();
        assert_eq!(
            req.input,
            TraceInput::Search {
                values: vec![1, 2, 3, 4, 5],
                target: DEFAULT_TARGET
            }
        );

        let req = raw.prepare(Algorithm::BfsPathfinding, &limits).unwrap();
        assert_eq!(req.input.size(), DEFAULT_GRID.0 * DEFAULT_GRID.1);
        assert!(req.materialize(&limits).is_ok());
    }

    #[test]
    fn test_raw_input_random_values() {
        let limits = LimitsConfig::default();
        let raw = RawInput {
            random: Some("12".into()),
            seed: Some("7".into()),
            ..RawInput::default()
        };
        let req = raw.prepare(Algorithm::SelectionSort, &limits).unwrap();
        assert_eq!(req.input, TraceInput::Values(random_values(12, 7)));

        let too_many = RawInput {
            random: Some("51".into()),
            ..RawInput::default()
        };
        assert!(matches!(
            too_many.prepare(Algorithm::BubbleSort, &limits),
            Err(VizError::InputTooLarge { len: 51, limit: 50 })
        ));
    }

    #[test]
    fn test_raw_input_grid_with_cells() {
        let limits = LimitsConfig::default();
        let raw = RawInput {
            grid: Some("000;010;000".into()),
            start: Some("2,0".into()),
            goal: Some("0,2".into()),
            ..RawInput::default()
        };
        let req = raw.prepare(Algorithm::BfsPathfinding, &limits).unwrap();
        let buffer = req.materialize(&limits).unwrap();
        assert_eq!(buffer.last().unwrap().label(), "goal");
    }

    #[test]
    fn test_raw_input_grid_ceiling() {
        let limits = LimitsConfig {
            max_grid_cells: 4,
            ..LimitsConfig::default()
        };
        let raw = RawInput {
            grid: Some("000;000".into()),
            ..RawInput::default()
        };
        assert!(matches!(
            raw.prepare(Algorithm::BfsPathfinding, &limits),
            Err(VizError::InputTooLarge { len: 6, limit: 4 })
        ));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<i64>("--target", " -3 ").unwrap(), -3);
        let err = parse_number::<usize>("--random", "many").unwrap_err();
        assert!(matches!(err, VizError::InvalidInput { .. }));
        assert!(err.to_string().contains("--random"));
        assert!(parse_number::<u64>("--seed", "").is_err());
    }

    #[test]
    fn test_raw_input_rejects_malformed_numbers() {
        let limits = LimitsConfig::default();
        let cases = [
            (
                Algorithm::BinarySearch,
                RawInput {
                    values: Some("1,2,3,4,5".into()),
                    target: Some("abc".into()),
                    ..RawInput::default()
                },
            ),
            (
                Algorithm::BubbleSort,
                RawInput {
                    random: Some("many".into()),
                    ..RawInput::default()
                },
            ),
            (
                Algorithm::InsertionSort,
                RawInput {
                    random: Some("5".into()),
                    seed: Some("-1".into()),
                    ..RawInput::default()
                },
            ),
            (
                Algorithm::BfsPathfinding,
                RawInput {
                    seed: Some("x".into()),
                    ..RawInput::default()
                },
            ),
        ];
        for (algorithm, raw) in cases {
            assert!(
                matches!(
                    raw.prepare(algorithm, &limits),
                    Err(VizError::InvalidInput { .. })
                ),
                "{algorithm}: {raw:?}"
            );
        }
    }

    #[test]
    fn test_raw_input_seed() {
        let mut raw = RawInput::default();
        assert_eq!(raw.seed().unwrap(), 0);
        raw.set_seed(41);
        assert_eq!(raw.seed, Some("41".to_string()));
        assert_eq!(raw.seed().unwrap(), 41);
    }
}
