//! Trace viewer application state and key handling.
//!
//! Terminal I/O lives in the `algoscope-tui` binary; everything that decides
//! what is shown lives here so it can be tested without a terminal.

use crossterm::event::KeyCode;
use tracing::warn;

use crate::config::VizConfig;
use crate::input::{parse_number, RawInput};
use crate::playback::{PlaybackController, TickOutcome};
use crate::render::{Renderer, TextRenderer};
use crate::trace::{Algorithm, Step};

/// Number of random values generated when `g` is pressed without explicit
/// values.
pub const REGENERATE_LEN: usize = 12;

/// Application state for the trace viewer.
#[derive(Debug)]
pub struct ViewerApp {
    /// Algorithm being shown.
    pub algorithm: Algorithm,
    /// Input used for the next generate.
    pub input: RawInput,
    /// Limits and playback settings.
    pub config: VizConfig,
    /// Playback over the current trace.
    pub playback: PlaybackController,
    /// One-shot message shown after a run completes.
    pub notice: Option<String>,
    /// Last generate error; the previous trace stays on screen.
    pub error: Option<String>,
    should_quit: bool,
}

impl ViewerApp {
    /// Create the viewer and generate the first trace.
    #[must_use]
    pub fn new(algorithm: Algorithm, input: RawInput, config: VizConfig) -> Self {
        let playback = PlaybackController::new(config.playback.clone());
        let mut app = Self {
            algorithm,
            input,
            config,
            playback,
            notice: None,
            error: None,
            should_quit: false,
        };
        app.generate();
        app
    }

    /// Materialize a trace for the current algorithm and input and attach it.
    ///
    /// On failure the previous trace and position are kept and the error is
    /// stored for display.
    pub fn generate(&mut self) -> bool {
        let result = self
            .input
            .prepare(self.algorithm, &self.config.limits)
            .and_then(|request| request.materialize(&self.config.limits));
        match result {
            Ok(buffer) => {
                self.error = None;
                self.notice = None;
                self.playback.attach(buffer)
            }
            Err(e) => {
                warn!(algorithm = %self.algorithm, error = %e, "generate failed");
                self.error = Some(e.to_string());
                false
            }
        }
    }

    /// Advance one seed and generate again. Explicit values are replaced by
    /// random ones.
    pub fn regenerate(&mut self) -> bool {
        let seed = self.input.seed().unwrap_or(0).wrapping_add(1);
        self.input.set_seed(seed);
        let explicit = self.input.values.take().is_some();
        let usable = self
            .input
            .random
            .as_deref()
            .is_some_and(|text| parse_number::<usize>("--random", text).is_ok());
        if explicit || !usable {
            let len = REGENERATE_LEN.min(self.config.limits.max_array_len);
            self.input.random = Some(len.to_string());
        }
        self.generate()
    }

    /// Switch to the next algorithm that generates a trace.
    ///
    /// Algorithms whose input fails are skipped and named in the notice. If
    /// none succeeds, the current algorithm and trace stay and the last
    /// error is shown.
    pub fn cycle_algorithm(&mut self) -> bool {
        let previous = self.algorithm;
        let mut skipped = Vec::new();
        let mut next = previous.cycle();
        while next != previous {
            self.algorithm = next;
            if self.generate() {
                if !skipped.is_empty() {
                    self.notice = Some(format!("Skipped {}", skipped.join("; ")));
                }
                return true;
            }
            let reason = self.error.clone().unwrap_or_default();
            skipped.push(format!("{next}: {reason}"));
            next = next.cycle();
        }
        self.algorithm = previous;
        false
    }

    /// The seed shown to the user; 0 when unset or unparseable.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.input.seed().unwrap_or(0)
    }

    /// Drive playback by one tick, recording the completion notice.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.playback.tick();
        if let TickOutcome::RunComplete { .. } = outcome {
            let label = self.current_step().map_or("", Step::label).to_string();
            self.notice = Some(format!("Run complete: {label}"));
        }
        outcome
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => {
                self.playback.toggle();
            }
            KeyCode::Char('n') | KeyCode::Right => {
                self.playback.step();
            }
            KeyCode::Char('r') => {
                if self.playback.reset() {
                    self.notice = None;
                }
            }
            KeyCode::Char('+' | '=') => {
                self.playback.speed_up();
            }
            KeyCode::Char('-') => {
                self.playback.slow_down();
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.playback.apply_preset(index);
            }
            KeyCode::Char('g') => {
                self.regenerate();
            }
            KeyCode::Char('a') => {
                self.cycle_algorithm();
            }
            _ => {}
        }
    }

    /// Check if the app should quit.
    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Step at the playback position.
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        self.playback.current_step()
    }

    /// `Step k/n · label · metrics` for the current Step.
    #[must_use]
    pub fn status_line(&self) -> String {
        self.current_step().map_or_else(
            || "No trace".to_string(),
            |step| TextRenderer::default().status_line(step, &self.playback.frame_label()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TraceBuffer;
    use crate::playback::PlaybackMode;

    fn app(algorithm: Algorithm) -> ViewerApp {
        ViewerApp::new(algorithm, RawInput::default(), VizConfig::default())
    }

    #[test]
    fn test_new_app_generates_trace() {
        let app = app(Algorithm::BubbleSort);
        assert_eq!(app.playback.mode(), PlaybackMode::Paused);
        assert_eq!(app.current_step().unwrap().label(), "start");
        assert!(app.error.is_none());
        assert!(!app.should_quit());
    }

    #[test]
    fn test_handle_key_quit() {
        let mut app = app(Algorithm::BubbleSort);
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit());

        let mut app = self::app(Algorithm::BubbleSort);
        app.handle_key(KeyCode::Esc);
        assert!(app.should_quit());
    }

    #[test]
    fn test_space_toggles_playback() {
        let mut app = app(Algorithm::InsertionSort);
        app.handle_key(KeyCode::Char(' '));
        assert!(app.playback.is_playing());
        app.handle_key(KeyCode::Char(' '));
        assert!(!app.playback.is_playing());
        assert_eq!(app.playback.position(), 0);
    }

    #[test]
    fn test_step_keys() {
        let mut app = app(Algorithm::SelectionSort);
        app.handle_key(KeyCode::Char('n'));
        app.handle_key(KeyCode::Right);
        assert_eq!(app.playback.position(), 2);
        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.playback.position(), 0);
    }

    #[test]
    fn test_speed_keys() {
        let mut app = app(Algorithm::BubbleSort);
        app.handle_key(KeyCode::Char('+'));
        assert!((app.playback.speed() - 2.0).abs() < f64::EPSILON);
        app.handle_key(KeyCode::Char('-'));
        app.handle_key(KeyCode::Char('-'));
        assert!((app.playback.speed() - 0.5).abs() < f64::EPSILON);
        app.handle_key(KeyCode::Char('4'));
        assert!((app.playback.speed() - 4.0).abs() < f64::EPSILON);
        app.handle_key(KeyCode::Char('9'));
        assert!((app.playback.speed() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completion_notice_once() {
        let mut app = app(Algorithm::BinarySearch);
        app.handle_key(KeyCode::Char(' '));
        let mut completions = 0;
        for _ in 0..100 {
            if matches!(app.tick(), TickOutcome::RunComplete { .. }) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(app.notice.as_deref(), Some("Run complete: found"));

        app.handle_key(KeyCode::Char('r'));
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_regenerate_uses_new_seed() {
        let mut app = app(Algorithm::BubbleSort);
        let before = app.current_step().unwrap().clone();
        app.handle_key(KeyCode::Char('g'));
        assert_eq!(app.seed(), 1);
        assert_eq!(app.input.random, Some(REGENERATE_LEN.to_string()));
        assert_ne!(app.current_step().unwrap(), &before);
        assert_eq!(app.playback.position(), 0);
    }

    #[test]
    fn test_cycle_algorithm() {
        let mut app = app(Algorithm::BinarySearch);
        app.handle_key(KeyCode::Char('a'));
        assert_eq!(app.algorithm, Algorithm::BfsPathfinding);
        assert!(app.current_step().unwrap().subject().as_grid().is_some());
        app.handle_key(KeyCode::Char('a'));
        assert_eq!(app.algorithm, Algorithm::BubbleSort);
    }

    #[test]
    fn test_cycle_skips_algorithm_with_bad_input() {
        let input = RawInput {
            grid: Some("0x0".into()),
            ..RawInput::default()
        };
        let mut app = ViewerApp::new(Algorithm::BinarySearch, input, VizConfig::default());
        app.handle_key(KeyCode::Char('a'));

        assert_eq!(app.algorithm, Algorithm::BubbleSort);
        let shown = app.playback.buffer().and_then(TraceBuffer::algorithm);
        assert_eq!(shown, Some(Algorithm::BubbleSort));
        assert!(app.error.is_none());
        assert!(app.notice.as_deref().unwrap().contains("BFS Pathfinding"));
    }

    #[test]
    fn test_cycle_keeps_algorithm_when_nothing_generates() {
        let mut app = app(Algorithm::InsertionSort);
        app.handle_key(KeyCode::Char('n'));
        app.input.values = Some("x".into());
        app.input.grid = Some("x".into());

        assert!(!app.cycle_algorithm());
        assert_eq!(app.algorithm, Algorithm::InsertionSort);
        let shown = app.playback.buffer().and_then(TraceBuffer::algorithm);
        assert_eq!(shown, Some(Algorithm::InsertionSort));
        assert_eq!(app.playback.position(), 1);
        assert!(app.error.is_some());
    }

    #[test]
    fn test_regenerate_recovers_from_bad_seed() {
        let input = RawInput {
            random: Some("5".into()),
            seed: Some("oops".into()),
            ..RawInput::default()
        };
        let mut app = ViewerApp::new(Algorithm::BubbleSort, input, VizConfig::default());
        assert!(app.error.is_some());
        assert!(app.regenerate());
        assert_eq!(app.seed(), 1);
        assert!(app.error.is_none());
    }

    #[test]
    fn test_generate_error_keeps_previous_trace() {
        let mut app = app(Algorithm::BubbleSort);
        app.handle_key(KeyCode::Char('n'));
        app.input.values = Some("1,oops".into());
        assert!(!app.generate());
        assert!(app.error.as_deref().unwrap().contains("oops"));
        assert_eq!(app.playback.position(), 1);
    }

    #[test]
    fn test_status_line() {
        let app = app(Algorithm::BubbleSort);
        assert!(app.status_line().starts_with("Step 1/"));
    }

    #[test]
    fn test_unknown_key_ignored() {
        let mut app = app(Algorithm::BubbleSort);
        app.handle_key(KeyCode::Char('z'));
        assert_eq!(app.playback.position(), 0);
        assert!(!app.should_quit());
    }
}
