//! Playback state machine.
//!
//! A [`PlaybackController`] picks the current Step of an attached
//! [`TraceBuffer`] and decides whether playback advances on the next tick.
//! It never sleeps: the driving loop waits [`PlaybackController::tick_interval`]
//! between calls to [`PlaybackController::tick`].
//!
//! ```text
//!            attach / reset               play (position < len-1)
//!   Idle ─────────────────────▶ Paused ─────────────────────────▶ Playing
//!                                 ▲  ◀──── pause / step ────────────  │
//!                                 └──────── tick onto last Step ──────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};

use crate::buffer::TraceBuffer;
use crate::config::PlaybackConfig;
use crate::trace::Step;

/// Controller mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// No buffer attached.
    Idle,
    /// Buffer attached, not advancing.
    Paused,
    /// Advancing one Step per tick.
    Playing,
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Paused => "paused",
            Self::Playing => "playing",
        })
    }
}

/// Result of one [`PlaybackController::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing changed.
    Ignored,
    /// Moved to `position`.
    Advanced {
        /// New position.
        position: usize,
    },
    /// Moved onto the last Step and paused. Reported once per run.
    RunComplete {
        /// Index of the last Step.
        position: usize,
    },
}

impl TickOutcome {
    /// Whether the position moved.
    #[must_use]
    pub const fn advanced(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Play/pause/step/reset over a materialized trace.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    config: PlaybackConfig,
    buffer: Option<TraceBuffer>,
    position: usize,
    mode: PlaybackMode,
    speed: f64,
    completion_armed: bool,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

impl PlaybackController {
    /// Create an idle controller at speed 1.0 (clamped to the configured range).
    #[must_use]
    pub fn new(config: PlaybackConfig) -> Self {
        let speed = clamp_speed(1.0, &config).unwrap_or(1.0);
        Self {
            config,
            buffer: None,
            position: 0,
            mode: PlaybackMode::Idle,
            speed,
            completion_armed: false,
        }
    }

    /// Attach a freshly materialized buffer and rewind to its first Step.
    ///
    /// An empty buffer is ignored and the previous state is kept. Returns
    /// whether the buffer was attached.
    pub fn attach(&mut self, buffer: TraceBuffer) -> bool {
        if buffer.is_empty() {
            debug!("ignoring empty buffer");
            return false;
        }
        debug!(steps = buffer.len(), algorithm = ?buffer.algorithm(), "buffer attached");
        self.buffer = Some(buffer);
        self.position = 0;
        self.mode = PlaybackMode::Paused;
        self.completion_armed = true;
        true
    }

    /// Start advancing on ticks. No-op unless paused before the last Step.
    pub fn play(&mut self) -> bool {
        if self.mode != PlaybackMode::Paused || !self.has_next() {
            return false;
        }
        self.mode = PlaybackMode::Playing;
        trace!(position = self.position, "play");
        true
    }

    /// Stop advancing. Idempotent.
    pub fn pause(&mut self) -> bool {
        if self.mode != PlaybackMode::Playing {
            return false;
        }
        self.mode = PlaybackMode::Paused;
        trace!(position = self.position, "pause");
        true
    }

    /// Play if paused, pause if playing.
    pub fn toggle(&mut self) -> bool {
        match self.mode {
            PlaybackMode::Playing => self.pause(),
            _ => self.play(),
        }
    }

    /// Pause and advance exactly one Step. No-op at the last Step or with
    /// no buffer.
    pub fn step(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.mode = PlaybackMode::Paused;
        self.position += 1;
        trace!(position = self.position, "step");
        true
    }

    /// Rewind to the first Step and pause. Stays idle without a buffer.
    pub fn reset(&mut self) -> bool {
        if self.buffer.is_none() {
            return false;
        }
        self.position = 0;
        self.mode = PlaybackMode::Paused;
        self.completion_armed = true;
        trace!("reset");
        true
    }

    /// Advance one Step if playing.
    ///
    /// Reaching the last Step pauses playback and reports
    /// [`TickOutcome::RunComplete`] once; later runs need `attach` or
    /// `reset` to report again.
    pub fn tick(&mut self) -> TickOutcome {
        if self.mode != PlaybackMode::Playing {
            return TickOutcome::Ignored;
        }
        let last = self.len().saturating_sub(1);
        self.position = (self.position + 1).min(last);

        if self.position < last {
            return TickOutcome::Advanced {
                position: self.position,
            };
        }

        self.mode = PlaybackMode::Paused;
        if self.completion_armed {
            self.completion_armed = false;
            debug!(position = self.position, "run complete");
            TickOutcome::RunComplete {
                position: self.position,
            }
        } else {
            TickOutcome::Advanced {
                position: self.position,
            }
        }
    }

    /// Set the speed multiplier, clamped to the configured range.
    ///
    /// NaN, infinities and anything that clamps to a non-positive speed are
    /// ignored. Mode and position never change. Returns the speed in effect.
    pub fn set_speed(&mut self, multiplier: f64) -> f64 {
        if let Some(speed) = clamp_speed(multiplier, &self.config) {
            self.speed = speed;
            trace!(speed = self.speed, "speed");
        }
        self.speed
    }

    /// Double the speed.
    pub fn speed_up(&mut self) -> f64 {
        self.set_speed(self.speed * 2.0)
    }

    /// Halve the speed.
    pub fn slow_down(&mut self) -> f64 {
        self.set_speed(self.speed / 2.0)
    }

    /// Switch to the `index`-th configured speed preset.
    pub fn apply_preset(&mut self, index: usize) -> bool {
        match self.config.presets.get(index) {
            Some(&preset) => {
                self.set_speed(preset);
                true
            }
            None => false,
        }
    }

    /// Delay between ticks: `base_delay / speed`, never below the minimum
    /// interval.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.raw_tick_interval().max(self.config.min_interval())
    }

    /// `base_delay / speed` before the minimum interval is applied.
    ///
    /// Saturates at `Duration::MAX` for speeds too small to represent.
    #[must_use]
    pub fn raw_tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.config.base_delay().as_secs_f64() / self.speed)
            .unwrap_or(Duration::MAX)
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Whether ticks currently advance.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.mode == PlaybackMode::Playing
    }

    /// Index of the current Step.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Current speed multiplier.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Playback settings in use.
    #[must_use]
    pub const fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Attached buffer, if any.
    #[must_use]
    pub const fn buffer(&self) -> Option<&TraceBuffer> {
        self.buffer.as_ref()
    }

    /// Number of Steps in the attached buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.as_ref().map_or(0, TraceBuffer::len)
    }

    /// Whether no Steps are available.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The Step at the current position.
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        self.buffer.as_ref()?.get(self.position)
    }

    /// Whether `play` would start playback.
    #[must_use]
    pub fn can_play(&self) -> bool {
        self.mode == PlaybackMode::Paused && self.has_next()
    }

    /// Whether `step` would advance.
    #[must_use]
    pub fn can_step(&self) -> bool {
        self.has_next()
    }

    /// Fraction of the run shown, from 0.0 to 1.0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.position as f64 / self.len().saturating_sub(1).max(1) as f64
    }

    /// One-based frame counter, e.g. `"3/17"`.
    #[must_use]
    pub fn frame_label(&self) -> String {
        if self.is_empty() {
            "0/0".to_string()
        } else {
            format!("{}/{}", self.position + 1, self.len())
        }
    }

    fn has_next(&self) -> bool {
        self.position + 1 < self.len()
    }
}

/// Clamp into the configured range; `None` unless the result is a positive
/// finite speed. Unvalidated configs may carry a zero or negative range.
fn clamp_speed(multiplier: f64, config: &PlaybackConfig) -> Option<f64> {
    if !multiplier.is_finite() {
        return None;
    }
    let speed = multiplier.max(config.min_speed).min(config.max_speed);
    (speed.is_finite() && speed > 0.0).then_some(speed)
}
