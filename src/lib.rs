//! # algoscope
//!
//! Step-traced sorting and search algorithms with a deterministic playback
//! controller.
//!
//! - Every algorithm is a [`Tracer`](trace::Tracer) producing a lazy,
//!   restartable sequence of [`Step`](trace::Step)s.
//! - A [`TraceBuffer`](buffer::TraceBuffer) materializes one run.
//! - A [`PlaybackController`](playback::PlaybackController) walks the buffer:
//!   play, pause, step, reset and speed, driven by an external tick.
//!
//! ## Example
//!
//! ```rust
//! use algoscope::prelude::*;
//!
//! let buffer = TraceBuffer::materialize(
//!     Algorithm::BubbleSort.tracer(),
//!     &TraceInput::Values(vec![5, 2, 4, 1, 3]),
//!     &LimitsConfig::default(),
//! )
//! .unwrap();
//!
//! let mut playback = PlaybackController::default();
//! playback.attach(buffer);
//! playback.play();
//! while playback.is_playing() {
//!     playback.tick();
//! }
//! assert_eq!(playback.current_step().unwrap().label(), "done");
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
    clippy::needless_range_loop,   // Sometimes range loops are clearer
)]

pub mod buffer;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod playback;
pub mod render;
pub mod trace;
pub mod tracers;
pub mod tui;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::buffer::{AuditViolation, TraceBuffer};
    pub use crate::config::{LimitsConfig, PlaybackConfig, VizConfig, VizConfigBuilder};
    pub use crate::error::{VizError, VizResult};
    pub use crate::input::{RawInput, TraceRequest};
    pub use crate::playback::{PlaybackController, PlaybackMode, TickOutcome};
    pub use crate::render::{Renderer, TextRenderer};
    pub use crate::trace::{
        metric, Algorithm, Cell, Grid, Highlight, InputKind, Metrics, Step, Subject, TraceInput,
        Tracer,
    };
}

/// Re-export for public API
pub use error::{VizError, VizResult};
