//! TUI module for algoscope.
//!
//! Reusable viewer state and key handling, extracted from the binary so it
//! can be tested. Terminal I/O stays in `src/bin/algoscope_tui.rs`.

#[cfg(feature = "tui")]
pub mod viewer_app;
