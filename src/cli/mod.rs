//! CLI module for algoscope.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested.
//! The entry point `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, Session};
pub use commands::{
    load_config, parse_runs, parse_speed, play_session, run_cli, trace_session, verify_session,
    PlaySummary, VerifyReport, DEFAULT_RUNS,
};
pub use output::{format_algorithm_list, hex, print_help, print_version, version_string};
