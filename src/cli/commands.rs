//! CLI command handlers.
//!
//! Each command has a pure `*_session` function returning data (tested in
//! `tests.rs`) and a thin wrapper that prints and picks the exit code.

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::thread;

use tracing::{debug, info};

use crate::buffer::{AuditViolation, TraceBuffer};
use crate::config::VizConfig;
use crate::error::{VizError, VizResult};
use crate::input::parse_number;
use crate::playback::{PlaybackController, TickOutcome};
use crate::render::{Renderer, TextRenderer};
use crate::trace::Algorithm;

use super::output::{format_algorithm_list, hex, print_help, print_version};
use super::{Args, Command, Session};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Trace { session, json } => trace_command(&session, json),
        Command::Play {
            session,
            speed,
            instant,
        } => play_command(&session, speed.as_deref(), instant),
        Command::Verify { session, runs } => verify_command(&session, runs.as_deref()),
        Command::List => {
            print!("{}", format_algorithm_list());
            ExitCode::SUCCESS
        }
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Load the session's configuration file, or the defaults.
///
/// # Errors
///
/// Returns error if the file cannot be read, parsed or validated.
pub fn load_config(path: Option<&Path>) -> VizResult<VizConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            VizConfig::load(path)
        }
        None => Ok(VizConfig::default()),
    }
}

/// Prepare input and materialize the session's trace.
///
/// # Errors
///
/// Returns configuration, input or materialization errors.
pub fn trace_session(session: &Session) -> VizResult<TraceBuffer> {
    let config = load_config(session.config_path.as_deref())?;
    let request = session.input.prepare(session.algorithm, &config.limits)?;
    request.materialize(&config.limits)
}

fn report_error(e: &VizError) -> ExitCode {
    eprintln!("Error: {e}");
    if e.is_input_error() {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn trace_command(session: &Session, json: bool) -> ExitCode {
    let buffer = match trace_session(session) {
        Ok(buffer) => buffer,
        Err(e) => return report_error(&e),
    };

    if json {
        return match serde_json::to_string_pretty(buffer.steps()) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => report_error(&VizError::serialization(e.to_string())),
        };
    }

    let renderer = TextRenderer::default();
    let total = buffer.len();
    for (i, step) in buffer.iter().enumerate() {
        println!("{}\n", renderer.render_frame(step, &format!("{}/{total}", i + 1)));
    }
    ExitCode::SUCCESS
}

/// Outcome of a headless playback run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaySummary {
    /// Frames written, including the first.
    pub frames: usize,
    /// Completion notices reported.
    pub completions: usize,
    /// Position when playback stopped.
    pub final_position: usize,
}

/// Play a buffer to its end through a [`PlaybackController`], writing each
/// frame to `out`.
///
/// Sleeps the controller's tick interval between ticks unless `instant`.
///
/// # Errors
///
/// Returns `Io` if writing fails.
pub fn play_session<W: Write>(
    buffer: TraceBuffer,
    config: &VizConfig,
    speed: Option<f64>,
    instant: bool,
    out: &mut W,
) -> VizResult<PlaySummary> {
    let renderer = TextRenderer::default();
    let mut controller = PlaybackController::new(config.playback.clone());
    if let Some(speed) = speed {
        controller.set_speed(speed);
    }
    if !controller.attach(buffer) {
        return Ok(PlaySummary {
            frames: 0,
            completions: 0,
            final_position: 0,
        });
    }
    info!(
        speed = controller.speed(),
        interval_ms = controller.tick_interval().as_millis(),
        "playing"
    );

    let mut frames = 0;
    let mut completions = 0;
    write_frame(&controller, &renderer, out)?;
    frames += 1;

    controller.play();
    while controller.is_playing() {
        if !instant {
            thread::sleep(controller.tick_interval());
        }
        let outcome = controller.tick();
        if outcome.advanced() {
            write_frame(&controller, &renderer, out)?;
            frames += 1;
        }
        if let TickOutcome::RunComplete { .. } = outcome {
            completions += 1;
            let label = controller.current_step().map_or("", |s| s.label());
            writeln!(out, "Run complete: {label}")?;
        }
    }

    Ok(PlaySummary {
        frames,
        completions,
        final_position: controller.position(),
    })
}

fn write_frame<W: Write>(
    controller: &PlaybackController,
    renderer: &TextRenderer,
    out: &mut W,
) -> VizResult<()> {
    if let Some(step) = controller.current_step() {
        writeln!(out, "{}\n", renderer.render_frame(step, &controller.frame_label()))?;
    }
    Ok(())
}

/// Runs compared by `verify` when `--runs` is not given.
pub const DEFAULT_RUNS: usize = 3;

/// Parse `--speed` text. Speeds must be finite; range clamping is left to
/// the controller.
///
/// # Errors
///
/// Returns `InvalidInput` for text that is not a finite number.
pub fn parse_speed(text: Option<&str>) -> VizResult<Option<f64>> {
    let Some(text) = text else {
        return Ok(None);
    };
    let speed: f64 = parse_number("--speed", text)?;
    if speed.is_finite() {
        Ok(Some(speed))
    } else {
        Err(VizError::invalid_input(format!("--speed: '{text}' is not finite")))
    }
}

/// Parse `--runs` text, defaulting to [`DEFAULT_RUNS`].
///
/// # Errors
///
/// Returns `InvalidInput` for text that is not an unsigned integer.
pub fn parse_runs(text: Option<&str>) -> VizResult<usize> {
    text.map_or(Ok(DEFAULT_RUNS), |text| parse_number("--runs", text))
}

fn play_command(session: &Session, speed: Option<&str>, instant: bool) -> ExitCode {
    let speed = match parse_speed(speed) {
        Ok(speed) => speed,
        Err(e) => return report_error(&e),
    };
    let result = load_config(session.config_path.as_deref()).and_then(|config| {
        let request = session.input.prepare(session.algorithm, &config.limits)?;
        let buffer = request.materialize(&config.limits)?;
        play_session(buffer, &config, speed, instant, &mut io::stdout().lock())
    });
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => report_error(&e),
    }
}

/// Result of materializing the same trace several times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Algorithm verified.
    pub algorithm: Algorithm,
    /// Steps in the reference run.
    pub steps: usize,
    /// Fingerprint of each run, reference first.
    pub fingerprints: Vec<[u8; 32]>,
    /// Protocol violations in the reference run.
    pub violations: Vec<AuditViolation>,
}

impl VerifyReport {
    /// Whether every run matched the reference.
    #[must_use]
    pub fn reproducible(&self) -> bool {
        self.fingerprints.windows(2).all(|w| w[0] == w[1])
    }

    /// Whether the trace is reproducible and well-formed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.reproducible() && self.violations.is_empty()
    }
}

/// Materialize the session `runs` times (at least once) and audit the
/// reference run.
///
/// # Errors
///
/// Returns configuration, input, materialization or serialization errors.
pub fn verify_session(session: &Session, runs: usize) -> VizResult<VerifyReport> {
    let config = load_config(session.config_path.as_deref())?;
    let request = session.input.prepare(session.algorithm, &config.limits)?;

    let reference = request.materialize(&config.limits)?;
    let mut fingerprints = vec![reference.fingerprint()?];
    for _ in 1..runs.max(1) {
        fingerprints.push(request.materialize(&config.limits)?.fingerprint()?);
    }

    Ok(VerifyReport {
        algorithm: session.algorithm,
        steps: reference.len(),
        fingerprints,
        violations: reference.audit(),
    })
}

fn verify_command(session: &Session, runs: Option<&str>) -> ExitCode {
    let report = match parse_runs(runs).and_then(|runs| verify_session(session, runs)) {
        Ok(report) => report,
        Err(e) => return report_error(&e),
    };

    println!("Verifying {} ({} steps)", report.algorithm, report.steps);
    let reference = report.fingerprints.first().copied().unwrap_or_default();
    for (i, fp) in report.fingerprints.iter().enumerate() {
        let sym = if *fp == reference { "=" } else { "!" };
        println!("  Run {}: {} {sym}", i + 1, hex(fp));
    }
    if report.violations.is_empty() {
        println!("  Audit: clean");
    } else {
        println!("  Audit: {} violation(s)", report.violations.len());
        for v in &report.violations {
            println!("    - {v}");
        }
    }

    if report.passed() {
        println!("✓ Result: PASSED");
        ExitCode::SUCCESS
    } else {
        println!("✗ Result: FAILED");
        ExitCode::from(1)
    }
}
