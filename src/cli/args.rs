//! CLI argument parsing.
//!
//! Hand-rolled so that parsing is a pure function of the argument list and
//! can be tested without a process.

use std::path::PathBuf;

use crate::input::RawInput;
use crate::trace::Algorithm;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// What to trace and with which settings. Shared by the trace commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Algorithm to run.
    pub algorithm: Algorithm,
    /// Raw input flags.
    pub input: RawInput,
    /// Optional YAML configuration file.
    pub config_path: Option<PathBuf>,
}

impl Session {
    /// Session with default input and configuration.
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            input: RawInput::default(),
            config_path: None,
        }
    }

    /// Parse `<program> [algorithm] [input flags]`, the viewer's command
    /// line. The algorithm defaults to bubble sort; `None` means it did not
    /// parse.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        let (algorithm, start) = match args.get(1) {
            Some(name) if !name.starts_with("--") => match name.parse::<Algorithm>() {
                Ok(algorithm) => (algorithm, 2),
                Err(e) => {
                    eprintln!("Error: {e}");
                    return None;
                }
            },
            _ => (Algorithm::BubbleSort, 1),
        };
        let mut session = Self::new(algorithm);
        Args::parse_flags(&args, start, &mut session, |_, _| None);
        Some(session)
    }
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print every Step of a trace
    Trace {
        /// What to trace.
        session: Session,
        /// Emit JSON instead of text frames.
        json: bool,
    },
    /// Play a trace through the playback controller
    Play {
        /// What to trace.
        session: Session,
        /// Speed multiplier, as typed.
        speed: Option<String>,
        /// Skip the delay between ticks.
        instant: bool,
    },
    /// Check a trace is reproducible and well-formed
    Verify {
        /// What to trace.
        session: Session,
        /// Number of materializations to compare, as typed. Defaults to 3.
        runs: Option<String>,
    },
    /// List available algorithms
    List,
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// This method is testable as it accepts any iterator of strings,
    /// not just `std::env::args()`.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "trace" => Self::parse_trace_command(args),
            "play" => Self::parse_play_command(args),
            "verify" => Self::parse_verify_command(args),
            "list" => Command::List,
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    fn parse_trace_command(args: &[String]) -> Command {
        let Some(mut session) = Self::parse_algorithm("trace", args) else {
            return Command::Help;
        };
        let mut json = false;
        Self::parse_flags(args, 3, &mut session, |flag, _| match flag {
            "--json" => {
                json = true;
                Some(0)
            }
            _ => None,
        });
        Command::Trace { session, json }
    }

    fn parse_play_command(args: &[String]) -> Command {
        let Some(mut session) = Self::parse_algorithm("play", args) else {
            return Command::Help;
        };
        let mut speed = None;
        let mut instant = false;
        Self::parse_flags(args, 3, &mut session, |flag, value| match flag {
            "--speed" => {
                speed = Some(value.unwrap_or_default().to_string());
                Some(1)
            }
            "--instant" => {
                instant = true;
                Some(0)
            }
            _ => None,
        });
        Command::Play {
            session,
            speed,
            instant,
        }
    }

    fn parse_verify_command(args: &[String]) -> Command {
        let Some(mut session) = Self::parse_algorithm("verify", args) else {
            return Command::Help;
        };
        let mut runs = None;
        Self::parse_flags(args, 3, &mut session, |flag, value| match flag {
            "--runs" => {
                runs = Some(value.unwrap_or_default().to_string());
                Some(1)
            }
            _ => None,
        });
        Command::Verify { session, runs }
    }

    fn parse_algorithm(command: &str, args: &[String]) -> Option<Session> {
        let Some(name) = args.get(2) else {
            eprintln!("Error: '{command}' command requires an algorithm (see 'algoscope list')");
            return None;
        };
        match name.parse::<Algorithm>() {
            Ok(algorithm) => Some(Session::new(algorithm)),
            Err(e) => {
                eprintln!("Error: {e}");
                None
            }
        }
    }

    /// Walk the flags from `args[start]` on.
    ///
    /// Input flags are applied to `session`; anything else goes to `extra`,
    /// which returns how many values it consumed or `None` if it does not
    /// know the flag.
    fn parse_flags<F>(args: &[String], start: usize, session: &mut Session, mut extra: F)
    where
        F: FnMut(&str, Option<&str>) -> Option<usize>,
    {
        let mut i = start;
        while i < args.len() {
            let flag = args[i].as_str();
            let value = args.get(i + 1).map(String::as_str);
            let consumed = match flag {
                "--values" => {
                    session.input.values = value.map(str::to_string);
                    Some(1)
                }
                "--random" => {
                    session.input.random = Some(value.unwrap_or_default().to_string());
                    Some(1)
                }
                "--seed" => {
                    session.input.seed = Some(value.unwrap_or_default().to_string());
                    Some(1)
                }
                "--target" => {
                    session.input.target = Some(value.unwrap_or_default().to_string());
                    Some(1)
                }
                "--grid" => {
                    session.input.grid = value.map(str::to_string);
                    Some(1)
                }
                "--start" => {
                    session.input.start = value.map(str::to_string);
                    Some(1)
                }
                "--goal" => {
                    session.input.goal = value.map(str::to_string);
                    Some(1)
                }
                "--config" => {
                    session.config_path = value.map(PathBuf::from);
                    Some(1)
                }
                other => extra(other, value),
            };
            match consumed {
                Some(n) => i += 1 + n,
                None => {
                    eprintln!("Ignoring unknown option: {flag}");
                    i += 1;
                }
            }
        }
    }
}
