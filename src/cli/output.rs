//! CLI output formatting.

use std::fmt::Write as _;

use crate::trace::Algorithm;

/// Version string with the embedded git hash when available.
#[must_use]
pub fn version_string() -> String {
    let version = option_env!("ALGOSCOPE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    match option_env!("GIT_HASH").filter(|h| !h.is_empty()) {
        Some(hash) => format!("algoscope {version} ({})", hash.get(..12).unwrap_or(hash)),
        None => format!("algoscope {version}"),
    }
}

/// Print version information.
pub fn print_version() {
    println!("{}", version_string());
}

/// Print help message.
pub fn print_help() {
    println!(
        r"algoscope - step-traced sorting and search algorithms

USAGE:
    algoscope <COMMAND> <ALGORITHM> [OPTIONS]

COMMANDS:
    trace <algo>            Print every step of the trace
        --json              Emit the steps as JSON

    play <algo>             Play the trace through the playback controller
        --speed <X>         Speed multiplier (0.25 - 16)
        --instant           Do not wait between ticks

    verify <algo>           Check the trace is reproducible and well-formed
        --runs <N>          Number of runs to compare (default: 3)

    list                    List available algorithms
    help                    Show this help message
    version                 Show version information

INPUT OPTIONS:
    --values <LIST>         Comma-separated integers (default: 5,2,4,1,3)
    --random <N>            N random values instead of --values
    --seed <S>              Seed for random values and grids (default: 0)
    --target <T>            Binary search target (default: 5)
    --grid <ROWS>           Grid rows separated by ';', 0 = open (default: random)
    --start <R,C>           BFS start cell (default: top-left)
    --goal <R,C>            BFS goal cell (default: bottom-right)
    --config <PATH>         YAML configuration file

EXAMPLES:
    algoscope trace bubble --values 5,2,4,1,3
    algoscope play insertion --random 12 --seed 7 --speed 4
    algoscope trace binary-search --values 9,3,7,1 --target 7 --json
    algoscope verify bfs --grid '0000;0110;0000' --start 0,0 --goal 2,3

Set RUST_LOG=debug to see materialization and playback events on stderr.
"
    );
}

/// Table of algorithms with their command-line names.
#[must_use]
pub fn format_algorithm_list() -> String {
    let mut out = String::from("Available algorithms:\n\n");
    for algo in Algorithm::ALL {
        let _ = writeln!(
            out,
            "  {:<15} {:<17} input: {:?}",
            algo.name(),
            algo.display_name(),
            algo.input_kind()
        );
    }
    out.push_str("\nUsage: algoscope trace <algorithm> [OPTIONS]\n");
    out
}

/// Lowercase hex of a fingerprint.
#[must_use]
pub fn hex(bytes: &[u8; 32]) -> String {
    blake3::Hash::from(*bytes).to_hex().to_string()
}
