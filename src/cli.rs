use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

/// In-memory task board.
/// Starts from two sample tasks, an empty board (--empty) or an exported
/// file (--import); nothing is saved unless you run `export`.
#[derive(Parser)]
#[command(name = "tb", version, about = "In-memory task board")]
pub struct Cli {
    /// Start from the tasks in this JSON file.
    #[arg(long, value_name = "FILE")]
    pub import: Option<PathBuf>,

    /// Start with no tasks instead of the samples.
    #[arg(long, conflicts_with = "import")]
    pub empty: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Mode>,
}

#[derive(Subcommand)]
pub enum Mode {
    /// Interactive board reading commands from stdin (default).
    Shell,

    /// Run the board commands in a file, one per line, then exit.
    Run {
        /// Script path. Blank lines and lines starting with '#' are skipped.
        script: PathBuf,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Log level implied by the verbosity flags.
pub fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr log subscriber.
pub fn init_tracing(verbose: u8, quiet: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tb={}", log_level(verbose, quiet))));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(log_level(0, false), "warn");
        assert_eq!(log_level(1, false), "info");
        assert_eq!(log_level(2, false), "debug");
        assert_eq!(log_level(5, false), "trace");
        assert_eq!(log_level(2, true), "error");
    }

    #[test]
    fn import_and_empty_conflict() {
        assert!(Cli::try_parse_from(["tb", "--empty", "--import", "x.json"]).is_err());
        let cli = Cli::try_parse_from(["tb", "-vv", "run", "script.tb"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Mode::Run { .. })));
    }
}
