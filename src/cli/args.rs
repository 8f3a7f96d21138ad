//! CLI argument definitions
//!
//! All Clap derive structs for `trafficlight` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Randomized traffic signal with blocking observers.
#[derive(Parser, Debug)]
#[command(name = "trafficlight", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "TRAFFICLIGHT_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "TRAFFICLIGHT_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a traffic light with a vehicle waiting for green.
    Run(RunArgs),

    /// Validate configuration files without running a light.
    Validate(ValidateArgs),
}

// ============================================================================
// Run Command
// ============================================================================

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "TRAFFICLIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for cycle draws (overrides the config file).
    #[arg(long, env = "TRAFFICLIGHT_SEED")]
    pub seed: Option<u64>,

    /// Shortest cycle, e.g. `4s` (overrides the config file).
    #[arg(long, value_parser = parse_duration, env = "TRAFFICLIGHT_MIN_CYCLE")]
    pub min_cycle: Option<Duration>,

    /// Longest cycle, exclusive, e.g. `6s` (overrides the config file).
    #[arg(long, value_parser = parse_duration, env = "TRAFFICLIGHT_MAX_CYCLE")]
    pub max_cycle: Option<Duration>,

    /// Idle yield of the timer loop and waiters (overrides the config file).
    #[arg(long, value_parser = parse_duration)]
    pub poll_interval: Option<Duration>,

    /// How often to report the current phase.
    #[arg(long, value_parser = parse_duration, default_value = "1s")]
    pub report_interval: Duration,

    /// Stop after this long instead of waiting for Ctrl+C.
    #[arg(long, value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Serve Prometheus metrics on `127.0.0.1:<port>`.
    #[arg(long, env = "TRAFFICLIGHT_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

// ============================================================================
// Validate Command
// ============================================================================

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Parses a humantime duration such as `250ms` or `1m 30s`.
fn parse_duration(raw: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(raw)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["trafficlight", "run"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(args) => args,
            Commands::Validate(_) => panic!("Expected RunArgs"),
        }
    }

    #[test]
    fn test_run_without_arguments() {
        let args = run_args(&[]);
        assert!(args.config.is_none());
        assert!(args.duration.is_none());
        assert_eq!(args.report_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_run_duration_overrides() {
        let args = run_args(&[
            "--min-cycle",
            "20ms",
            "--max-cycle",
            "30ms",
            "--duration",
            "2s",
            "--seed",
            "7",
        ]);
        assert_eq!(args.min_cycle, Some(Duration::from_millis(20)));
        assert_eq!(args.max_cycle, Some(Duration::from_millis(30)));
        assert_eq!(args.duration, Some(Duration::from_secs(2)));
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn test_run_rejects_bad_duration() {
        let cli = Cli::try_parse_from(["trafficlight", "run", "--duration", "forever"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_validate_requires_files() {
        let cli = Cli::try_parse_from(["trafficlight", "validate"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_validate_json_format() {
        let cli =
            Cli::try_parse_from(["trafficlight", "validate", "a.yaml", "--format", "json"]).unwrap();
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.files.len(), 1);
                assert_eq!(args.format, OutputFormat::Json);
            }
            Commands::Run(_) => panic!("Expected ValidateArgs"),
        }
    }

    #[test]
    fn test_help_output() {
        let result = Cli::try_parse_from(["trafficlight", "--help"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "trafficlight",
            "run",
            "-vv",
            "--color",
            "never",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
