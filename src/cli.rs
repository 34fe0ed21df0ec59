//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::cache::Policy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// iptally - synthetic IP access-log generator and analyzer
///
/// Generate a log of uniform-random IPv4 addresses drawn from a fixed
/// candidate pool, tally occurrences per address, or replay the log
/// through LRU/ARC cache simulations.
///
/// Examples:
///   iptally generate --lines 100000 --output data/ips_uniform.log
///   iptally generate --seed 42 --pool-size 1000
///   iptally tally --input data/ips_uniform.log
///   iptally simulate --capacity 100 --policy both
///   iptally run --seed 42
///   iptally --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Generate a default .iptally.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .iptally.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a synthetic IP log file
    Generate(GenerateArgs),
    /// Count occurrences per address in a log file
    Tally(TallyArgs),
    /// Replay a log file through cache simulations and report hit rates
    Simulate(SimulateArgs),
    /// Generate a log and tally it in one process
    Run(RunArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Number of candidate addresses in the pool
    ///
    /// The log is sampled uniformly (with replacement) from this pool.
    #[arg(long, value_name = "COUNT")]
    pub pool_size: Option<usize>,

    /// Number of log lines to write
    #[arg(long, value_name = "COUNT")]
    pub lines: Option<u64>,

    /// Output log file path
    ///
    /// The parent directory must already exist.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Seed for reproducible output
    ///
    /// The same seed produces the same pool and the same line sequence.
    /// Without a seed the generator is entropy-seeded and every run differs.
    #[arg(long, value_name = "SEED", env = "IPTALLY_SEED")]
    pub seed: Option<u64>,
}

/// Arguments for the `tally` subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TallyArgs {
    /// Input log file path
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Skip lines whose leading token is empty
    ///
    /// By default a blank line is counted under the empty-string key,
    /// matching the literal split-and-take-first-token rule.
    #[arg(long)]
    pub skip_blank: bool,
}

/// Arguments for the `simulate` subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SimulateArgs {
    /// Input log file path
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Cache capacity in entries
    #[arg(long, value_name = "COUNT")]
    pub capacity: Option<usize>,

    /// Cache policy to simulate (lru, arc, both)
    #[arg(long, value_enum, value_name = "POLICY")]
    pub policy: Option<Policy>,
}

/// Arguments for the `run` subcommand (generate, then tally).
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub generate: GenerateArgs,

    /// Skip lines whose leading token is empty during the tally step
    #[arg(long)]
    pub skip_blank: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.command.is_none() {
            return Err("No command given. Try 'iptally generate' or 'iptally --help'".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Some(Command::Generate(g)) => validate_generate(g)?,
            Some(Command::Run(r)) => validate_generate(&r.generate)?,
            Some(Command::Simulate(s)) => {
                if s.capacity == Some(0) {
                    return Err("Cache capacity must be at least 1".to_string());
                }
            }
            _ => {}
        }

        // Validate config path if provided
        if let Some(ref config_path) = self.config {
            if !config_path.exists() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

fn validate_generate(args: &GenerateArgs) -> Result<(), String> {
    if args.pool_size == Some(0) {
        return Err("Pool size must be at least 1".to_string());
    }
    Ok(())
}
