//! iptally - Synthetic IP Log Toolkit
//!
//! A CLI tool that generates synthetic access logs of random IPv4
//! addresses, tallies occurrences per address, and replays logs through
//! LRU/ARC cache simulations.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, filesystem failure)

mod cache;
mod cli;
mod config;
mod generator;
mod report;
mod tally;

use anyhow::{Context, Result};
use cli::{Args, Command};
use config::Config;
use generator::GenerateOptions;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    info!("iptally v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .iptally.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".iptally.toml");

    if path.exists() {
        eprintln!("⚠️  .iptally.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .iptally.toml")?;

    println!("✅ Created .iptally.toml with default settings.");
    println!("   Edit it to customize pool size, line count, paths, and cache policy.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Dispatch the selected subcommand.
fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    match &args.command {
        Some(Command::Generate(_)) => cmd_generate(&config, &args),
        Some(Command::Tally(_)) => cmd_tally(&config),
        Some(Command::Simulate(_)) => cmd_simulate(&config),
        Some(Command::Run(_)) => {
            // Generate and tally in one process; the file is fully
            // written and flushed before the tally opens it.
            cmd_generate(&config, &args)?;
            cmd_tally(&config)
        }
        None => Ok(()),
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .iptally.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Run the generator with the resolved configuration.
fn cmd_generate(config: &Config, args: &Args) -> Result<()> {
    let start = Instant::now();
    let gen = &config.generator;

    if !args.quiet {
        println!(
            "📝 Generating {} lines from a pool of {} addresses",
            gen.lines, gen.pool_size
        );
        match gen.seed {
            Some(seed) => println!("   Seed: {}", seed),
            None => println!("   Seed: entropy (output differs every run)"),
        }
        println!("   Output: {}", gen.output.display());
    }

    let options = GenerateOptions {
        pool_size: gen.pool_size,
        lines: gen.lines,
        seed: gen.seed,
        show_progress: !args.quiet,
    };

    let summary = generator::generate(&gen.output, &options)?;

    if !args.quiet {
        println!(
            "✅ Wrote {} lines to {} in {:.1}s",
            summary.lines_written,
            gen.output.display(),
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

/// Tally the configured input file and print the count table.
fn cmd_tally(config: &Config) -> Result<()> {
    let options = tally::TallyOptions {
        skip_blank: config.tally.skip_blank,
    };

    let result = tally::tally_path(&config.tally.input, options)?;
    info!(
        "Tallied {} lines from {}",
        result.lines_read(),
        config.tally.input.display()
    );

    print!("{}", report::render_tally(&result));
    Ok(())
}

/// Replay the configured input through the selected cache policies.
fn cmd_simulate(config: &Config) -> Result<()> {
    let capacity = config.cache.capacity;
    let input = &config.cache.input;

    let run_lru = matches!(config.cache.policy, cache::Policy::Lru | cache::Policy::Both);
    let run_arc = matches!(config.cache.policy, cache::Policy::Arc | cache::Policy::Both);

    if run_lru {
        println!("Running LRU test...");
        let stats = cache::replay_lru(open_log(input)?, capacity)?;
        print!("{}", report::render_replay(&stats));
    }

    if run_lru && run_arc {
        println!("================");
    }

    if run_arc {
        println!("Running ARC test...");
        let stats = cache::replay_arc(open_log(input)?, capacity)?;
        print!("{}", report::render_replay(&stats));
    }

    Ok(())
}

fn open_log(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    Ok(BufReader::new(file))
}
