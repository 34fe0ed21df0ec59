//! Synthetic IP log generation.
//!
//! Builds a candidate pool of random IPv4 address strings, then writes a
//! log file where every line is one pool entry drawn uniformly at random
//! with replacement. The RNG is passed in explicitly so seeded runs are
//! fully reproducible.

use anyhow::{ensure, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::{debug, info};

/// Options controlling a generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Number of candidate addresses to synthesize.
    pub pool_size: usize,
    /// Number of log lines to write.
    pub lines: u64,
    /// Seed for the RNG. `None` means entropy-seeded.
    pub seed: Option<u64>,
    /// Whether to draw a progress bar while writing.
    pub show_progress: bool,
}

/// Summary of a completed generation run.
#[derive(Debug, Clone)]
pub struct GenerateSummary {
    /// Number of entries in the candidate pool (duplicates included).
    pub pool_size: usize,
    /// Number of lines written to the log file.
    pub lines_written: u64,
}

/// The fixed set of candidate addresses a log is sampled from.
///
/// Entries are synthesized once and never mutated. Duplicates are
/// permitted; the pool is a plain ordered sequence, not a set.
#[derive(Debug, Clone)]
pub struct AddressPool {
    entries: Vec<String>,
}

impl AddressPool {
    /// Synthesize a pool of `size` random IPv4 address strings.
    pub fn synthesize<R: Rng>(size: usize, rng: &mut R) -> Self {
        let entries = (0..size).map(|_| random_ipv4(rng)).collect();
        Self { entries }
    }

    /// Number of entries in the pool.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the pool contains the given address string.
    pub fn contains(&self, address: &str) -> bool {
        self.entries.iter().any(|e| e == address)
    }

    /// Draw one entry uniformly at random, with replacement.
    ///
    /// Panics if the pool is empty; callers validate `pool_size >= 1`.
    fn pick<R: Rng>(&self, rng: &mut R) -> &str {
        &self.entries[rng.gen_range(0..self.entries.len())]
    }
}

/// Generate a random dotted-decimal IPv4 address string.
pub fn random_ipv4<R: Rng>(rng: &mut R) -> String {
    let a = rng.gen::<u8>();
    let b = rng.gen::<u8>();
    let c = rng.gen::<u8>();
    let d = rng.gen::<u8>();
    Ipv4Addr::new(a, b, c, d).to_string()
}

/// Build an RNG from an optional seed.
pub fn rng_for_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Generate a log file at `output` according to `options`.
///
/// Creates or truncates the file. The output directory must already
/// exist; filesystem errors propagate to the caller.
pub fn generate(output: &Path, options: &GenerateOptions) -> Result<GenerateSummary> {
    let mut rng = rng_for_seed(options.seed);
    generate_with_rng(output, options, &mut rng)
}

/// Generate a log file using a caller-supplied RNG.
pub fn generate_with_rng<R: Rng>(
    output: &Path,
    options: &GenerateOptions,
    rng: &mut R,
) -> Result<GenerateSummary> {
    ensure!(options.pool_size >= 1, "Pool size must be at least 1");

    let pool = AddressPool::synthesize(options.pool_size, rng);
    debug!("Synthesized candidate pool of {} addresses", pool.len());

    let file = File::create(output)
        .with_context(|| format!("Failed to create log file: {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    let progress_bar = if options.show_progress {
        let pb = ProgressBar::new(options.lines);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    for _ in 0..options.lines {
        writeln!(writer, "{}", pool.pick(rng))
            .with_context(|| format!("Failed to write to log file: {}", output.display()))?;
        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush log file: {}", output.display()))?;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    info!(
        "Wrote {} lines to {} (pool of {})",
        options.lines,
        output.display(),
        pool.len()
    );

    Ok(GenerateSummary {
        pool_size: pool.len(),
        lines_written: options.lines,
    })
}
