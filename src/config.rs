//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.iptally.toml` files.

use crate::cache::Policy;
use crate::cli::{Args, Command, GenerateArgs, SimulateArgs, TallyArgs};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Generator settings.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Tally settings.
    #[serde(default)]
    pub tally: TallyConfig,

    /// Cache simulation settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Log generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of candidate addresses in the pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Number of log lines to write.
    #[serde(default = "default_lines")]
    pub lines: u64,

    /// Output log file path.
    #[serde(default = "default_log_path")]
    pub output: PathBuf,

    /// Seed for reproducible output. Unset means entropy-seeded.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            lines: default_lines(),
            output: default_log_path(),
            seed: None,
        }
    }
}

fn default_pool_size() -> usize {
    1000
}

fn default_lines() -> u64 {
    100_000
}

fn default_log_path() -> PathBuf {
    PathBuf::from("data/ips_uniform.log")
}

/// Tally settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyConfig {
    /// Input log file path.
    #[serde(default = "default_log_path")]
    pub input: PathBuf,

    /// Skip lines whose leading token is empty instead of counting
    /// them under the empty-string key.
    #[serde(default)]
    pub skip_blank: bool,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            input: default_log_path(),
            skip_blank: false,
        }
    }
}

/// Cache simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Input log file path.
    #[serde(default = "default_log_path")]
    pub input: PathBuf,

    /// Cache capacity in entries.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Which policy to simulate.
    #[serde(default)]
    pub policy: Policy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            input: default_log_path(),
            capacity: default_capacity(),
            policy: Policy::default(),
        }
    }
}

fn default_capacity() -> usize {
    100
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".iptally.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the CLI actually provides override the config.
    pub fn merge_with_args(&mut self, args: &Args) {
        match &args.command {
            Some(Command::Generate(g)) => self.merge_generate(g),
            Some(Command::Tally(t)) => self.merge_tally(t),
            Some(Command::Simulate(s)) => self.merge_simulate(s),
            Some(Command::Run(r)) => {
                self.merge_generate(&r.generate);
                // The pipeline tallies the file it just wrote.
                self.tally.input = self.generator.output.clone();
                if r.skip_blank {
                    self.tally.skip_blank = true;
                }
            }
            None => {}
        }
    }

    fn merge_generate(&mut self, args: &GenerateArgs) {
        if let Some(pool_size) = args.pool_size {
            self.generator.pool_size = pool_size;
        }
        if let Some(lines) = args.lines {
            self.generator.lines = lines;
        }
        if let Some(ref output) = args.output {
            self.generator.output = output.clone();
        }
        if let Some(seed) = args.seed {
            self.generator.seed = Some(seed);
        }
    }

    fn merge_tally(&mut self, args: &TallyArgs) {
        if let Some(ref input) = args.input {
            self.tally.input = input.clone();
        }
        if args.skip_blank {
            self.tally.skip_blank = true;
        }
    }

    fn merge_simulate(&mut self, args: &SimulateArgs) {
        if let Some(ref input) = args.input {
            self.cache.input = input.clone();
        }
        if let Some(capacity) = args.capacity {
            self.cache.capacity = capacity;
        }
        if let Some(policy) = args.policy {
            self.cache.policy = policy;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generator.pool_size, 1000);
        assert_eq!(config.generator.lines, 100_000);
        assert_eq!(config.generator.output, default_log_path());
        assert_eq!(config.generator.seed, None);
        assert_eq!(config.tally.input, default_log_path());
        assert!(!config.tally.skip_blank);
        assert_eq!(config.cache.capacity, 100);
        assert_eq!(config.cache.policy, Policy::Both);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[generator]
pool_size = 50
lines = 2000
output = "out/test.log"
seed = 42

[tally]
skip_blank = true

[cache]
capacity = 8
policy = "lru"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.generator.pool_size, 50);
        assert_eq!(config.generator.lines, 2000);
        assert_eq!(config.generator.output, PathBuf::from("out/test.log"));
        assert_eq!(config.generator.seed, Some(42));
        assert!(config.tally.skip_blank);
        // Unset sections/fields fall back to defaults
        assert_eq!(config.tally.input, default_log_path());
        assert_eq!(config.cache.capacity, 8);
        assert_eq!(config.cache.policy, Policy::Lru);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[generator]"));
        assert!(toml_str.contains("[tally]"));
        assert!(toml_str.contains("[cache]"));

        // Round-trips through the parser
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.generator.pool_size, 1000);
    }

    #[test]
    fn test_merge_generate_args() {
        let mut config = Config::default();
        let args = Args {
            command: Some(Command::Generate(crate::cli::GenerateArgs {
                pool_size: Some(5),
                lines: None,
                output: Some(PathBuf::from("other.log")),
                seed: Some(1),
            })),
            init_config: false,
            config: None,
            verbose: false,
            quiet: false,
        };

        config.merge_with_args(&args);
        assert_eq!(config.generator.pool_size, 5);
        assert_eq!(config.generator.lines, 100_000); // untouched
        assert_eq!(config.generator.output, PathBuf::from("other.log"));
        assert_eq!(config.generator.seed, Some(1));
    }

    #[test]
    fn test_merge_run_points_tally_at_output() {
        let mut config = Config::default();
        let args = Args {
            command: Some(Command::Run(crate::cli::RunArgs {
                generate: crate::cli::GenerateArgs {
                    output: Some(PathBuf::from("pipeline.log")),
                    ..Default::default()
                },
                skip_blank: true,
            })),
            init_config: false,
            config: None,
            verbose: false,
            quiet: false,
        };

        config.merge_with_args(&args);
        assert_eq!(config.tally.input, PathBuf::from("pipeline.log"));
        assert!(config.tally.skip_blank);
    }
}
