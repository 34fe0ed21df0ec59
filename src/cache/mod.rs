//! Cache replay simulation.
//!
//! Replays a log file through cache implementations keyed by the packed
//! form of each line's IP address, and reports hit/miss statistics. The
//! access pattern per line is lookup followed by insert.

mod arc;
mod lru;

pub use arc::ArcCache;
pub use lru::LruCache;

use crate::tally::leading_token;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Which cache policy to simulate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Plain least-recently-used cache
    Lru,
    /// Adaptive replacement cache
    Arc,
    /// Run both and report each
    #[default]
    Both,
}

/// Error packing an address string into a cache key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("not a dotted-decimal IPv4 address: {0:?}")]
    Malformed(String),
}

/// Pack a dotted-decimal IPv4 string into a big-endian u32 key.
pub fn ip_to_key(ip: &str) -> Result<u32, KeyError> {
    ip.parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| KeyError::Malformed(ip.to_string()))
}

/// Hit/miss statistics from one replay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Accesses found in the cache.
    pub hits: u64,
    /// Accesses not found in the cache.
    pub misses: u64,
    /// Lines skipped because the leading token was not an IPv4 address.
    pub skipped: u64,
}

impl ReplayStats {
    /// Total cache accesses (hits plus misses).
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of accesses that hit; 0.0 for an empty replay.
    pub fn hit_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.hits as f64 / self.total() as f64
        }
    }
}

/// Replay a log through an LRU cache of the given capacity.
pub fn replay_lru<R: BufRead>(reader: R, capacity: usize) -> Result<ReplayStats> {
    let mut cache = LruCache::new(capacity);
    replay_lines(reader, |key, address| {
        let hit = cache.get(key).is_some();
        cache.put(key, address.to_string());
        hit
    })
}

/// Replay a log through an ARC cache of the given capacity.
pub fn replay_arc<R: BufRead>(reader: R, capacity: usize) -> Result<ReplayStats> {
    let mut cache = ArcCache::new(capacity);
    replay_lines(reader, |key, address| {
        let hit = cache.get(key).is_some();
        cache.put(key, address.to_string());
        hit
    })
}

fn replay_lines<R, F>(reader: R, mut access: F) -> Result<ReplayStats>
where
    R: BufRead,
    F: FnMut(u32, &str) -> bool,
{
    let mut stats = ReplayStats::default();

    for line in reader.lines() {
        let line = line.context("Failed to read line from log")?;
        let token = leading_token(&line);
        let key = match ip_to_key(token) {
            Ok(key) => key,
            Err(_) => {
                stats.skipped += 1;
                continue;
            }
        };
        if access(key, token) {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
    }

    Ok(stats)
}
