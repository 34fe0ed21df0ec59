//! Per-address occurrence counting.
//!
//! Streams a log file line by line and counts occurrences of the leading
//! token of each line. The parsing rule is literal: split on the first
//! whitespace run and take the token before it, so a line holding only an
//! address yields that address, extra whitespace-delimited content is
//! silently dropped, and a blank line yields the empty-string key unless
//! `skip_blank` is set.

use anyhow::{Context, Result};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Options controlling aggregation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TallyOptions {
    /// Skip lines whose leading token is empty instead of counting
    /// them under the empty-string key.
    pub skip_blank: bool,
}

/// The count table accumulated over one pass of a log file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: HashMap<String, u64>,
    lines_read: u64,
    blank_skipped: u64,
}

impl Tally {
    /// Record one log line.
    pub fn observe(&mut self, line: &str, options: TallyOptions) {
        self.lines_read += 1;
        let token = leading_token(line);
        if token.is_empty() && options.skip_blank {
            self.blank_skipped += 1;
            return;
        }
        *self.counts.entry(token.to_string()).or_insert(0) += 1;
    }

    /// The full count table.
    pub fn counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    /// Count for a single key (zero if never seen).
    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum of all counts. Equals the number of counted lines.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct keys.
    pub fn unique(&self) -> usize {
        self.counts.len()
    }

    /// Total lines read from the input, counted or not.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Lines skipped because their leading token was empty.
    pub fn blank_skipped(&self) -> u64 {
        self.blank_skipped
    }

    /// Entries sorted by count descending, then key ascending.
    pub fn sorted_counts(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        entries.sort_by_key(|&(key, count)| (Reverse(count), key));
        entries
    }
}

/// Extract the token before the first whitespace run of a line.
///
/// A blank line (or a line starting with whitespace) yields "".
pub fn leading_token(line: &str) -> &str {
    line.split(char::is_whitespace).next().unwrap_or("")
}

/// Aggregate all lines from a reader into a count table.
pub fn tally_reader<R: Read>(reader: R, options: TallyOptions) -> Result<Tally> {
    let mut tally = Tally::default();

    for line in BufReader::new(reader).lines() {
        let line = line.context("Failed to read line from log")?;
        tally.observe(&line, options);
    }

    debug!(
        "Tallied {} lines into {} distinct keys",
        tally.lines_read(),
        tally.unique()
    );

    Ok(tally)
}

/// Aggregate a log file at `path` into a count table.
///
/// A missing or unreadable file is an error; an empty file yields an
/// empty table.
pub fn tally_path(path: &Path, options: TallyOptions) -> Result<Tally> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    tally_reader(file, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tally_str(input: &str) -> Tally {
        tally_reader(Cursor::new(input), TallyOptions::default()).unwrap()
    }

    #[test]
    fn test_leading_token() {
        assert_eq!(leading_token("10.0.0.1"), "10.0.0.1");
        assert_eq!(leading_token("10.0.0.1 trailing fields"), "10.0.0.1");
        assert_eq!(leading_token("10.0.0.1\textra"), "10.0.0.1");
        assert_eq!(leading_token(""), "");
        assert_eq!(leading_token(" leading-space"), "");
    }

    #[test]
    fn test_empty_input_yields_empty_table() {
        let tally = tally_str("");
        assert!(tally.counts().is_empty());
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.lines_read(), 0);
    }

    #[test]
    fn test_single_line() {
        let tally = tally_str("10.0.0.1\n");
        assert_eq!(tally.unique(), 1);
        assert_eq!(tally.get("10.0.0.1"), 1);
    }

    #[test]
    fn test_repeated_addresses() {
        let tally = tally_str("1.1.1.1\n1.1.1.1\n2.2.2.2\n");
        assert_eq!(tally.get("1.1.1.1"), 2);
        assert_eq!(tally.get("2.2.2.2"), 1);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.unique(), 2);
    }

    #[test]
    fn test_trailing_blank_line_counts_empty_key() {
        // Literal split-and-take-first-token rule: the blank line is
        // counted under "".
        let tally = tally_str("1.1.1.1\n\n");
        assert_eq!(tally.get("1.1.1.1"), 1);
        assert_eq!(tally.get(""), 1);
        assert_eq!(tally.total(), 2);
    }

    #[test]
    fn test_skip_blank_drops_empty_key() {
        let options = TallyOptions { skip_blank: true };
        let tally = tally_reader(Cursor::new("1.1.1.1\n\n"), options).unwrap();
        assert_eq!(tally.get("1.1.1.1"), 1);
        assert_eq!(tally.get(""), 0);
        assert_eq!(tally.total(), 1);
        assert_eq!(tally.lines_read(), 2);
        assert_eq!(tally.blank_skipped(), 1);
    }

    #[test]
    fn test_extra_tokens_truncate_to_first() {
        let tally = tally_str("1.1.1.1 2024-01-01T00:00:00 GET /\n1.1.1.1\n");
        assert_eq!(tally.get("1.1.1.1"), 2);
        assert_eq!(tally.unique(), 1);
    }

    #[test]
    fn test_total_equals_counted_lines() {
        let tally = tally_str("a\nb\nc\na\n");
        assert_eq!(tally.total(), tally.lines_read());
    }

    #[test]
    fn test_idempotent_over_same_input() {
        let input = "1.1.1.1\n3.3.3.3\n1.1.1.1\n2.2.2.2\n";
        let first = tally_str(input);
        let second = tally_str(input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sorted_counts_deterministic_order() {
        let tally = tally_str("b\na\nb\nc\nc\n");
        // Count descending, key ascending for ties.
        assert_eq!(
            tally.sorted_counts(),
            vec![("b", 2), ("c", 2), ("a", 1)]
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = tally_path(
            Path::new("definitely/not/a/real/file.log"),
            TallyOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_round_trip_with_generator() {
        use crate::generator::{generate, GenerateOptions};
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ips.log");

        generate(
            &path,
            &GenerateOptions {
                pool_size: 20,
                lines: 1000,
                seed: Some(11),
                show_progress: false,
            },
        )
        .unwrap();

        let tally = tally_path(&path, TallyOptions::default()).unwrap();
        assert_eq!(tally.total(), 1000);
        assert!(tally.unique() <= 20);
        // Every key is a dotted-decimal address from the pool.
        for key in tally.counts().keys() {
            assert!(key.parse::<std::net::Ipv4Addr>().is_ok());
        }
    }
}
