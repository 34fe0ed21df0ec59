//! Plain-text renderings of results.
//!
//! One fixed format per result type, written to stdout by the caller.

use crate::cache::ReplayStats;
use crate::tally::Tally;

/// Render the full count table plus a short footer.
pub fn render_tally(tally: &Tally) -> String {
    let mut output = String::new();

    for (address, count) in tally.sorted_counts() {
        output.push_str(&format!("{} {}\n", address, count));
    }

    output.push_str(&format!("Total lines: {}\n", tally.lines_read()));
    output.push_str(&format!("Counted: {}\n", tally.total()));
    output.push_str(&format!("Unique addresses: {}\n", tally.unique()));
    if tally.blank_skipped() > 0 {
        output.push_str(&format!("Blank lines skipped: {}\n", tally.blank_skipped()));
    }

    output
}

/// Render the hit/miss summary of one replay pass.
pub fn render_replay(stats: &ReplayStats) -> String {
    let mut output = String::new();

    output.push_str(&format!("Total examples: {}\n", stats.total()));
    output.push_str(&format!("Hit: {}\n", stats.hits));
    output.push_str(&format!("Miss: {}\n", stats.misses));
    output.push_str(&format!("Hit rate: {:.4}\n", stats.hit_rate()));
    if stats.skipped > 0 {
        output.push_str(&format!("Skipped lines: {}\n", stats.skipped));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::{tally_reader, TallyOptions};
    use std::io::Cursor;

    #[test]
    fn test_render_tally_sorted_and_totaled() {
        let tally = tally_reader(
            Cursor::new("2.2.2.2\n1.1.1.1\n2.2.2.2\n"),
            TallyOptions::default(),
        )
        .unwrap();

        let output = render_tally(&tally);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "2.2.2.2 2");
        assert_eq!(lines[1], "1.1.1.1 1");
        assert!(output.contains("Total lines: 3"));
        assert!(output.contains("Counted: 3"));
        assert!(output.contains("Unique addresses: 2"));
        assert!(!output.contains("Blank lines skipped"));
    }

    #[test]
    fn test_render_tally_reports_skipped_blanks() {
        let tally = tally_reader(
            Cursor::new("1.1.1.1\n\n"),
            TallyOptions { skip_blank: true },
        )
        .unwrap();

        let output = render_tally(&tally);
        assert!(output.contains("Blank lines skipped: 1"));
        assert!(output.contains("Counted: 1"));
    }

    #[test]
    fn test_render_replay() {
        let stats = ReplayStats {
            hits: 3,
            misses: 1,
            skipped: 0,
        };
        let output = render_replay(&stats);
        assert!(output.contains("Total examples: 4"));
        assert!(output.contains("Hit: 3"));
        assert!(output.contains("Miss: 1"));
        assert!(output.contains("Hit rate: 0.7500"));
        assert!(!output.contains("Skipped"));
    }

    #[test]
    fn test_render_replay_with_skipped() {
        let stats = ReplayStats {
            hits: 0,
            misses: 0,
            skipped: 2,
        };
        let output = render_replay(&stats);
        assert!(output.contains("Hit rate: 0.0000"));
        assert!(output.contains("Skipped lines: 2"));
    }
}
