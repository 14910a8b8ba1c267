//! Match statistics
//!
//! This module counts matches per confidence band and prints the summary.

use crate::matching::{ConfidenceBand, MatchRecord};

/// Match counts by confidence band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl MatchSummary {
    /// Share of matches in a band, in percent
    pub fn percentage(&self, band: ConfidenceBand) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let count = match band {
            ConfidenceBand::High => self.high,
            ConfidenceBand::Medium => self.medium,
            ConfidenceBand::Low => self.low,
        };
        count as f64 / self.total as f64 * 100.0
    }
}

/// Counts matches by confidence band
///
/// # Example
///
/// ```
/// use redirect_mapper::output::summarize;
/// use redirect_mapper::MatchRecord;
///
/// let record = |c| MatchRecord {
///     old_url: "https://old.example/a".into(),
///     new_url: "https://new.example/a".into(),
///     confidence: c,
///     reason: String::new(),
/// };
/// let summary = summarize(&[record(0.9), record(0.7), record(0.3)]);
/// assert_eq!((summary.total, summary.high, summary.medium, summary.low), (3, 1, 1, 1));
/// ```
pub fn summarize(matches: &[MatchRecord]) -> MatchSummary {
    matches
        .iter()
        .fold(MatchSummary::default(), |mut summary, record| {
            summary.total += 1;
            match record.band() {
                ConfidenceBand::High => summary.high += 1,
                ConfidenceBand::Medium => summary.medium += 1,
                ConfidenceBand::Low => summary.low += 1,
            }
            summary
        })
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &MatchSummary) {
    println!("=== Match Summary ===\n");
    println!("  Total matches: {}", summary.total);
    for (label, band, count) in [
        ("High (>= 80%)", ConfidenceBand::High, summary.high),
        ("Medium (60-79%)", ConfidenceBand::Medium, summary.medium),
        ("Low (< 60%)", ConfidenceBand::Low, summary.low),
    ] {
        println!(
            "  {:<16} {} ({:.1}%)",
            label,
            count,
            summary.percentage(band)
        );
    }
}
