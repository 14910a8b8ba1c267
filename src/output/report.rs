//! Run report formatting
//!
//! Builds the plain-text report printed after a run: crawl counts, match
//! bands, a short preview of the matches and any URLs that were excluded
//! because they need authentication.

use crate::matching::MatchRecord;
use crate::output::stats::MatchSummary;
use crate::pipeline::RunReport;
use crate::url::truncate_for_display;

/// Number of matches shown in the report preview
pub const PREVIEW_LIMIT: usize = 10;

/// Formats the report of a finished run
///
/// `matches` are the run's matches in accumulation order; only the first
/// [`PREVIEW_LIMIT`] are listed.
pub fn format_run_report(report: &RunReport, matches: &[MatchRecord]) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Run {} ===\n\n", report.run_id));
    out.push_str(&format!("  Mode: {}\n", report.mode));
    out.push_str(&format!("  Model: {}\n", report.model));

    if !report.crawl.is_empty() {
        out.push_str("\nCrawl:\n");
        for crawl in &report.crawl {
            out.push_str(&format!(
                "  {} site: {}/{} fetched, {} need authentication, {} failed\n",
                crawl.side,
                crawl.succeeded,
                crawl.total,
                crawl.auth_required,
                crawl.failed()
            ));
        }
    }

    out.push_str(&format!(
        "\nBatches: {} sent, {} failed\n",
        report.total_batches,
        report.failed_batches.len()
    ));
    for failure in &report.failed_batches {
        out.push_str(&format!(
            "  - batch {} ({} URLs): {}\n",
            failure.batch_index, failure.size, failure.error
        ));
    }

    out.push('\n');
    out.push_str(&format_summary(&report.summary));

    if !matches.is_empty() {
        out.push_str(&format!(
            "\nFirst {} matches:\n",
            matches.len().min(PREVIEW_LIMIT)
        ));
        out.push_str(&format_preview(matches));
    }

    if !report.auth_required_urls.is_empty() {
        out.push_str(&format_auth_note(
            &report.auth_required_urls,
            report.used_credentials,
        ));
    }

    out
}

/// Formats match counts per confidence band
pub fn format_summary(summary: &MatchSummary) -> String {
    format!(
        "Matches: {}\n  High (>= 80%): {}\n  Medium (60-79%): {}\n  Low (< 60%): {}\n",
        summary.total, summary.high, summary.medium, summary.low
    )
}

/// Formats the first [`PREVIEW_LIMIT`] matches, one per line
pub fn format_preview(matches: &[MatchRecord]) -> String {
    matches
        .iter()
        .take(PREVIEW_LIMIT)
        .map(|m| {
            format!(
                "  [{:>3.0}%] {} -> {}\n         {}\n",
                m.confidence * 100.0,
                truncate_for_display(&m.old_url),
                truncate_for_display(&m.new_url),
                m.reason
            )
        })
        .collect()
}

fn format_auth_note(urls: &[String], used_credentials: bool) -> String {
    let mut out = format!(
        "\n{} URLs were excluded from matching because they require authentication:\n",
        urls.len()
    );
    for url in urls {
        out.push_str(&format!("  - {}\n", url));
    }
    if used_credentials {
        out.push_str("The configured [auth] credentials were rejected for these URLs.\n");
    } else {
        out.push_str("Add an [auth] section with credentials and re-run to include them.\n");
    }
    out
}
