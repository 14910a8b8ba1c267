//! Redirect table export
//!
//! This module turns matches into the four-column redirect table and writes
//! it as CSV.

use crate::matching::MatchRecord;
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column headers of the redirect table, in column order
pub const TABLE_HEADER: [&str; 4] = ["Old URL", "New URL", "Confidence", "Reason"];

/// Converts matches into table rows, preserving order
///
/// Columns are always `[old URL, new URL, confidence, reason]`.
pub fn to_table(matches: &[MatchRecord]) -> Vec<[String; 4]> {
    matches
        .iter()
        .map(|m| {
            [
                m.old_url.clone(),
                m.new_url.clone(),
                m.confidence.to_string(),
                m.reason.clone(),
            ]
        })
        .collect()
}

/// Formats matches as CSV text: one header line plus one line per match
pub fn export_csv(matches: &[MatchRecord]) -> String {
    let mut csv = String::new();
    push_csv_line(&mut csv, &TABLE_HEADER);
    for row in to_table(matches) {
        push_csv_line(&mut csv, &row);
    }
    csv
}

/// Writes the CSV export of `matches` to `path`
pub fn write_csv(matches: &[MatchRecord], path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(export_csv(matches).as_bytes())?;
    Ok(())
}

/// Timestamped default export name, e.g. `redirects_20240131_142501.csv`
pub fn default_csv_path(now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!("redirects_{}.csv", now.format("%Y%m%d_%H%M%S")))
}

fn push_csv_line<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    let line = fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

/// Quotes a field when it contains a separator, quote or line break
fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
