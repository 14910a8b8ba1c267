//! Output module for match summaries and exports
//!
//! This module handles:
//! - Counting matches per confidence band
//! - Building the redirect table and exporting it as CSV
//! - Formatting the end-of-run report

mod report;
pub mod stats;
mod table;

pub use report::{format_preview, format_run_report, format_summary, PREVIEW_LIMIT};
pub use stats::{print_summary, summarize, MatchSummary};
pub use table::{default_csv_path, export_csv, to_table, write_csv, TABLE_HEADER};

use crate::matching::MatchRecord;
use crate::storage::{RunRecord, Storage};
use crate::MapperError;

/// Loads the latest run and its matches from storage
///
/// Returns `Ok(None)` when no run has been persisted yet.
pub fn load_latest_matches(
    storage: &dyn Storage,
) -> Result<Option<(RunRecord, Vec<MatchRecord>)>, MapperError> {
    let Some(run) = storage.get_latest_run()? else {
        return Ok(None);
    };
    let matches = storage.load_matches(run.id)?;
    Ok(Some((run, matches)))
}
