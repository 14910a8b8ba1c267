//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::matching::{MatchMode, MatchRecord};
use crate::state::{ContentSignal, CrawlSide};
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Invalid stored value in {column}: {value}")]
    InvalidValue { column: &'static str, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for checkpoint backend implementations
///
/// Each phase of a run writes its complete output once; saving the same
/// phase again for a run replaces the earlier checkpoint.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run in the `running` state and returns its ID
    fn create_run(&mut self, fingerprint: &str, model: &str, mode: MatchMode)
        -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Updates the status of a run
    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks a run as completed with a finish timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    /// Number of persisted runs
    fn count_runs(&self) -> StorageResult<u64>;

    // ===== Crawl Checkpoints =====

    /// Saves the crawl results of one side, preserving order
    fn save_signals(
        &mut self,
        run_id: i64,
        side: CrawlSide,
        signals: &[ContentSignal],
    ) -> StorageResult<()>;

    /// Loads the crawl results of one side in their original order
    fn load_signals(&self, run_id: i64, side: CrawlSide) -> StorageResult<Vec<ContentSignal>>;

    // ===== Match Checkpoints =====

    /// Saves the matches of a run, preserving order
    fn save_matches(&mut self, run_id: i64, matches: &[MatchRecord]) -> StorageResult<()>;

    /// Loads the matches of a run in accumulation order
    fn load_matches(&self, run_id: i64) -> StorageResult<Vec<MatchRecord>>;

    // ===== Maintenance =====

    /// Deletes every run and its checkpoints
    fn clear_all(&mut self) -> StorageResult<()>;
}
