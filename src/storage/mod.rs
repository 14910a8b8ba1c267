//! Storage module for persisting run checkpoints
//!
//! This module handles all database operations for the mapper, including:
//! - SQLite database initialization and schema management
//! - Run tracking (status, fingerprint, model, mode)
//! - Crawl signal checkpoints for both URL sets
//! - Match checkpoints for reporting and re-export

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::matching::MatchMode;
use crate::MapperError;

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, MapperError> {
    SqliteStorage::new(path)
}

/// Represents a mapping run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub fingerprint: String,
    pub model: String,
    pub mode: MatchMode,
    pub status: RunStatus,
}

/// Status of a mapping run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
