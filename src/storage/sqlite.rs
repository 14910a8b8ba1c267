//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::matching::{MatchMode, MatchRecord};
use crate::state::{ContentSignal, CrawlSide, FetchStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use crate::MapperError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, fingerprint, model, mode, status";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> Result<Self, MapperError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing and dry runs)
    pub fn new_in_memory() -> Result<Self, MapperError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Raw column values of a run row, decoded outside the rusqlite closure
struct RunRow {
    id: i64,
    started_at: String,
    finished_at: Option<String>,
    fingerprint: String,
    model: String,
    mode: String,
    status: String,
}

impl RunRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            started_at: row.get(1)?,
            finished_at: row.get(2)?,
            fingerprint: row.get(3)?,
            model: row.get(4)?,
            mode: row.get(5)?,
            status: row.get(6)?,
        })
    }

    fn into_record(self) -> StorageResult<RunRecord> {
        let mode = MatchMode::from_db_string(&self.mode).ok_or(StorageError::InvalidValue {
            column: "runs.mode",
            value: self.mode.clone(),
        })?;
        let status = RunStatus::from_db_string(&self.status).ok_or(StorageError::InvalidValue {
            column: "runs.status",
            value: self.status.clone(),
        })?;

        Ok(RunRecord {
            id: self.id,
            started_at: self.started_at,
            finished_at: self.finished_at,
            fingerprint: self.fingerprint,
            model: self.model,
            mode,
            status,
        })
    }
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(
        &mut self,
        fingerprint: &str,
        model: &str,
        mode: MatchMode,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, fingerprint, model, mode, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                now,
                fingerprint,
                model,
                mode.to_db_string(),
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                RunRow::from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))?;

        row.into_record()
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                RunRow::from_row,
            )
            .optional()?;

        row.map(RunRow::into_record).transpose()
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![RunStatus::Completed.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn count_runs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Crawl Checkpoints =====

    fn save_signals(
        &mut self,
        run_id: i64,
        side: CrawlSide,
        signals: &[ContentSignal],
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM signals WHERE run_id = ?1 AND side = ?2",
            params![run_id, side.to_db_string()],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO signals
                 (run_id, side, position, url, title, heading, description, excerpt, status, error_detail)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;

            for (position, signal) in signals.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    side.to_db_string(),
                    position as i64,
                    signal.url,
                    signal.title,
                    signal.heading,
                    signal.description,
                    signal.excerpt,
                    signal.status.to_db_string(),
                    signal.error_detail,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_signals(&self, run_id: i64, side: CrawlSide) -> StorageResult<Vec<ContentSignal>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, title, heading, description, excerpt, status, error_detail
             FROM signals WHERE run_id = ?1 AND side = ?2 ORDER BY position",
        )?;

        let rows = stmt
            .query_map(params![run_id, side.to_db_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(url, title, heading, description, excerpt, status, error_detail)| {
                    let status = FetchStatus::from_db_string(&status).ok_or(
                        StorageError::InvalidValue {
                            column: "signals.status",
                            value: status.clone(),
                        },
                    )?;
                    Ok(ContentSignal {
                        url,
                        title,
                        heading,
                        description,
                        excerpt,
                        status,
                        error_detail,
                    })
                },
            )
            .collect()
    }

    // ===== Match Checkpoints =====

    fn save_matches(&mut self, run_id: i64, matches: &[MatchRecord]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM matches WHERE run_id = ?1", params![run_id])?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO matches (run_id, position, old_url, new_url, confidence, reason)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for (position, record) in matches.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    position as i64,
                    record.old_url,
                    record.new_url,
                    record.confidence,
                    record.reason,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_matches(&self, run_id: i64) -> StorageResult<Vec<MatchRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT old_url, new_url, confidence, reason
             FROM matches WHERE run_id = ?1 ORDER BY position",
        )?;

        let matches = stmt
            .query_map(params![run_id], |row| {
                Ok(MatchRecord {
                    old_url: row.get(0)?,
                    new_url: row.get(1)?,
                    confidence: row.get(2)?,
                    reason: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(matches)
    }

    // ===== Maintenance =====

    fn clear_all(&mut self) -> StorageResult<()> {
        self.conn.execute_batch(
            "
            DELETE FROM matches;
            DELETE FROM signals;
            DELETE FROM runs;
        ",
        )?;
        Ok(())
    }
}
