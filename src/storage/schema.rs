//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the checkpoint database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track mapping runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    fingerprint TEXT NOT NULL,
    model TEXT NOT NULL,
    mode TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Crawl results per side, in input order
CREATE TABLE IF NOT EXISTS signals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id) ON DELETE CASCADE,
    side TEXT NOT NULL,
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    title TEXT,
    heading TEXT,
    description TEXT,
    excerpt TEXT,
    status TEXT NOT NULL,
    error_detail TEXT,
    UNIQUE(run_id, side, position)
);

CREATE INDEX IF NOT EXISTS idx_signals_run ON signals(run_id, side);

-- Matches in accumulation order
CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    old_url TEXT NOT NULL,
    new_url TEXT NOT NULL,
    confidence REAL NOT NULL,
    reason TEXT NOT NULL,
    UNIQUE(run_id, position)
);

CREATE INDEX IF NOT EXISTS idx_matches_run ON matches(run_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
