//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the LinkStore trait.

use crate::state::FetchState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{LinkStore, StorageError, StorageResult};
use crate::storage::{PageCounts, PageRecord, RunRecord, RunStatus, StoreStats};
use chrono::Utc;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite link store
///
/// Batches are plain `BEGIN IMMEDIATE` / `COMMIT` pairs on the single
/// connection; anything written outside a batch autocommits.
pub struct SqliteLinkStore {
    conn: Connection,
    in_batch: bool,
}

impl SqliteLinkStore {
    /// Opens or creates the database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteLinkStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            in_batch: false,
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            in_batch: false,
        })
    }

    /// Returns true while a write batch is open
    pub fn in_batch(&self) -> bool {
        self.in_batch
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        identifier: row.get(0)?,
        display_name: row.get(1)?,
        fetch_state: row.get(2)?,
        is_internal: row.get(3)?,
        raw_content: row.get(4)?,
        discovered_at: row.get(5)?,
        fetched_at: row.get(6)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: row.get(4)?,
    })
}

impl LinkStore for SqliteLinkStore {
    // ===== Graph =====

    fn ensure_page_exists(
        &mut self,
        identifier: &str,
        display_name: &str,
        is_internal: bool,
    ) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO page (identifier, display_name, fetch_state, is_internal, discovered_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![identifier, display_name, FetchState::Pending, is_internal, now],
        )?;
        Ok(inserted == 1)
    }

    fn insert_link_if_new(&mut self, from: &str, to: &str) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO link (from_identifier, to_identifier) VALUES (?1, ?2)",
            params![from, to],
        )?;
        Ok(inserted == 1)
    }

    fn mark_fetched(&mut self, identifier: &str, content: Option<&str>) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE page SET fetch_state = ?1, raw_content = ?2, fetched_at = COALESCE(fetched_at, ?3)
             WHERE identifier = ?4",
            params![FetchState::Fetched, content, now, identifier],
        )?;

        if updated == 0 {
            return Err(StorageError::PageNotFound(identifier.to_string()));
        }
        Ok(())
    }

    fn list_pending(&self) -> StorageResult<Vec<String>> {
        // rowid order is discovery order, so a resumed crawl stays breadth-first
        let mut stmt = self.conn.prepare(
            "SELECT identifier FROM page WHERE fetch_state = ?1 AND is_internal = 1 ORDER BY rowid",
        )?;

        let pending = stmt
            .query_map(params![FetchState::Pending], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(pending)
    }

    fn stats(&self) -> StorageResult<StoreStats> {
        Ok(StoreStats {
            fetched_count: self.count("SELECT COUNT(*) FROM page WHERE fetch_state = 'fetched'")?,
            link_count: self.count("SELECT COUNT(*) FROM link")?,
        })
    }

    fn get_page(&self, identifier: &str) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                "SELECT identifier, display_name, fetch_state, is_internal, raw_content,
                 discovered_at, fetched_at
                 FROM page WHERE identifier = ?1",
                params![identifier],
                page_from_row,
            )
            .optional()?;

        Ok(page)
    }

    fn outgoing_links(&self, from: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT to_identifier FROM link WHERE from_identifier = ?1 ORDER BY rowid",
        )?;

        let targets = stmt
            .query_map(params![from], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(targets)
    }

    fn page_counts(&self) -> StorageResult<PageCounts> {
        let (total, fetched, internal): (i64, i64, i64) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(fetch_state = 'fetched'), 0),
                    COALESCE(SUM(is_internal), 0)
             FROM page",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let (total, fetched, internal) = (total as u64, fetched as u64, internal as u64);
        Ok(PageCounts {
            total,
            fetched,
            pending: total - fetched,
            internal,
            external: total - internal,
        })
    }

    // ===== Batching =====

    fn begin_batch(&mut self) -> StorageResult<()> {
        if !self.in_batch {
            self.conn.execute_batch("BEGIN IMMEDIATE")?;
            self.in_batch = true;
        }
        Ok(())
    }

    fn commit_batch(&mut self) -> StorageResult<()> {
        if self.in_batch {
            self.conn.execute_batch("COMMIT")?;
            self.in_batch = false;
        }
        Ok(())
    }

    fn rollback_batch(&mut self) -> StorageResult<()> {
        if self.in_batch {
            self.in_batch = false;
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    // ===== Run Management =====

    fn begin_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status, now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }
}

impl ToSql for FetchState {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_db_string()))
    }
}

impl FromSql for FetchState {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        FetchState::from_db_string(raw)
            .ok_or_else(|| FromSqlError::Other(format!("unknown fetch state '{}'", raw).into()))
    }
}

impl ToSql for RunStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_db_string()))
    }
}

impl FromSql for RunStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        RunStatus::from_db_string(raw)
            .ok_or_else(|| FromSqlError::Other(format!("unknown run status '{}'", raw).into()))
    }
}
