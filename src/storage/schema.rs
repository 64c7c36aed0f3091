//! Database schema definitions
//!
//! Identifier uniqueness on `page` is the crawl's visited set, and the
//! unique index on `link` makes edge inserts dedup-inserts.

/// Stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: u32 = 1;

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One row per distinct page identifier
CREATE TABLE IF NOT EXISTS page (
    identifier TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    fetch_state TEXT NOT NULL DEFAULT 'pending',
    is_internal INTEGER NOT NULL,
    raw_content TEXT,
    discovered_at TEXT NOT NULL,
    fetched_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_page_fetch_state ON page(fetch_state);

-- Directed edges; at most one per ordered pair
CREATE TABLE IF NOT EXISTS link (
    from_identifier TEXT NOT NULL REFERENCES page(identifier),
    to_identifier TEXT NOT NULL REFERENCES page(identifier),
    UNIQUE(from_identifier, to_identifier)
);

CREATE INDEX IF NOT EXISTS idx_link_to ON link(to_identifier);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}
