//! Schema migrations, compiled into the binary.

use rusqlite::{Connection, params};
use crate::error::{Result, GatewayError};

/// Migration metadata
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

/// Ordered by version; never edit an applied entry, append a new one.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "001_jobs",
        sql: "CREATE TABLE IF NOT EXISTS jobs (
                  id TEXT PRIMARY KEY,
                  task TEXT NOT NULL,
                  args_json TEXT NOT NULL,
                  kwargs_json TEXT NOT NULL,
                  status TEXT NOT NULL DEFAULT 'PENDING',
                  submitted_at TEXT NOT NULL,
                  updated_at TEXT NOT NULL
              );
              CREATE INDEX IF NOT EXISTS idx_jobs_status_submitted ON jobs (status, submitted_at);",
    },
    Migration {
        version: 2,
        name: "002_operation_events",
        sql: "CREATE TABLE IF NOT EXISTS operation_events (
                  event_id TEXT PRIMARY KEY,
                  request_id TEXT NOT NULL,
                  timestamp TEXT NOT NULL,
                  message TEXT NOT NULL,
                  fields_json TEXT NOT NULL
              );
              CREATE INDEX IF NOT EXISTS idx_events_request ON operation_events (request_id);",
    },
];

/// Tables every fully migrated database must contain.
pub const EXPECTED_TABLES: &[&str] = &["jobs", "operation_events", "schema_migrations"];

/// Create schema_migrations table if it doesn't exist
fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Get list of applied migrations
pub fn get_applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM schema_migrations ORDER BY version")?;
    let names: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
        .map_err(GatewayError::Database)?;
    Ok(names)
}

/// Run all pending migrations
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    ensure_migrations_table(conn)?;

    let applied = get_applied_migrations(conn)?;

    for migration in MIGRATIONS {
        if applied.iter().any(|name| name == migration.name) {
            log::debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        log::info!("Applying migration: {} (version {})", migration.name, migration.version);

        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            params![migration.version, migration.name],
        )?;
        tx.commit()?;
    }

    log::debug!("All migrations completed");
    Ok(())
}

/// Names of expected tables missing from the database
pub fn missing_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    Ok(EXPECTED_TABLES
        .iter()
        .filter(|expected| !tables.iter().any(|t| t == *expected))
        .map(|t| t.to_string())
        .collect())
}
