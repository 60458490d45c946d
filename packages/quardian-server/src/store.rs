//! SQLite-backed job store.
//!
//! One row per completed operation. Only metadata is stored: kind, scheme,
//! sizes, the verify outcome and a timestamp. No plaintext, ciphertext or
//! keys ever reach this table.

use std::sync::Arc;

use parking_lot::Mutex;
use quardian_core::{Error, JobSink, OperationKind, OperationRecord, Result};
use rusqlite::{params, Connection};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL to create all tables
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- One row per completed operation
CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    -- encrypt | decrypt | sign | verify
    kind TEXT NOT NULL,
    scheme TEXT NOT NULL,
    input_size INTEGER NOT NULL,
    output_size INTEGER,
    -- verify records only
    verified INTEGER,
    -- Unix timestamp (milliseconds)
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_jobs_kind ON jobs(kind);
"#;

/// Path that selects an in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// [`JobSink`] over a single SQLite connection.
#[derive(Clone)]
pub struct SqliteJobStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteJobStore {
    /// Open or create the database at `path` (`:memory:` for in-memory).
    pub fn open(path: &str) -> Result<Self> {
        let conn = if path == IN_MEMORY {
            Connection::open_in_memory()
                .map_err(|e| Error::Storage(format!("Failed to create in-memory database: {}", e)))?
        } else {
            Connection::open(path)
                .map_err(|e| Error::Storage(format!("Failed to open database: {}", e)))?
        };

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(IN_MEMORY)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        let version: Option<i32> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .ok();

        match version {
            None => {
                conn.execute_batch(CREATE_TABLES)
                    .map_err(|e| Error::Storage(format!("Failed to create tables: {}", e)))?;
                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?)",
                    params![SCHEMA_VERSION],
                )
                .map_err(|e| Error::Storage(format!("Failed to set schema version: {}", e)))?;

                tracing::info!("Job store schema created (version {})", SCHEMA_VERSION);
            }
            Some(v) if v > SCHEMA_VERSION => {
                return Err(Error::Storage(format!(
                    "Database schema version {} is newer than supported {}",
                    v, SCHEMA_VERSION
                )));
            }
            Some(v) => {
                tracing::debug!("Job store schema is version {}", v);
            }
        }

        Ok(())
    }
}

impl JobSink for SqliteJobStore {
    fn append(&self, record: OperationRecord) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO jobs (id, kind, scheme, input_size, output_size, verified, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id.to_string(),
                record.kind.as_str(),
                record.scheme,
                record.input_size_bytes as i64,
                record.output_size_bytes.map(|n| n as i64),
                record.verified,
                record.timestamp.timestamp_millis(),
            ],
        )
        .map_err(|e| Error::Storage(format!("Failed to insert job: {}", e)))?;

        Ok(())
    }

    fn count(&self, kind: OperationKind) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM jobs WHERE kind = ?1",
                params![kind.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| Error::Storage(format!("Failed to count jobs: {}", e)))?;

        Ok(count as u64)
    }
}
