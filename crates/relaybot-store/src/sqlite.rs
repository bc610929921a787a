use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rusqlite::{params, Connection};

use relaybot_core::{
    audit::{AuditRecord, AuditSink},
    errors::Error,
    Result,
};

/// One row per audit record in a local SQLite file.
#[derive(Clone)]
pub struct SqliteAuditSink {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAuditSink {
    /// Open or create the database and make sure the table exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            Error::Storage(format!("failed to open database {}: {e}", path.display()))
        })?;

        // journal_mode PRAGMA always returns the resulting mode, so use query_row
        let _: String = conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .map_err(map_err)?;

        Self::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(map_err)?;
        Self::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_records (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at  TEXT NOT NULL,
                user_name   TEXT NOT NULL,
                user_id     INTEGER NOT NULL,
                group_id    INTEGER,
                group_name  TEXT,
                message     VARCHAR(5000) NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_audit_records_user_id
                ON audit_records(user_id);",
        )
        .map_err(|e| Error::Storage(format!("failed to create audit table: {e}")))
    }
}

fn map_err(e: rusqlite::Error) -> Error {
    Error::Storage(format!("sqlite error: {e}"))
}

fn insert(conn: &Connection, record: &AuditRecord) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO audit_records
            (created_at, user_name, user_id, group_id, group_name, message)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.created_at.to_rfc3339(),
            record.user_name,
            record.user_id,
            record.group_id,
            record.group_name,
            record.message,
        ],
    )
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn record(&self, record: &AuditRecord) -> Result<()> {
        let conn = self.conn.clone();
        let record = record.clone();

        // rusqlite is blocking; keep it off the async workers.
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| Error::Storage("sqlite connection lock poisoned".to_string()))?;
            insert(&conn, &record).map_err(map_err)?;
            Ok::<(), Error>(())
        })
        .await
        .map_err(|e| Error::Storage(format!("sqlite write task failed: {e}")))?
    }
}
