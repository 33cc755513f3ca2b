//! SQLite-backed storage for heartbeats awaiting (re)delivery.
//!
//! One table in one file, keyed by heartbeat identity. Each CLI invocation
//! opens, transacts, and closes — there is no long-lived handle.

use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tempo_core::Heartbeat;

use crate::error::QueueError;

/// How long to wait on another process's lock before giving up.
const BUSY_TIMEOUT_MS: u32 = 30_000;

/// The queue store over a single SQLite file.
pub struct QueueStore {
    conn: Connection,
    path: PathBuf,
}

impl QueueStore {
    /// Open (or create) the queue file. The heartbeat table itself is
    /// created lazily on first write.
    pub fn open(path: &Path) -> Result<Self, QueueError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| QueueError::Io {
                    op: "create queue directory",
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }
        tracing::debug!(file = %path.display(), "opening queue file");
        let conn = Connection::open(path).map_err(storage("open"))?;
        conn.execute_batch(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};"))
            .map_err(storage("open"))?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the heartbeat table exists yet.
    pub fn table_exists(&self) -> Result<bool, QueueError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'heartbeats'",
                [],
                |row| row.get(0),
            )
            .map_err(storage("table check"))?;
        Ok(count > 0)
    }

    /// Diagnostics check surfacing the distinct "table missing" signal.
    pub fn check_table(&self) -> Result<(), QueueError> {
        if self.table_exists()? {
            Ok(())
        } else {
            Err(QueueError::NoTable {
                path: self.path.display().to_string(),
            })
        }
    }

    fn ensure_table(&self) -> Result<(), QueueError> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS heartbeats (id TEXT PRIMARY KEY, payload TEXT NOT NULL)",
                [],
            )
            .map(|_| ())
            .map_err(storage("create table"))
    }

    /// Store a batch under each heartbeat's identity, all in one
    /// transaction. An existing entry with the same identity is overwritten.
    pub fn push_many(&self, heartbeats: &[Heartbeat]) -> Result<(), QueueError> {
        self.ensure_table()?;
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(storage("begin push"))?;
        for heartbeat in heartbeats {
            let id = heartbeat.id();
            let payload =
                serde_json::to_string(heartbeat).map_err(|source| QueueError::Encode {
                    id: id.clone(),
                    source,
                })?;
            tx.execute(
                "INSERT OR REPLACE INTO heartbeats (id, payload) VALUES (?1, ?2)",
                params![id, payload],
            )
            .map_err(storage("push"))?;
        }
        tx.commit().map_err(storage("commit push"))
    }

    /// Remove and return up to `limit` entries in key order.
    ///
    /// Key order approximates insertion order because identities embed the
    /// timestamp first, but timestamps are not zero-padded; treat this as
    /// insertion-key order, not strict chronological FIFO.
    ///
    /// Read and delete share one transaction; a decode failure aborts the
    /// whole call and rolls back, leaving every entry queued.
    pub fn pop_many(&self, limit: usize) -> Result<Vec<Heartbeat>, QueueError> {
        if !self.table_exists()? {
            tracing::debug!(file = %self.path.display(), "heartbeat table not created yet, nothing queued");
            return Ok(Vec::new());
        }
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(storage("begin pop"))?;
        let entries = read_entries(&tx, limit)?;
        let heartbeats = decode_entries(&entries)?;
        for (id, _) in &entries {
            tx.execute("DELETE FROM heartbeats WHERE id = ?1", params![id])
                .map_err(storage("delete"))?;
        }
        tx.commit().map_err(storage("commit pop"))?;
        Ok(heartbeats)
    }

    /// Non-destructive variant of [`pop_many`](Self::pop_many); entries
    /// remain queued.
    pub fn read_many(&self, limit: usize) -> Result<Vec<Heartbeat>, QueueError> {
        if !self.table_exists()? {
            tracing::debug!(file = %self.path.display(), "heartbeat table not created yet, nothing queued");
            return Ok(Vec::new());
        }
        let entries = read_entries(&self.conn, limit)?;
        decode_entries(&entries)
    }

    /// Number of queued entries. Zero when the table is absent.
    pub fn count(&self) -> Result<u64, QueueError> {
        if !self.table_exists()? {
            return Ok(0);
        }
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM heartbeats", [], |row| row.get(0))
            .map_err(storage("count"))?;
        Ok(count as u64)
    }
}

fn read_entries(conn: &Connection, limit: usize) -> Result<Vec<(String, String)>, QueueError> {
    let mut stmt = conn
        .prepare("SELECT id, payload FROM heartbeats ORDER BY id LIMIT ?1")
        .map_err(storage("read"))?;
    let entries = stmt
        .query_map(params![limit as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(storage("read"))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(storage("read"))?;
    Ok(entries)
}

fn decode_entries(entries: &[(String, String)]) -> Result<Vec<Heartbeat>, QueueError> {
    entries
        .iter()
        .map(|(id, payload)| {
            serde_json::from_str(payload).map_err(|source| QueueError::Corrupt {
                id: id.clone(),
                source,
            })
        })
        .collect()
}

fn storage(op: &'static str) -> impl FnOnce(rusqlite::Error) -> QueueError {
    move |source| QueueError::Storage { op, source }
}
