use thiserror::Error;

/// Failures of the persistent offline queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The heartbeat table has not been created yet. Distinct from an empty
    /// queue; read paths treat it as zero entries.
    #[error("heartbeat table not found in {path}")]
    NoTable { path: String },

    #[error("failed to encode heartbeat {id}: {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored entry no longer decodes. Aborts the whole read so the entry
    /// does not silently vanish.
    #[error("failed to decode stored heartbeat {id}: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage failure during {op}: {source}")]
    Storage {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("i/o failure during {op} on {path}: {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Terminal error after exhausting push retries. `dump` is a best-effort
    /// JSON serialization of the heartbeats that could not be persisted.
    #[error("abort requeuing after {attempts} unsuccessful attempts: {last_error}. heartbeats: {dump}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last_error: Box<QueueError>,
        dump: String,
    },
}
