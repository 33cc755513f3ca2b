//! Offline persistence middleware and the retry-with-backoff pusher.

use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempo_core::{Handle, HandleOption, Heartbeat, HeartbeatResult};

use crate::error::QueueError;
use crate::store::QueueStore;

const QUEUE_FILENAME: &str = "offline_heartbeats.db";

/// Maximum number of retries after the initial push attempt.
pub const MAX_REQUEUE_ATTEMPTS: u32 = 3;

/// Default queue file location: `<data dir>/tempo/offline_heartbeats.db`,
/// falling back to `~/.tempo/` and finally the working directory.
pub fn queue_filepath() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("tempo").join(QUEUE_FILENAME)
    } else if let Some(home) = dirs::home_dir() {
        home.join(".tempo").join(QUEUE_FILENAME)
    } else {
        PathBuf::from(QUEUE_FILENAME)
    }
}

/// Best-effort persist of a batch, tolerating transient failures such as
/// another invocation holding the file lock. Sleeps 2^n seconds between
/// attempts (2s, 4s, 8s). After exhausting the retries the terminal error
/// carries the attempt count, the last failure, and a JSON dump of the
/// batch so nothing is silently dropped.
pub fn push_with_retry(path: &Path, heartbeats: &[Heartbeat]) -> Result<(), QueueError> {
    push_with_retry_impl(heartbeats, |batch| push_heartbeats(path, batch), |delay| {
        std::thread::sleep(delay)
    })
}

// The store is opened fresh per attempt.
fn push_heartbeats(path: &Path, heartbeats: &[Heartbeat]) -> Result<(), QueueError> {
    let store = QueueStore::open(path)?;
    store.push_many(heartbeats)
}

fn push_with_retry_impl<P, S>(
    heartbeats: &[Heartbeat],
    mut push: P,
    mut sleep: S,
) -> Result<(), QueueError>
where
    P: FnMut(&[Heartbeat]) -> Result<(), QueueError>,
    S: FnMut(Duration),
{
    let mut attempts = 0u32;
    loop {
        match push(heartbeats) {
            Ok(()) => return Ok(()),
            Err(err) => {
                attempts += 1;
                if attempts > MAX_REQUEUE_ATTEMPTS {
                    let dump = serde_json::to_string(heartbeats).unwrap_or_else(|json_err| {
                        tracing::warn!("failed to serialize undelivered heartbeats: {json_err}");
                        "<unserializable>".to_string()
                    });
                    return Err(QueueError::RetriesExhausted {
                        attempts,
                        last_error: Box::new(err),
                        dump,
                    });
                }
                tracing::debug!(attempt = attempts, "queue push failed, backing off: {err}");
                sleep(Duration::from_secs(1 << attempts));
            }
        }
    }
}

/// Offline-queue middleware. An empty batch short-circuits without invoking
/// downstream. On delivery failure the original batch is absorbed into the
/// queue and the delivery error is still returned; if the queue push itself
/// exhausts its retries, that storage error wins and the delivery error is
/// folded into its context.
pub fn with_queue<'a>(path: PathBuf) -> HandleOption<'a> {
    with_queue_impl(path, |path, heartbeats| push_with_retry(path, heartbeats))
}

fn with_queue_impl<'a, P>(path: PathBuf, push: P) -> HandleOption<'a>
where
    P: Fn(&Path, &[Heartbeat]) -> Result<(), QueueError> + 'a,
{
    Box::new(move |next: Handle<'a>| {
        Box::new(move |heartbeats: Vec<Heartbeat>| {
            tracing::debug!(file = %path.display(), "offline queue engaged");
            if heartbeats.is_empty() {
                tracing::debug!("no heartbeats ready for sending, skipping delivery");
                return Ok(Vec::new());
            }
            match next(heartbeats.clone()) {
                Ok(results) => {
                    handle_results(&path, &results, &heartbeats);
                    Ok(results)
                }
                Err(delivery_err) => {
                    tracing::debug!(
                        count = heartbeats.len(),
                        "queueing heartbeats after delivery failure: {delivery_err:#}"
                    );
                    if let Err(queue_err) = push(&path, &heartbeats) {
                        return Err(anyhow::Error::new(queue_err).context(format!(
                            "failed to queue heartbeats after delivery failure: {delivery_err:#}"
                        )));
                    }
                    Err(delivery_err)
                }
            }
        })
    })
}

/// Save-first middleware: the batch is durably queued before any delivery
/// attempt. A failed save aborts without attempting delivery.
pub fn save_first<'a>(path: PathBuf) -> HandleOption<'a> {
    save_first_impl(path, |path, heartbeats| push_with_retry(path, heartbeats))
}

fn save_first_impl<'a, P>(path: PathBuf, push: P) -> HandleOption<'a>
where
    P: Fn(&Path, &[Heartbeat]) -> Result<(), QueueError> + 'a,
{
    Box::new(move |next: Handle<'a>| {
        Box::new(move |heartbeats: Vec<Heartbeat>| {
            push(&path, &heartbeats).context("saving heartbeats locally before delivery")?;
            next(heartbeats)
        })
    })
}

// Extension point reserved for reconciling queued entries against delivered
// results.
fn handle_results(_path: &Path, _results: &[HeartbeatResult], _heartbeats: &[Heartbeat]) {}
