use std::path::PathBuf;
use tempo_core::format::with_formatting;
use tempo_core::user_agent::user_agent;
use tempo_core::{build_handle, HandleOption, Heartbeat, HeartbeatParams, HeartbeatResult};
use tempo_queue::{queue_filepath, save_first, with_queue, QueueError};

use crate::{exitcode, require_api_url};

pub struct HeartbeatCliParams<'a> {
    pub api_url: Option<&'a str>,
    pub entity: String,
    pub time: Option<i64>,
    pub cursor_position: Option<i32>,
    pub language: Option<String>,
    pub line_number: Option<i32>,
    pub lines_in_file: Option<i32>,
    pub project: Option<String>,
    pub project_path: Option<String>,
    pub plugin: &'a str,
    pub disable_offline: bool,
    pub local_first: bool,
    pub offline_queue_file: Option<PathBuf>,
}

pub fn execute(params: HeartbeatCliParams) -> anyhow::Result<i32> {
    // Validation happens before any network or disk I/O.
    let heartbeat = Heartbeat::from_params(HeartbeatParams {
        entity: params.entity,
        cursor_position: params.cursor_position,
        language: params.language,
        line_number: params.line_number,
        lines_in_file: params.lines_in_file,
        project: params.project,
        project_path: params.project_path,
        time: params.time,
        user_agent: user_agent(params.plugin),
    })?;

    let span = tracing::debug_span!(
        "heartbeat",
        entity = %heartbeat.entity,
        time = heartbeat.time,
        lineno = heartbeat.line_number,
    );
    let _guard = span.enter();

    let client = require_api_url(params.api_url)?;
    let queue_path = params.offline_queue_file.unwrap_or_else(queue_filepath);
    let offline_enabled = !params.disable_offline;

    let mut options: Vec<HandleOption> = vec![with_formatting()];
    if offline_enabled {
        if params.local_first {
            options.push(save_first(queue_path));
        } else {
            options.push(with_queue(queue_path));
        }
    }
    let handle = build_handle(&client, options);

    match handle(vec![heartbeat]) {
        Ok(results) => {
            log_result_errors(&results);
            Ok(exitcode::SUCCESS)
        }
        Err(err) => {
            let code = chain_error_exit_code(&err, offline_enabled);
            match code {
                exitcode::SUCCESS => {
                    // The batch was absorbed into the offline queue; a later
                    // invocation will retry delivery.
                    tracing::warn!("delivery failed, heartbeat queued locally: {err:#}");
                }
                _ => {
                    tracing::error!("failed to send heartbeat: {err:#}");
                    eprintln!("error: {err:#}");
                }
            }
            Ok(code)
        }
    }
}

// Per-item remote rejection is not a process failure; it is surfaced in the
// logs only.
fn log_result_errors(results: &[HeartbeatResult]) {
    for result in results.iter().filter(|r| !r.is_success()) {
        tracing::warn!(
            status = result.status,
            "heartbeat rejected: {}",
            result.errors.join("; ")
        );
    }
}

/// An unrecovered storage error is generic (1). A delivery error with the
/// offline queue enabled means the data is safe locally, so the invocation
/// still succeeds (0); with the queue disabled it is an API failure (102).
fn chain_error_exit_code(err: &anyhow::Error, offline_enabled: bool) -> i32 {
    if err.downcast_ref::<QueueError>().is_some() {
        exitcode::ERR_GENERIC
    } else if offline_enabled {
        exitcode::SUCCESS
    } else {
        exitcode::ERR_API
    }
}
