//! Heartbeat delivery and per-item response parsing.

use anyhow::Context;
use serde::Deserialize;
use tempo_core::{Heartbeat, HeartbeatResult, Sender};

use crate::client::Client;

pub const COLLECT_HEARTBEAT_ROUTE: &str = "/users/current/heartbeats/collect";

impl Client {
    /// Deliver a batch in one request. On an accepted response (201 or 202)
    /// the body carries one `[body, status]` pair per heartbeat, in the
    /// order they were sent; individual pairs may still report failures.
    pub fn send_heartbeats(
        &self,
        heartbeats: &[Heartbeat],
    ) -> anyhow::Result<Vec<HeartbeatResult>> {
        let url = self.url(COLLECT_HEARTBEAT_ROUTE);
        tracing::debug!(count = heartbeats.len(), "sending heartbeats to {url}");
        let body = serde_json::to_string(heartbeats).context("failed to json encode heartbeats")?;
        let mut response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&body)
            .with_context(|| format!("failed making request to {url}"))?;
        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("failed reading response body from {url}"))?;
        match status {
            201 | 202 => {}
            400 => anyhow::bail!("bad request at {url}"),
            _ => anyhow::bail!(
                "invalid response status from {url}. got: {status}, want: 201/202. body: {text:?}"
            ),
        }
        parse_heartbeat_responses(&text)
    }
}

impl Sender for Client {
    fn send_heartbeats(&self, heartbeats: &[Heartbeat]) -> anyhow::Result<Vec<HeartbeatResult>> {
        Client::send_heartbeats(self, heartbeats)
    }
}

/// Parse a bulk response of the shape `{"responses": [[<body>, <status>], ...]}`.
pub fn parse_heartbeat_responses(data: &str) -> anyhow::Result<Vec<HeartbeatResult>> {
    #[derive(Deserialize)]
    struct ResponsesBody {
        responses: Vec<Vec<serde_json::Value>>,
    }

    let body: ResponsesBody = serde_json::from_str(data)
        .with_context(|| format!("failed to parse json response body: {data:?}"))?;
    let mut results = Vec::with_capacity(body.responses.len());
    for (n, item) in body.responses.iter().enumerate() {
        let result =
            parse_heartbeat_response(item).with_context(|| format!("failed parsing result #{n}"))?;
        results.push(result);
    }
    Ok(results)
}

fn parse_heartbeat_response(item: &[serde_json::Value]) -> anyhow::Result<HeartbeatResult> {
    let [body, status] = item else {
        anyhow::bail!("expected [body, status] pair, got {} item(s)", item.len());
    };
    let status: u16 =
        serde_json::from_value(status.clone()).context("failed to parse json status")?;

    if !(200..300).contains(&status) {
        let errors =
            parse_heartbeat_response_errors(body).context("failed to parse result errors")?;
        return Ok(HeartbeatResult {
            status,
            errors,
            heartbeat: None,
        });
    }

    #[derive(Deserialize)]
    struct ResponseBody {
        data: Heartbeat,
    }

    let body: ResponseBody =
        serde_json::from_value(body.clone()).context("failed to parse json heartbeat")?;
    Ok(HeartbeatResult {
        status,
        errors: Vec::new(),
        heartbeat: Some(body.data),
    })
}

/// A failed pair reports either a single `"error"` string or an `"errors"`
/// map of field name to messages. The `dependencies` field is noise from
/// oversized payloads and is skipped.
fn parse_heartbeat_response_errors(body: &serde_json::Value) -> anyhow::Result<Vec<String>> {
    if let Some(message) = body.get("error").and_then(|v| v.as_str()) {
        return Ok(vec![message.to_string()]);
    }

    let Some(fields) = body.get("errors").and_then(|v| v.as_object()) else {
        anyhow::bail!("failed to detect any errors despite invalid response status");
    };
    let mut errors = Vec::new();
    for (field, messages) in fields {
        if field == "dependencies" {
            continue;
        }
        let joined = match messages {
            serde_json::Value::Array(items) => items
                .iter()
                .map(value_to_string)
                .collect::<Vec<_>>()
                .join(" "),
            other => value_to_string(other),
        };
        errors.push(format!("{field}: {joined}"));
    }
    Ok(errors)
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
