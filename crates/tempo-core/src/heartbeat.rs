use serde::{Deserialize, Serialize};

/// One observed unit of developer activity, tied to a file at a point in time.
///
/// Field names on the wire match what the aggregation service expects
/// (`cursorpos`, `lineno`, `lines`, `projectPath`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    #[serde(rename = "cursorpos", default, skip_serializing_if = "Option::is_none")]
    pub cursor_position: Option<i32>,
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "lineno", default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i32>,
    #[serde(rename = "lines", default, skip_serializing_if = "Option::is_none")]
    pub lines_in_file: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(rename = "projectPath", default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    /// Unix epoch seconds.
    pub time: i64,
    pub user_agent: String,
}

/// Loaded heartbeat parameters, before validation.
#[derive(Debug, Clone, Default)]
pub struct HeartbeatParams {
    pub entity: String,
    pub cursor_position: Option<i32>,
    pub language: Option<String>,
    pub line_number: Option<i32>,
    pub lines_in_file: Option<i32>,
    pub project: Option<String>,
    pub project_path: Option<String>,
    /// Unix epoch seconds; `None` or non-positive falls back to now.
    pub time: Option<i64>,
    pub user_agent: String,
}

impl Heartbeat {
    /// Validate parameters and build a heartbeat. The entity path is
    /// mandatory; a missing or non-positive timestamp defaults to now.
    pub fn from_params(params: HeartbeatParams) -> anyhow::Result<Self> {
        if params.entity.is_empty() {
            anyhow::bail!("entity is required");
        }

        let time = params
            .time
            .filter(|secs| *secs > 0)
            .unwrap_or_else(now_unix);

        Ok(Self {
            cursor_position: params.cursor_position,
            entity: params.entity,
            language: params.language,
            line_number: params.line_number,
            lines_in_file: params.lines_in_file,
            project: params.project,
            project_path: params.project_path,
            time,
            user_agent: params.user_agent,
        })
    }

    /// Deterministic identity used as the offline queue storage key:
    /// `<time>-<cursorpos|nil>-<project|unset>`.
    ///
    /// Heartbeats with equal (time, cursor position, project) collide and
    /// overwrite each other in the queue.
    pub fn id(&self) -> String {
        let cursor = self
            .cursor_position
            .map_or_else(|| "nil".to_string(), |pos| pos.to_string());
        let project = self.project.as_deref().unwrap_or("unset");
        format!("{}-{}-{}", self.time, cursor, project)
    }
}

fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// Per-heartbeat outcome reported by the aggregation service.
///
/// Empty `errors` means the heartbeat was accepted; the echoed heartbeat is
/// only present on success.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatResult {
    pub status: u16,
    pub errors: Vec<String>,
    pub heartbeat: Option<Heartbeat>,
}

impl HeartbeatResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Heartbeat {
        Heartbeat {
            cursor_position: Some(125),
            entity: "testdata/main.go".to_string(),
            language: Some("Go".to_string()),
            line_number: Some(19),
            lines_in_file: Some(38),
            project: Some("test-cli".to_string()),
            project_path: Some("/sys/usr/tempo/".to_string()),
            time: 1585598059,
            user_agent: "tempo/0.1.0 (linux-x86_64) tempo-v0/".to_string(),
        }
    }

    #[test]
    fn id_embeds_time_cursor_and_project() {
        assert_eq!(sample().id(), "1585598059-125-test-cli");
    }

    #[test]
    fn id_uses_nil_and_unset_placeholders() {
        let mut h = sample();
        h.cursor_position = None;
        h.project = None;
        assert_eq!(h.id(), "1585598059-nil-unset");
    }

    #[test]
    fn id_is_deterministic_and_collides_on_equal_tuple() {
        let a = sample();
        let mut b = sample();
        b.entity = "other/file.rs".to_string();
        b.line_number = None;
        // Same (time, cursorpos, project) -> same identity, by design.
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn from_params_requires_entity() {
        let err = Heartbeat::from_params(HeartbeatParams::default()).unwrap_err();
        assert!(err.to_string().contains("entity is required"));
    }

    #[test]
    fn from_params_defaults_non_positive_time_to_now() {
        let before = now_unix();
        let h = Heartbeat::from_params(HeartbeatParams {
            entity: "src/lib.rs".to_string(),
            time: Some(0),
            ..Default::default()
        })
        .unwrap();
        assert!(h.time >= before);
    }

    #[test]
    fn from_params_keeps_explicit_time() {
        let h = Heartbeat::from_params(HeartbeatParams {
            entity: "src/lib.rs".to_string(),
            time: Some(1585598059),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(h.time, 1585598059);
    }

    #[test]
    fn serde_round_trip_preserves_all_fields() {
        let h = sample();
        let json = serde_json::to_string(&h).unwrap();
        let back: Heartbeat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn serde_uses_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "cursorpos",
            "entity",
            "language",
            "lineno",
            "lines",
            "project",
            "projectPath",
            "time",
            "user_agent",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn serde_omits_absent_optionals() {
        let h = Heartbeat {
            cursor_position: None,
            entity: "a.rs".to_string(),
            language: None,
            line_number: None,
            lines_in_file: None,
            project: None,
            project_path: None,
            time: 1,
            user_agent: "ua".to_string(),
        };
        let json = serde_json::to_value(&h).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
    }

    #[test]
    fn empty_errors_is_success() {
        let r = HeartbeatResult {
            status: 201,
            errors: vec![],
            heartbeat: Some(sample()),
        };
        assert!(r.is_success());

        let r = HeartbeatResult {
            status: 400,
            errors: vec!["entity: invalid".to_string()],
            heartbeat: None,
        };
        assert!(!r.is_success());
    }
}
