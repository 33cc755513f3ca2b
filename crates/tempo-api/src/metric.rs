//! Per-metric duration breakdowns.

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::summary::GrandTotal;

/// Metric keys the service understands.
pub mod metric_key {
    pub const PROJECT: &str = "project";
    pub const LINE_NUMBER: &str = "lineno";
}

/// Share of today's tracked time attributed to one metric value. `T` is
/// the value's kind: project names are strings, line numbers are integers;
/// the wire shape is otherwise identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRatio<T> {
    pub value: T,
    pub duration: u64,
    pub ratio: f64,
    #[serde(rename = "durationText")]
    pub duration_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRatioData<T> {
    #[serde(rename = "grandTotal")]
    pub grand_total: GrandTotal,
    pub ratios: Vec<MetricRatio<T>>,
    pub metric: String,
}

impl Client {
    /// Today's duration broken down per value of `key`.
    pub fn today_metric_duration<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> anyhow::Result<MetricRatioData<T>> {
        let body = self.get_json(&format!("/api/metric/duration/today/{key}"))?;
        serde_json::from_str(&body)
            .with_context(|| format!("failed to parse json response: {body:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_valued_ratios() {
        let data = r#"{
            "grandTotal": {
                "hours": 1,
                "minutes": 0,
                "seconds": 0,
                "text": "1 hr 0 min",
                "totalMs": 3600000
            },
            "metric": "project",
            "ratios": [
                {"value": "test-cli", "duration": 2700000, "ratio": 0.75, "durationText": "45 mins"},
                {"value": "docs", "duration": 900000, "ratio": 0.25, "durationText": "15 mins"}
            ]
        }"#;
        let parsed: MetricRatioData<String> = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.metric, "project");
        assert_eq!(parsed.ratios.len(), 2);
        assert_eq!(parsed.ratios[0].value, "test-cli");
        assert_eq!(parsed.ratios[0].ratio, 0.75);
        assert_eq!(parsed.ratios[1].duration_text, "15 mins");
    }

    #[test]
    fn parses_integer_valued_ratios() {
        let data = r#"{
            "grandTotal": {
                "hours": 0,
                "minutes": 10,
                "seconds": 0,
                "text": "10 mins",
                "totalMs": 600000
            },
            "metric": "lineno",
            "ratios": [
                {"value": 42, "duration": 600000, "ratio": 1.0, "durationText": "10 mins"}
            ]
        }"#;
        let parsed: MetricRatioData<u32> = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.metric, "lineno");
        assert_eq!(parsed.ratios[0].value, 42);
    }

    #[test]
    fn serializes_with_camel_case_wire_names() {
        let data = MetricRatioData {
            grand_total: GrandTotal::from_total_ms(600_000),
            metric: metric_key::PROJECT.to_string(),
            ratios: vec![MetricRatio {
                value: "test-cli".to_string(),
                duration: 600_000,
                ratio: 1.0,
                duration_text: "10 mins".to_string(),
            }],
        };
        let encoded = serde_json::to_value(&data).unwrap();
        assert!(encoded.get("grandTotal").is_some());
        assert!(encoded["ratios"][0].get("durationText").is_some());
    }
}
