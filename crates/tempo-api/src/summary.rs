//! Today's aggregates: grand total and the per-project timeline.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::client::Client;

pub const TODAY_DURATION_ROUTE: &str = "/api/duration/today";
pub const TODAY_SUMMARY_ROUTE: &str = "/api/summary/today";

/// Total tracked time broken into display components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrandTotal {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u64,
    pub text: String,
    #[serde(rename = "totalMs")]
    pub total_ms: u64,
}

impl GrandTotal {
    /// Break `total_ms` into hour/minute/second components and render the
    /// status-bar text.
    pub fn from_total_ms(total_ms: u64) -> Self {
        let total_seconds = total_ms / 1000;
        let total_minutes = total_seconds / 60;
        let mut total = Self {
            hours: (total_minutes / 60) as u32,
            minutes: (total_minutes % 60) as u32,
            seconds: total_seconds % 60,
            text: String::new(),
            total_ms,
        };
        total.text = total.duration_text();
        total
    }

    // Empty only for a zero total; hours only shown when nonzero; units
    // are singular below 2.
    fn duration_text(&self) -> String {
        if self.total_ms == 0 {
            return String::new();
        }
        if self.hours > 0 {
            format!(
                "{} {} {} {}",
                self.hours,
                unit(self.hours, "hr"),
                self.minutes,
                unit(self.minutes, "min"),
            )
        } else {
            format!("{} {}", self.minutes, unit(self.minutes, "min"))
        }
    }
}

fn unit(value: u32, singular: &str) -> String {
    if value < 2 {
        singular.to_string()
    } else {
        format!("{singular}s")
    }
}

/// One contiguous stretch of activity attributed to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub start: u64,
    pub duration: u64,
    pub project: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "grandTotal")]
    pub grand_total: GrandTotal,
    pub timeline: Vec<TimelineItem>,
}

impl Client {
    /// Total time tracked today.
    pub fn today_duration(&self) -> anyhow::Result<GrandTotal> {
        let body = self.get_json(TODAY_DURATION_ROUTE)?;
        serde_json::from_str(&body)
            .with_context(|| format!("failed to parse json response: {body:?}"))
    }

    /// Today's grand total plus the activity timeline.
    pub fn today_summary(&self) -> anyhow::Result<Summary> {
        let body = self.get_json(TODAY_SUMMARY_ROUTE)?;
        serde_json::from_str(&body)
            .with_context(|| format!("failed to parse json response: {body:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_renders_empty_text() {
        let total = GrandTotal::from_total_ms(0);
        assert_eq!(total.hours, 0);
        assert_eq!(total.minutes, 0);
        assert_eq!(total.seconds, 0);
        assert_eq!(total.text, "");
    }

    #[test]
    fn below_one_minute_still_reports_zero_minutes() {
        let total = GrandTotal::from_total_ms(59_000);
        assert_eq!(total.seconds, 59);
        assert_eq!(total.text, "0 min");
    }

    #[test]
    fn one_minute_is_singular() {
        assert_eq!(GrandTotal::from_total_ms(60_000).text, "1 min");
    }

    #[test]
    fn minutes_only_are_plural_from_two() {
        assert_eq!(GrandTotal::from_total_ms(5 * 60_000).text, "5 mins");
        assert_eq!(GrandTotal::from_total_ms(2 * 60_000).text, "2 mins");
    }

    #[test]
    fn hours_and_minutes_mix_units() {
        assert_eq!(GrandTotal::from_total_ms(90 * 60_000).text, "1 hr 30 mins");
        assert_eq!(
            GrandTotal::from_total_ms(2 * 60 * 60_000).text,
            "2 hrs 0 min"
        );
        assert_eq!(
            GrandTotal::from_total_ms((60 + 1) * 60_000).text,
            "1 hr 1 min"
        );
    }

    #[test]
    fn components_break_down_correctly() {
        let total = GrandTotal::from_total_ms(3_661_000);
        assert_eq!(total.hours, 1);
        assert_eq!(total.minutes, 1);
        assert_eq!(total.seconds, 1);
        assert_eq!(total.total_ms, 3_661_000);
    }

    #[test]
    fn summary_uses_camel_case_wire_names() {
        let data = r#"{
            "grandTotal": {
                "hours": 1,
                "minutes": 30,
                "seconds": 0,
                "text": "1 hr 30 mins",
                "totalMs": 5400000
            },
            "timeline": [
                {"start": 1585598059, "duration": 5400000, "project": "test-cli"}
            ]
        }"#;
        let summary: Summary = serde_json::from_str(data).unwrap();
        assert_eq!(summary.grand_total, GrandTotal::from_total_ms(5_400_000));
        assert_eq!(summary.timeline.len(), 1);
        assert_eq!(summary.timeline[0].project, "test-cli");

        let encoded = serde_json::to_value(&summary).unwrap();
        assert!(encoded.get("grandTotal").is_some());
        assert!(encoded["grandTotal"].get("totalMs").is_some());
    }
}
