use anyhow::Context;
use tempo_api::metric::metric_key;

use crate::{exitcode, require_api_url};

/// The metric key picks the value type: project names are strings, line
/// numbers are integers.
pub fn execute(api_url: Option<&str>, key: &str) -> anyhow::Result<i32> {
    match key {
        metric_key::PROJECT => fetch_and_print::<String>(api_url, key),
        metric_key::LINE_NUMBER => fetch_and_print::<u32>(api_url, key),
        other => anyhow::bail!("invalid metric key: {other}"),
    }
}

fn fetch_and_print<T>(api_url: Option<&str>, key: &str) -> anyhow::Result<i32>
where
    T: serde::de::DeserializeOwned + serde::Serialize,
{
    let client = require_api_url(api_url)?;
    let data = match client.today_metric_duration::<T>(key) {
        Ok(data) => data,
        Err(err) => {
            tracing::error!("failed to fetch today's {key} breakdown: {err:#}");
            eprintln!("error: {err:#}");
            return Ok(exitcode::ERR_API);
        }
    };
    let output = serde_json::to_string(&data).context("failed to json encode metric data")?;
    println!("{output}");
    Ok(exitcode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_metric_key_is_rejected_up_front() {
        let err = execute(None, "branch").unwrap_err();
        assert!(err.to_string().contains("invalid metric key: branch"));
    }
}
