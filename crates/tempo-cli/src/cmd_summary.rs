use anyhow::Context;

use crate::{exitcode, require_api_url};

pub fn execute(api_url: Option<&str>) -> anyhow::Result<i32> {
    let client = require_api_url(api_url)?;
    let summary = match client.today_summary() {
        Ok(summary) => summary,
        Err(err) => {
            tracing::error!("failed to fetch today's summary: {err:#}");
            eprintln!("error: {err:#}");
            return Ok(exitcode::ERR_API);
        }
    };
    let output = serde_json::to_string(&summary).context("failed to json encode summary")?;
    println!("{output}");
    Ok(exitcode::SUCCESS)
}
