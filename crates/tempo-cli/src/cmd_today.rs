use crate::{exitcode, require_api_url};

pub fn execute(api_url: Option<&str>) -> anyhow::Result<i32> {
    let client = require_api_url(api_url)?;
    let total = match client.today_duration() {
        Ok(total) => total,
        Err(err) => {
            tracing::error!("failed to fetch today's duration: {err:#}");
            eprintln!("error: {err:#}");
            return Ok(exitcode::ERR_API);
        }
    };
    tracing::debug!(total_ms = total.total_ms, "fetched today's duration");
    println!("{}", total.text);
    Ok(exitcode::SUCCESS)
}
