use anyhow::Context;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking client for the aggregation service.
pub struct Client {
    pub(crate) base_url: String,
    pub(crate) agent: ureq::Agent,
}

impl Client {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Statuses are inspected by the callers, so non-2xx responses are not
    /// turned into transport errors.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    /// GET a JSON body, accepting only a 200 status.
    pub(crate) fn get_json(&self, route: &str) -> anyhow::Result<String> {
        let url = self.url(route);
        let mut response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()
            .with_context(|| format!("failed making request to {url}"))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("failed reading response body from {url}"))?;
        match status {
            200 => Ok(body),
            400 => anyhow::bail!("bad request at {url}"),
            _ => anyhow::bail!(
                "invalid response status from {url}. got: {status}, want: 200. body: {body:?}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = Client::new("https://api.example.com/");
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(
            client.url("/api/duration/today"),
            "https://api.example.com/api/duration/today"
        );
    }
}
