//! Async HTTP client wrapping reqwest.
//!
//! Not a browser, just one GET with browser-like headers. No retries:
//! escalation to the rendered tier is the caller's decision.

use crate::config::{ExtractorConfig, BROWSER_HEADERS};
use crate::error::{ExtractError, ExtractResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::debug;

/// Response from a static GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP client for the static fetch tier.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Build a client carrying the browser header set and the given timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> ExtractResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(user_agent)
            .default_headers(browser_headers()?)
            .build()?;

        Ok(Self { client })
    }

    pub fn from_config(config: &ExtractorConfig) -> ExtractResult<Self> {
        Self::new(&config.user_agent, config.static_timeout())
    }

    /// Perform a single GET. Transport errors and non-2xx statuses are
    /// network failures.
    pub async fn get(&self, url: &str) -> ExtractResult<HttpResponse> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        let final_url = resp.url().to_string();
        if !status.is_success() {
            return Err(ExtractError::Network(format!(
                "{url} responded with HTTP {}",
                status.as_u16()
            )));
        }

        let body = resp.text().await?;

        debug!(
            url,
            final_url,
            status = status.as_u16(),
            bytes = body.len(),
            "static fetch complete"
        );

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn browser_headers() -> ExtractResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in BROWSER_HEADERS {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ExtractError::Network(format!("invalid header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ExtractError::Network(format!("invalid header value {value}: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
