//! Two-tier content acquisition.
//!
//! A static GET is the fast path. Parsers escalate to a rendered fetch
//! (headless browser) only when the static markup lacks their data.

pub mod http_client;

use crate::config::ExtractorConfig;
use crate::error::ExtractResult;
use crate::renderer::{ChromiumRenderer, NoopRenderer, Renderer};
use async_trait::async_trait;
use http_client::HttpClient;
use std::sync::Arc;

/// Which acquisition tier to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// Single HTTP GET, no script execution.
    Static,
    /// Full render in an isolated headless browser.
    Rendered,
}

/// Markup plus the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub markup: String,
    pub mode: FetchMode,
}

/// Acquires page markup for a URL. One attempt per call, no retries.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, mode: FetchMode) -> ExtractResult<FetchResult>;
}

/// Production fetcher: reqwest for the static tier, a [`Renderer`] for the
/// rendered tier.
pub struct ContentFetcher {
    http: HttpClient,
    renderer: Arc<dyn Renderer>,
}

impl ContentFetcher {
    pub fn new(http: HttpClient, renderer: Arc<dyn Renderer>) -> Self {
        Self { http, renderer }
    }

    /// Build from config, choosing Chromium or the no-op renderer.
    pub fn from_config(config: &ExtractorConfig) -> ExtractResult<Self> {
        let renderer: Arc<dyn Renderer> = if config.render_enabled {
            Arc::new(ChromiumRenderer::new(config.clone()))
        } else {
            Arc::new(NoopRenderer)
        };
        Ok(Self::new(HttpClient::from_config(config)?, renderer))
    }
}

#[async_trait]
impl PageFetcher for ContentFetcher {
    async fn fetch(&self, url: &str, mode: FetchMode) -> ExtractResult<FetchResult> {
        let markup = match mode {
            FetchMode::Static => self.http.get(url).await?.body,
            FetchMode::Rendered => self.renderer.render(url).await?,
        };
        Ok(FetchResult { markup, mode })
    }
}
