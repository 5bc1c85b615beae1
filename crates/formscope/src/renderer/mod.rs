//! Renderer abstraction for browser-based page rendering.
//!
//! The rendered fetch tier talks to a [`Renderer`]; the production
//! implementation is Chromium via chromiumoxide, run in an isolated worker.

pub mod chromium;

use crate::error::{ExtractError, ExtractResult};
use async_trait::async_trait;

pub use chromium::ChromiumRenderer;

/// A browser engine that renders a URL and returns the resulting markup.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `url` after script execution and return the page HTML.
    async fn render(&self, url: &str) -> ExtractResult<String>;
}

/// A renderer used when browser rendering is disabled.
///
/// Every render fails with a network error, so escalation surfaces as a
/// typed failure instead of hanging on a missing browser.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn render(&self, url: &str) -> ExtractResult<String> {
        Err(ExtractError::Network(format!(
            "browser rendering is disabled, cannot render {url}"
        )))
    }
}
