//! Extraction pipeline.
//!
//! ```text
//! Start -> StaticFetch -> DataFound   -> Validate -> Parse -> Done
//!                      \-> DataMissing -> RenderedFetch -> Validate -> Parse -> Done
//! ```
//!
//! `Validate` may end in `FormNotFound` or `AuthRequired`; any fetch ends the
//! call with a network failure. There is no retry past the rendered tier.

use crate::config::ExtractorConfig;
use crate::detect::{detect_from_content, detect_from_url};
use crate::error::ExtractResult;
use crate::fetch::{ContentFetcher, FetchMode, FetchResult, PageFetcher};
use crate::model::FormInfo;
use crate::platform::{parser_for, FormPlatform};
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point of the engine. Stateless across calls.
#[derive(Clone)]
pub struct FormExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl FormExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn from_config(config: &ExtractorConfig) -> ExtractResult<Self> {
        Ok(Self::new(Arc::new(ContentFetcher::from_config(config)?)))
    }

    /// Detect the platform for `url` and extract its form metadata.
    pub async fn extract(&self, url: &str) -> ExtractResult<FormInfo> {
        let (platform, probed) = match detect_from_url(url) {
            Some(platform) => (platform, None),
            None => {
                let page = self.fetcher.fetch(url, FetchMode::Static).await?;
                let platform = detect_from_content(&page.markup);
                (platform, Some(page))
            }
        };
        info!(url, %platform, probed = probed.is_some(), "routing extraction");

        self.run(parser_for(platform), url, probed).await
    }

    /// Run one platform parser through both fetch tiers.
    ///
    /// `probed` is a static fetch already made for detection; it stands in
    /// for the static tier.
    pub async fn run(
        &self,
        parser: &dyn FormPlatform,
        url: &str,
        probed: Option<FetchResult>,
    ) -> ExtractResult<FormInfo> {
        let page = match probed {
            Some(page) => page,
            None => self.fetcher.fetch(url, FetchMode::Static).await?,
        };

        let page = if parser.has_form_data(&page.markup) {
            page
        } else {
            info!(
                url,
                platform = %parser.platform(),
                "form data missing from static markup, escalating to rendered fetch"
            );
            self.fetcher.fetch(url, FetchMode::Rendered).await?
        };

        debug!(url, mode = ?page.mode, bytes = page.markup.len(), "parsing page");
        parser.extract(&page.markup)
    }
}

/// Extract form metadata from `url` with configuration taken from the
/// environment.
pub async fn extract_form_info(url: &str) -> ExtractResult<FormInfo> {
    FormExtractor::from_config(&ExtractorConfig::from_env())?
        .extract(url)
        .await
}
