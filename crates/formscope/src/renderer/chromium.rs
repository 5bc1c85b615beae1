//! Chromium-based renderer using chromiumoxide.
//!
//! Every render launches its own browser on a dedicated OS thread with a
//! private current-thread runtime and a throw-away profile directory. The
//! calling runtime only awaits a oneshot channel.

use super::Renderer;
use crate::config::{find_chromium, ExtractorConfig, BROWSER_HEADERS};
use crate::error::{ExtractError, ExtractResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::EventLifecycleEvent;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle event name Chromium emits once the page has had no network
/// activity for 500ms.
const NETWORK_IDLE: &str = "networkIdle";

/// Page setup and teardown allowance on top of navigation and settle time.
const CAPTURE_SLACK: Duration = Duration::from_secs(10);

/// How long a closed browser gets to exit before it is killed.
const EXIT_GRACE: Duration = Duration::from_secs(5);

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    config: ExtractorConfig,
}

impl ChromiumRenderer {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn render(&self, url: &str) -> ExtractResult<String> {
        let (tx, rx) = oneshot::channel();
        let target = url.to_string();
        let config = self.config.clone();

        std::thread::Builder::new()
            .name("formscope-render".to_string())
            .spawn(move || {
                let result = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime.block_on(render_isolated(&target, &config)),
                    Err(e) => Err(ExtractError::Network(format!(
                        "failed to start render runtime: {e}"
                    ))),
                };
                let _ = tx.send(result);
            })
            .map_err(|e| ExtractError::Network(format!("failed to spawn render worker: {e}")))?;

        rx.await.unwrap_or_else(|_| {
            Err(ExtractError::Network(
                "render worker exited without a result".to_string(),
            ))
        })
    }
}

/// Launch, capture, tear down. Runs inside the worker's own runtime.
async fn render_isolated(url: &str, config: &ExtractorConfig) -> ExtractResult<String> {
    info!(url, "rendering page in headless browser");
    let session = BrowserSession::launch(config).await?;

    // Navigation has its own timeout; this bounds the page setup around it.
    let limit = config.render_timeout() + config.settle_delay() + CAPTURE_SLACK;
    let result = match tokio::time::timeout(limit, session.capture(url, config)).await {
        Ok(result) => result,
        Err(_) => Err(ExtractError::Network(format!(
            "render of {url} exceeded {}s",
            limit.as_secs()
        ))),
    };
    session.shutdown().await;
    result
}

/// One browser process plus its event handler and profile directory.
///
/// `shutdown` closes the browser gracefully and kills it if that fails.
/// Dropping the session aborts the handler, chromiumoxide kills a child
/// still running, and the profile directory is removed with its `TempDir`.
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    _profile: TempDir,
}

impl BrowserSession {
    async fn launch(config: &ExtractorConfig) -> ExtractResult<Self> {
        // Owned here so a failed launch still removes the directory.
        let profile = tempfile::Builder::new()
            .prefix("formscope-render-")
            .tempdir()
            .map_err(|e| ExtractError::Network(format!("failed to create browser profile: {e}")))?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile.path())
            .launch_timeout(config.launch_timeout())
            .request_timeout(config.render_timeout())
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if let Some(path) = find_chromium(config.chromium_path.as_ref()) {
            debug!(path = %path.display(), "using Chromium binary");
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder
            .build()
            .map_err(|e| ExtractError::Network(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ExtractError::Network(format!("failed to launch Chromium: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler error: {e}");
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            _profile: profile,
        })
    }

    async fn capture(&self, url: &str, config: &ExtractorConfig) -> ExtractResult<String> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ExtractError::Network(format!("failed to open page: {e}")))?;

        let result = navigate_and_capture(&page, url, config).await;
        if let Err(e) = page.close().await {
            debug!("page close failed: {e}");
        }
        result
    }

    async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("browser close failed, killing process: {e}");
            self.kill().await;
        }
        match tokio::time::timeout(EXIT_GRACE, self.browser.wait()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("waiting for browser exit failed: {e}"),
            Err(_) => {
                warn!("browser still running after {}s, killing", EXIT_GRACE.as_secs());
                self.kill().await;
            }
        }
    }

    async fn kill(&mut self) {
        if let Some(Err(e)) = self.browser.kill().await {
            warn!("failed to kill browser: {e}");
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

async fn navigate_and_capture(
    page: &Page,
    url: &str,
    config: &ExtractorConfig,
) -> ExtractResult<String> {
    let cdp = |what: &'static str| {
        move |e: chromiumoxide::error::CdpError| ExtractError::Network(format!("{what}: {e}"))
    };

    page.execute(SetUserAgentOverrideParams::new(config.user_agent.clone()))
        .await
        .map_err(cdp("failed to set user agent"))?;
    page.execute(SetExtraHttpHeadersParams::new(Headers::new(extra_headers())))
        .await
        .map_err(cdp("failed to set request headers"))?;

    let mut lifecycle = page
        .event_listener::<EventLifecycleEvent>()
        .await
        .map_err(cdp("failed to subscribe to lifecycle events"))?;
    let main_frame = page.mainframe().await.ok().flatten();

    let timeout = config.render_timeout();
    let navigation = async {
        page.goto(url).await.map_err(cdp("navigation failed"))?;
        // Wait for the main frame of the new document to go network-idle.
        let mut navigated = false;
        while let Some(event) = lifecycle.next().await {
            if main_frame.as_ref().is_some_and(|f| *f != event.frame_id) {
                continue;
            }
            match event.name.as_str() {
                "init" => navigated = true,
                NETWORK_IDLE if navigated => break,
                _ => {}
            }
        }
        Ok::<(), ExtractError>(())
    };

    tokio::time::timeout(timeout, navigation)
        .await
        .map_err(|_| {
            ExtractError::Network(format!(
                "navigation to {url} timed out after {}s",
                timeout.as_secs()
            ))
        })??;

    tokio::time::sleep(config.settle_delay()).await;

    let html = page
        .content()
        .await
        .map_err(cdp("failed to capture page content"))?;
    debug!(url, bytes = html.len(), "rendered fetch complete");
    Ok(html)
}

fn extra_headers() -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = BROWSER_HEADERS
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect();
    serde_json::Value::Object(map)
}
