//! Extractor configuration: defaults, environment overrides, Chromium lookup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Desktop Chrome user agent sent by both fetch tiers.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Request headers sent alongside the user agent.
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Accept-Encoding", "gzip, deflate, br"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Cache-Control", "max-age=0"),
];

/// Environment variable naming a Chromium binary.
pub const CHROMIUM_PATH_ENV: &str = "FORMSCOPE_CHROMIUM_PATH";

const SYSTEM_CHROMIUM: &[&str] = &["google-chrome", "chromium", "chromium-browser"];

/// Tunables for both fetch tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Timeout for the static HTTP GET.
    pub static_timeout_secs: u64,
    /// Time allowed for Chromium to start and expose its DevTools socket.
    pub launch_timeout_secs: u64,
    /// Navigation timeout for the rendered fetch.
    pub render_timeout_secs: u64,
    /// Pause after the network settles, before capturing markup.
    pub settle_delay_ms: u64,
    pub user_agent: String,
    /// Explicit Chromium binary; discovered when `None`.
    pub chromium_path: Option<PathBuf>,
    /// When false, escalation to the rendered tier fails with a network error.
    pub render_enabled: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            static_timeout_secs: 30,
            launch_timeout_secs: 20,
            render_timeout_secs: 60,
            settle_delay_ms: 3000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chromium_path: None,
            render_enabled: true,
        }
    }
}

impl ExtractorConfig {
    /// Defaults overlaid with `FORMSCOPE_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup. Unparseable values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("FORMSCOPE_STATIC_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.static_timeout_secs = v;
        }
        if let Some(v) = lookup("FORMSCOPE_LAUNCH_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.launch_timeout_secs = v;
        }
        if let Some(v) = lookup("FORMSCOPE_RENDER_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.render_timeout_secs = v;
        }
        if let Some(v) = lookup("FORMSCOPE_SETTLE_DELAY_MS").and_then(|s| s.parse().ok()) {
            self.settle_delay_ms = v;
        }
        if let Some(p) = lookup(CHROMIUM_PATH_ENV).filter(|s| !s.is_empty()) {
            self.chromium_path = Some(PathBuf::from(p));
        }
        if let Some(v) = lookup("FORMSCOPE_DISABLE_RENDER") {
            if matches!(v.as_str(), "1" | "true" | "yes") {
                self.render_enabled = false;
            }
        }
        self
    }

    pub fn static_timeout(&self) -> Duration {
        Duration::from_secs(self.static_timeout_secs)
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Chromium builds unpacked by hand under `~/.formscope/chromium`.
fn bundled_chromium(home: PathBuf) -> Vec<PathBuf> {
    let root = home.join(".formscope").join("chromium");
    let mut builds = Vec::new();
    if cfg!(target_os = "macos") {
        const APP: &str =
            "Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing";
        builds.push(root.join("chrome-mac-arm64").join(APP));
        builds.push(root.join("chrome-mac-x64").join(APP));
    } else {
        builds.push(root.join("chrome-linux64").join("chrome"));
    }
    builds.push(root.join("chrome"));
    builds
}

/// Locate a Chromium binary: the configured path, then
/// `FORMSCOPE_CHROMIUM_PATH`, then a bundled build, then `PATH`.
///
/// `None` leaves the choice to chromiumoxide's own detection.
pub fn find_chromium(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    explicit
        .cloned()
        .into_iter()
        .chain(std::env::var_os(CHROMIUM_PATH_ENV).map(PathBuf::from))
        .chain(dirs::home_dir().into_iter().flat_map(bundled_chromium))
        .find(|candidate| candidate.exists())
        .or_else(|| {
            SYSTEM_CHROMIUM
                .iter()
                .find_map(|name| which::which(name).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_fetch_contract() {
        let cfg = ExtractorConfig::default();
        assert_eq!(cfg.static_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.launch_timeout(), Duration::from_secs(20));
        assert_eq!(cfg.render_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.settle_delay(), Duration::from_secs(3));
        assert!(cfg.render_enabled);
        assert!(cfg.chromium_path.is_none());
    }

    #[test]
    fn test_overrides_apply_and_ignore_garbage() {
        let env: HashMap<&str, &str> = [
            ("FORMSCOPE_STATIC_TIMEOUT_SECS", "5"),
            ("FORMSCOPE_LAUNCH_TIMEOUT_SECS", "2"),
            ("FORMSCOPE_RENDER_TIMEOUT_SECS", "not-a-number"),
            ("FORMSCOPE_SETTLE_DELAY_MS", "250"),
            ("FORMSCOPE_CHROMIUM_PATH", "/opt/chrome/chrome"),
            ("FORMSCOPE_DISABLE_RENDER", "1"),
        ]
        .into_iter()
        .collect();

        let cfg = ExtractorConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.static_timeout_secs, 5);
        assert_eq!(cfg.launch_timeout_secs, 2);
        assert_eq!(cfg.render_timeout_secs, 60);
        assert_eq!(cfg.settle_delay_ms, 250);
        assert_eq!(cfg.chromium_path, Some(PathBuf::from("/opt/chrome/chrome")));
        assert!(!cfg.render_enabled);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let cfg: ExtractorConfig = serde_json::from_str(r#"{"settle_delay_ms": 0}"#).unwrap();
        assert_eq!(cfg.settle_delay_ms, 0);
        assert_eq!(cfg.static_timeout_secs, 30);
        assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_existing_explicit_chromium_wins() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("chrome");
        std::fs::write(&binary, "").unwrap();
        assert_eq!(find_chromium(Some(&binary)), Some(binary));
    }

    #[test]
    fn test_bundled_chromium_candidates_live_under_home() {
        let builds = bundled_chromium(PathBuf::from("/home/u"));
        assert!(!builds.is_empty());
        assert!(builds
            .iter()
            .all(|p| p.starts_with("/home/u/.formscope/chromium")));
        assert_eq!(
            builds.last(),
            Some(&PathBuf::from("/home/u/.formscope/chromium/chrome"))
        );
    }

    #[test]
    fn test_browser_headers_cover_static_header_set() {
        let names: Vec<&str> = BROWSER_HEADERS.iter().map(|(k, _)| *k).collect();
        for expected in [
            "Accept",
            "Accept-Language",
            "Accept-Encoding",
            "Connection",
            "Upgrade-Insecure-Requests",
            "Cache-Control",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }
}
