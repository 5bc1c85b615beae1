//! Platform detection from URL shape and, failing that, page content.
//!
//! Unrecognized pages default to Google Forms: any unknown URL is treated
//! as a possible Google Form.

use crate::model::Platform;
use crate::platform::all_parsers;

/// Fallback when neither URL nor content identifies a platform.
pub const DEFAULT_PLATFORM: Platform = Platform::GoogleForms;

/// Platform identified by the URL alone.
pub fn detect_from_url(url: &str) -> Option<Platform> {
    all_parsers()
        .into_iter()
        .find(|p| p.matches_url(url))
        .map(|p| p.platform())
}

/// Platform suggested by statically fetched markup.
pub fn detect_from_content(markup: &str) -> Platform {
    all_parsers()
        .into_iter()
        .find(|p| p.matches_content(markup))
        .map(|p| p.platform())
        .unwrap_or(DEFAULT_PLATFORM)
}

/// URL first, then content when given, then the default.
pub fn detect(url: &str, markup: Option<&str>) -> Platform {
    detect_from_url(url)
        .or_else(|| markup.map(detect_from_content))
        .unwrap_or(DEFAULT_PLATFORM)
}
