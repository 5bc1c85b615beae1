//! Platform parsers.
//!
//! Both platforms implement one capability set: decide applicability from
//! URL or content, decide whether fetched markup carries enough data to skip
//! rendering, validate form presence and auth state, and parse.

pub mod google_forms;
pub mod surveymonkey;

use crate::error::{ExtractError, ExtractResult};
use crate::model::{FormInfo, Platform};
use scraper::{ElementRef, Html, Selector};

pub use google_forms::GoogleFormsParser;
pub use surveymonkey::SurveyMonkeyParser;

/// A platform-specific form parser.
///
/// Methods take markup or a parsed document and never hold one across an
/// await, so implementations stay usable from async code.
pub trait FormPlatform: Send + Sync {
    fn platform(&self) -> Platform;

    /// The URL alone identifies this platform.
    fn matches_url(&self, url: &str) -> bool;

    /// Statically fetched content points at this platform.
    fn matches_content(&self, markup: &str) -> bool;

    /// The markup already carries this platform's form data. When false
    /// after a static fetch, the pipeline escalates to a rendered fetch.
    fn has_form_data(&self, markup: &str) -> bool;

    /// Reject pages without a form, or with a login-gated one.
    fn validate(&self, doc: &Html) -> ExtractResult<()>;

    /// Map a validated document to a [`FormInfo`].
    fn parse(&self, doc: &Html) -> ExtractResult<FormInfo>;

    /// Validate then parse.
    fn extract(&self, markup: &str) -> ExtractResult<FormInfo> {
        let doc = Html::parse_document(markup);
        self.validate(&doc)?;
        self.parse(&doc)
    }
}

static GOOGLE_FORMS: GoogleFormsParser = GoogleFormsParser;
static SURVEYMONKEY: SurveyMonkeyParser = SurveyMonkeyParser;

/// The parser responsible for `platform`.
pub fn parser_for(platform: Platform) -> &'static dyn FormPlatform {
    match platform {
        Platform::GoogleForms => &GOOGLE_FORMS,
        Platform::SurveyMonkey => &SURVEYMONKEY,
    }
}

/// All parsers, in detection priority order.
pub fn all_parsers() -> [&'static dyn FormPlatform; 2] {
    [&GOOGLE_FORMS, &SURVEYMONKEY]
}

/// Compile a CSS selector, reporting failure as a parse error.
pub(crate) fn selector(css: &str) -> ExtractResult<Selector> {
    Selector::parse(css).map_err(|e| ExtractError::Parse(format!("invalid selector {css:?}: {e}")))
}

/// Concatenated, trimmed text of an element and its descendants.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// The `action` attribute of the first `<form>`, or empty string.
pub(crate) fn first_form_action(doc: &Html) -> ExtractResult<String> {
    let forms = selector("form")?;
    Ok(doc
        .select(&forms)
        .next()
        .and_then(|f| f.value().attr("action"))
        .unwrap_or_default()
        .to_string())
}
