//! SurveyMonkey parser. Scans rendered DOM with a primary selector and
//! fallbacks for each field.

use super::{element_text, first_form_action, selector, FormPlatform};
use crate::error::{ExtractError, ExtractResult};
use crate::model::{FormInfo, Platform};
use scraper::Html;

const BRAND: &str = "SurveyMonkey";
const UNTITLED: &str = "Untitled Survey";

/// Class fragments marking a question container.
const QUESTION_CLASSES: &[&str] = &["question-container", "question-row"];

pub struct SurveyMonkeyParser;

impl FormPlatform for SurveyMonkeyParser {
    fn platform(&self) -> Platform {
        Platform::SurveyMonkey
    }

    fn matches_url(&self, url: &str) -> bool {
        url.to_ascii_lowercase().contains("surveymonkey.com")
    }

    fn matches_content(&self, markup: &str) -> bool {
        markup.contains(BRAND) || markup.contains("surveymonkey.com")
    }

    fn has_form_data(&self, markup: &str) -> bool {
        matches!(branded_title(&Html::parse_document(markup)), Ok(true))
    }

    fn validate(&self, doc: &Html) -> ExtractResult<()> {
        if !branded_title(doc)? {
            return Err(ExtractError::FormNotFound(
                "SurveyMonkey form was not found at this URL.".to_string(),
            ));
        }

        let gate = selector("div.password-required, div.login-required")?;
        if doc.select(&gate).next().is_some() {
            return Err(ExtractError::AuthRequired(
                "This form requires login or password.".to_string(),
            ));
        }
        Ok(())
    }

    fn parse(&self, doc: &Html) -> ExtractResult<FormInfo> {
        let title = first_text(doc, &["h1.survey-title", "h1"])?
            .unwrap_or_else(|| UNTITLED.to_string());
        let description =
            first_text(doc, &["div.survey-description", "div.description"])?.unwrap_or_default();

        Ok(FormInfo {
            title,
            description,
            question_count: count_questions(doc)?,
            submit_url: first_form_action(doc)?,
            platform: Platform::SurveyMonkey,
            details: None,
        })
    }
}

/// Whether the first `<title>` mentions SurveyMonkey.
fn branded_title(doc: &Html) -> ExtractResult<bool> {
    let title = selector("title")?;
    Ok(doc
        .select(&title)
        .next()
        .is_some_and(|t| t.text().collect::<String>().contains(BRAND)))
}

/// Text of the first element matching any selector, tried in order.
fn first_text(doc: &Html, candidates: &[&str]) -> ExtractResult<Option<String>> {
    for css in candidates {
        let sel = selector(css)?;
        if let Some(el) = doc.select(&sel).next() {
            return Ok(Some(element_text(el)));
        }
    }
    Ok(None)
}

/// Question containers, falling back to elements tagged with a question type.
fn count_questions(doc: &Html) -> ExtractResult<u32> {
    let divs = selector("div[class]")?;
    let containers = doc
        .select(&divs)
        .filter(|div| {
            div.value()
                .classes()
                .any(|class| QUESTION_CLASSES.iter().any(|q| class.contains(*q)))
        })
        .count();
    if containers > 0 {
        return Ok(containers as u32);
    }

    let typed = selector("div[data-question-type]")?;
    Ok(doc.select(&typed).count() as u32)
}
