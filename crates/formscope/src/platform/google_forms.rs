//! Google Forms parser.
//!
//! A Google Form page embeds its definition as a script assignment,
//! `var FB_PUBLIC_LOAD_DATA_ = [...];`. The payload is an undocumented,
//! positionally indexed nested list. It is decoded into [`RawFormDefinition`]
//! with a checked access at every position; any shape mismatch becomes
//! [`ExtractError::Parse`].

use super::{element_text, first_form_action, selector, FormPlatform};
use crate::error::{ExtractError, ExtractResult};
use crate::model::{FormDetails, FormInfo, Platform};
use scraper::Html;
use serde_json::Value;
use tracing::debug;

/// Script-assignment prefix identifying the embedded form definition.
pub const DATA_MARKER: &str = "var FB_PUBLIC_LOAD_DATA_ = ";

/// Question type code of a page-break pseudo-question.
pub const PAGE_BREAK: i64 = 8;

/// Forms posting here require a Google account.
const AUTH_DOMAIN: &str = "accounts.google.com";

// Positions inside the embedded definition.
const TOP_METADATA: usize = 1;
const TOP_FORM_ID: usize = 14;
const META_DESCRIPTION: usize = 0;
const META_QUESTIONS: usize = 1;
const META_TITLE: usize = 8;
const META_SETTINGS: usize = 10;
const QUESTION_TYPE: usize = 3;
const SETTING_QUIZ: usize = 0;
const SETTING_LOGIN: usize = 1;
const SETTING_CLOSED: usize = 6;

pub struct GoogleFormsParser;

impl FormPlatform for GoogleFormsParser {
    fn platform(&self) -> Platform {
        Platform::GoogleForms
    }

    fn matches_url(&self, url: &str) -> bool {
        let url = url.to_ascii_lowercase();
        url.contains("docs.google.com/forms") || url.contains("forms.gle/")
    }

    fn matches_content(&self, markup: &str) -> bool {
        markup.contains("FB_PUBLIC_LOAD_DATA_") || markup.contains("docs.google.com/forms")
    }

    fn has_form_data(&self, markup: &str) -> bool {
        let doc = Html::parse_document(markup);
        matches!(find_data_script(&doc), Ok(Some(_)))
    }

    fn validate(&self, doc: &Html) -> ExtractResult<()> {
        let forms = selector("form")?;
        if doc.select(&forms).next().is_none() {
            return Err(ExtractError::FormNotFound(
                "Google Form was not found at this URL.".to_string(),
            ));
        }

        let gated = doc.select(&forms).any(|form| {
            form.value()
                .attr("action")
                .is_some_and(|action| action.contains(AUTH_DOMAIN))
        });
        if gated {
            return Err(ExtractError::AuthRequired(
                "This form requires login.".to_string(),
            ));
        }

        if find_data_script(doc)?.is_none() {
            return Err(ExtractError::FormNotFound(
                "Google Form data could not be extracted.".to_string(),
            ));
        }
        Ok(())
    }

    fn parse(&self, doc: &Html) -> ExtractResult<FormInfo> {
        let script = find_data_script(doc)?.ok_or_else(|| {
            ExtractError::FormNotFound("Google Form data could not be extracted.".to_string())
        })?;
        let definition = decode_definition(&script)?;
        let question_count = definition.question_count();
        debug!(
            questions = definition.questions.len(),
            counted = question_count,
            "decoded Google Form definition"
        );

        Ok(FormInfo {
            title: definition.title,
            description: definition.description,
            question_count,
            submit_url: first_form_action(doc)?,
            platform: Platform::GoogleForms,
            details: definition.details,
        })
    }
}

/// Text of the first `<script>` carrying the data marker.
fn find_data_script(doc: &Html) -> ExtractResult<Option<String>> {
    let scripts = selector("script")?;
    Ok(doc
        .select(&scripts)
        .map(element_text)
        .find(|text| text.contains(DATA_MARKER)))
}

/// Right-hand side of the marker assignment: from just after the marker to
/// the last semicolon, or to the end of the text when there is none.
pub fn extract_payload(script: &str) -> ExtractResult<&str> {
    let start = script
        .find(DATA_MARKER)
        .ok_or_else(|| ExtractError::Parse("form data marker not found in script".to_string()))?
        + DATA_MARKER.len();
    let rest = &script[start..];
    let end = rest.rfind(';').unwrap_or(rest.len());
    Ok(rest[..end].trim())
}

/// Decode the script text into a [`RawFormDefinition`].
pub fn decode_definition(script: &str) -> ExtractResult<RawFormDefinition> {
    let payload = extract_payload(script)?;
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| ExtractError::Parse(format!("embedded form data is not valid JSON: {e}")))?;
    RawFormDefinition::from_value(&value)
}

/// The embedded definition, mapped from positions to names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFormDefinition {
    pub title: String,
    pub description: String,
    pub questions: Vec<RawQuestion>,
    pub details: Option<FormDetails>,
}

/// One entry of the question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawQuestion {
    /// `None` when the platform left the type code null.
    pub type_code: Option<i64>,
}

impl RawQuestion {
    pub fn is_page_break(&self) -> bool {
        self.type_code == Some(PAGE_BREAK)
    }
}

impl RawFormDefinition {
    pub fn from_value(top: &Value) -> ExtractResult<Self> {
        let meta = at(top, TOP_METADATA, "form metadata")?;
        let description = string_at(meta, META_DESCRIPTION, "description")?;
        let title = string_at(meta, META_TITLE, "title")?;
        let questions = questions_at(meta)?;

        Ok(Self {
            title,
            description,
            questions,
            details: details_from(top, meta),
        })
    }

    /// Questions excluding page breaks.
    pub fn question_count(&self) -> u32 {
        self.questions.iter().filter(|q| !q.is_page_break()).count() as u32
    }
}

fn at<'a>(value: &'a Value, index: usize, what: &str) -> ExtractResult<&'a Value> {
    let items = value.as_array().ok_or_else(|| {
        ExtractError::Parse(format!(
            "expected a list holding the {what}, found {}",
            json_kind(value)
        ))
    })?;
    items.get(index).ok_or_else(|| {
        ExtractError::Parse(format!(
            "{what} missing: index {index} out of range for list of {}",
            items.len()
        ))
    })
}

fn string_at(value: &Value, index: usize, what: &str) -> ExtractResult<String> {
    match at(value, index, what)? {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        other => Err(ExtractError::Parse(format!(
            "{what} should be a string, found {}",
            json_kind(other)
        ))),
    }
}

fn questions_at(meta: &Value) -> ExtractResult<Vec<RawQuestion>> {
    let decoded;
    let items = match at(meta, META_QUESTIONS, "question list")? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        // Some pages double-encode the list as a JSON string.
        Value::String(text) => {
            decoded = serde_json::from_str::<Value>(text).map_err(|e| {
                ExtractError::Parse(format!("question list is not valid JSON: {e}"))
            })?;
            decoded.as_array().ok_or_else(|| {
                ExtractError::Parse(format!(
                    "question list should be a list, found {}",
                    json_kind(&decoded)
                ))
            })?
        }
        other => {
            return Err(ExtractError::Parse(format!(
                "question list should be a list, found {}",
                json_kind(other)
            )))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(n, entry)| {
            let what = format!("type code of question {n}");
            let type_code = match at(entry, QUESTION_TYPE, &what)? {
                Value::Null => None,
                code @ Value::Number(_) => Some(code.as_i64().ok_or_else(|| {
                    ExtractError::Parse(format!("{what} is not an integer: {code}"))
                })?),
                other => {
                    return Err(ExtractError::Parse(format!(
                        "{what} should be a number, found {}",
                        json_kind(other)
                    )))
                }
            };
            Ok(RawQuestion { type_code })
        })
        .collect()
}

/// Settings are informational: a missing or odd shape yields no details
/// rather than an error.
fn details_from(top: &Value, meta: &Value) -> Option<FormDetails> {
    let form_id = top
        .get(TOP_FORM_ID)
        .and_then(Value::as_str)
        .map(str::to_string);
    let settings = meta.get(META_SETTINGS).and_then(Value::as_array);
    if form_id.is_none() && settings.is_none() {
        return None;
    }

    let flag = |index: usize| {
        settings
            .and_then(|s| s.get(index))
            .is_some_and(is_truthy)
    };
    Some(FormDetails {
        form_id,
        is_quiz: flag(SETTING_QUIZ),
        requires_login: flag(SETTING_LOGIN),
        accepting_responses: !flag(SETTING_CLOSED),
    })
}

/// Script-style truthiness of a decoded value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
