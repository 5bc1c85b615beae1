//! The uniform extraction result and its JSON envelope.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};

/// Survey-hosting service a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    GoogleForms,
    SurveyMonkey,
}

impl Platform {
    /// Human-readable platform name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::GoogleForms => "Google Forms",
            Platform::SurveyMonkey => "SurveyMonkey",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Metadata extracted from one form page.
///
/// String fields are empty rather than absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInfo {
    pub title: String,
    pub description: String,
    pub question_count: u32,
    pub submit_url: String,
    pub platform: Platform,
    /// Platform settings, when the page exposes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FormDetails>,
}

/// Google Forms settings carried in the embedded definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
    pub is_quiz: bool,
    pub requires_login: bool,
    pub accepting_responses: bool,
}

/// Response envelope returned by the outer surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_info: Option<FormInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractResponse {
    pub fn ok(info: FormInfo) -> Self {
        Self {
            success: true,
            form_info: Some(info),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            form_info: None,
            error: Some(message.into()),
        }
    }
}

impl From<Result<FormInfo, ExtractError>> for ExtractResponse {
    fn from(result: Result<FormInfo, ExtractError>) -> Self {
        match result {
            Ok(info) => ExtractResponse::ok(info),
            Err(e) => ExtractResponse::failure(e.to_string()),
        }
    }
}
