//! Error taxonomy shared by every platform parser.

use serde::{Deserialize, Serialize};

/// All failures an extraction can end in.
///
/// `Network` and `Parse` are kept apart for diagnostics but are reported
/// under one kind (see [`ExtractError::kind`]): the caller's remedy is the
/// same for both.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No recognizable form or survey after both fetch tiers.
    #[error("Form not found: {0}")]
    FormNotFound(String),

    /// A form exists but sits behind a login or password.
    #[error("Form requires authentication: {0}")]
    AuthRequired(String),

    /// Transport failure, non-2xx status, or a failed browser render.
    #[error("Failed to fetch form data: {0}")]
    Network(String),

    /// Embedded data could not be decoded or mapped.
    #[error("Failed to parse form data: {0}")]
    Parse(String),
}

/// The three kinds a failure is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    FormNotFound,
    AuthRequired,
    NetworkOrParse,
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::FormNotFound(_) => ErrorKind::FormNotFound,
            ExtractError::AuthRequired(_) => ErrorKind::AuthRequired,
            ExtractError::Network(_) | ExtractError::Parse(_) => ErrorKind::NetworkOrParse,
        }
    }

    /// Whether this failure came from an undecodable page rather than transport.
    pub fn is_parse(&self) -> bool {
        matches!(self, ExtractError::Parse(_))
    }
}

impl From<reqwest::Error> for ExtractError {
    fn from(e: reqwest::Error) -> Self {
        ExtractError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(e: serde_json::Error) -> Self {
        ExtractError::Parse(e.to_string())
    }
}

/// Convenience result type.
pub type ExtractResult<T> = Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_and_parse_share_a_kind() {
        let net = ExtractError::Network("connection refused".into());
        let parse = ExtractError::Parse("expected value".into());
        assert_eq!(net.kind(), ErrorKind::NetworkOrParse);
        assert_eq!(parse.kind(), ErrorKind::NetworkOrParse);
        assert!(parse.is_parse());
        assert!(!net.is_parse());
    }

    #[test]
    fn test_display_names_kind_and_detail() {
        let e = ExtractError::AuthRequired("This form requires login.".into());
        assert_eq!(
            e.to_string(),
            "Form requires authentication: This form requires login."
        );
        let e = ExtractError::FormNotFound("no <form> element".into());
        assert!(e.to_string().starts_with("Form not found:"));
    }

    #[test]
    fn test_json_error_converts_to_parse() {
        let err = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err();
        let e: ExtractError = err.into();
        assert!(e.is_parse());
    }
}
