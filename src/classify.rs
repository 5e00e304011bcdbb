//! Classification of endpoint-reported errors against an allow-list of
//! failures expected in the current environment.

use reqwest::StatusCode;
use serde_json::Value;

#[derive(Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The error matched an allow-listed substring; the endpoint's core
    /// path is considered working in this environment.
    Expected { matched: String, error: String },
    Unexpected { error: String },
}

/// Substring matcher over endpoint error bodies. The allow-list comes from
/// configuration so environments can adapt it without touching harness
/// logic.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    expected: Vec<String>,
}

impl ErrorClassifier {
    pub fn new(expected: Vec<String>) -> Self {
        Self { expected }
    }

    /// Classify a non-success response. The `error` field of a JSON body is
    /// the message of record; a body that is not JSON (or has no `error`
    /// field) is matched raw.
    pub fn classify(&self, _status: StatusCode, body: &str) -> ErrorClass {
        let error = extract_error_message(body);
        for pattern in &self.expected {
            if error.contains(pattern.as_str()) {
                return ErrorClass::Expected {
                    matched: pattern.clone(),
                    error,
                };
            }
        }
        ErrorClass::Unexpected { error }
    }
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ErrorClassifier {
        ErrorClassifier::new(vec![
            "PERMISSION_DENIED".to_string(),
            "Invalid Groq API key configuration".to_string(),
        ])
    }

    #[test]
    fn test_allow_listed_error_is_expected() {
        let body = r#"{"error":"Invalid Groq API key configuration"}"#;
        match classifier().classify(StatusCode::INTERNAL_SERVER_ERROR, body) {
            ErrorClass::Expected { matched, .. } => {
                assert_eq!(matched, "Invalid Groq API key configuration");
            }
            other => panic!("expected allow-list match, got {:?}", other),
        }
    }

    #[test]
    fn test_substring_match_inside_longer_message() {
        let body = r#"{"error":"7 PERMISSION_DENIED: Missing or insufficient permissions."}"#;
        assert!(matches!(
            classifier().classify(StatusCode::INTERNAL_SERVER_ERROR, body),
            ErrorClass::Expected { .. }
        ));
    }

    #[test]
    fn test_unlisted_error_is_unexpected() {
        let body = r#"{"error":"database exploded"}"#;
        match classifier().classify(StatusCode::INTERNAL_SERVER_ERROR, body) {
            ErrorClass::Unexpected { error } => assert_eq!(error, "database exploded"),
            other => panic!("expected unexpected, got {:?}", other),
        }
    }

    #[test]
    fn test_non_json_body_matched_raw() {
        let body = "Internal Server Error: PERMISSION_DENIED";
        assert!(matches!(
            classifier().classify(StatusCode::INTERNAL_SERVER_ERROR, body),
            ErrorClass::Expected { .. }
        ));
    }

    #[test]
    fn test_empty_allow_list_never_matches() {
        let classifier = ErrorClassifier::new(vec![]);
        let body = r#"{"error":"PERMISSION_DENIED"}"#;
        assert!(matches!(
            classifier.classify(StatusCode::INTERNAL_SERVER_ERROR, body),
            ErrorClass::Unexpected { .. }
        ));
    }
}
