//! API error classification.
//!
//! Inspects a decoded response tree together with the responding host and
//! maps the API's error shapes onto the three classified error kinds. The
//! legacy REST surface reports errors as `{error_code, error_msg}`; the
//! Graph surface as `{error: {type, message}}` or, for OAuth endpoints, as
//! `{error: <int>, error_description}`.

use serde_json::Value;

use crate::error::FbError;
use crate::request::hosts;

const RATE_LIMIT_PHRASE: &str = "request limit reached";
const RATE_LIMIT_CODE: &str = "API_EC_TOO_MANY_CALLS";
const OAUTH_TYPE: &str = "OAuthException";
const OAUTH_PARAM_CODE: &str = "API_EC_PARAM_ACCESS_TOKEN";

/// Classify a decoded response value, keyed on the responding host.
///
/// Returns `None` when the value carries no recognizable error shape.
pub fn classify(host: &str, value: &Value) -> Option<FbError> {
    let tree = value.as_object()?;
    if hosts::is_rest_host(host) {
        classify_rest(tree)
    } else {
        classify_graph(tree)
    }
}

fn classify_rest(tree: &serde_json::Map<String, Value>) -> Option<FbError> {
    let code = stringify(tree.get("error_code")?);
    let message = tree
        .get("error_msg")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if code == "190" {
        Some(FbError::oauth_error(message, code))
    } else if code == "4" || code == RATE_LIMIT_CODE || contains_phrase(&message) {
        Some(FbError::rate_limit_error(message, code))
    } else {
        Some(FbError::api_error(message, code))
    }
}

fn classify_graph(tree: &serde_json::Map<String, Value>) -> Option<FbError> {
    match tree.get("error")? {
        Value::Object(error) => {
            let error_type = error.get("type").and_then(Value::as_str).unwrap_or_default();
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if error_type.is_empty() || message.is_empty() {
                return None;
            }
            if error_type == OAUTH_TYPE {
                Some(FbError::oauth_error(message, error_type))
            } else if error_type == RATE_LIMIT_CODE || contains_phrase(message) {
                Some(FbError::rate_limit_error(message, error_type))
            } else {
                Some(FbError::api_error(message, error_type))
            }
        }
        Value::Number(code) => {
            let description = tree.get("error_description").and_then(Value::as_str)?;
            if code.as_i64() == Some(190) {
                Some(FbError::oauth_error(description, OAUTH_PARAM_CODE))
            } else {
                Some(FbError::api_error(description, code.to_string()))
            }
        }
        _ => None,
    }
}

fn contains_phrase(message: &str) -> bool {
    message.to_ascii_lowercase().contains(RATE_LIMIT_PHRASE)
}

/// Legacy `error_code` values arrive as strings under `json-strings`, but be
/// permissive about numeric re-decodes.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
