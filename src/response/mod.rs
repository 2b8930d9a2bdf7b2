//! Response interpretation.
//!
//! Decodes the raw transport response into a value tree or a classified
//! error. The success/error envelope differs between the two API surfaces
//! and between transport states: JSON bodies everywhere, except the OAuth
//! token exchange endpoint which answers with a form-encoded `text/plain`
//! body. Anything else is an unknown response.

pub mod classify;

use reqwest::header::HeaderMap;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::encoding::{url_decode, JsonSerializer};
use crate::error::FbError;

pub use classify::classify;

/// Raw response as recorded by the transport collaborator.
#[derive(Debug)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub content_type: String,
    pub headers: HeaderMap,
    /// Final response URI; its host keys error classification.
    pub url: Url,
    pub body: String,
}

/// A successfully interpreted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedResponse {
    /// Plain decoded value.
    Value(Value),
    /// Decoded value wrapped with response headers, produced for calls that
    /// carried the caching pseudo-key. A not-modified response has a null
    /// body.
    Conditional { headers: Value, body: Value },
}

impl DecodedResponse {
    /// Collapse into one value tree; the conditional form becomes
    /// `{"headers": ..., "body": ...}`.
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Conditional { headers, body } => {
                serde_json::json!({ "headers": headers, "body": body })
            }
        }
    }
}

/// Interpret a raw response envelope.
///
/// Decodes the body per content type, runs error classification against the
/// responding host, and wraps the result with response headers when the call
/// requested conditional-caching metadata.
pub fn interpret(
    serializer: &dyn JsonSerializer,
    envelope: &ResponseEnvelope,
    contains_etag: bool,
) -> Result<DecodedResponse, FbError> {
    if contains_etag && envelope.status == 304 {
        debug!(url = %envelope.url, "conditional request: not modified");
        return Ok(DecodedResponse::Conditional {
            headers: headers_to_json(&envelope.headers),
            body: Value::Null,
        });
    }

    let content_type = envelope.content_type.to_ascii_lowercase();
    let value = if content_type.contains("json") {
        serializer.deserialize(&envelope.body)?
    } else if envelope.status == 200 && content_type.contains("text/plain") {
        if envelope.url.path().ends_with("/oauth/access_token") {
            parse_oauth_token_body(&envelope.body)?
        } else {
            return Err(FbError::ProtocolError(
                "unexpected text/plain response".into(),
            ));
        }
    } else {
        return Err(FbError::ProtocolError(format!(
            "unexpected response: status {}, content type '{}'",
            envelope.status, envelope.content_type
        )));
    };

    let host = envelope.url.host_str().unwrap_or_default();
    if let Some(error) = classify(host, &value) {
        debug!(host, %error, "response carried an API error");
        return Err(error);
    }

    if contains_etag {
        Ok(DecodedResponse::Conditional {
            headers: headers_to_json(&envelope.headers),
            body: value,
        })
    } else {
        Ok(DecodedResponse::Value(value))
    }
}

/// Parse the OAuth token exchange body: `&`-joined `key=value` pairs, with
/// the `expires` field coerced to an integer count when present.
fn parse_oauth_token_body(body: &str) -> Result<Value, FbError> {
    let mut tree = serde_json::Map::new();
    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            FbError::ProtocolError(format!("malformed token response pair '{pair}'"))
        })?;
        let key = url_decode(key).map_err(|_| {
            FbError::ProtocolError(format!("malformed token response pair '{pair}'"))
        })?;
        let value = url_decode(value).map_err(|_| {
            FbError::ProtocolError(format!("malformed token response pair '{pair}'"))
        })?;
        let value = if key == "expires" {
            value
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(value))
        } else {
            Value::String(value)
        };
        tree.insert(key, value);
    }
    Ok(Value::Object(tree))
}

fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut tree = serde_json::Map::new();
    for (name, value) in headers {
        tree.insert(
            name.as_str().to_string(),
            Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
        );
    }
    Value::Object(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::SerdeSerializer;
    use reqwest::header::{HeaderValue, ETAG};
    use serde_json::json;

    fn envelope(status: u16, content_type: &str, url: &str, body: &str) -> ResponseEnvelope {
        ResponseEnvelope {
            status,
            content_type: content_type.to_string(),
            headers: HeaderMap::new(),
            url: Url::parse(url).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn json_body_decodes_to_a_value() {
        let env = envelope(
            200,
            "application/json; charset=UTF-8",
            "https://graph.facebook.com/me",
            r#"{"id":"1234","name":"A"}"#,
        );
        let decoded = interpret(&SerdeSerializer, &env, false).unwrap();
        assert_eq!(
            decoded,
            DecodedResponse::Value(json!({"id": "1234", "name": "A"}))
        );
    }

    #[test]
    fn graph_error_body_is_classified() {
        let env = envelope(
            400,
            "application/json",
            "https://graph.facebook.com/me",
            r#"{"error":{"type":"OAuthException","message":"Token expired"}}"#,
        );
        let err = interpret(&SerdeSerializer, &env, false).unwrap_err();
        assert_eq!(err, FbError::oauth_error("Token expired", "OAuthException"));
    }

    #[test]
    fn rest_error_body_is_classified_by_host() {
        let env = envelope(
            200,
            "application/json",
            "https://api.facebook.com/restserver.php",
            r#"{"error_code":"190","error_msg":"Invalid OAuth token"}"#,
        );
        let err = interpret(&SerdeSerializer, &env, false).unwrap_err();
        assert_eq!(err, FbError::oauth_error("Invalid OAuth token", "190"));
    }

    #[test]
    fn oauth_token_text_body_parses_as_pairs() {
        let env = envelope(
            200,
            "text/plain; charset=UTF-8",
            "https://graph.facebook.com/oauth/access_token",
            "access_token=abc%7Cdef&expires=5183999",
        );
        let decoded = interpret(&SerdeSerializer, &env, false).unwrap();
        assert_eq!(
            decoded,
            DecodedResponse::Value(json!({"access_token": "abc|def", "expires": 5183999}))
        );
    }

    #[test]
    fn other_text_plain_is_a_protocol_error() {
        let env = envelope(
            200,
            "text/plain",
            "https://graph.facebook.com/me",
            "something else",
        );
        let err = interpret(&SerdeSerializer, &env, false).unwrap_err();
        assert!(matches!(err, FbError::ProtocolError(_)));
    }

    #[test]
    fn unknown_content_type_is_a_protocol_error() {
        let env = envelope(200, "text/html", "https://graph.facebook.com/me", "<html>");
        let err = interpret(&SerdeSerializer, &env, false).unwrap_err();
        assert!(matches!(err, FbError::ProtocolError(_)));
    }

    #[test]
    fn etag_call_wraps_headers_around_the_body() {
        let mut env = envelope(
            200,
            "application/json",
            "https://graph.facebook.com/me",
            r#"{"id":"1"}"#,
        );
        env.headers
            .insert(ETAG, HeaderValue::from_static("\"abc\""));
        let decoded = interpret(&SerdeSerializer, &env, true).unwrap();
        let DecodedResponse::Conditional { headers, body } = decoded else {
            panic!("expected conditional response");
        };
        assert_eq!(headers["etag"], "\"abc\"");
        assert_eq!(body, json!({"id": "1"}));
    }

    #[test]
    fn not_modified_short_circuits_with_null_body() {
        let env = envelope(304, "", "https://graph.facebook.com/me", "");
        let decoded = interpret(&SerdeSerializer, &env, true).unwrap();
        let DecodedResponse::Conditional { body, .. } = decoded else {
            panic!("expected conditional response");
        };
        assert_eq!(body, Value::Null);
    }
}
