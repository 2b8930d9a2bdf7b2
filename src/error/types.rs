//! Core error types.

use thiserror::Error;

/// Unified error type for request assembly, transport, and response
/// interpretation.
///
/// The first three variants are raised synchronously at build time, before
/// any network attempt. `ApiError`, `OAuthError` and `RateLimitError` are the
/// engine's decoded understanding of an API-reported failure and carry no
/// retry policy. `ProtocolError` signals a response shape the engine cannot
/// interpret.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FbError {
    /// Missing or malformed caller input (method, path, query string, ...).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The supplied path could not be resolved into path + query.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The requested combination is not supported (attachments on GET,
    /// nested attachments, legacy call without a method name, ...).
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Generic API-reported failure.
    #[error("Facebook API error ({code}): {message}")]
    ApiError { message: String, code: String },

    /// OAuth failure (invalid/expired token and friends).
    #[error("Facebook OAuth error ({code}): {message}")]
    OAuthError { message: String, code: String },

    /// The API reported that the request limit was reached.
    #[error("Facebook rate limit error ({code}): {message}")]
    RateLimitError { message: String, code: String },

    /// The response shape could not be interpreted.
    #[error("Unknown response: {0}")]
    ProtocolError(String),

    /// Transport-level failure reported by the HTTP client.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// JSON serialization/deserialization failure.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl FbError {
    /// Create a generic API error.
    pub fn api_error(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::ApiError {
            message: message.into(),
            code: code.into(),
        }
    }

    /// Create an OAuth error.
    pub fn oauth_error(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::OAuthError {
            message: message.into(),
            code: code.into(),
        }
    }

    /// Create a rate limit error.
    pub fn rate_limit_error(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::RateLimitError {
            message: message.into(),
            code: code.into(),
        }
    }

    /// Whether this error was reported by the API itself (as opposed to a
    /// build-time or transport-level failure).
    pub fn is_api_reported(&self) -> bool {
        matches!(
            self,
            Self::ApiError { .. } | Self::OAuthError { .. } | Self::RateLimitError { .. }
        )
    }

    /// API error code when this is an API-reported error.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::ApiError { code, .. }
            | Self::OAuthError { code, .. }
            | Self::RateLimitError { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_and_accessors() {
        let err = FbError::oauth_error("Invalid OAuth token", "190");
        assert!(err.is_api_reported());
        assert_eq!(err.code(), Some("190"));
        assert_eq!(
            err.to_string(),
            "Facebook OAuth error (190): Invalid OAuth token"
        );
    }

    #[test]
    fn build_time_errors_are_not_api_reported() {
        assert!(!FbError::InvalidParameter("httpMethod".into()).is_api_reported());
        assert!(FbError::InvalidPath("a?b?c".into()).code().is_none());
    }
}
