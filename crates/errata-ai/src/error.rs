//! Error types for AI provider calls.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while calling an inference backend.
///
/// These never leave the crate's [`AIProvider`](crate::AIProvider) boundary;
/// they are logged and turned into an empty explanation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Backend is not reachable.
    #[error("server not reachable at {0}")]
    Unreachable(String),

    /// Backend asked us to slow down.
    #[error("rate limited (HTTP {0})")]
    RateLimited(u16),

    /// Backend returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing API key")]
    MissingApiKey,

    /// Backend answered without any text.
    #[error("no completion returned")]
    EmptyResponse,
}

impl ProviderError {
    /// Only rate limiting is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::RateLimited(_))
    }

    /// Classify a transport error, distinguishing timeouts and refused connections.
    pub(crate) fn from_transport(err: reqwest::Error, base_url: &str, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout_secs)
        } else if err.is_connect() {
            ProviderError::Unreachable(base_url.to_string())
        } else {
            ProviderError::Http(err)
        }
    }

    /// Classify a non-success response.
    ///
    /// 429 is rate limiting everywhere; `overloaded_status` lets a backend add
    /// its own equivalent (Anthropic uses 529).
    pub(crate) fn from_status(status: StatusCode, body: &str, overloaded_status: Option<u16>) -> Self {
        let code = status.as_u16();
        if status == StatusCode::TOO_MANY_REQUESTS || Some(code) == overloaded_status {
            return ProviderError::RateLimited(code);
        }
        ProviderError::Api {
            status: code,
            message: error_message(body),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed { message: String },
    Plain(String),
}

/// Pull the human-readable message out of an error body, if it has the usual shape.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ErrorBody::Detailed { message },
        })
        | Ok(ErrorEnvelope {
            error: ErrorBody::Plain(message),
        }) => message,
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_retryable() {
        let err = ProviderError::from_status(StatusCode::TOO_MANY_REQUESTS, "", None);
        assert!(matches!(err, ProviderError::RateLimited(429)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_overloaded_status_counts_as_rate_limit() {
        let status = StatusCode::from_u16(529).unwrap();
        assert!(ProviderError::from_status(status, "", Some(529)).is_retryable());
        assert!(!ProviderError::from_status(status, "", None).is_retryable());
    }

    #[test]
    fn test_api_error_message_extraction() {
        let err = ProviderError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "invalid x-api-key", "type": "authentication_error"}}"#,
            None,
        );
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid x-api-key");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!ProviderError::MissingApiKey.is_retryable());
    }

    #[test]
    fn test_plain_error_body() {
        let err = ProviderError::from_status(
            StatusCode::NOT_FOUND,
            r#"{"error": "model 'llama9' not found"}"#,
            None,
        );
        assert!(err.to_string().contains("model 'llama9' not found"));
    }
}
